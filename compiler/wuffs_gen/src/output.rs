//! Writing generated files without touching unchanged ones.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::GenError;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Wrote,
    Unchanged,
}

/// Writes files and remembers what each write did.
#[derive(Debug, Default)]
pub struct OutputWriter {
    log: Vec<(PathBuf, WriteOutcome)>,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `contents` to `path` unless it already holds exactly that.
    /// Parent directories are created as needed.
    pub fn write(&mut self, path: &Path, contents: &[u8]) -> Result<WriteOutcome, GenError> {
        let outcome = if fs::read(path).is_ok_and(|existing| existing == contents) {
            WriteOutcome::Unchanged
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
            }
            fs::write(path, contents).map_err(|e| GenError::io(path, e))?;
            WriteOutcome::Wrote
        };
        trace!(path = %path.display(), ?outcome, "output");
        self.log.push((path.to_path_buf(), outcome));
        Ok(outcome)
    }

    /// Every write so far, in order.
    pub fn log(&self) -> &[(PathBuf, WriteOutcome)] {
        &self.log
    }

    pub fn count(&self, outcome: WriteOutcome) -> usize {
        self.log.iter().filter(|(_, o)| *o == outcome).count()
    }
}
