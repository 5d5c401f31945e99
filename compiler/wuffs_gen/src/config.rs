//! Driver configuration and root directory discovery.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::GenError;

#[cfg(test)]
mod tests;

/// The marker file at the top of a source tree.
pub const ROOT_MARKER: &str = "wuffs-root-directory.txt";

/// The environment variable naming the root directory.
pub const ROOT_ENV: &str = "WUFFS_ROOT";

pub const DEFAULT_PREFIX: &str = "wuffs-";
pub const DEFAULT_LANGS: &str = "c";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenConfig {
    /// The tree holding `std/`, `gen/` and `release/`.
    pub root: PathBuf,
    /// Target languages. Each names a backend and a file extension.
    pub langs: Vec<String>,
    /// Backend commands are `prefix` followed by the language.
    pub prefix: String,
    /// Generate only the named packages, taking their dependencies' stubs
    /// from a previous run.
    pub skip_gen_deps: bool,
}

impl GenConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GenConfig {
            root: root.into(),
            langs: vec![DEFAULT_LANGS.to_owned()],
            prefix: DEFAULT_PREFIX.to_owned(),
            skip_gen_deps: false,
        }
    }

    #[must_use]
    pub fn with_langs(mut self, langs: Vec<String>) -> Self {
        self.langs = langs;
        self
    }
}

/// Whether `s` is a valid language or package name: `[a-z0-9]+`.
pub fn valid_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Parse a `-langs` value such as `c,go`. The empty string selects no
/// languages.
pub fn parse_langs(comma_separated: &str) -> Result<Vec<String>, GenError> {
    if comma_separated.is_empty() {
        return Ok(Vec::new());
    }
    comma_separated
        .split(',')
        .map(|lang| {
            if valid_name(lang) {
                Ok(lang.to_owned())
            } else {
                Err(GenError::InvalidName {
                    what: "lang",
                    name: lang.to_owned(),
                })
            }
        })
        .collect()
}

/// The root directory: the `-root` flag, then `$WUFFS_ROOT`, then the
/// nearest ancestor of `cwd` holding the marker file, then `.`.
pub fn find_root(flag: Option<&Path>, env: Option<OsString>, cwd: &Path) -> PathBuf {
    if let Some(flag) = flag {
        return flag.to_path_buf();
    }
    if let Some(env) = env.filter(|v| !v.is_empty()) {
        return PathBuf::from(env);
    }
    cwd.ancestors()
        .find(|dir| dir.join(ROOT_MARKER).is_file())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
