//! Release versions and file naming.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::GenError;

#[cfg(test)]
mod tests;

/// A `MAJOR.MINOR.PATCH[-EXTENSION]` version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u16,
    pub patch: u16,
    pub extension: Option<String>,
}

/// Characters that never need quoting on a command line.
fn is_alphanumeric_ish(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b',' | b'-' | b'.' | b'/' | b'_'))
}

impl Version {
    pub fn parse(s: &str) -> Result<Version, GenError> {
        let bad = || GenError::BadVersion(s.to_owned());
        if !is_alphanumeric_ish(s) {
            return Err(bad());
        }
        let (numbers, extension) = match s.split_once('-') {
            Some((numbers, ext)) => (numbers, Some(ext.to_owned())),
            None => (s, None),
        };
        let mut parts = numbers.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        Ok(Version {
            major: major.parse().map_err(|_| bad())?,
            minor: minor.parse().map_err(|_| bad())?,
            patch: patch.parse().map_err(|_| bad())?,
            extension: extension.filter(|e| !e.is_empty()),
        })
    }

    /// The release file's stem: `wuffs-vMAJOR.MINOR`, or
    /// `unsupported-snapshot` for version 0.0.
    pub fn release_stem(&self) -> String {
        if self.major == 0 && self.minor == 0 {
            "unsupported-snapshot".to_owned()
        } else {
            format!("wuffs-v{}.{}", self.major, self.minor)
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ext) = &self.extension {
            write!(f, "-{ext}")?;
        }
        Ok(())
    }
}

/// The extension of the files a language's release is built from. C
/// releases are built from the headers.
pub fn release_ext(lang: &str) -> &str {
    if lang == "c" {
        "h"
    } else {
        lang
    }
}

/// `<root>/release/<lang>/<stem>.<ext>`.
pub fn release_path(root: &Path, lang: &str, version: &Version) -> PathBuf {
    root.join("release")
        .join(lang)
        .join(format!("{}.{}", version.release_stem(), release_ext(lang)))
}

/// Every file under `dir` whose name ends in `.ext`, sorted.
pub fn find_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, GenError> {
    let suffix = format!(".{ext}");
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| GenError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| GenError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix))
            {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
