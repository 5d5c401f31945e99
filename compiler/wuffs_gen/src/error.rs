//! Generation errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use wuffs_check::CheckError;
use wuffs_lexer::LexError;
use wuffs_parse::ParseError;

use crate::resolve::ResolveError;

#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Reading, writing or spawning failed. `path` is the file or command.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A backend process exited unsuccessfully.
    #[error("{command}: failed")]
    BackendFailed { command: String },

    #[error("{command}: output did not contain {:?}", crate::C_HEADER_ENDS_HERE)]
    MissingSentinel { command: String },

    #[error("invalid {what} {name:?}, not in [a-z0-9]+")]
    InvalidName { what: &'static str, name: String },

    #[error("package {package}: missing packageid declaration")]
    MissingPackageId { package: String },

    #[error("bad -version flag value {0:?}")]
    BadVersion(String),
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}
