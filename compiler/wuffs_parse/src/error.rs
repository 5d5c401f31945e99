//! Parse errors.
//!
//! Every error names the file and line it was found at. The first error
//! aborts the parse.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A specific token or construct was required.
    #[error("parse: expected {expected}, got {got:?} at {file}:{line}")]
    Expected {
        expected: String,
        got: String,
        file: String,
        line: u32,
    },

    /// Well-formed tokens that do not make a valid construct.
    #[error("parse: {message} at {file}:{line}")]
    Invalid {
        message: String,
        file: String,
        line: u32,
    },

    #[error("parse: nesting too deep at {file}:{line}")]
    TooDeep { file: String, line: u32 },
}

impl ParseError {
    pub fn line(&self) -> u32 {
        match self {
            ParseError::Expected { line, .. }
            | ParseError::Invalid { line, .. }
            | ParseError::TooDeep { line, .. } => *line,
        }
    }
}
