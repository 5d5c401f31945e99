//! Lexer errors.
//!
//! Every variant names the file and line, so the message alone locates the
//! problem.

use thiserror::Error;
use wuffs_ir::TokenMapError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("lex: invalid UTF-8 at {file}:{line}")]
    InvalidUtf8 { file: String, line: u32 },

    #[error("lex: unrecognized byte '\\x{byte:02X}' at {file}:{line}")]
    UnrecognizedByte { byte: u8, file: String, line: u32 },

    #[error("lex: expected final {quote} in string at {file}:{line}")]
    UnterminatedString { quote: char, file: String, line: u32 },

    #[error("lex: backslash in \"-string at {file}:{line}")]
    BackslashInString { file: String, line: u32 },

    #[error("lex: control character in string at {file}:{line}")]
    ControlCharacter { file: String, line: u32 },

    #[error("lex: invalid '-string at {file}:{line}")]
    InvalidSingleQuoted { file: String, line: u32 },

    #[error("lex: multi-byte '-string needs be or le suffix at {file}:{line}")]
    MissingEndianSuffix { file: String, line: u32 },

    #[error("lex: legacy octal syntax at {file}:{line}")]
    LegacyOctal { file: String, line: u32 },

    #[error("lex: invalid numeric literal {text:?} at {file}:{line}")]
    InvalidNumber { text: String, file: String, line: u32 },

    #[error("lex: numeric literal {text:?} is too large at {file}:{line}")]
    NumberTooLarge { text: String, file: String, line: u32 },

    #[error("lex: token too long at {file}:{line}")]
    TokenTooLong { file: String, line: u32 },

    #[error("lex: too many lines in {file:?}")]
    TooManyLines { file: String },

    #[error("lex: {source} at {file}:{line}")]
    Map {
        source: TokenMapError,
        file: String,
        line: u32,
    },
}
