//! Numeric literal validation.

use wuffs_ir::token::parse_num_literal;

/// Why a numeric literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberError {
    LegacyOctal,
    Invalid,
    TooLarge,
}

/// Check a literal as matched by the lexer: decimal or `0x` hex digits,
/// with single underscores only between digits.
pub(crate) fn check(text: &str) -> Result<(), NumberError> {
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"));
    let (digits, radix) = match hex {
        Some(digits) => (digits, 16),
        None => {
            let bytes = text.as_bytes();
            if bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit() {
                return Err(NumberError::LegacyOctal);
            }
            (text, 10)
        }
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return Err(NumberError::Invalid);
    }
    if digits.contains("__") {
        return Err(NumberError::Invalid);
    }
    if !digits.chars().all(|c| c == '_' || c.is_digit(radix)) {
        return Err(NumberError::Invalid);
    }
    parse_num_literal(text).map(|_| ()).ok_or(NumberError::TooLarge)
}
