//! Lexer for Wuffs using logos with token interning.
//!
//! Produces a flat `Vec<Token>` with line numbers. A `;` is inserted at each
//! newline (and at end of input) that follows a token which can end a
//! statement, so the parser never sees newlines.

mod lex_error;
mod number;
mod raw_token;

use logos::Logos;
use tracing::trace;
use wuffs_ir::token::unescape_bytes;
use wuffs_ir::{Key, Token, TokenId, TokenMap};

pub use lex_error::LexError;
use number::NumberError;
use raw_token::RawToken;

/// Longest token, in bytes.
pub const MAX_TOKEN_SIZE: usize = 1023;

/// Highest line number a file may reach.
pub const MAX_LINE: u32 = 1_048_575;

/// Lex a source file.
///
/// Identifiers, literals and operators are interned into `map`. Keywords
/// and built-in names resolve to their fixed keys.
pub fn lex(map: &TokenMap, filename: &str, source: &[u8]) -> Result<Vec<Token>, LexError> {
    let source = std::str::from_utf8(source).map_err(|e| LexError::InvalidUtf8 {
        file: filename.to_owned(),
        line: line_of(&source[..e.valid_up_to()]),
    })?;

    let mut lexer = Lexer {
        map,
        filename,
        line: 1,
        tokens: Vec::with_capacity(source.len() / 4),
    };
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let slice = logos.slice();
        match result {
            Ok(RawToken::LineComment) => {}
            Ok(RawToken::Newline) => lexer.newline()?,
            Ok(raw) => {
                let id = lexer.convert(raw, slice)?;
                lexer.push(id);
            }
            Err(()) => {
                return Err(LexError::UnrecognizedByte {
                    byte: slice.bytes().next().unwrap_or(0),
                    file: filename.to_owned(),
                    line: lexer.line,
                });
            }
        }
    }
    lexer.end_statement();

    trace!(file = filename, tokens = lexer.tokens.len(), "lexed");
    Ok(lexer.tokens)
}

fn line_of(prefix: &[u8]) -> u32 {
    let newlines = prefix.iter().filter(|&&b| b == b'\n').count();
    u32::try_from(newlines).map_or(u32::MAX, |n| n.saturating_add(1))
}

struct Lexer<'a> {
    map: &'a TokenMap,
    filename: &'a str,
    line: u32,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn push(&mut self, id: TokenId) {
        self.tokens.push(Token::new(id, self.line));
    }

    /// Insert a `;` if the last token can end a statement.
    fn end_statement(&mut self) {
        if self
            .tokens
            .last()
            .is_some_and(|t| t.id.is_implicit_semicolon())
        {
            self.push(TokenId::built_in(Key::SEMICOLON));
        }
    }

    fn newline(&mut self) -> Result<(), LexError> {
        self.end_statement();
        if self.line == MAX_LINE {
            return Err(LexError::TooManyLines {
                file: self.filename.to_owned(),
            });
        }
        self.line += 1;
        Ok(())
    }

    fn convert(&self, raw: RawToken, slice: &str) -> Result<TokenId, LexError> {
        let file = || self.filename.to_owned();
        let line = self.line;
        match raw {
            RawToken::Punct(key) | RawToken::Squiggle(key) => return Ok(TokenId::built_in(key)),
            RawToken::DoubleZ => return Ok(TokenId::built_in(Key::DOUBLE_Z)),
            RawToken::UnterminatedDoubleQuoted => {
                return Err(LexError::UnterminatedString {
                    quote: '"',
                    file: file(),
                    line,
                })
            }
            RawToken::UnterminatedSingleQuoted => {
                return Err(LexError::UnterminatedString {
                    quote: '\'',
                    file: file(),
                    line,
                })
            }
            RawToken::Ident
            | RawToken::Number
            | RawToken::DoubleQuoted
            | RawToken::SingleQuoted
            | RawToken::LineComment
            | RawToken::Newline => {}
        }

        if slice.len() > MAX_TOKEN_SIZE {
            return Err(LexError::TokenTooLong { file: file(), line });
        }

        match raw {
            RawToken::Number => {
                number::check(slice).map_err(|e| match e {
                    NumberError::LegacyOctal => LexError::LegacyOctal { file: file(), line },
                    NumberError::Invalid => LexError::InvalidNumber {
                        text: slice.to_owned(),
                        file: file(),
                        line,
                    },
                    NumberError::TooLarge => LexError::NumberTooLarge {
                        text: slice.to_owned(),
                        file: file(),
                        line,
                    },
                })?;
            }
            RawToken::DoubleQuoted => {
                if slice.contains('\\') {
                    return Err(LexError::BackslashInString { file: file(), line });
                }
                self.check_control(slice)?;
            }
            RawToken::SingleQuoted => {
                self.check_control(slice)?;
                let bytes = unescape_bytes(slice)
                    .ok_or_else(|| LexError::InvalidSingleQuoted { file: file(), line })?;
                let has_endian = slice.ends_with("'be") || slice.ends_with("'le");
                if bytes.len() > 1 && !has_endian {
                    return Err(LexError::MissingEndianSuffix { file: file(), line });
                }
            }
            _ => {}
        }

        self.map.insert(slice).map_err(|source| LexError::Map {
            source,
            file: file(),
            line,
        })
    }

    fn check_control(&self, slice: &str) -> Result<(), LexError> {
        if slice.chars().any(char::is_control) {
            return Err(LexError::ControlCharacter {
                file: self.filename.to_owned(),
                line: self.line,
            });
        }
        Ok(())
    }
}
