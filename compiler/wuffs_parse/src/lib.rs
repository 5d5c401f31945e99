//! Recursive descent parser for Wuffs.
//!
//! Turns a lexed token stream into a [`File`]. Expressions have no operator
//! precedence: each operator is disambiguated into its unary, binary or
//! associative form purely from where it appears.

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::ParseError;

use tracing::debug;
use wuffs_ir::ast::{Expr, File};
use wuffs_ir::{Key, Token, TokenId, TokenMap};

/// Deepest nesting of expressions, types and blocks.
pub const MAX_DEPTH: u32 = 255;

/// Parse a whole source file.
pub fn parse(map: &TokenMap, filename: &str, tokens: &[Token]) -> Result<File, ParseError> {
    let mut parser = Parser::new(map, filename, tokens);
    let decls = parser.parse_decls()?;
    debug!(file = filename, decls = decls.len(), "parsed");
    Ok(File {
        filename: filename.to_owned(),
        decls,
    })
}

/// Parse a single expression, optionally followed by `;`.
pub fn parse_expr(map: &TokenMap, filename: &str, tokens: &[Token]) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(map, filename, tokens);
    let expr = parser.parse_expr()?;
    parser.cursor.eat(Key::SEMICOLON);
    if !parser.cursor.is_at_end() {
        return Err(parser.expected("end of expression"));
    }
    Ok(expr)
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    map: &'a TokenMap,
    filename: &'a str,
    depth: u32,
}

impl<'a> Parser<'a> {
    fn new(map: &'a TokenMap, filename: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            map,
            filename,
            depth: 0,
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                file: self.filename.to_owned(),
                line: self.cursor.line(),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // --- Errors ---

    fn expected(&self, expected: &str) -> ParseError {
        let got = if self.cursor.is_at_end() {
            "EOF".to_owned()
        } else {
            self.map.by_id(self.cursor.current_id()).to_owned()
        };
        ParseError::Expected {
            expected: expected.to_owned(),
            got,
            file: self.filename.to_owned(),
            line: self.cursor.line(),
        }
    }

    fn invalid(&self, message: String, line: u32) -> ParseError {
        ParseError::Invalid {
            message,
            file: self.filename.to_owned(),
            line,
        }
    }

    // --- Consumption ---

    /// Consume a token with the given key or fail naming it.
    fn expect(&mut self, key: Key) -> Result<(), ParseError> {
        if self.cursor.eat(key) {
            Ok(())
        } else {
            Err(self.expected(&format!("{:?}", self.map.by_key(key))))
        }
    }

    fn expect_ident(&mut self) -> Result<TokenId, ParseError> {
        let id = self.cursor.current_id();
        if self.cursor.is_at_end() || !id.is_ident() {
            return Err(self.expected("identifier"));
        }
        self.cursor.advance();
        Ok(id)
    }

    fn expect_str_literal(&mut self) -> Result<TokenId, ParseError> {
        let id = self.cursor.current_id();
        if self.cursor.is_at_end() || !id.is_str_literal() {
            return Err(self.expected("string literal"));
        }
        self.cursor.advance();
        Ok(id)
    }

    /// Parse `open elem, elem, ... close`, allowing a trailing comma.
    fn parse_list<T>(
        &mut self,
        open: Key,
        close: Key,
        mut elem: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        self.expect(open)?;
        let mut items = Vec::new();
        while !self.cursor.eat(close) {
            items.push(elem(self)?);
            if !self.cursor.check(close) {
                self.expect(Key::COMMA)?;
            }
        }
        Ok(items)
    }
}
