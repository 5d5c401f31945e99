//! Token cursor for navigating the token stream.
//!
//! Provides lookahead and consumption over a lexed `&[Token]`. Reading past
//! the end yields [`TokenId::INVALID`], so callers never index out of
//! bounds.

use wuffs_ir::{Key, Token, TokenId};

/// Cursor over a lexed file.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The current token id, or `INVALID` at the end.
    #[inline]
    pub fn current_id(&self) -> TokenId {
        self.peek_id(0)
    }

    #[inline]
    pub fn current_key(&self) -> Key {
        self.current_id().key()
    }

    /// The id `ahead` tokens past the current one.
    pub fn peek_id(&self, ahead: usize) -> TokenId {
        self.tokens
            .get(self.pos + ahead)
            .map_or(TokenId::INVALID, |t| t.id)
    }

    pub fn peek_key(&self, ahead: usize) -> Key {
        self.peek_id(ahead).key()
    }

    /// Line of the current token. At the end, the line of the last token.
    pub fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    #[inline]
    pub fn check(&self, key: Key) -> bool {
        !self.is_at_end() && self.current_key() == key
    }

    /// Consume the current token and return its id.
    pub fn advance(&mut self) -> TokenId {
        let id = self.current_id();
        if !self.is_at_end() {
            self.pos += 1;
        }
        id
    }

    /// Consume the current token if it has the given key.
    pub fn eat(&mut self, key: Key) -> bool {
        if self.check(key) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests;
