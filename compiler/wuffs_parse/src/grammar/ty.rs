//! Type expressions.

use wuffs_ir::ast::{Refinement, TypeExpr};
use wuffs_ir::Key;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse `array[N] T`, `slice T`, `table T`, `ptr T`, `nptr T` or a
    /// possibly qualified and refined name.
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.nested(|p| match p.cursor.current_key() {
            Key::ARRAY => {
                p.cursor.advance();
                p.expect(Key::OPEN_BRACKET)?;
                let len = p.parse_expr()?;
                p.expect(Key::CLOSE_BRACKET)?;
                let elem = p.parse_type()?;
                Ok(TypeExpr::Array {
                    len: Box::new(len),
                    elem: Box::new(elem),
                })
            }
            Key::SLICE => p.parse_decorated(TypeExpr::Slice),
            Key::TABLE => p.parse_decorated(TypeExpr::Table),
            Key::PTR => p.parse_decorated(TypeExpr::Ptr),
            Key::NPTR => p.parse_decorated(TypeExpr::Nptr),
            _ => p.parse_named_type(),
        })
    }

    fn parse_decorated(
        &mut self,
        wrap: fn(Box<TypeExpr>) -> TypeExpr,
    ) -> Result<TypeExpr, ParseError> {
        self.cursor.advance();
        let inner = self.parse_type()?;
        Ok(wrap(Box::new(inner)))
    }

    fn parse_named_type(&mut self) -> Result<TypeExpr, ParseError> {
        let first = self.expect_ident()?;
        let (package, name) = if self.cursor.eat(Key::DOT) {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };
        let refinement = if self.cursor.check(Key::OPEN_BRACKET) {
            Some(self.parse_refinement()?)
        } else {
            None
        };
        Ok(TypeExpr::Named {
            package,
            name,
            refinement,
        })
    }

    /// `[lo ..= hi]` with either bound optional.
    fn parse_refinement(&mut self) -> Result<Refinement, ParseError> {
        self.expect(Key::OPEN_BRACKET)?;
        let min = if self.cursor.check(Key::DOT_DOT_EQ) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Key::DOT_DOT_EQ)?;
        let max = if self.cursor.check(Key::CLOSE_BRACKET) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Key::CLOSE_BRACKET)?;
        Ok(Refinement { min, max })
    }
}
