//! Expressions.
//!
//! There is no precedence. An expression is an operand, optionally followed
//! by one operator and a second operand. Repeating an associative operator
//! (`a + b + c`) builds one associative node; any other mix needs
//! parentheses.

use wuffs_ir::ast::{Arg, Effect, Expr};
use wuffs_ir::Key;

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_expr_inner)
    }

    fn parse_expr_inner(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_operand()?;
        let op = self.cursor.current_key();

        if op == Key::AS {
            self.cursor.advance();
            let ty = self.parse_type()?;
            return Ok(Expr::As {
                value: Box::new(lhs),
                ty: Box::new(ty),
            });
        }
        if !op.is_binary_op() {
            return Ok(lhs);
        }
        self.cursor.advance();
        let rhs = self.parse_operand()?;

        let expr = if op.is_associative_op() && self.cursor.check(op) {
            let mut args = vec![lhs, rhs];
            while self.cursor.eat(op) {
                args.push(self.parse_operand()?);
            }
            Expr::associative(op, args)
        } else {
            Expr::binary(op, lhs, rhs)
        };

        let next = self.cursor.current_key();
        if next.is_binary_op() {
            return Err(self.invalid(
                format!(
                    "{:?} and {:?} need parentheses to be combined",
                    self.map.by_key(op),
                    self.map.by_key(next),
                ),
                self.cursor.line(),
            ));
        }
        Ok(expr)
    }

    /// A unary operation, a parenthesized expression, a literal, or a name
    /// with its postfix chain.
    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let id = self.cursor.current_id();
        let key = id.key();
        if self.cursor.is_at_end() {
            return Err(self.expected("operand"));
        }

        if key.is_unary_op() {
            self.cursor.advance();
            let operand = self.nested(Self::parse_operand)?;
            return Ok(Expr::unary(key, operand));
        }
        if key == Key::OPEN_PAREN {
            self.cursor.advance();
            let inner = self.parse_expr()?;
            self.expect(Key::CLOSE_PAREN)?;
            return Ok(inner);
        }
        if id.is_literal() {
            self.cursor.advance();
            return Ok(Expr::literal(id));
        }
        if id.is_ident() {
            self.cursor.advance();
            return self.parse_postfix(Expr::ident(id));
        }
        Err(self.expected("operand"))
    }

    /// Selectors, indexes, slices and calls following a name.
    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            match self.cursor.current_key() {
                Key::DOT => {
                    self.cursor.advance();
                    let field = self.cursor.current_id();
                    // `pkg."#status"` names a status declared in `pkg`.
                    if !field.is_ident() && !field.is_str_literal() {
                        return Err(self.expected("identifier"));
                    }
                    self.cursor.advance();
                    expr = Expr::select(expr, field);
                }
                Key::EXCLAM | Key::QUESTION if self.cursor.peek_key(1) == Key::OPEN_PAREN => {
                    let effect = if self.cursor.advance().key() == Key::EXCLAM {
                        Effect::Impure
                    } else {
                        Effect::Suspendible
                    };
                    expr = self.parse_call(expr, effect)?;
                }
                Key::OPEN_PAREN => expr = self.parse_call(expr, Effect::Pure)?,
                Key::OPEN_BRACKET => expr = self.parse_index_or_slice(expr)?,
                _ => return Ok(expr),
            }
        }
    }

    fn parse_call(&mut self, callee: Expr, effect: Effect) -> Result<Expr, ParseError> {
        let args = self.parse_args()?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            effect,
            args,
        })
    }

    /// `(name: value, ...)`. Argument values must be free of effects.
    pub(crate) fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        self.parse_list(Key::OPEN_PAREN, Key::CLOSE_PAREN, |p| {
            let name = p.expect_ident()?;
            p.expect(Key::COLON)?;
            let line = p.cursor.line();
            let value = p.parse_expr()?;
            p.require_pure(&value, "an argument", line)?;
            Ok(Arg { name, value })
        })
    }

    fn parse_index_or_slice(&mut self, base: Expr) -> Result<Expr, ParseError> {
        self.expect(Key::OPEN_BRACKET)?;
        let lo = if self.cursor.check(Key::DOT_DOT) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        let expr = if self.cursor.eat(Key::DOT_DOT) {
            let hi = if self.cursor.check(Key::CLOSE_BRACKET) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            Expr::Slice {
                base: Box::new(base),
                lo: lo.map(Box::new),
                hi: hi.map(Box::new),
            }
        } else {
            let Some(index) = lo else {
                return Err(self.expected("\"..\""));
            };
            Expr::Index {
                base: Box::new(base),
                index: Box::new(index),
            }
        };
        self.expect(Key::CLOSE_BRACKET)?;
        Ok(expr)
    }

    /// A const initializer: an expression or a bracketed list of them.
    pub(crate) fn parse_const_value(&mut self) -> Result<Expr, ParseError> {
        if !self.cursor.check(Key::OPEN_BRACKET) {
            return self.parse_expr();
        }
        self.nested(|p| {
            let elems = p.parse_list(Key::OPEN_BRACKET, Key::CLOSE_BRACKET, Self::parse_const_value)?;
            Ok(Expr::List(elems))
        })
    }

    // --- Effect rules ---

    pub(crate) fn require_pure(&self, expr: &Expr, what: &str, line: u32) -> Result<(), ParseError> {
        if expr.is_pure() {
            return Ok(());
        }
        Err(self.invalid(
            format!("{what} must not have side effects: {:?}", expr.str(self.map)),
            line,
        ))
    }

    /// Only the outermost call of a statement may have an effect.
    pub(crate) fn require_outer_effect_only(&self, expr: &Expr, line: u32) -> Result<(), ParseError> {
        for child in expr.children() {
            self.require_pure(child, "a nested expression", line)?;
        }
        Ok(())
    }
}
