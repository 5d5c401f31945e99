//! Statements and blocks.

use wuffs_ir::ast::{Assert, ElseBranch, If, Stmt, StmtKind, While};
use wuffs_ir::Key;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// `{ stmt; stmt; ... }`. The last `;` before `}` may be omitted.
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.nested(|p| {
            p.expect(Key::OPEN_CURLY)?;
            let mut body = Vec::new();
            while !p.cursor.eat(Key::CLOSE_CURLY) {
                body.push(p.parse_stmt()?);
                if !p.cursor.check(Key::CLOSE_CURLY) {
                    p.expect(Key::SEMICOLON)?;
                }
            }
            Ok(body)
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let line = self.cursor.line();
        let kind = match self.cursor.current_key() {
            Key::ASSERT => StmtKind::Assert(self.parse_assert()?),
            Key::BREAK | Key::CONTINUE => {
                let keyword = self.cursor.advance().key();
                let label = if self.cursor.eat(Key::DOT) {
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                StmtKind::Jump { keyword, label }
            }
            Key::IF => StmtKind::If(self.parse_if()?),
            Key::RETURN => {
                self.cursor.advance();
                if self.cursor.check(Key::SEMICOLON) || self.cursor.check(Key::CLOSE_CURLY) {
                    StmtKind::Return(None)
                } else {
                    let value = self.parse_expr()?;
                    self.require_outer_effect_only(&value, line)?;
                    StmtKind::Return(Some(value))
                }
            }
            Key::VAR => {
                self.cursor.advance();
                let name = self.expect_ident()?;
                self.expect(Key::COLON)?;
                let ty = self.parse_type()?;
                let value = if self.cursor.eat(Key::EQ) {
                    let value = self.parse_expr()?;
                    self.require_outer_effect_only(&value, line)?;
                    Some(value)
                } else {
                    None
                };
                StmtKind::Var { name, ty, value }
            }
            Key::WHILE => StmtKind::While(self.parse_while()?),
            _ => self.parse_assign_or_expr(line)?,
        };
        Ok(Stmt::new(kind, line))
    }

    fn parse_assign_or_expr(&mut self, line: u32) -> Result<StmtKind, ParseError> {
        let lhs = self.parse_expr()?;
        let op = self.cursor.current_key();
        if !op.is_assign() {
            self.require_outer_effect_only(&lhs, line)?;
            return Ok(StmtKind::Expr(lhs));
        }
        self.cursor.advance();

        if lhs.is_literal() {
            return Err(self.invalid(
                format!("cannot assign to literal {:?}", lhs.str(self.map)),
                line,
            ));
        }
        self.require_pure(&lhs, "an assignment target", line)?;
        let rhs = self.parse_expr()?;
        self.require_outer_effect_only(&rhs, line)?;
        Ok(StmtKind::Assign { lhs, op, rhs })
    }

    /// `if COND { } [else if ...] [else { }]`.
    fn parse_if(&mut self) -> Result<If, ParseError> {
        self.nested(|p| {
            let line = p.cursor.line();
            p.expect(Key::IF)?;
            let condition = p.parse_expr()?;
            p.require_pure(&condition, "an if condition", line)?;
            let then_body = p.parse_block()?;
            let mut else_body = None;
            if p.cursor.eat(Key::ELSE) {
                else_body = Some(if p.cursor.check(Key::IF) {
                    ElseBranch::If(Box::new(p.parse_if()?))
                } else {
                    ElseBranch::Block(p.parse_block()?)
                });
            }
            Ok(If {
                condition,
                then_body,
                else_body,
                line,
            })
        })
    }

    /// `while[.label] COND [, pre|inv|post ...] { }`.
    fn parse_while(&mut self) -> Result<While, ParseError> {
        let line = self.cursor.line();
        self.expect(Key::WHILE)?;
        let label = if self.cursor.eat(Key::DOT) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let condition = self.parse_expr()?;
        self.require_pure(&condition, "a while condition", line)?;
        let asserts = self.parse_contract(&[Key::PRE, Key::INV, Key::POST])?;
        let body = self.parse_block()?;
        Ok(While {
            label,
            condition,
            asserts,
            body,
        })
    }

    /// Comma-prefixed contract clauses before a body. `allowed` lists the
    /// keywords in the order they must appear.
    pub(crate) fn parse_contract(&mut self, allowed: &[Key]) -> Result<Vec<Assert>, ParseError> {
        let mut asserts: Vec<Assert> = Vec::new();
        let mut rank = 0;
        while self.cursor.eat(Key::COMMA) {
            if self.cursor.check(Key::OPEN_CURLY) {
                break;
            }
            let key = self.cursor.current_key();
            let Some(pos) = allowed.iter().position(|&k| k == key) else {
                let names: Vec<String> = allowed
                    .iter()
                    .map(|&k| format!("{:?}", self.map.by_key(k)))
                    .collect();
                return Err(self.expected(&names.join(" or ")));
            };
            if pos < rank {
                return Err(self.invalid(
                    format!(
                        "{:?} must come before {:?}",
                        self.map.by_key(key),
                        self.map.by_key(allowed[rank]),
                    ),
                    self.cursor.line(),
                ));
            }
            rank = pos;
            asserts.push(self.parse_assert()?);
        }
        Ok(asserts)
    }

    /// `KEYWORD COND [via "RULE"(name: value, ...)]`.
    fn parse_assert(&mut self) -> Result<Assert, ParseError> {
        let line = self.cursor.line();
        let keyword = self.cursor.advance().key();
        let condition = self.parse_expr()?;
        self.require_pure(&condition, "an assert condition", line)?;
        let (reason, args) = if self.cursor.eat(Key::VIA) {
            let reason = self.expect_str_literal()?;
            (Some(reason), self.parse_args()?)
        } else {
            (None, Vec::new())
        };
        Ok(Assert {
            keyword,
            condition,
            reason,
            args,
            line,
        })
    }
}
