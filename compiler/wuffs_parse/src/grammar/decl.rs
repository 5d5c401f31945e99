//! Top-level declarations.

use wuffs_ir::ast::{Decl, DeclKind, Effect, Field, Func, Visibility};
use wuffs_ir::token::unescape;
use wuffs_ir::{Key, Status};

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse declarations until the end of input.
    pub(crate) fn parse_decls(&mut self) -> Result<Vec<Decl>, ParseError> {
        let mut decls = Vec::new();
        while !self.cursor.is_at_end() {
            decls.push(self.parse_decl()?);
        }
        Ok(decls)
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let line = self.cursor.line();
        let kind = match self.cursor.current_key() {
            Key::USE => {
                self.cursor.advance();
                DeclKind::Use {
                    path: self.expect_str_literal()?,
                }
            }
            Key::PACKAGE_ID => {
                self.cursor.advance();
                DeclKind::PackageId(self.expect_str_literal()?)
            }
            Key::PUB | Key::PRI => {
                let vis = if self.cursor.advance().key() == Key::PUB {
                    Visibility::Public
                } else {
                    Visibility::Private
                };
                match self.cursor.current_key() {
                    Key::CONST => self.parse_const(vis)?,
                    Key::FUNC => DeclKind::Func(self.parse_func(vis)?),
                    Key::STATUS => self.parse_status(vis)?,
                    Key::STRUCT => self.parse_struct(vis)?,
                    _ => {
                        return Err(
                            self.expected("\"const\", \"func\", \"status\" or \"struct\"")
                        )
                    }
                }
            }
            _ => return Err(self.expected("top-level declaration")),
        };
        self.expect(Key::SEMICOLON)?;
        Ok(Decl::new(kind, line))
    }

    /// `const NAME [:] TYPE = VALUE`.
    fn parse_const(&mut self, vis: Visibility) -> Result<DeclKind, ParseError> {
        self.expect(Key::CONST)?;
        let name = self.expect_ident()?;
        self.cursor.eat(Key::COLON);
        let ty = self.parse_type()?;
        self.expect(Key::EQ)?;
        let value = self.parse_const_value()?;
        Ok(DeclKind::Const {
            vis,
            name,
            ty,
            value,
        })
    }

    /// `status "#message"` or `status "@message"`.
    fn parse_status(&mut self, vis: Visibility) -> Result<DeclKind, ParseError> {
        self.expect(Key::STATUS)?;
        let line = self.cursor.line();
        let literal = self.expect_str_literal()?;
        let text = self.map.by_id(literal);
        let status = unescape(text)
            .filter(|_| text.starts_with('"'))
            .and_then(Status::parse)
            .ok_or_else(|| {
                self.invalid(
                    format!("status {text} must be a \"#error\" or \"@suspension\" message"),
                    line,
                )
            })?;
        Ok(DeclKind::Status {
            vis,
            literal,
            status,
        })
    }

    /// `struct NAME[?](field: TYPE, ...)`.
    fn parse_struct(&mut self, vis: Visibility) -> Result<DeclKind, ParseError> {
        self.expect(Key::STRUCT)?;
        let name = self.expect_ident()?;
        let suspendible = self.cursor.eat(Key::QUESTION);
        let fields = self.parse_fields()?;
        Ok(DeclKind::Struct {
            vis,
            name,
            suspendible,
            fields,
        })
    }

    /// `func [Recv.]name[!|?](inputs)[(outputs)] [RET] [, pre|post ...] { }`.
    fn parse_func(&mut self, vis: Visibility) -> Result<Func, ParseError> {
        self.expect(Key::FUNC)?;
        let first = self.expect_ident()?;
        let (receiver, name) = if self.cursor.eat(Key::DOT) {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };
        let effect = if self.cursor.eat(Key::EXCLAM) {
            Effect::Impure
        } else if self.cursor.eat(Key::QUESTION) {
            Effect::Suspendible
        } else {
            Effect::Pure
        };

        let inputs = self.parse_fields()?;
        let outputs = if self.cursor.check(Key::OPEN_PAREN) {
            Some(self.parse_fields()?)
        } else {
            None
        };
        let ret = if self.cursor.check(Key::COMMA) || self.cursor.check(Key::OPEN_CURLY) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let asserts = self.parse_contract(&[Key::PRE, Key::POST])?;
        let body = self.parse_block()?;

        Ok(Func {
            vis,
            receiver,
            name,
            effect,
            inputs,
            outputs,
            ret,
            asserts,
            body,
        })
    }

    /// `(name: TYPE, ...)`.
    fn parse_fields(&mut self) -> Result<Vec<Field>, ParseError> {
        self.parse_list(Key::OPEN_PAREN, Key::CLOSE_PAREN, |p| {
            let line = p.cursor.line();
            let name = p.expect_ident()?;
            p.expect(Key::COLON)?;
            let ty = p.parse_type()?;
            Ok(Field { name, ty, line })
        })
    }
}
