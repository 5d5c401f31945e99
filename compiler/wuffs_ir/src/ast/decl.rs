//! Top-level declarations.

use crate::status::Status;
use crate::token::TokenId;

use super::expr::Expr;
use super::stmt::{Assert, Stmt};
use super::types::TypeExpr;
use super::{Effect, Visibility};

/// A parsed source file.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct File {
    pub filename: String,
    pub decls: Vec<Decl>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub line: u32,
}

impl Decl {
    pub fn new(kind: DeclKind, line: u32) -> Self {
        Decl { kind, line }
    }

    pub fn visibility(&self) -> Option<Visibility> {
        match &self.kind {
            DeclKind::Const { vis, .. }
            | DeclKind::Status { vis, .. }
            | DeclKind::Struct { vis, .. } => Some(*vis),
            DeclKind::Func(func) => Some(func.vis),
            DeclKind::Use { .. } | DeclKind::PackageId(_) => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    /// `use "path"`; the token is the quoted literal.
    Use { path: TokenId },
    /// `packageid "name"`; the token is the quoted literal.
    PackageId(TokenId),
    Const {
        vis: Visibility,
        name: TokenId,
        ty: TypeExpr,
        value: Expr,
    },
    Status {
        vis: Visibility,
        literal: TokenId,
        status: Status,
    },
    Struct {
        vis: Visibility,
        name: TokenId,
        suspendible: bool,
        fields: Vec<Field>,
    },
    Func(Func),
}

/// A struct field or a function parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Field {
    pub name: TokenId,
    pub ty: TypeExpr,
    pub line: u32,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Func {
    pub vis: Visibility,
    /// The receiver struct; `None` for a free function.
    pub receiver: Option<TokenId>,
    pub name: TokenId,
    pub effect: Effect,
    pub inputs: Vec<Field>,
    /// The named output fields, when written.
    pub outputs: Option<Vec<Field>>,
    pub ret: Option<TypeExpr>,
    /// `pre` and `post` contract asserts.
    pub asserts: Vec<Assert>,
    pub body: Vec<Stmt>,
}
