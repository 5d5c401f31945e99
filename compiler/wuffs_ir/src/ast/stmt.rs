//! Statements.

use crate::token::{Key, TokenId};

use super::expr::{Arg, Expr};
use super::types::TypeExpr;

/// A statement and the line it starts on.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: u32) -> Self {
        Stmt { kind, line }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    Assert(Assert),
    /// `lhs op rhs` where `op` is `=` or a compound assignment.
    Assign {
        lhs: Expr,
        op: Key,
        rhs: Expr,
    },
    /// An expression evaluated for its effect, normally a call.
    Expr(Expr),
    If(If),
    /// `break` or `continue`, with an optional loop label.
    Jump {
        keyword: Key,
        label: Option<TokenId>,
    },
    Return(Option<Expr>),
    Var {
        name: TokenId,
        ty: TypeExpr,
        value: Option<Expr>,
    },
    While(While),
}

/// `assert`, `pre`, `inv` or `post`, with an optional proof hint.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Assert {
    pub keyword: Key,
    pub condition: Expr,
    /// The quoted rule name after `via`.
    pub reason: Option<TokenId>,
    pub args: Vec<Arg>,
    pub line: u32,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct If {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Option<ElseBranch>,
    pub line: u32,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElseBranch {
    /// `else if ...`.
    If(Box<If>),
    Block(Vec<Stmt>),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct While {
    pub label: Option<TokenId>,
    pub condition: Expr,
    /// Loop contract: `pre`, then `inv`, then `post` asserts.
    pub asserts: Vec<Assert>,
    pub body: Vec<Stmt>,
}

impl While {
    /// The contract asserts with the given keyword.
    pub fn asserts_of(&self, keyword: Key) -> impl Iterator<Item = &Assert> {
        self.asserts.iter().filter(move |a| a.keyword == keyword)
    }
}
