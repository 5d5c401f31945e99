//! Syntax tree for one source file.
//!
//! Declarations and statements carry their source line. Expressions carry
//! no positions so that two occurrences of `x + 1` compare and hash equal,
//! which the checker relies on when it stores expressions as facts.
//!
//! # Module Structure
//!
//! - `expr`: expressions and call arguments
//! - `types`: type expressions with range refinements
//! - `stmt`: statements, asserts and control flow
//! - `decl`: top-level declarations and the file root
//! - `display`: source rendering, used for diagnostics and stubs

mod decl;
mod display;
mod expr;
mod stmt;
mod types;

pub use decl::{Decl, DeclKind, Field, File, Func};
pub use display::{ExprDisplay, TypeDisplay};
pub use expr::{Arg, Expr};
pub use stmt::{Assert, ElseBranch, If, Stmt, StmtKind, While};
pub use types::{Refinement, TypeExpr};

/// Visibility of a declaration.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    /// `pri`, visible only within the package.
    #[default]
    Private,
    /// `pub`, part of the package's public surface.
    Public,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Private => "pri",
            Visibility::Public => "pub",
        }
    }
}

/// Side effects a function or call may have, weakest first.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum Effect {
    #[default]
    Pure,
    /// `!`: may mutate its receiver or arguments.
    Impure,
    /// `?`: impure and may suspend, returning a status.
    Suspendible,
}

impl Effect {
    /// The marker written after a function name.
    pub fn marker(self) -> &'static str {
        match self {
            Effect::Pure => "",
            Effect::Impure => "!",
            Effect::Suspendible => "?",
        }
    }
}
