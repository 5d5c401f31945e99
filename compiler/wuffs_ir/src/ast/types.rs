//! Type expressions.

use crate::token::{Key, TokenId};

use super::expr::Expr;

/// A type as written in source.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeExpr {
    /// `[pkg.]name[lo ..= hi]`.
    Named {
        package: Option<TokenId>,
        name: TokenId,
        refinement: Option<Refinement>,
    },
    /// `array[len] elem`.
    Array { len: Box<Expr>, elem: Box<TypeExpr> },
    Slice(Box<TypeExpr>),
    Table(Box<TypeExpr>),
    Ptr(Box<TypeExpr>),
    Nptr(Box<TypeExpr>),
}

/// The `[lo ..= hi]` suffix of a numeric type. Either end may be omitted.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Refinement {
    pub min: Option<Expr>,
    pub max: Option<Expr>,
}

impl TypeExpr {
    /// An unrefined built-in `base.` type such as `base.u32`.
    pub fn base(name: Key) -> Self {
        TypeExpr::Named {
            package: Some(TokenId::built_in(Key::BASE)),
            name: TokenId::built_in(name),
            refinement: None,
        }
    }

    /// The same type without its refinement.
    pub fn unrefined(&self) -> TypeExpr {
        match self {
            TypeExpr::Named { package, name, .. } => TypeExpr::Named {
                package: *package,
                name: *name,
                refinement: None,
            },
            other => other.clone(),
        }
    }

    pub fn refinement(&self) -> Option<&Refinement> {
        match self {
            TypeExpr::Named { refinement, .. } => refinement.as_ref(),
            _ => None,
        }
    }

    /// The key of a named type, ignoring any package qualifier.
    pub fn name_key(&self) -> Option<Key> {
        match self {
            TypeExpr::Named { name, .. } => Some(name.key()),
            _ => None,
        }
    }

    /// The element type of an array, slice or table.
    pub fn element(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Array { elem, .. } => Some(elem.as_ref()),
            TypeExpr::Slice(elem) | TypeExpr::Table(elem) => Some(elem.as_ref()),
            _ => None,
        }
    }

    /// The pointee of a `ptr` or `nptr`.
    pub fn pointee(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Ptr(inner) | TypeExpr::Nptr(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}
