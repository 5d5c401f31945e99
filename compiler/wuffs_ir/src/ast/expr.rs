//! Expressions.
//!
//! Operator keys are always the disambiguated forms (`X_BINARY_PLUS`, not
//! `PLUS`); the constructors normalize them.

use crate::token::{Key, TokenId};

use super::types::TypeExpr;
use super::Effect;

/// An expression tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Expr {
    /// A name: local, parameter, `this`, a package or a const.
    Ident(TokenId),
    /// A numeric, string or boolean literal.
    Literal(TokenId),
    Unary {
        op: Key,
        operand: Box<Expr>,
    },
    Binary {
        op: Key,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// The same associative operator applied to two or more arguments.
    Associative {
        op: Key,
        args: Vec<Expr>,
    },
    /// `value as ty`.
    As {
        value: Box<Expr>,
        ty: Box<TypeExpr>,
    },
    /// `callee(name: value, ...)`, with the effect marker written before the
    /// parenthesis.
    Call {
        callee: Box<Expr>,
        effect: Effect,
        args: Vec<Arg>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// `base[lo .. hi]`, either end optional.
    Slice {
        base: Box<Expr>,
        lo: Option<Box<Expr>>,
        hi: Option<Box<Expr>>,
    },
    /// `base.field`. A string-literal field is a status qualified by its
    /// package, as in `pkg."#bad header"`.
    Select {
        base: Box<Expr>,
        field: TokenId,
    },
    /// `[a, b, c]`, only valid as a const value.
    List(Vec<Expr>),
}

/// A named call argument.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Arg {
    pub name: TokenId,
    pub value: Expr,
}

impl Expr {
    pub fn ident(id: TokenId) -> Self {
        Expr::Ident(id)
    }

    pub fn literal(id: TokenId) -> Self {
        Expr::Literal(id)
    }

    pub fn zero() -> Self {
        Expr::Literal(TokenId::built_in(Key::ZERO))
    }

    pub fn bool(value: bool) -> Self {
        let key = if value { Key::TRUE } else { Key::FALSE };
        Expr::Literal(TokenId::built_in(key))
    }

    pub fn unary(op: Key, operand: Expr) -> Self {
        Expr::Unary {
            op: op.unary_form(),
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: Key, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op: op.binary_form(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn associative(op: Key, args: Vec<Expr>) -> Self {
        Expr::Associative {
            op: op.associative_form(),
            args,
        }
    }

    pub fn select(base: Expr, field: TokenId) -> Self {
        Expr::Select {
            base: Box::new(base),
            field,
        }
    }

    /// The operator and operands of a binary node.
    pub fn as_binary(&self) -> Option<(Key, &Expr, &Expr)> {
        match self {
            Expr::Binary { op, lhs, rhs } => Some((*op, lhs, rhs)),
            _ => None,
        }
    }

    /// The token of a plain identifier.
    pub fn as_ident(&self) -> Option<TokenId> {
        match self {
            Expr::Ident(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    /// Whether the expression is a unary, binary or associative operation.
    pub fn is_operation(&self) -> bool {
        matches!(
            self,
            Expr::Unary { .. } | Expr::Binary { .. } | Expr::Associative { .. } | Expr::As { .. }
        )
    }

    /// Immediate subexpressions, in source order. Types are not visited.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Ident(_) | Expr::Literal(_) => Vec::new(),
            Expr::Unary { operand, .. } => vec![operand.as_ref()],
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Associative { args, .. } => args.iter().collect(),
            Expr::As { value, .. } => vec![value.as_ref()],
            Expr::Call { callee, args, .. } => std::iter::once(callee.as_ref())
                .chain(args.iter().map(|a| &a.value))
                .collect(),
            Expr::Index { base, index } => vec![base.as_ref(), index.as_ref()],
            Expr::Slice { base, lo, hi } => std::iter::once(base.as_ref())
                .chain(lo.as_deref())
                .chain(hi.as_deref())
                .collect(),
            Expr::Select { base, .. } => vec![base.as_ref()],
            Expr::List(elems) => elems.iter().collect(),
        }
    }

    /// Whether `pred` holds for this expression or any subexpression.
    pub fn any(&self, pred: &mut impl FnMut(&Expr) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        self.children().into_iter().any(|child| child.any(pred))
    }

    /// Whether `other` occurs anywhere in this expression.
    pub fn mentions(&self, other: &Expr) -> bool {
        self.any(&mut |e| e == other)
    }

    /// The strongest effect of any call in the expression.
    pub fn effect(&self) -> Effect {
        let own = match self {
            Expr::Call { effect, .. } => *effect,
            _ => Effect::Pure,
        };
        self.children()
            .into_iter()
            .map(Expr::effect)
            .fold(own, Effect::max)
    }

    pub fn is_pure(&self) -> bool {
        self.effect() == Effect::Pure
    }

    /// Replace every occurrence of `from` with `to`.
    pub fn substitute(&self, from: &Expr, to: &Expr) -> Expr {
        if self == from {
            return to.clone();
        }
        match self {
            Expr::Ident(_) | Expr::Literal(_) => self.clone(),
            Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: operand.boxed_substitute(from, to),
            },
            Expr::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: lhs.boxed_substitute(from, to),
                rhs: rhs.boxed_substitute(from, to),
            },
            Expr::Associative { op, args } => Expr::Associative {
                op: *op,
                args: args.iter().map(|a| a.substitute(from, to)).collect(),
            },
            Expr::As { value, ty } => Expr::As {
                value: value.boxed_substitute(from, to),
                ty: ty.clone(),
            },
            Expr::Call {
                callee,
                effect,
                args,
            } => Expr::Call {
                callee: callee.boxed_substitute(from, to),
                effect: *effect,
                args: args
                    .iter()
                    .map(|a| Arg {
                        name: a.name,
                        value: a.value.substitute(from, to),
                    })
                    .collect(),
            },
            Expr::Index { base, index } => Expr::Index {
                base: base.boxed_substitute(from, to),
                index: index.boxed_substitute(from, to),
            },
            Expr::Slice { base, lo, hi } => Expr::Slice {
                base: base.boxed_substitute(from, to),
                lo: lo.as_ref().map(|e| e.boxed_substitute(from, to)),
                hi: hi.as_ref().map(|e| e.boxed_substitute(from, to)),
            },
            Expr::Select { base, field } => Expr::Select {
                base: base.boxed_substitute(from, to),
                field: *field,
            },
            Expr::List(elems) => Expr::List(elems.iter().map(|e| e.substitute(from, to)).collect()),
        }
    }

    fn boxed_substitute(&self, from: &Expr, to: &Expr) -> Box<Expr> {
        Box::new(self.substitute(from, to))
    }
}
