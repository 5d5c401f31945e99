//! Constant folding and the algebraic rewrites applied to facts.

use wuffs_ir::ast::{Arg, Expr};
use wuffs_ir::token::parse_num_literal;
use wuffs_ir::{Key, TokenId, TokenMap};

#[cfg(test)]
mod tests;

/// The value of a literal token: numbers, `true` and `false`.
pub(crate) fn literal_value(map: &TokenMap, id: TokenId) -> Option<i128> {
    match id.key() {
        Key::TRUE => Some(1),
        Key::FALSE | Key::ZERO => Some(0),
        _ if id.is_num_literal() => parse_num_literal(map.by_id(id)),
        _ => None,
    }
}

/// Fold `expr` to a constant. Names and selectors are handed to `leaf`.
pub(crate) fn fold(
    map: &TokenMap,
    expr: &Expr,
    leaf: &dyn Fn(&Expr) -> Option<i128>,
) -> Option<i128> {
    match expr {
        Expr::Literal(id) => literal_value(map, *id),
        Expr::Unary { op, operand } => {
            let v = fold(map, operand, leaf)?;
            match *op {
                Key::X_UNARY_PLUS => Some(v),
                Key::X_UNARY_MINUS => v.checked_neg(),
                Key::X_UNARY_NOT => Some(i128::from(v == 0)),
                _ => None,
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            binary_const(*op, fold(map, lhs, leaf)?, fold(map, rhs, leaf)?)
        }
        Expr::Associative { op, args } => {
            let op = op.ambiguous_form().binary_form();
            let (first, rest) = args.split_first()?;
            rest.iter().try_fold(fold(map, first, leaf)?, |acc, arg| {
                binary_const(op, acc, fold(map, arg, leaf)?)
            })
        }
        Expr::As { value, .. } => fold(map, value, leaf),
        _ => leaf(expr),
    }
}

/// Apply a binary operator to two constants. `None` on overflow, division
/// by zero, negative shifts and the wrapping `~` operators.
pub(crate) fn binary_const(op: Key, l: i128, r: i128) -> Option<i128> {
    match op {
        Key::X_BINARY_PLUS => l.checked_add(r),
        Key::X_BINARY_MINUS => l.checked_sub(r),
        Key::X_BINARY_STAR => l.checked_mul(r),
        Key::X_BINARY_SLASH => l.checked_div(r),
        Key::X_BINARY_PERCENT => l.checked_rem(r),
        Key::X_BINARY_SHIFT_L => {
            let by = u32::try_from(r).ok()?;
            (l >= 0 && by < 127 && l.leading_zeros() > by + 1).then(|| l << by)
        }
        Key::X_BINARY_SHIFT_R => {
            let by = u32::try_from(r).ok()?;
            (l >= 0).then(|| if by >= 127 { 0 } else { l >> by })
        }
        Key::X_BINARY_AMP => Some(l & r),
        Key::X_BINARY_PIPE => Some(l | r),
        Key::X_BINARY_HAT => Some(l ^ r),
        Key::X_BINARY_NOT_EQ => Some(i128::from(l != r)),
        Key::X_BINARY_LESS_THAN => Some(i128::from(l < r)),
        Key::X_BINARY_LESS_EQ => Some(i128::from(l <= r)),
        Key::X_BINARY_EQ_EQ => Some(i128::from(l == r)),
        Key::X_BINARY_GREATER_EQ => Some(i128::from(l >= r)),
        Key::X_BINARY_GREATER_THAN => Some(i128::from(l > r)),
        Key::X_BINARY_AND => Some(i128::from(l != 0 && r != 0)),
        Key::X_BINARY_OR => Some(i128::from(l != 0 || r != 0)),
        _ => None,
    }
}

/// An expression for a constant. Negative values become a unary minus
/// applied to a literal.
pub(crate) fn const_expr(map: &TokenMap, v: i128) -> Option<Expr> {
    if v == 0 {
        return Some(Expr::zero());
    }
    let id = map.insert(&v.unsigned_abs().to_string()).ok()?;
    let literal = Expr::literal(id);
    Some(if v < 0 {
        Expr::unary(Key::MINUS, literal)
    } else {
        literal
    })
}

fn no_leaf(_: &Expr) -> Option<i128> {
    None
}

/// Fold literal-only arithmetic and cancel `x - x`, `(a + b) - b` and
/// `(a + b) - a`. Comparisons are simplified on both sides.
pub(crate) fn simplify(map: &TokenMap, expr: &Expr) -> Expr {
    let Some((op, lhs, rhs)) = expr.as_binary() else {
        return expr.clone();
    };
    if let (Some(l), Some(r)) = (fold(map, lhs, &no_leaf), fold(map, rhs, &no_leaf)) {
        if let Some(folded) = binary_const(op, l, r).and_then(|v| const_expr(map, v)) {
            return folded;
        }
    }

    if op == Key::X_BINARY_MINUS {
        if lhs == rhs {
            return Expr::zero();
        }
        if let Some((Key::X_BINARY_PLUS, a, b)) = lhs.as_binary() {
            if a == rhs {
                return b.clone();
            }
            if b == rhs {
                return a.clone();
            }
        }
    } else if op.is_x_comparison() {
        return Expr::binary(op, simplify(map, lhs), simplify(map, rhs));
    }
    expr.clone()
}

/// The comparison that holds exactly when `op` does not.
pub(crate) fn negate_comparison(op: Key) -> Option<Key> {
    let negated = match op {
        Key::X_BINARY_NOT_EQ => Key::X_BINARY_EQ_EQ,
        Key::X_BINARY_LESS_THAN => Key::X_BINARY_GREATER_EQ,
        Key::X_BINARY_LESS_EQ => Key::X_BINARY_GREATER_THAN,
        Key::X_BINARY_EQ_EQ => Key::X_BINARY_NOT_EQ,
        Key::X_BINARY_GREATER_EQ => Key::X_BINARY_LESS_THAN,
        Key::X_BINARY_GREATER_THAN => Key::X_BINARY_LESS_EQ,
        _ => return None,
    };
    Some(negated)
}

/// The comparison with its operands swapped: `a < b` is `b > a`.
pub(crate) fn mirror_comparison(op: Key) -> Option<Key> {
    let mirrored = match op {
        Key::X_BINARY_NOT_EQ | Key::X_BINARY_EQ_EQ => op,
        Key::X_BINARY_LESS_THAN => Key::X_BINARY_GREATER_THAN,
        Key::X_BINARY_LESS_EQ => Key::X_BINARY_GREATER_EQ,
        Key::X_BINARY_GREATER_EQ => Key::X_BINARY_LESS_EQ,
        Key::X_BINARY_GREATER_THAN => Key::X_BINARY_LESS_THAN,
        _ => return None,
    };
    Some(mirrored)
}

/// The logical negation of a boolean expression, pushed through
/// comparisons and De Morgan's laws.
pub(crate) fn invert(expr: &Expr) -> Expr {
    match expr {
        Expr::Unary {
            op: Key::X_UNARY_NOT,
            operand,
        } => return operand.as_ref().clone(),
        Expr::Binary { op, lhs, rhs } => {
            if let Some(negated) = negate_comparison(*op) {
                return Expr::binary(negated, lhs.as_ref().clone(), rhs.as_ref().clone());
            }
            let flipped = match *op {
                Key::X_BINARY_AND => Some(Key::OR),
                Key::X_BINARY_OR => Some(Key::AND),
                _ => None,
            };
            if let Some(flipped) = flipped {
                return Expr::binary(flipped, invert(lhs), invert(rhs));
            }
        }
        Expr::Associative { op, args } => {
            let flipped = match *op {
                Key::X_ASSOCIATIVE_AND => Some(Key::OR),
                Key::X_ASSOCIATIVE_OR => Some(Key::AND),
                _ => None,
            };
            if let Some(flipped) = flipped {
                return Expr::associative(flipped, args.iter().map(invert).collect());
            }
        }
        _ => {}
    }
    Expr::unary(Key::NOT, expr.clone())
}

/// Replace every identifier `f` maps to, all at once. Selector field names
/// are left alone.
pub(crate) fn substitute_idents(expr: &Expr, f: &dyn Fn(TokenId) -> Option<Expr>) -> Expr {
    let sub = |e: &Expr| substitute_idents(e, f);
    let boxed = |e: &Expr| Box::new(substitute_idents(e, f));
    match expr {
        Expr::Ident(id) => f(*id).unwrap_or_else(|| expr.clone()),
        Expr::Literal(_) => expr.clone(),
        Expr::Unary { op, operand } => Expr::Unary {
            op: *op,
            operand: boxed(operand),
        },
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op: *op,
            lhs: boxed(lhs),
            rhs: boxed(rhs),
        },
        Expr::Associative { op, args } => Expr::Associative {
            op: *op,
            args: args.iter().map(sub).collect(),
        },
        Expr::As { value, ty } => Expr::As {
            value: boxed(value),
            ty: ty.clone(),
        },
        Expr::Call {
            callee,
            effect,
            args,
        } => Expr::Call {
            callee: boxed(callee),
            effect: *effect,
            args: args
                .iter()
                .map(|a| Arg {
                    name: a.name,
                    value: sub(&a.value),
                })
                .collect(),
        },
        Expr::Index { base, index } => Expr::Index {
            base: boxed(base),
            index: boxed(index),
        },
        Expr::Slice { base, lo, hi } => Expr::Slice {
            base: boxed(base),
            lo: lo.as_deref().map(boxed),
            hi: hi.as_deref().map(boxed),
        },
        Expr::Select { base, field } => Expr::Select {
            base: boxed(base),
            field: *field,
        },
        Expr::List(elems) => Expr::List(elems.iter().map(sub).collect()),
    }
}
