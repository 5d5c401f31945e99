//! Source rendering of expressions and types.
//!
//! The output re-parses to the same tree: nested operations are wrapped in
//! parentheses because the language has no operator precedence.

use std::fmt;

use crate::token::Key;
use crate::TokenMap;

use super::expr::Expr;
use super::types::TypeExpr;

/// Displays an expression with names resolved through a [`TokenMap`].
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    map: &'a TokenMap,
}

/// Displays a type with names resolved through a [`TokenMap`].
pub struct TypeDisplay<'a> {
    ty: &'a TypeExpr,
    map: &'a TokenMap,
}

impl Expr {
    pub fn display<'a>(&'a self, map: &'a TokenMap) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, map }
    }

    /// The rendered source text.
    pub fn str(&self, map: &TokenMap) -> String {
        self.display(map).to_string()
    }
}

impl TypeExpr {
    pub fn display<'a>(&'a self, map: &'a TokenMap) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, map }
    }

    pub fn str(&self, map: &TokenMap) -> String {
        self.display(map).to_string()
    }
}

impl ExprDisplay<'_> {
    fn operand(&self, f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
        if e.is_operation() {
            write!(f, "({})", e.display(self.map))
        } else {
            write!(f, "{}", e.display(self.map))
        }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.map;
        match self.expr {
            Expr::Ident(id) | Expr::Literal(id) => f.write_str(map.by_id(*id)),
            Expr::Unary { op, operand } => {
                f.write_str(map.by_key(*op))?;
                if op.ambiguous_form() == Key::NOT {
                    f.write_str(" ")?;
                }
                self.operand(f, operand)
            }
            Expr::Binary { op, lhs, rhs } => {
                self.operand(f, lhs)?;
                write!(f, " {} ", map.by_key(*op))?;
                self.operand(f, rhs)
            }
            Expr::Associative { op, args } => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", map.by_key(*op))?;
                    }
                    self.operand(f, arg)?;
                }
                Ok(())
            }
            Expr::As { value, ty } => {
                self.operand(f, value)?;
                write!(f, " as {}", ty.display(map))
            }
            Expr::Call {
                callee,
                effect,
                args,
            } => {
                write!(f, "{}{}(", callee.display(map), effect.marker())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", map.by_id(arg.name), arg.value.display(map))?;
                }
                f.write_str(")")
            }
            Expr::Index { base, index } => {
                self.operand(f, base)?;
                write!(f, "[{}]", index.display(map))
            }
            Expr::Slice { base, lo, hi } => {
                self.operand(f, base)?;
                f.write_str("[")?;
                if let Some(lo) = lo {
                    write!(f, "{} ", lo.display(map))?;
                }
                f.write_str("..")?;
                if let Some(hi) = hi {
                    write!(f, " {}", hi.display(map))?;
                }
                f.write_str("]")
            }
            Expr::Select { base, field } => {
                self.operand(f, base)?;
                write!(f, ".{}", map.by_id(*field))
            }
            Expr::List(elems) => {
                f.write_str("[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", elem.display(map))?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.map;
        match self.ty {
            TypeExpr::Named {
                package,
                name,
                refinement,
            } => {
                if let Some(package) = package {
                    write!(f, "{}.", map.by_id(*package))?;
                }
                f.write_str(map.by_id(*name))?;
                if let Some(r) = refinement {
                    f.write_str("[")?;
                    if let Some(min) = &r.min {
                        write!(f, "{} ", min.display(map))?;
                    }
                    f.write_str("..=")?;
                    if let Some(max) = &r.max {
                        write!(f, " {}", max.display(map))?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
            TypeExpr::Array { len, elem } => {
                write!(f, "array[{}] {}", len.display(map), elem.display(map))
            }
            TypeExpr::Slice(elem) => write!(f, "slice {}", elem.display(map)),
            TypeExpr::Table(elem) => write!(f, "table {}", elem.display(map)),
            TypeExpr::Ptr(elem) => write!(f, "ptr {}", elem.display(map)),
            TypeExpr::Nptr(elem) => write!(f, "nptr {}", elem.display(map)),
        }
    }
}
