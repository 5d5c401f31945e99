//! Expression typing.
//!
//! Expressions carry no annotations, so the type of an expression is
//! recomputed from its parts whenever a later phase needs it.

use rustc_hash::FxHashMap;
use wuffs_ir::ast::{Arg, Effect, Expr};
use wuffs_ir::{Key, QId, TokenId, TokenMap};

use crate::env::Env;
use crate::simplify::fold;
use crate::typ::{Callee, FuncKey, Typ};

/// Types the expressions of one function body or constant.
pub(crate) struct Typer<'a> {
    pub map: &'a TokenMap,
    pub env: &'a Env,
    /// Parameters, `this` and hoisted `var`s.
    pub locals: &'a FxHashMap<TokenId, Typ>,
    /// The strongest effect a call may have.
    pub effect: Effect,
}

impl Typer<'_> {
    /// The value of `expr` if it is built from literals and constants.
    pub fn const_value(&self, expr: &Expr) -> Option<i128> {
        fold(self.map, expr, &|leaf| match leaf {
            Expr::Ident(id) if self.locals.contains_key(id) => None,
            Expr::Select { base, .. } if self.is_local(base) => None,
            _ => self.env.const_leaf(leaf, None),
        })
    }

    fn is_local(&self, expr: &Expr) -> bool {
        expr.as_ident().is_some_and(|id| self.locals.contains_key(&id))
    }

    /// A used package named by `expr`, unless a local shadows it.
    pub fn package(&self, expr: &Expr) -> Option<TokenId> {
        expr.as_ident()
            .filter(|id| !self.locals.contains_key(id) && self.env.packages.contains(id))
    }

    fn text(&self, expr: &Expr) -> String {
        format!("{:?}", expr.str(self.map))
    }

    pub fn type_of(&self, expr: &Expr) -> Result<Typ, String> {
        match expr {
            Expr::Ident(id) => self.ident_type(*id),
            Expr::Literal(id) => self.literal_type(*id),
            Expr::Unary { op, operand } => {
                let typ = self.type_of(operand)?;
                if *op == Key::X_UNARY_NOT {
                    if !typ.is_bool() {
                        return Err(format!("not operand {} is not a bool", self.text(operand)));
                    }
                    return Ok(Typ::Bool);
                }
                if !typ.is_num_or_ideal() {
                    return Err(format!(
                        "unary {:?} operand {} is not numeric",
                        self.map.by_key(op.ambiguous_form()),
                        self.text(operand)
                    ));
                }
                Ok(typ.unrefined())
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.type_of(lhs)?;
                let r = self.type_of(rhs)?;
                self.binary_type(expr, *op, &l, &r)
            }
            Expr::Associative { op, args } => {
                let binary = op.ambiguous_form().binary_form();
                let mut acc: Option<Typ> = None;
                for arg in args {
                    let typ = self.type_of(arg)?;
                    acc = Some(match acc {
                        None if matches!(binary, Key::X_BINARY_AND | Key::X_BINARY_OR) => {
                            self.binary_type(expr, binary, &typ, &Typ::Bool)?
                        }
                        None => self.binary_type(expr, binary, &typ, &Typ::Ideal)?,
                        Some(prev) => self.binary_type(expr, binary, &prev, &typ)?,
                    });
                }
                acc.ok_or_else(|| format!("associative {} has no arguments", self.text(expr)))
            }
            Expr::As { value, ty } => {
                let src = self.type_of(value)?;
                if !src.is_num_or_ideal() {
                    return Err(format!(
                        "cannot convert {} of type {} with \"as\"",
                        self.text(value),
                        src.str(self.map)
                    ));
                }
                let target = self.env.resolve_type(self.map, ty, None)?;
                if !target.is_num() {
                    return Err(format!(
                        "cannot convert {} to non-numeric type {}",
                        self.text(value),
                        target.str(self.map)
                    ));
                }
                Ok(target)
            }
            Expr::Call {
                callee,
                effect,
                args,
            } => self.call_type(expr, callee, *effect, args),
            Expr::Index { base, index } => {
                let typ = self.type_of(base)?;
                let Some(elem) = typ.element() else {
                    return Err(format!(
                        "cannot index {} of type {}",
                        self.text(base),
                        typ.str(self.map)
                    ));
                };
                self.require_index(index)?;
                Ok(elem.clone())
            }
            Expr::Slice { base, lo, hi } => {
                let typ = self.type_of(base)?;
                let elem = match &typ {
                    Typ::Array { elem, .. } | Typ::Slice(elem) => elem.clone(),
                    _ => {
                        return Err(format!(
                            "cannot slice {} of type {}",
                            self.text(base),
                            typ.str(self.map)
                        ))
                    }
                };
                for bound in lo.iter().chain(hi.iter()) {
                    self.require_index(bound)?;
                }
                Ok(Typ::Slice(elem))
            }
            Expr::Select { base, field } => self.select_type(base, *field),
            Expr::List(_) => Err(format!(
                "list {} is only allowed as a const value",
                self.text(expr)
            )),
        }
    }

    fn require_index(&self, index: &Expr) -> Result<(), String> {
        let typ = self.type_of(index)?;
        if typ.is_num_or_ideal() {
            Ok(())
        } else {
            Err(format!(
                "index {} of type {} is not numeric",
                self.text(index),
                typ.str(self.map)
            ))
        }
    }

    fn ident_type(&self, id: TokenId) -> Result<Typ, String> {
        if let Some(typ) = self.locals.get(&id) {
            return Ok(typ.clone());
        }
        if let Some(c) = self.env.consts.get(&QId::new(None, id)) {
            return Ok(c.ty.clone());
        }
        let free = FuncKey {
            package: None,
            receiver: None,
            name: id,
        };
        if self.env.funcs.contains_key(&free) {
            return Ok(Typ::Func(Callee::User(free)));
        }
        if id.key() == Key::THIS {
            return Err("\"this\" used outside a method".to_owned());
        }
        Err(format!("unknown identifier {:?}", self.map.by_id(id)))
    }

    fn literal_type(&self, id: TokenId) -> Result<Typ, String> {
        match id.key() {
            Key::TRUE | Key::FALSE => Ok(Typ::Bool),
            _ if id.is_num_literal() => Ok(Typ::Ideal),
            _ if self.env.statuses.contains_key(&QId::new(None, id)) => Ok(Typ::Status),
            _ => Err(format!("undeclared status {}", self.map.by_id(id))),
        }
    }

    fn binary_type(&self, expr: &Expr, op: Key, l: &Typ, r: &Typ) -> Result<Typ, String> {
        let mismatch = || {
            format!(
                "operands of {} have mismatched types {} and {}",
                self.text(expr),
                l.str(self.map),
                r.str(self.map)
            )
        };
        match op {
            Key::X_BINARY_AND | Key::X_BINARY_OR => {
                if l.is_bool() && r.is_bool() {
                    Ok(Typ::Bool)
                } else {
                    Err(format!("operands of {} are not bools", self.text(expr)))
                }
            }
            Key::X_BINARY_EQ_EQ | Key::X_BINARY_NOT_EQ
                if (l.is_bool() && r.is_bool()) || (*l == Typ::Status && *r == Typ::Status) =>
            {
                Ok(Typ::Bool)
            }
            _ if op.is_x_comparison() => {
                self.numeric_type(l, r).ok_or_else(mismatch)?;
                Ok(Typ::Bool)
            }
            Key::X_BINARY_TILDE_MOD_SHIFT_L
            | Key::X_BINARY_TILDE_MOD_PLUS
            | Key::X_BINARY_TILDE_MOD_MINUS
            | Key::X_BINARY_TILDE_MOD_STAR
            | Key::X_BINARY_TILDE_SAT_PLUS
            | Key::X_BINARY_TILDE_SAT_MINUS => {
                let typ = self.numeric_type(l, r).ok_or_else(mismatch)?;
                if !typ.is_unsigned() {
                    return Err(format!(
                        "operands of {} must have an unsigned machine type",
                        self.text(expr)
                    ));
                }
                Ok(typ)
            }
            _ => self.numeric_type(l, r).ok_or_else(mismatch),
        }
    }

    /// The unrefined type two numeric operands share. An ideal operand
    /// adopts the other side's type.
    fn numeric_type(&self, l: &Typ, r: &Typ) -> Option<Typ> {
        if !l.is_num_or_ideal() || !r.is_num_or_ideal() {
            return None;
        }
        if l.is_ideal() {
            return Some(r.unrefined());
        }
        if r.is_ideal() || l.eq_ignoring_refinements(r) {
            return Some(l.unrefined());
        }
        None
    }

    fn select_type(&self, base: &Expr, field: TokenId) -> Result<Typ, String> {
        if let Some(package) = self.package(base) {
            let qid = QId::new(Some(package), field);
            if field.is_str_literal() {
                if self.env.statuses.contains_key(&qid) {
                    return Ok(Typ::Status);
                }
            } else if let Some(c) = self.env.consts.get(&qid) {
                return Ok(c.ty.clone());
            } else {
                let key = FuncKey {
                    package: Some(package),
                    receiver: None,
                    name: field,
                };
                if self.env.funcs.contains_key(&key) {
                    return Ok(Typ::Func(Callee::User(key)));
                }
            }
            return Err(format!(
                "no member {} in package {:?}",
                self.map.by_id(field),
                self.map.by_id(package)
            ));
        }

        let typ = self.type_of(base)?;
        if field.key() == Key::LENGTH && typ.element().is_some() {
            return Ok(Typ::Func(Callee::Length));
        }
        let qid = match &typ {
            Typ::Struct(qid) => *qid,
            Typ::Ptr(inner) | Typ::Nptr(inner) => match inner.as_ref() {
                Typ::Struct(qid) => *qid,
                _ => return Err(self.no_member(base, field, &typ)),
            },
            _ => return Err(self.no_member(base, field, &typ)),
        };
        let Some(info) = self.env.structs.get(&qid) else {
            return Err(self.no_member(base, field, &typ));
        };
        if let Some((_, ftyp)) = info.fields.iter().find(|(name, _)| *name == field) {
            return Ok(ftyp.clone());
        }
        let key = FuncKey {
            package: qid.package,
            receiver: Some(qid.name),
            name: field,
        };
        if self.env.funcs.contains_key(&key) {
            return Ok(Typ::Func(Callee::User(key)));
        }
        Err(self.no_member(base, field, &typ))
    }

    fn no_member(&self, base: &Expr, field: TokenId, typ: &Typ) -> String {
        format!(
            "no field or method {:?} for {} of type {}",
            self.map.by_id(field),
            self.text(base),
            typ.str(self.map)
        )
    }

    fn call_type(
        &self,
        expr: &Expr,
        callee: &Expr,
        effect: Effect,
        args: &[Arg],
    ) -> Result<Typ, String> {
        if effect > self.effect {
            return Err(format!(
                "call {} has a stronger effect than its caller",
                self.text(expr)
            ));
        }
        let key = match self.type_of(callee)? {
            Typ::Func(Callee::Length) => {
                if effect != Effect::Pure || !args.is_empty() {
                    return Err(format!("{} takes no arguments and is pure", self.text(callee)));
                }
                return Typ::num(Key::U64).ok_or_else(|| "no base.u64 type".to_owned());
            }
            Typ::Func(Callee::User(key)) => key,
            other => {
                return Err(format!(
                    "{} of type {} is not a function",
                    self.text(callee),
                    other.str(self.map)
                ))
            }
        };
        let Some(info) = self.env.funcs.get(&key) else {
            return Err(format!("unknown function {}", key.str(self.map)));
        };
        if info.effect != effect {
            return Err(format!(
                "call {} must be written {}{}(...)",
                self.text(expr),
                key.str(self.map),
                info.effect.marker()
            ));
        }
        if info.inputs.len() != args.len() {
            return Err(format!(
                "call {} has {} arguments, {} takes {}",
                self.text(expr),
                args.len(),
                key.str(self.map),
                info.inputs.len()
            ));
        }
        for (arg, (name, ptyp)) in args.iter().zip(&info.inputs) {
            if arg.name != *name {
                return Err(format!(
                    "argument {:?} of {} should be named {:?}",
                    self.map.by_id(arg.name),
                    self.text(expr),
                    self.map.by_id(*name)
                ));
            }
            let atyp = self.type_of(&arg.value)?;
            if !ptyp.accepts(&atyp) {
                return Err(format!(
                    "argument {} of type {} does not match parameter {:?} of type {}",
                    self.text(&arg.value),
                    atyp.str(self.map),
                    self.map.by_id(*name),
                    ptyp.str(self.map)
                ));
            }
        }
        Ok(info.result())
    }
}
