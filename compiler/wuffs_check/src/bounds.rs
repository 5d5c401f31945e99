//! Bounds checking of expressions, and proving the conditions that arise.
//!
//! Every numeric expression gets an [`Interval`] computed from its operands
//! and narrowed by the facts in scope. The result must lie within the
//! bounds of the expression's type.

use tracing::trace;
use wuffs_ir::ast::{Arg, Effect, Expr};
use wuffs_ir::{Interval, Key, TokenId};

use crate::env::FuncInfo;
use crate::facts::other_hand_side;
use crate::func::{FuncChecker, MAX_EXPR_DEPTH, MAX_PROOF_DEPTH};
use crate::simplify::{const_expr, invert, mirror_comparison, simplify, substitute_idents};
use crate::typ::{Callee, Typ};
use crate::CheckError;


const BOOL_RANGE: Interval = Interval::new(0, 1);
const NON_NEGATIVE: Interval = Interval {
    lo: Some(0),
    hi: None,
};

/// A contract condition of `info` as seen by a caller: `this` becomes the
/// receiver and each input becomes the argument passed for it.
pub(crate) fn contract_instance(
    cond: &Expr,
    info: &FuncInfo,
    receiver: Option<&Expr>,
    args: &[Arg],
) -> Expr {
    substitute_idents(cond, &|id: TokenId| {
        if id.key() == Key::THIS {
            return receiver.cloned();
        }
        let i = info.inputs.iter().position(|(name, _)| *name == id)?;
        args.get(i).map(|a| a.value.clone())
    })
}

/// `base.length()`.
pub(crate) fn length_of(base: &Expr) -> Expr {
    Expr::Call {
        callee: Box::new(Expr::select(base.clone(), TokenId::built_in(Key::LENGTH))),
        effect: Effect::Pure,
        args: Vec::new(),
    }
}

fn lt(a: Option<i128>, b: Option<i128>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

fn le(a: Option<i128>, b: Option<i128>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a <= b)
}

/// Whether `l op r` holds for every pair of values in the two ranges.
pub(crate) fn compare_ranges(op: Key, l: Interval, r: Interval) -> bool {
    match op {
        Key::X_BINARY_LESS_THAN => lt(l.hi, r.lo),
        Key::X_BINARY_LESS_EQ => le(l.hi, r.lo),
        Key::X_BINARY_GREATER_THAN => lt(r.hi, l.lo),
        Key::X_BINARY_GREATER_EQ => le(r.hi, l.lo),
        Key::X_BINARY_EQ_EQ => l.as_point().is_some() && l.as_point() == r.as_point(),
        Key::X_BINARY_NOT_EQ => lt(l.hi, r.lo) || lt(r.hi, l.lo),
        _ => false,
    }
}

/// Whether `a fact b` implies `a want b`.
pub(crate) fn op_implies_op(fact: Key, want: Key) -> bool {
    fact == want
        || matches!(
            (fact, want),
            (
                Key::X_BINARY_LESS_THAN,
                Key::X_BINARY_LESS_EQ | Key::X_BINARY_NOT_EQ
            ) | (
                Key::X_BINARY_GREATER_THAN,
                Key::X_BINARY_GREATER_EQ | Key::X_BINARY_NOT_EQ
            ) | (
                Key::X_BINARY_EQ_EQ,
                Key::X_BINARY_LESS_EQ | Key::X_BINARY_GREATER_EQ
            )
        )
}

/// Pin each end of `range` inside `within`.
fn clamp(range: Interval, within: Interval) -> Interval {
    let pin = |v: Option<i128>, fallback: Option<i128>| match (v, within.lo, within.hi) {
        (None, ..) => fallback,
        (Some(v), Some(lo), _) if v < lo => Some(lo),
        (Some(v), _, Some(hi)) if v > hi => Some(hi),
        (v, ..) => v,
    };
    Interval {
        lo: pin(range.lo, within.lo),
        hi: pin(range.hi, within.hi),
    }
}

/// Bit width of a machine integer type.
fn bit_width(key: Key) -> Option<i128> {
    match key {
        Key::I8 | Key::U8 => Some(8),
        Key::I16 | Key::U16 => Some(16),
        Key::I32 | Key::U32 => Some(32),
        Key::I64 | Key::U64 => Some(64),
        _ => None,
    }
}

impl FuncChecker<'_> {
    /// The values `expr` may take. Fails if they escape its type's bounds.
    pub fn bcheck_expr(&mut self, expr: &Expr, depth: u32) -> Result<Interval, CheckError> {
        if depth > MAX_EXPR_DEPTH {
            return Err(self.invalid(format!(
                "expression {:?} is nested too deeply",
                expr.str(self.map)
            )));
        }
        let computed = self.bcheck_expr1(expr, depth + 1)?;
        let range = self
            .facts
            .refine(expr, computed, |e| self.const_value(e))
            .map_err(|c| {
                self.invalid(format!(
                    "expression {:?} bounds {} inconsistent with fact {:?}",
                    expr.str(self.map),
                    c.before,
                    c.fact.str(self.map)
                ))
            })?;
        if let Some(within) = self.ty(expr)?.bounds() {
            if !range.is_subset_of(within) {
                return Err(self.out_of_bounds(expr.str(self.map), range, within));
            }
        }
        Ok(range)
    }

    /// Bounds check `expr` and require it to fit a slot of type `typ`.
    pub fn fits(&mut self, expr: &Expr, typ: &Typ, depth: u32) -> Result<Interval, CheckError> {
        let range = self.bcheck_expr(expr, depth)?;
        if let Some(within) = typ.bounds() {
            if !range.is_subset_of(within) {
                return Err(self.out_of_bounds(expr.str(self.map), range, within));
            }
        }
        Ok(range)
    }

    fn type_bounds(&self, expr: &Expr) -> Result<Interval, CheckError> {
        Ok(self.ty(expr)?.bounds().unwrap_or(Interval::UNBOUNDED))
    }

    fn bcheck_expr1(&mut self, expr: &Expr, depth: u32) -> Result<Interval, CheckError> {
        if let Some(v) = self.const_value(expr) {
            return Ok(Interval::point(v));
        }
        match expr {
            Expr::Ident(_) | Expr::Literal(_) => self.type_bounds(expr),
            Expr::Unary { op, operand } => {
                let range = self.bcheck_expr(operand, depth)?;
                Ok(match *op {
                    Key::X_UNARY_MINUS => range.neg(),
                    Key::X_UNARY_NOT => BOOL_RANGE,
                    _ => range,
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.bcheck_expr(lhs, depth)?;
                let r = match *op {
                    Key::X_BINARY_AND if lhs.is_pure() => {
                        self.with_fact(lhs.as_ref().clone(), |fc| fc.bcheck_expr(rhs, depth))?
                    }
                    Key::X_BINARY_OR if lhs.is_pure() => {
                        let negated = invert(lhs);
                        self.with_fact(negated, |fc| fc.bcheck_expr(rhs, depth))?
                    }
                    _ => self.bcheck_expr(rhs, depth)?,
                };
                self.binary_range(expr, l, r)
            }
            Expr::Associative { op, args } => {
                let Some((first, rest)) = args.split_first() else {
                    return Ok(Interval::UNBOUNDED);
                };
                let binary = op.ambiguous_form();
                let mut acc_expr = first.clone();
                let mut acc = self.bcheck_expr(first, depth)?;
                for arg in rest {
                    let r = self.bcheck_expr(arg, depth)?;
                    let prefix = Expr::binary(binary, acc_expr, arg.clone());
                    acc = self.binary_range(&prefix, acc, r)?;
                    if let Some(within) = self.ty(&prefix)?.bounds() {
                        if !acc.is_subset_of(within) {
                            return Err(self.out_of_bounds(prefix.str(self.map), acc, within));
                        }
                    }
                    acc_expr = prefix;
                }
                Ok(acc)
            }
            Expr::As { value, .. } => {
                let range = self.bcheck_expr(value, depth)?;
                if let Some(within) = self.ty(expr)?.bounds() {
                    if !range.is_subset_of(within) {
                        return Err(self.out_of_bounds(expr.str(self.map), range, within));
                    }
                }
                Ok(range)
            }
            Expr::Call { callee, args, .. } => self.bcheck_call(callee, args, depth),
            Expr::Index { base, index } => {
                self.bcheck_expr(base, depth)?;
                let i = self.bcheck_expr(index, depth)?;
                match self.ty(base)? {
                    Typ::Array { len, .. } => {
                        let within = Interval::new(0, len - 1);
                        if !i.is_subset_of(within) {
                            return Err(self.out_of_bounds(index.str(self.map), i, within));
                        }
                    }
                    _ => {
                        self.require(&Expr::binary(Key::LESS_EQ, Expr::zero(), index.as_ref().clone()))?;
                        self.require(&Expr::binary(
                            Key::LESS_THAN,
                            index.as_ref().clone(),
                            length_of(base),
                        ))?;
                    }
                }
                self.type_bounds(expr)
            }
            Expr::Slice { base, lo, hi } => {
                self.bcheck_slice(base, lo.as_deref(), hi.as_deref(), depth)?;
                Ok(Interval::UNBOUNDED)
            }
            Expr::Select { base, .. } => {
                if self.typer().package(base).is_none() {
                    self.bcheck_expr(base, depth)?;
                }
                self.type_bounds(expr)
            }
            Expr::List(_) => Ok(Interval::UNBOUNDED),
        }
    }

    /// Run `f` with `fact` temporarily added.
    fn with_fact<T>(&mut self, fact: Expr, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.facts.clone();
        self.facts.append(fact);
        let out = f(self);
        self.facts = saved;
        out
    }

    pub fn binary_range(&mut self, expr: &Expr, l: Interval, r: Interval) -> Result<Interval, CheckError> {
        let Some((op, lhs, rhs)) = expr.as_binary() else {
            return Ok(Interval::UNBOUNDED);
        };
        let range = match op {
            Key::X_BINARY_PLUS => l.add(r),
            Key::X_BINARY_MINUS => {
                let diff = l.sub(r);
                let ge = Expr::binary(Key::GREATER_EQ, lhs.clone(), rhs.clone());
                if diff.may_be_negative() && self.prove(&ge) {
                    diff.intersect(NON_NEGATIVE).unwrap_or(diff)
                } else {
                    diff
                }
            }
            Key::X_BINARY_STAR => l.mul(r),
            Key::X_BINARY_SLASH | Key::X_BINARY_PERCENT => {
                let result = if op == Key::X_BINARY_SLASH {
                    l.quo(r)
                } else {
                    l.rem(r)
                };
                result.ok_or_else(|| {
                    self.invalid(format!(
                        "divisor {:?} in {:?} may be zero or negative: its bounds are {r}",
                        rhs.str(self.map),
                        expr.str(self.map)
                    ))
                })?
            }
            Key::X_BINARY_SHIFT_L | Key::X_BINARY_SHIFT_R | Key::X_BINARY_TILDE_MOD_SHIFT_L => {
                self.check_shift(lhs, rhs, r)?;
                let shifted = if op == Key::X_BINARY_SHIFT_R {
                    l.shr(r)
                } else {
                    l.shl(r)
                };
                let shifted = shifted.ok_or_else(|| {
                    self.invalid(format!(
                        "shift operands of {:?} may be negative",
                        expr.str(self.map)
                    ))
                })?;
                if op == Key::X_BINARY_TILDE_MOD_SHIFT_L {
                    self.machine_bounds(expr)?
                } else {
                    shifted
                }
            }
            Key::X_BINARY_AMP | Key::X_BINARY_PIPE | Key::X_BINARY_HAT => {
                let result = match op {
                    Key::X_BINARY_AMP => l.bit_and(r),
                    Key::X_BINARY_PIPE => l.bit_or(r),
                    _ => l.xor(r),
                };
                result.ok_or_else(|| {
                    self.invalid(format!(
                        "bitwise operands of {:?} may be negative",
                        expr.str(self.map)
                    ))
                })?
            }
            Key::X_BINARY_TILDE_MOD_PLUS
            | Key::X_BINARY_TILDE_MOD_MINUS
            | Key::X_BINARY_TILDE_MOD_STAR => self.machine_bounds(expr)?,
            Key::X_BINARY_TILDE_SAT_PLUS => clamp(l.add(r), self.machine_bounds(expr)?),
            Key::X_BINARY_TILDE_SAT_MINUS => clamp(l.sub(r), self.machine_bounds(expr)?),
            _ if op.is_x_comparison() => BOOL_RANGE,
            Key::X_BINARY_AND | Key::X_BINARY_OR => BOOL_RANGE,
            _ => Interval::UNBOUNDED,
        };
        Ok(range)
    }

    fn machine_bounds(&self, expr: &Expr) -> Result<Interval, CheckError> {
        Ok(self.ty(expr)?.machine_bounds().unwrap_or(Interval::UNBOUNDED))
    }

    /// A shift amount must be less than the width of the shifted type.
    fn check_shift(&self, lhs: &Expr, rhs: &Expr, r: Interval) -> Result<(), CheckError> {
        let width = match self.ty(lhs)? {
            Typ::Num { key, .. } => bit_width(key),
            _ => None,
        };
        let Some(width) = width else {
            return Ok(());
        };
        let within = Interval::new(0, width - 1);
        if !r.is_subset_of(within) {
            return Err(self.out_of_bounds(rhs.str(self.map), r, within));
        }
        Ok(())
    }

    fn bcheck_call(&mut self, callee: &Expr, args: &[Arg], depth: u32) -> Result<Interval, CheckError> {
        let receiver = match callee {
            Expr::Select { base, .. } if self.typer().package(base).is_none() => Some(base.as_ref()),
            _ => None,
        };
        if let Some(base) = receiver {
            self.bcheck_expr(base, depth)?;
        }
        let key = match self.ty(callee)? {
            Typ::Func(Callee::User(key)) => key,
            _ => return self.type_bounds(&length_of(receiver.unwrap_or(callee))),
        };
        let env = self.env;
        let Some(info) = env.funcs.get(&key) else {
            return Err(self.invalid(format!("unknown function {}", key.str(self.map))));
        };
        for (arg, (_, ptyp)) in args.iter().zip(&info.inputs) {
            self.fits(&arg.value, ptyp, depth)?;
        }
        for pre in &info.pre {
            let obligation = contract_instance(pre, info, receiver, args);
            if !self.prove(&obligation) {
                let detail = format!("precondition of {}", key.str(self.map));
                return Err(self.unproven(&obligation, Some(detail)));
            }
        }
        Ok(info.result().bounds().unwrap_or(Interval::UNBOUNDED))
    }

    fn bcheck_slice(
        &mut self,
        base: &Expr,
        lo: Option<&Expr>,
        hi: Option<&Expr>,
        depth: u32,
    ) -> Result<(), CheckError> {
        self.bcheck_expr(base, depth)?;
        for bound in lo.iter().chain(hi.iter()) {
            self.bcheck_expr(bound, depth)?;
        }
        if lo.is_none() && hi.is_none() {
            return Ok(());
        }
        let len = match self.ty(base)? {
            Typ::Array { len, .. } => const_expr(self.map, len)
                .ok_or_else(|| self.invalid(format!("array length {len} is not representable")))?,
            _ => length_of(base),
        };
        let lo = lo.cloned().unwrap_or_else(Expr::zero);
        let hi = hi.cloned().unwrap_or_else(|| len.clone());
        self.require(&Expr::binary(Key::LESS_EQ, Expr::zero(), lo.clone()))?;
        self.require(&Expr::binary(Key::LESS_EQ, lo, hi.clone()))?;
        self.require(&Expr::binary(Key::LESS_EQ, hi, len))
    }

    /// Fail unless `cond` can be proven.
    pub fn require(&mut self, cond: &Expr) -> Result<(), CheckError> {
        if self.prove(cond) {
            Ok(())
        } else {
            Err(self.unproven(cond, None))
        }
    }

    /// The range of `expr`, or unbounded if it cannot be bounds checked or
    /// the proofs it needs are nested too deeply.
    fn range_of(&mut self, expr: &Expr) -> Interval {
        if self.proof_depth >= MAX_PROOF_DEPTH {
            return Interval::UNBOUNDED;
        }
        self.proof_depth += 1;
        let range = self.bcheck_expr(expr, 0).unwrap_or(Interval::UNBOUNDED);
        self.proof_depth -= 1;
        range
    }

    /// Whether `cond` follows from the facts and the bounds of its parts.
    pub fn prove(&mut self, cond: &Expr) -> bool {
        let cond = simplify(self.map, cond);
        let proven = self.prove1(&cond);
        trace!(cond = %cond.display(self.map), proven, "prove");
        proven
    }

    fn prove1(&mut self, cond: &Expr) -> bool {
        if self.facts.contains(cond) {
            return true;
        }
        if let Some(v) = self.const_value(cond) {
            return v != 0;
        }
        match cond {
            Expr::Binary {
                op: Key::X_BINARY_AND,
                lhs,
                rhs,
            } => self.prove(lhs) && self.prove(rhs),
            Expr::Binary {
                op: Key::X_BINARY_OR,
                lhs,
                rhs,
            } => self.prove(lhs) || self.prove(rhs),
            Expr::Associative {
                op: Key::X_ASSOCIATIVE_AND,
                args,
            } => args.iter().all(|arg| self.prove(arg)),
            Expr::Associative {
                op: Key::X_ASSOCIATIVE_OR,
                args,
            } => args.iter().any(|arg| self.prove(arg)),
            Expr::Binary { op, lhs, rhs } if op.is_x_comparison() => {
                self.prove_binary_op(*op, lhs, rhs)
            }
            _ => false,
        }
    }

    fn prove_binary_op(&mut self, op: Key, lhs: &Expr, rhs: &Expr) -> bool {
        let l = self.range_of(lhs);
        let r = self.range_of(rhs);
        if compare_ranges(op, l, r) {
            return true;
        }
        if self.prove_from_facts(op, lhs, rhs, r) {
            return true;
        }
        match mirror_comparison(op) {
            Some(mirrored) => self.prove_from_facts(mirrored, rhs, lhs, l),
            None => false,
        }
    }

    /// Prove `lhs op rhs` from a fact `lhs OP other`, either directly or by
    /// chaining through the range of `other`.
    fn prove_from_facts(&mut self, op: Key, lhs: &Expr, rhs: &Expr, r: Interval) -> bool {
        let candidates: Vec<(Key, Expr)> = self
            .facts
            .iter()
            .filter_map(|fact| other_hand_side(fact, lhs).map(|(k, other)| (k, other.clone())))
            .collect();
        for (fact_op, other) in candidates {
            if other == *rhs && op_implies_op(fact_op, op) {
                return true;
            }
            if self.off_by_one(fact_op, op, &other, rhs) {
                return true;
            }
            let step = match (fact_op, op) {
                (Key::X_BINARY_LESS_THAN, Key::X_BINARY_LESS_THAN | Key::X_BINARY_LESS_EQ) => {
                    Key::X_BINARY_LESS_EQ
                }
                (Key::X_BINARY_LESS_EQ | Key::X_BINARY_EQ_EQ, Key::X_BINARY_LESS_THAN) => {
                    Key::X_BINARY_LESS_THAN
                }
                (Key::X_BINARY_LESS_EQ | Key::X_BINARY_EQ_EQ, Key::X_BINARY_LESS_EQ) => {
                    Key::X_BINARY_LESS_EQ
                }
                (
                    Key::X_BINARY_GREATER_THAN,
                    Key::X_BINARY_GREATER_THAN | Key::X_BINARY_GREATER_EQ,
                ) => Key::X_BINARY_GREATER_EQ,
                (Key::X_BINARY_GREATER_EQ | Key::X_BINARY_EQ_EQ, Key::X_BINARY_GREATER_THAN) => {
                    Key::X_BINARY_GREATER_THAN
                }
                (Key::X_BINARY_GREATER_EQ | Key::X_BINARY_EQ_EQ, Key::X_BINARY_GREATER_EQ) => {
                    Key::X_BINARY_GREATER_EQ
                }
                _ => continue,
            };
            let o = self.range_of(&other);
            if compare_ranges(step, o, r) {
                return true;
            }
        }
        false
    }

    /// Integers: `x < y + 1` gives `x <= y` and `x > y - 1` gives `x >= y`.
    fn off_by_one(&self, fact_op: Key, op: Key, other: &Expr, rhs: &Expr) -> bool {
        let step = match (fact_op, op) {
            (Key::X_BINARY_LESS_THAN, Key::X_BINARY_LESS_EQ) => Key::X_BINARY_PLUS,
            (Key::X_BINARY_GREATER_THAN, Key::X_BINARY_GREATER_EQ) => Key::X_BINARY_MINUS,
            _ => return false,
        };
        let Some(one) = const_expr(self.map, 1) else {
            return false;
        };
        *other == Expr::binary(step, rhs.clone(), one)
    }
}
