//! Facts: boolean expressions known to hold at a point in a function.

use std::fmt;

use wuffs_ir::ast::Expr;
use wuffs_ir::{Interval, Key, TokenMap};

use crate::simplify::mirror_comparison;

#[cfg(test)]
mod tests;

/// An ordered set of facts, compared structurally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactSet {
    facts: Vec<Expr>,
}

/// A fact that leaves an expression with no possible value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contradiction {
    pub fact: Expr,
    pub before: Interval,
}

/// If `fact` compares `this` against something, the operator as seen from
/// `this` and the other side. `c > x` seen from `x` is `x < c`.
pub(crate) fn other_hand_side<'a>(fact: &'a Expr, this: &Expr) -> Option<(Key, &'a Expr)> {
    let (op, lhs, rhs) = fact.as_binary()?;
    let mirrored = mirror_comparison(op)?;
    if lhs == this {
        Some((op, rhs))
    } else if rhs == this {
        Some((mirrored, lhs))
    } else {
        None
    }
}

impl FactSet {
    pub fn new() -> Self {
        FactSet::default()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expr> {
        self.facts.iter()
    }

    pub fn contains(&self, fact: &Expr) -> bool {
        self.facts.contains(fact)
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    /// Add a fact. Conjunctions are split into their parts. A bare operand
    /// also brings in everything it is known to equal.
    pub fn append(&mut self, fact: Expr) {
        if self.facts.contains(&fact) {
            return;
        }
        match fact {
            Expr::Binary {
                op: Key::X_BINARY_AND,
                lhs,
                rhs,
            } => {
                self.append(*lhs);
                self.append(*rhs);
            }
            Expr::Associative {
                op: Key::X_ASSOCIATIVE_AND,
                args,
            } => {
                for arg in args {
                    self.append(arg);
                }
            }
            fact => {
                let equals: Vec<Expr> = if fact.is_operation() {
                    Vec::new()
                } else {
                    self.facts
                        .iter()
                        .filter_map(|x| match other_hand_side(x, &fact) {
                            Some((Key::X_BINARY_EQ_EQ, other)) => Some(other.clone()),
                            _ => None,
                        })
                        .collect()
                };
                self.facts.push(fact);
                for other in equals {
                    self.append(other);
                }
            }
        }
    }

    /// Drop every fact that mentions `expr`.
    pub fn retain_unmentioned(&mut self, expr: &Expr) {
        self.facts.retain(|x| !x.mentions(expr));
    }

    /// Replace each fact with `f(fact)`, dropping those mapped to `None`.
    pub fn update(&mut self, mut f: impl FnMut(&Expr) -> Option<Expr>) {
        self.facts = self.facts.iter().filter_map(|x| f(x)).collect();
    }

    /// Narrow `range`, the computed bounds of `expr`, using facts that
    /// compare `expr` against a constant. `const_value` evaluates the other
    /// side.
    pub fn refine(
        &self,
        expr: &Expr,
        range: Interval,
        const_value: impl Fn(&Expr) -> Option<i128>,
    ) -> Result<Interval, Contradiction> {
        let (Some(mut lo), Some(mut hi)) = (range.lo, range.hi) else {
            return Ok(range);
        };
        for x in &self.facts {
            let Some((op, other)) = other_hand_side(x, expr) else {
                continue;
            };
            let Some(cv) = const_value(other) else {
                continue;
            };
            let narrowed = match op {
                Key::X_BINARY_NOT_EQ if lo == cv => lo.checked_add(1).map(|lo| (lo, hi)),
                Key::X_BINARY_NOT_EQ if hi == cv => hi.checked_sub(1).map(|hi| (lo, hi)),
                Key::X_BINARY_LESS_THAN if hi >= cv => cv.checked_sub(1).map(|hi| (lo, hi)),
                Key::X_BINARY_LESS_EQ if hi > cv => Some((lo, cv)),
                Key::X_BINARY_EQ_EQ => Some((lo.max(cv), hi.min(cv))),
                Key::X_BINARY_GREATER_EQ if lo < cv => Some((cv, hi)),
                Key::X_BINARY_GREATER_THAN if lo <= cv => cv.checked_add(1).map(|lo| (lo, hi)),
                _ => continue,
            };
            // No integer lies past the ends of i128.
            match narrowed {
                Some((l, h)) if l <= h => {
                    lo = l;
                    hi = h;
                }
                _ => {
                    return Err(Contradiction {
                        fact: x.clone(),
                        before: Interval::new(lo, hi),
                    })
                }
            }
        }
        Ok(Interval::new(lo, hi))
    }

    /// The facts that hold in every branch.
    pub fn intersect(branches: &[FactSet]) -> FactSet {
        let Some((first, rest)) = branches.split_first() else {
            return FactSet::new();
        };
        FactSet {
            facts: first
                .facts
                .iter()
                .filter(|x| rest.iter().all(|b| b.contains(x)))
                .cloned()
                .collect(),
        }
    }

    /// The facts rendered as source text.
    pub fn render(&self, map: &TokenMap) -> Vec<String> {
        self.facts.iter().map(|x| x.str(map)).collect()
    }

    pub fn display<'a>(&'a self, map: &'a TokenMap) -> FactsDisplay<'a> {
        FactsDisplay { facts: self, map }
    }
}

/// Renders one fact per line.
pub struct FactsDisplay<'a> {
    facts: &'a FactSet,
    map: &'a TokenMap,
}

impl fmt::Display for FactsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, x) in self.facts.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", x.display(self.map))?;
        }
        Ok(())
    }
}
