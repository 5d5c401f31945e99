//! Wuffs Check - type and bounds checking for one package
//!
//! The checker resolves names, types every expression, and then proves that
//! every arithmetic result, index, slice and assignment stays within its
//! bounds. Proofs combine interval arithmetic over the types with facts
//! learned from conditions, assignments and `assert` statements. An assert
//! may cite one of the built-in [`RULES`] with `via`.
//!
//! # Module Structure
//!
//! - `checker`: package phases, from `packageid` to function bodies
//! - `env`: the declarations in scope
//! - `typ`, `typer`: resolved types and expression typing
//! - `func`, `tcheck`: per-function state and statement typing
//! - `bounds`, `flow`: interval checking of expressions and statements
//! - `facts`, `simplify`, `rules`: the fact store, rewrites and proof rules

mod bounds;
mod checker;
mod env;
mod error;
mod facts;
mod flow;
mod func;
mod rules;
mod simplify;
mod tcheck;
mod typ;
mod typer;

pub use checker::{valid_use_path, Checker, Dependencies, Package};
pub use error::CheckError;
pub use facts::{Contradiction, FactSet, FactsDisplay};
pub use rules::{ProofRule, RuleBook, RuleOutcome, RULES};
pub use typ::{machine_range, Callee, FuncKey, Typ};

#[cfg(test)]
mod tests;
