//! Check errors.
//!
//! The first error aborts checking of the package. Errors raised while
//! bounds checking a function body list the facts in scope at that point.

use thiserror::Error;
use wuffs_ir::Interval;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CheckError {
    /// A declaration or statement that is not valid in context.
    #[error("check: {message} at {file}:{line}")]
    Invalid {
        message: String,
        file: String,
        line: u32,
    },

    #[error("check: duplicate {what} {name} at {file}:{line} and {other_file}:{other_line}")]
    Duplicate {
        what: &'static str,
        name: String,
        file: String,
        line: u32,
        other_file: String,
        other_line: u32,
    },

    #[error(
        "check: expression {expr:?} bounds {bounds} is not within bounds {within} at {file}:{line}{}",
        facts_suffix(.facts)
    )]
    OutOfBounds {
        expr: String,
        bounds: Interval,
        within: Interval,
        file: String,
        line: u32,
        facts: Vec<String>,
    },

    /// An obligation that neither the facts nor the computed bounds settle.
    #[error("check: cannot prove {condition:?}{} at {file}:{line}{}", detail_suffix(.detail.as_deref()), facts_suffix(.facts))]
    Unproven {
        condition: String,
        detail: Option<String>,
        file: String,
        line: u32,
        facts: Vec<String>,
    },

    /// An entry of the built-in proof rule table failed to parse.
    #[error("check: invalid proof rule {rule:?}: {message}")]
    BadRule { rule: String, message: String },
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map_or_else(String::new, |d| format!(": {d}"))
}

fn facts_suffix(facts: &[String]) -> String {
    if facts.is_empty() {
        return String::new();
    }
    format!(". Facts:\n\t{}", facts.join("\n\t"))
}

impl CheckError {
    pub fn line(&self) -> u32 {
        match self {
            CheckError::Invalid { line, .. }
            | CheckError::Duplicate { line, .. }
            | CheckError::OutOfBounds { line, .. }
            | CheckError::Unproven { line, .. } => *line,
            CheckError::BadRule { .. } => 0,
        }
    }
}
