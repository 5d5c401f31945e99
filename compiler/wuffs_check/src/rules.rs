//! Proof rules for `assert COND via "RULE"(args)`.
//!
//! Each rule is written `CONCLUSION: HYPOTHESIS; HYPOTHESIS; ...` and its
//! text is also its name. Lowercase identifiers are placeholders. The table
//! is parsed once when a [`RuleBook`] is built.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use wuffs_ir::ast::{Arg, Expr};
use wuffs_ir::{TokenId, TokenMap};

use crate::CheckError;


/// Every rule an assert may cite.
pub const RULES: &[&str] = &[
    "a < b: b > a",
    "a > b: b < a",
    "a <= b: b >= a",
    "a >= b: b <= a",
    "a < b: a < c; c < b",
    "a < b: a < c; c == b",
    "a < b: a == c; c < b",
    "a < b: a < c; c <= b",
    "a < b: a <= c; c < b",
    "a <= b: a <= c; c <= b",
    "a <= b: a <= c; c == b",
    "a <= b: a == c; c <= b",
    "a <= b: a < b",
    "a < (b + c): a < c; 0 <= b",
    "a < (b + c): a < (b0 + c0); b0 <= b; c0 <= c",
    "(a + b) <= c: a <= (c - b)",
    "(a + b) < c: a < (c - b)",
    "a <= (a + b): 0 <= b",
    "(a - b) <= c: a <= (c + b)",
];

const RULES_FILE: &str = "<rules>";

type Bindings = SmallVec<[(TokenId, Expr); 4]>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofRule {
    pub name: &'static str,
    pub conclusion: Expr,
    pub hypotheses: Vec<Expr>,
}

/// The result of citing a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleOutcome {
    Proven,
    /// The asserted condition does not have the conclusion's shape.
    NoMatch,
    /// A placeholder that only appears in hypotheses was not passed.
    MissingArg(TokenId),
    /// The first hypothesis that could not be proven, instantiated.
    Unmet(Expr),
}

fn is_placeholder(id: TokenId) -> bool {
    id.is_ident() && !id.key().is_built_in()
}

fn match_pattern(pattern: &Expr, target: &Expr, bindings: &mut Bindings) -> bool {
    match pattern {
        Expr::Ident(id) if is_placeholder(*id) => {
            if let Some((_, bound)) = bindings.iter().find(|(p, _)| p == id) {
                return bound == target;
            }
            bindings.push((*id, target.clone()));
            true
        }
        Expr::Binary { op, lhs, rhs } => match target.as_binary() {
            Some((target_op, tl, tr)) => {
                target_op == *op && match_pattern(lhs, tl, bindings) && match_pattern(rhs, tr, bindings)
            }
            None => false,
        },
        _ => pattern == target,
    }
}

fn collect_placeholders(pattern: &Expr, out: &mut SmallVec<[TokenId; 4]>) {
    pattern.any(&mut |e| {
        if let Expr::Ident(id) = e {
            if is_placeholder(*id) && !out.contains(id) {
                out.push(*id);
            }
        }
        false
    });
}

fn instantiate(pattern: &Expr, bindings: &Bindings) -> Option<Expr> {
    match pattern {
        Expr::Ident(id) if is_placeholder(*id) => bindings
            .iter()
            .find(|(p, _)| p == id)
            .map(|(_, e)| e.clone()),
        Expr::Unary { op, operand } => Some(Expr::unary(*op, instantiate(operand, bindings)?)),
        Expr::Binary { op, lhs, rhs } => Some(Expr::binary(
            *op,
            instantiate(lhs, bindings)?,
            instantiate(rhs, bindings)?,
        )),
        _ => Some(pattern.clone()),
    }
}

impl ProofRule {
    fn parse(map: &TokenMap, name: &'static str) -> Result<ProofRule, CheckError> {
        let bad = |message: String| CheckError::BadRule {
            rule: name.to_owned(),
            message,
        };
        let Some((conclusion, hypotheses)) = name.split_once(':') else {
            return Err(bad("missing ':'".to_owned()));
        };
        let parse_side = |text: &str| -> Result<Expr, CheckError> {
            let tokens = wuffs_lexer::lex(map, RULES_FILE, text.trim().as_bytes())
                .map_err(|e| bad(e.to_string()))?;
            wuffs_parse::parse_expr(map, RULES_FILE, &tokens).map_err(|e| bad(e.to_string()))
        };
        Ok(ProofRule {
            name,
            conclusion: parse_side(conclusion)?,
            hypotheses: hypotheses
                .split(';')
                .map(parse_side)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Try to prove `condition` with this rule. `prove` decides each
    /// instantiated hypothesis.
    pub fn apply<E>(
        &self,
        condition: &Expr,
        args: &[Arg],
        mut prove: impl FnMut(&Expr) -> Result<bool, E>,
    ) -> Result<RuleOutcome, E> {
        let mut bindings = Bindings::new();
        if !match_pattern(&self.conclusion, condition, &mut bindings) {
            return Ok(RuleOutcome::NoMatch);
        }

        let mut wanted = SmallVec::<[TokenId; 4]>::new();
        for hypothesis in &self.hypotheses {
            collect_placeholders(hypothesis, &mut wanted);
        }
        for placeholder in wanted {
            if bindings.iter().any(|(p, _)| *p == placeholder) {
                continue;
            }
            let Some(arg) = args.iter().find(|a| a.name == placeholder) else {
                return Ok(RuleOutcome::MissingArg(placeholder));
            };
            bindings.push((placeholder, arg.value.clone()));
        }

        for hypothesis in &self.hypotheses {
            let Some(instance) = instantiate(hypothesis, &bindings) else {
                return Ok(RuleOutcome::Unmet(hypothesis.clone()));
            };
            if !prove(&instance)? {
                return Ok(RuleOutcome::Unmet(instance));
            }
        }
        Ok(RuleOutcome::Proven)
    }
}

/// The parsed rule table, looked up by rule text.
#[derive(Debug)]
pub struct RuleBook {
    rules: FxHashMap<&'static str, ProofRule>,
}

impl RuleBook {
    pub fn new(map: &TokenMap) -> Result<RuleBook, CheckError> {
        let rules = RULES
            .iter()
            .map(|&name| ProofRule::parse(map, name).map(|rule| (name, rule)))
            .collect::<Result<_, _>>()?;
        Ok(RuleBook { rules })
    }

    pub fn get(&self, name: &str) -> Option<&ProofRule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
