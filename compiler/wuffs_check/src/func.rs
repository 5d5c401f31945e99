//! Checking one function: its locals, contract and body.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use wuffs_ir::ast::{Expr, Func, While};
use wuffs_ir::{Interval, Key, QId, TokenId, TokenMap};

use crate::env::{Env, FuncInfo};
use crate::facts::FactSet;
use crate::rules::RuleBook;
use crate::typ::{FuncKey, Typ};
use crate::typer::Typer;
use crate::CheckError;

/// Deepest expression the bounds checker will descend into.
pub(crate) const MAX_EXPR_DEPTH: u32 = 255;

/// How many proofs may be nested inside the range computations of an
/// outer proof. Facts such as `x <= (10 - x)` would otherwise recurse
/// forever.
pub(crate) const MAX_PROOF_DEPTH: u32 = 4;

/// State while checking one function body.
pub(crate) struct FuncChecker<'a> {
    pub map: &'a TokenMap,
    pub env: &'a Env,
    pub rules: &'a RuleBook,
    pub file: &'a str,
    pub info: &'a FuncInfo,
    pub locals: FxHashMap<TokenId, Typ>,
    /// `this` and the inputs, which may not be assigned.
    pub readonly: FxHashSet<TokenId>,
    pub facts: FactSet,
    /// Enclosing loops, innermost last.
    pub loops: Vec<&'a While>,
    /// Line of the statement being checked.
    pub line: u32,
    /// Range computations currently in progress on behalf of a proof.
    pub proof_depth: u32,
}

/// What every function of a package is checked against.
#[derive(Copy, Clone)]
pub(crate) struct Context<'a> {
    pub map: &'a TokenMap,
    pub env: &'a Env,
    pub rules: &'a RuleBook,
}

/// Type check and then bounds check `func`.
pub(crate) fn check_func<'a>(
    cx: Context<'a>,
    file: &'a str,
    key: FuncKey,
    func: &'a Func,
    info: &'a FuncInfo,
    line: u32,
) -> Result<(), CheckError> {
    debug!(func = %key.str(cx.map), file, "checking function");
    let mut fc = FuncChecker {
        map: cx.map,
        env: cx.env,
        rules: cx.rules,
        file,
        info,
        locals: FxHashMap::default(),
        readonly: FxHashSet::default(),
        facts: FactSet::new(),
        loops: Vec::new(),
        line,
        proof_depth: 0,
    };

    if let Some(receiver) = key.receiver {
        let this = TokenId::built_in(Key::THIS);
        let recv = Typ::Ptr(Box::new(Typ::Struct(QId::new(None, receiver))));
        fc.locals.insert(this, recv);
        fc.readonly.insert(this);
    }
    for (name, typ) in &info.inputs {
        fc.declare(*name, typ.clone())?;
        fc.readonly.insert(*name);
    }
    for (name, typ) in &info.outputs {
        fc.declare(*name, typ.clone())?;
    }
    fc.hoist_vars(&func.body)?;

    for a in &func.asserts {
        fc.line = a.line;
        fc.tcheck_assert(a)?;
    }
    fc.tcheck_block(&func.body)?;

    fc.line = line;
    for pre in &info.pre {
        fc.facts.append(pre.clone());
    }
    fc.bcheck_block(&func.body)?;
    if !crate::flow::terminates(&func.body) {
        fc.prove_posts()?;
    }
    Ok(())
}

impl FuncChecker<'_> {
    /// Add a local, rejecting duplicates and names taken by constants.
    pub fn declare(&mut self, name: TokenId, typ: Typ) -> Result<(), CheckError> {
        let text = self.map.by_id(name);
        if name.key() == Key::THIS || self.locals.contains_key(&name) {
            return Err(self.invalid(format!("duplicate variable {text:?}")));
        }
        if self.env.consts.contains_key(&QId::new(None, name)) {
            return Err(self.invalid(format!("variable {text:?} shadows a constant")));
        }
        self.locals.insert(name, typ);
        Ok(())
    }

    pub fn typer(&self) -> Typer<'_> {
        Typer {
            map: self.map,
            env: self.env,
            locals: &self.locals,
            effect: self.info.effect,
        }
    }

    pub fn ty(&self, expr: &Expr) -> Result<Typ, CheckError> {
        self.typer().type_of(expr).map_err(|m| self.invalid(m))
    }

    pub fn const_value(&self, expr: &Expr) -> Option<i128> {
        self.typer().const_value(expr)
    }

    // --- Errors ---

    pub fn invalid(&self, message: String) -> CheckError {
        CheckError::Invalid {
            message,
            file: self.file.to_owned(),
            line: self.line,
        }
    }

    pub fn out_of_bounds(&self, expr: String, bounds: Interval, within: Interval) -> CheckError {
        CheckError::OutOfBounds {
            expr,
            bounds,
            within,
            file: self.file.to_owned(),
            line: self.line,
            facts: self.facts.render(self.map),
        }
    }

    pub fn unproven(&self, condition: &Expr, detail: Option<String>) -> CheckError {
        CheckError::Unproven {
            condition: condition.str(self.map),
            detail,
            file: self.file.to_owned(),
            line: self.line,
            facts: self.facts.render(self.map),
        }
    }
}
