//! Facts through statements.
//!
//! Facts flow forward through a block. Assignments invalidate what they
//! overwrite, `if` branches are checked separately and meet at the
//! intersection of their facts, and a loop's `pre`, `inv` and `post`
//! asserts are the only facts that cross its boundary.

use tracing::trace;
use wuffs_ir::ast::{Assert, ElseBranch, Expr, If, Stmt, StmtKind, While};
use wuffs_ir::token::unescape;
use wuffs_ir::{Key, TokenId};

use crate::bounds::contract_instance;
use crate::facts::{other_hand_side, FactSet};
use crate::func::FuncChecker;
use crate::rules::RuleOutcome;
use crate::simplify::{invert, simplify};
use crate::typ::{Callee, Typ};
use crate::CheckError;

/// Whether control never falls off the end of `body`.
pub(crate) fn terminates(body: &[Stmt]) -> bool {
    match body.last().map(|s| &s.kind) {
        Some(StmtKind::Return(_) | StmtKind::Jump { .. }) => true,
        Some(StmtKind::If(i)) => if_terminates(i),
        Some(StmtKind::While(w)) => {
            w.condition == Expr::bool(true) && !breaks_to(&w.body, w.label, false)
        }
        _ => false,
    }
}

pub(crate) fn if_terminates(i: &If) -> bool {
    terminates(&i.then_body)
        && match &i.else_body {
            None => false,
            Some(ElseBranch::Block(body)) => terminates(body),
            Some(ElseBranch::If(inner)) => if_terminates(inner),
        }
}

/// Whether `body` holds a `break` that leaves the loop labeled `label`.
/// `nested` is set inside inner loops, where unlabeled breaks stop.
fn breaks_to(body: &[Stmt], label: Option<TokenId>, nested: bool) -> bool {
    body.iter().any(|s| match &s.kind {
        StmtKind::Jump {
            keyword: Key::BREAK,
            label: target,
        } => match target {
            None => !nested,
            Some(target) => Some(*target) == label,
        },
        StmtKind::If(i) => if_breaks_to(i, label, nested),
        StmtKind::While(w) => breaks_to(&w.body, label, true),
        _ => false,
    })
}

fn if_breaks_to(i: &If, label: Option<TokenId>, nested: bool) -> bool {
    breaks_to(&i.then_body, label, nested)
        || match &i.else_body {
            None => false,
            Some(ElseBranch::Block(body)) => breaks_to(body, label, nested),
            Some(ElseBranch::If(inner)) => if_breaks_to(inner, label, nested),
        }
}

/// The receiver of a method call, unless the callee is a package member.
fn receiver_of<'e>(fc: &FuncChecker<'_>, callee: &'e Expr) -> Option<&'e Expr> {
    match callee {
        Expr::Select { base, .. } if fc.typer().package(base).is_none() => Some(base.as_ref()),
        _ => None,
    }
}

impl<'a> FuncChecker<'a> {
    pub fn bcheck_block(&mut self, body: &'a [Stmt]) -> Result<(), CheckError> {
        for stmt in body {
            self.bcheck_stmt(stmt)?;
        }
        Ok(())
    }

    fn bcheck_stmt(&mut self, stmt: &'a Stmt) -> Result<(), CheckError> {
        self.line = stmt.line;
        trace!(line = stmt.line, facts = %self.facts.display(self.map), "bcheck statement");
        match &stmt.kind {
            StmtKind::Assert(a) => self.bcheck_assert(a),
            StmtKind::Assign { lhs, op, rhs } => self.bcheck_assignment(lhs, *op, rhs),
            StmtKind::Expr(expr) => {
                self.bcheck_expr(expr, 0)?;
                self.after_call(expr);
                Ok(())
            }
            StmtKind::If(i) => self.bcheck_if(i),
            StmtKind::Jump { keyword, label } => self.bcheck_jump(*keyword, *label),
            StmtKind::Return(value) => self.bcheck_return(value.as_ref()),
            StmtKind::Var { name, value, .. } => {
                let lhs = Expr::Ident(*name);
                match value {
                    Some(value) => self.bcheck_assignment(&lhs, Key::EQ, value),
                    None if self.locals.get(name).is_some_and(Typ::is_num) => {
                        self.bcheck_assignment(&lhs, Key::EQ, &Expr::zero())
                    }
                    None => {
                        self.facts.retain_unmentioned(&lhs);
                        Ok(())
                    }
                }
            }
            StmtKind::While(w) => self.bcheck_while(w),
        }
    }

    /// Prove an assert, then keep its condition as a fact.
    fn bcheck_assert(&mut self, a: &Assert) -> Result<(), CheckError> {
        self.prove_assert(a)?;
        self.facts.append(simplify(self.map, &a.condition));
        Ok(())
    }

    fn prove_assert(&mut self, a: &Assert) -> Result<(), CheckError> {
        self.line = a.line;
        let cond = &a.condition;
        self.bcheck_expr(cond, 0)?;
        let Some(reason) = a.reason else {
            return self.require(cond);
        };

        let name = unescape(self.map.by_id(reason)).unwrap_or_default();
        let rules = self.rules;
        let Some(rule) = rules.get(name) else {
            return Err(self.invalid(format!("no such reason {name:?}")));
        };
        for arg in &a.args {
            self.bcheck_expr(&arg.value, 0)?;
        }
        let outcome = rule.apply(cond, &a.args, |h| Ok::<_, CheckError>(self.prove(h)))?;
        let detail = match outcome {
            RuleOutcome::Proven => return Ok(()),
            RuleOutcome::NoMatch => format!("it does not match the conclusion of {name:?}"),
            RuleOutcome::MissingArg(p) => {
                format!("{name:?} needs an argument {:?}", self.map.by_id(p))
            }
            RuleOutcome::Unmet(h) => {
                format!("{name:?} requires {:?}", h.str(self.map))
            }
        };
        Err(self.unproven(cond, Some(detail)))
    }

    fn bcheck_assignment(&mut self, lhs: &Expr, op: Key, rhs: &Expr) -> Result<(), CheckError> {
        let lhs_typ = self.ty(lhs)?;
        if op == Key::EQ {
            self.bcheck_expr(lhs, 0)?;
            self.fits(rhs, &lhs_typ, 0)?;
            self.forget(lhs);
            self.after_call(rhs);
            if rhs.is_pure() && lhs_typ.is_num() && !rhs.mentions(lhs) {
                self.facts
                    .append(Expr::binary(Key::EQ_EQ, lhs.clone(), rhs.clone()));
            }
            return Ok(());
        }

        let bop = op.assign_binary_form();
        let l = self.bcheck_expr(lhs, 0)?;
        let r = self.bcheck_expr(rhs, 0)?;
        let combined = Expr::binary(bop, lhs.clone(), rhs.clone());
        let range = self.binary_range(&combined, l, r)?;
        if let Some(within) = lhs_typ.bounds() {
            if !range.is_subset_of(within) {
                let text = format!(
                    "{} {} {}",
                    lhs.str(self.map),
                    self.map.by_key(op),
                    rhs.str(self.map)
                );
                return Err(self.out_of_bounds(text, range, within));
            }
        }

        if matches!(bop, Key::X_BINARY_PLUS | Key::X_BINARY_MINUS)
            && rhs.is_pure()
            && !rhs.mentions(lhs)
        {
            let map = self.map;
            self.facts.update(|x| {
                if !x.mentions(lhs) {
                    return Some(x.clone());
                }
                let (fop, other) = other_hand_side(x, lhs)?;
                if other.mentions(lhs) {
                    return None;
                }
                let shifted = simplify(map, &Expr::binary(bop, other.clone(), rhs.clone()));
                Some(Expr::binary(fop, lhs.clone(), shifted))
            });
        } else {
            self.forget(lhs);
        }
        self.after_call(rhs);
        Ok(())
    }

    /// Drop the facts an assignment to `lhs` may invalidate. Writing one
    /// element of a slice or array forgets everything about its base.
    fn forget(&mut self, lhs: &Expr) {
        match lhs {
            Expr::Index { base, .. } => self.facts.retain_unmentioned(base),
            _ => self.facts.retain_unmentioned(lhs),
        }
    }

    /// After a call statement: forget what an effectful callee may have
    /// changed, then assume its postconditions.
    fn after_call(&mut self, expr: &Expr) {
        let Expr::Call {
            callee,
            effect,
            args,
        } = expr
        else {
            return;
        };
        let receiver = receiver_of(self, callee);
        if !expr.is_pure() {
            self.facts
                .retain_unmentioned(&Expr::Ident(TokenId::built_in(Key::THIS)));
            if let Some(receiver) = receiver {
                self.facts.retain_unmentioned(receiver);
            }
        }
        let Ok(Typ::Func(Callee::User(key))) = self.ty(callee) else {
            return;
        };
        let env = self.env;
        let Some(info) = env.funcs.get(&key) else {
            return;
        };
        for post in &info.post {
            let mentions_output = info
                .outputs
                .iter()
                .any(|(name, _)| post.mentions(&Expr::Ident(*name)));
            if !mentions_output {
                self.facts
                    .append(contract_instance(post, info, receiver, args));
            }
        }
        trace!(callee = %key.str(self.map), ?effect, "assumed postconditions");
    }

    fn bcheck_if(&mut self, i: &'a If) -> Result<(), CheckError> {
        self.line = i.line;
        let cond = &i.condition;
        self.bcheck_expr(cond, 0)?;
        let before = self.facts.clone();
        let mut arms = Vec::with_capacity(2);

        if cond.is_pure() {
            self.facts.append(cond.clone());
        }
        self.bcheck_block(&i.then_body)?;
        if !terminates(&i.then_body) {
            arms.push(std::mem::take(&mut self.facts));
        }

        self.facts = before;
        if cond.is_pure() {
            self.facts.append(invert(cond));
        }
        match &i.else_body {
            None => arms.push(self.facts.clone()),
            Some(ElseBranch::Block(body)) => {
                self.bcheck_block(body)?;
                if !terminates(body) {
                    arms.push(self.facts.clone());
                }
            }
            Some(ElseBranch::If(inner)) => {
                self.bcheck_if(inner)?;
                if !if_terminates(inner) {
                    arms.push(self.facts.clone());
                }
            }
        }
        self.facts = FactSet::intersect(&arms);
        Ok(())
    }

    /// The conditions of a loop's asserts with the given keywords, as facts.
    fn loop_facts(&self, w: &While, keywords: &[Key]) -> FactSet {
        let mut facts = FactSet::new();
        for a in w.asserts.iter().filter(|a| keywords.contains(&a.keyword)) {
            facts.append(simplify(self.map, &a.condition));
        }
        facts
    }

    /// Prove again the loop asserts with the given keywords.
    fn recheck(&mut self, w: &While, keywords: &[Key]) -> Result<(), CheckError> {
        let line = self.line;
        for a in w.asserts.iter().filter(|a| keywords.contains(&a.keyword)) {
            self.prove_assert(a)?;
        }
        self.line = line;
        Ok(())
    }

    fn bcheck_while(&mut self, w: &'a While) -> Result<(), CheckError> {
        for a in w.asserts_of(Key::PRE).chain(w.asserts_of(Key::INV)) {
            self.bcheck_assert(a)?;
        }
        let cond = &w.condition;
        self.bcheck_expr(cond, 0)?;
        let entry = self.loop_facts(w, &[Key::PRE, Key::INV]);
        let value = self.const_value(cond);

        if value != Some(1) {
            self.facts = entry.clone();
            if cond.is_pure() {
                self.facts.append(invert(cond));
            }
            for a in w.asserts_of(Key::POST) {
                self.bcheck_assert(a)?;
            }
        }

        if value != Some(0) {
            self.facts = entry;
            if cond.is_pure() {
                self.facts.append(cond.clone());
            }
            self.loops.push(w);
            self.bcheck_block(&w.body)?;
            if !terminates(&w.body) {
                self.recheck(w, &[Key::PRE, Key::INV])?;
            }
            self.loops.pop();
        }

        self.facts = self.loop_facts(w, &[Key::INV, Key::POST]);
        Ok(())
    }

    fn bcheck_jump(&mut self, keyword: Key, label: Option<TokenId>) -> Result<(), CheckError> {
        let target = match label {
            None => self.loops.last().copied(),
            Some(label) => self.loops.iter().rev().copied().find(|w| w.label == Some(label)),
        };
        let Some(target) = target else {
            return Err(self.invalid(format!(
                "no loop for {}",
                self.map.by_key(keyword)
            )));
        };
        if keyword == Key::BREAK {
            self.recheck(target, &[Key::INV, Key::POST])?;
        } else {
            self.recheck(target, &[Key::PRE, Key::INV])?;
        }
        self.facts.clear();
        Ok(())
    }

    fn bcheck_return(&mut self, value: Option<&Expr>) -> Result<(), CheckError> {
        let info = self.info;
        if let Some(value) = value {
            match &info.ret {
                Some(ret) => {
                    self.fits(value, ret, 0)?;
                }
                None => {
                    self.bcheck_expr(value, 0)?;
                }
            }
        }
        self.prove_posts()?;
        self.facts.clear();
        Ok(())
    }

    /// Prove the function's postconditions at an exit.
    pub fn prove_posts(&mut self) -> Result<(), CheckError> {
        let info = self.info;
        for post in &info.post {
            if !self.prove(post) {
                return Err(self.unproven(post, Some("postcondition".to_owned())));
            }
        }
        Ok(())
    }
}
