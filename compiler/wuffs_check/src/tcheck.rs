//! Type checking of statements.

use wuffs_ir::ast::{Assert, Effect, ElseBranch, Expr, If, Stmt, StmtKind};
use wuffs_ir::token::unescape;
use wuffs_ir::{Key, TokenId};

use crate::func::FuncChecker;
use crate::typ::Typ;
use crate::CheckError;

fn has_call(expr: &Expr) -> bool {
    expr.any(&mut |e| matches!(e, Expr::Call { .. }))
}

impl<'a> FuncChecker<'a> {
    /// Declare every `var` in `body`, nested blocks included. Locals are
    /// function-scoped, so a name may be declared only once per function.
    pub fn hoist_vars(&mut self, body: &[Stmt]) -> Result<(), CheckError> {
        for stmt in body {
            self.line = stmt.line;
            match &stmt.kind {
                StmtKind::Var { name, ty, .. } => {
                    let typ = self
                        .env
                        .resolve_type(self.map, ty, None)
                        .map_err(|m| self.invalid(m))?;
                    self.declare(*name, typ)?;
                }
                StmtKind::If(i) => self.hoist_if(i)?,
                StmtKind::While(w) => self.hoist_vars(&w.body)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn hoist_if(&mut self, i: &If) -> Result<(), CheckError> {
        self.hoist_vars(&i.then_body)?;
        match &i.else_body {
            None => Ok(()),
            Some(ElseBranch::Block(body)) => self.hoist_vars(body),
            Some(ElseBranch::If(inner)) => self.hoist_if(inner),
        }
    }

    pub fn tcheck_block(&mut self, body: &'a [Stmt]) -> Result<(), CheckError> {
        for stmt in body {
            self.tcheck_stmt(stmt)?;
        }
        Ok(())
    }

    fn tcheck_stmt(&mut self, stmt: &'a Stmt) -> Result<(), CheckError> {
        self.line = stmt.line;
        match &stmt.kind {
            StmtKind::Assert(a) => self.tcheck_assert(a),
            StmtKind::Assign { lhs, op, rhs } => self.tcheck_assignment(lhs, *op, rhs),
            StmtKind::Expr(expr) => {
                if !matches!(expr, Expr::Call { .. }) {
                    return Err(self.invalid(format!(
                        "expression statement {:?} is not a call",
                        expr.str(self.map)
                    )));
                }
                self.ty(expr)?;
                Ok(())
            }
            StmtKind::If(i) => self.tcheck_if(i),
            StmtKind::Jump { keyword, label } => {
                let found = match label {
                    None => !self.loops.is_empty(),
                    Some(label) => self.loops.iter().any(|w| w.label == Some(*label)),
                };
                if found {
                    Ok(())
                } else {
                    Err(self.invalid(self.jump_message(*keyword, *label)))
                }
            }
            StmtKind::Return(value) => self.tcheck_return(value.as_ref()),
            StmtKind::Var { name, value, .. } => {
                let Some(value) = value else {
                    return Ok(());
                };
                let Some(typ) = self.locals.get(name).cloned() else {
                    return Err(self.invalid(format!(
                        "variable {:?} was not declared",
                        self.map.by_id(*name)
                    )));
                };
                self.tcheck_store(&Expr::Ident(*name), &typ, value)
            }
            StmtKind::While(w) => {
                if let Some(label) = w.label {
                    if self.loops.iter().any(|outer| outer.label == Some(label)) {
                        return Err(self.invalid(format!(
                            "duplicate loop label {:?}",
                            self.map.by_id(label)
                        )));
                    }
                }
                self.tcheck_condition(&w.condition, "while")?;
                for a in &w.asserts {
                    self.tcheck_assert(a)?;
                }
                self.loops.push(w);
                self.tcheck_block(&w.body)?;
                self.loops.pop();
                Ok(())
            }
        }
    }

    fn jump_message(&self, keyword: Key, label: Option<TokenId>) -> String {
        match label {
            None => format!("{} outside a loop", self.map.by_key(keyword)),
            Some(label) => format!(
                "{}:{} names no enclosing loop",
                self.map.by_key(keyword),
                self.map.by_id(label)
            ),
        }
    }

    /// `if`, `while` and assert conditions are pure booleans.
    fn tcheck_condition(&self, cond: &Expr, what: &str) -> Result<(), CheckError> {
        let typ = self.ty(cond)?;
        if !typ.is_bool() {
            return Err(self.invalid(format!(
                "{what} condition {:?} has type {}, not base.bool",
                cond.str(self.map),
                typ.str(self.map)
            )));
        }
        if !cond.is_pure() {
            return Err(self.invalid(format!(
                "{what} condition {:?} is not pure",
                cond.str(self.map)
            )));
        }
        Ok(())
    }

    pub fn tcheck_assert(&mut self, a: &Assert) -> Result<(), CheckError> {
        self.line = a.line;
        self.tcheck_condition(&a.condition, self.map.by_key(a.keyword))?;
        if let Some(reason) = a.reason {
            let name = unescape(self.map.by_id(reason)).unwrap_or_default();
            if self.rules.get(name).is_none() {
                return Err(self.invalid(format!("no such reason {name:?}")));
            }
        }
        for arg in &a.args {
            self.ty(&arg.value)?;
        }
        Ok(())
    }

    fn tcheck_if(&mut self, i: &'a If) -> Result<(), CheckError> {
        self.line = i.line;
        self.tcheck_condition(&i.condition, "if")?;
        self.tcheck_block(&i.then_body)?;
        match &i.else_body {
            None => Ok(()),
            Some(ElseBranch::Block(body)) => self.tcheck_block(body),
            Some(ElseBranch::If(inner)) => self.tcheck_if(inner),
        }
    }

    fn tcheck_assignment(&mut self, lhs: &Expr, op: Key, rhs: &Expr) -> Result<(), CheckError> {
        self.check_assignable(lhs)?;
        let typ = self.ty(lhs)?;
        if op == Key::EQ {
            return self.tcheck_store(lhs, &typ, rhs);
        }
        let combined = Expr::binary(op.assign_binary_form(), lhs.clone(), rhs.clone());
        let result = self.ty(&combined)?;
        if !typ.accepts(&result) {
            return Err(self.invalid(format!(
                "cannot apply {} to {:?} of type {}",
                self.map.by_key(op),
                lhs.str(self.map),
                typ.str(self.map)
            )));
        }
        Ok(())
    }

    /// `value` may be stored in `dst`, a slot of type `typ`.
    fn tcheck_store(&self, dst: &Expr, typ: &Typ, value: &Expr) -> Result<(), CheckError> {
        let vtyp = self.ty(value)?;
        if typ.accepts(&vtyp) {
            return Ok(());
        }
        Err(self.invalid(format!(
            "cannot assign {:?} of type {} to {:?} of type {}",
            value.str(self.map),
            vtyp.str(self.map),
            dst.str(self.map),
            typ.str(self.map)
        )))
    }

    /// Only locals, and fields and elements reached through them, may be
    /// assigned. `this` and the inputs are read-only bindings.
    fn check_assignable(&self, lhs: &Expr) -> Result<(), CheckError> {
        let text = || format!("{:?}", lhs.str(self.map));
        if has_call(lhs) {
            return Err(self.invalid(format!("cannot assign to {}", text())));
        }
        match lhs {
            Expr::Ident(id) if self.readonly.contains(id) => {
                Err(self.invalid(format!("cannot assign to read-only {}", text())))
            }
            Expr::Ident(id) if !self.locals.contains_key(id) => {
                Err(self.invalid(format!("cannot assign to {}: not a local variable", text())))
            }
            Expr::Ident(_) => Ok(()),
            Expr::Select { base, .. } | Expr::Index { base, .. } => {
                if self.typer().package(base).is_some() {
                    return Err(self.invalid(format!("cannot assign to package member {}", text())));
                }
                Ok(())
            }
            _ => Err(self.invalid(format!("cannot assign to {}", text()))),
        }
    }

    fn tcheck_return(&self, value: Option<&Expr>) -> Result<(), CheckError> {
        match (&self.info.ret, value) {
            (Some(ret), Some(value)) => {
                let slot = Expr::ident(TokenId::built_in(Key::RETURN));
                self.tcheck_store(&slot, ret, value)
            }
            (Some(ret), None) => Err(self.invalid(format!(
                "missing return value of type {}",
                ret.str(self.map)
            ))),
            (None, Some(value)) if self.info.effect == Effect::Suspendible => {
                let typ = self.ty(value)?;
                if typ == Typ::Status {
                    Ok(())
                } else {
                    Err(self.invalid(format!(
                        "return value {:?} of a suspendible function must be a status, not {}",
                        value.str(self.map),
                        typ.str(self.map)
                    )))
                }
            }
            (None, Some(value)) => Err(self.invalid(format!(
                "unexpected return value {:?}",
                value.str(self.map)
            ))),
            (None, None) => Ok(()),
        }
    }
}
