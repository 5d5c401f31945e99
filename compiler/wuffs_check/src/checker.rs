//! Package-level checking.
//!
//! A package is checked in phases, each seeing the declarations the earlier
//! ones collected: package id, uses, statuses, consts, structs, function
//! signatures, and finally function bodies. The first error stops the check.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use wuffs_ir::ast::{Decl, DeclKind, Effect, Expr, Field, File, Func};
use wuffs_ir::token::unescape;
use wuffs_ir::{base38, Interval, Key, QId, TokenId, TokenMap};

use crate::env::{ConstInfo, Env, FuncInfo, Origin, StructInfo};
use crate::func::{check_func, Context};
use crate::rules::RuleBook;
use crate::typ::{FuncKey, Typ};
use crate::CheckError;

/// Public surface stubs of used packages, keyed by `use` path.
pub type Dependencies = FxHashMap<String, File>;

/// A package that passed every check.
#[derive(Debug)]
pub struct Package {
    pub files: Vec<File>,
    /// The `packageid` string and its base-38 value.
    pub package_id: Option<(String, u32)>,
    /// The `use` paths, in declaration order.
    pub uses: Vec<String>,
}

/// Checks packages against a shared proof rule table.
pub struct Checker<'m> {
    map: &'m TokenMap,
    rules: RuleBook,
}

impl<'m> Checker<'m> {
    pub fn new(map: &'m TokenMap) -> Result<Self, CheckError> {
        Ok(Checker {
            map,
            rules: RuleBook::new(map)?,
        })
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Check the files of one package. `deps` must hold a stub for every
    /// path the package uses.
    pub fn check(&self, files: Vec<File>, deps: &Dependencies) -> Result<Package, CheckError> {
        debug!(files = files.len(), "checking package");
        let mut pc = PackageChecker {
            map: self.map,
            env: Env::default(),
            uses: Vec::new(),
        };
        let package_id = pc.check_package_id(&files)?;
        pc.check_uses(&files, deps)?;
        pc.check_statuses(&files)?;
        pc.check_consts(&files)?;
        pc.check_structs(&files)?;
        pc.check_signatures(&files)?;

        let cx = Context {
            map: self.map,
            env: &pc.env,
            rules: &self.rules,
        };
        for file in &files {
            for decl in &file.decls {
                if let DeclKind::Func(func) = &decl.kind {
                    let key = local_key(func);
                    let Some(info) = pc.env.funcs.get(&key) else {
                        continue;
                    };
                    check_func(cx, &file.filename, key, func, info, decl.line)?;
                }
            }
        }

        debug!(package = ?package_id.as_ref().map(|(name, _)| name), "package checked");
        Ok(Package {
            files,
            package_id,
            uses: pc.uses,
        })
    }
}

fn local_key(func: &Func) -> FuncKey {
    FuncKey {
        package: None,
        receiver: func.receiver,
        name: func.name,
    }
}

/// Whether `path` is a clean, relative `use` path whose elements are all
/// lowercase alphanumeric.
pub fn valid_use_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|elem| !elem.is_empty() && elem.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

struct PackageChecker<'m> {
    map: &'m TokenMap,
    env: Env,
    uses: Vec<String>,
}

/// Every declaration with the file it came from.
fn decls(files: &[File]) -> impl Iterator<Item = (&str, &Decl)> {
    files
        .iter()
        .flat_map(|f| f.decls.iter().map(move |d| (f.filename.as_str(), d)))
}

fn invalid(message: String, file: &str, line: u32) -> CheckError {
    CheckError::Invalid {
        message,
        file: file.to_owned(),
        line,
    }
}

fn duplicate(what: &'static str, name: String, file: &str, line: u32, prev: &Origin) -> CheckError {
    CheckError::Duplicate {
        what,
        name,
        file: file.to_owned(),
        line,
        other_file: prev.file.clone(),
        other_line: prev.line,
    }
}

impl PackageChecker<'_> {
    fn check_package_id(&self, files: &[File]) -> Result<Option<(String, u32)>, CheckError> {
        let mut found: Option<(String, u32, Origin)> = None;
        for (file, decl) in decls(files) {
            let DeclKind::PackageId(literal) = decl.kind else {
                continue;
            };
            let text = unescape(self.map.by_id(literal)).unwrap_or_default();
            if let Some((prev, _, origin)) = &found {
                return Err(duplicate("packageid", format!("{prev:?}"), file, decl.line, origin));
            }
            let Some(id) = base38::encode_padded(text).filter(|&id| id != 0) else {
                return Err(invalid(format!("invalid packageid {text:?}"), file, decl.line));
            };
            found = Some((text.to_owned(), id, Origin::new(file, decl.line)));
        }

        if found.is_none() {
            let public = decls(files).find(|(_, d)| d.visibility().is_some_and(|v| v.is_public()));
            if let Some((file, decl)) = public {
                return Err(invalid(
                    "missing packageid for a package with public declarations".to_owned(),
                    file,
                    decl.line,
                ));
            }
        }
        Ok(found.map(|(name, id, _)| (name, id)))
    }

    fn check_uses(&mut self, files: &[File], deps: &Dependencies) -> Result<(), CheckError> {
        let mut seen: FxHashMap<&str, Origin> = FxHashMap::default();
        for (file, decl) in decls(files) {
            let DeclKind::Use { path } = decl.kind else {
                continue;
            };
            let text = unescape(self.map.by_id(path)).unwrap_or_default();
            if !valid_use_path(text) {
                return Err(invalid(format!("invalid use path {text:?}"), file, decl.line));
            }
            let name = text.rsplit('/').next().unwrap_or(text);
            if let Some(prev) = seen.get(name) {
                return Err(duplicate("use", format!("{text:?}"), file, decl.line, prev));
            }
            seen.insert(name, Origin::new(file, decl.line));

            let Some(stub) = deps.get(text) else {
                return Err(invalid(format!("no stub for used package {text:?}"), file, decl.line));
            };
            let package = self
                .map
                .insert(name)
                .map_err(|e| invalid(e.to_string(), file, decl.line))?;
            if !package.is_ident() || package.key().is_built_in() {
                return Err(invalid(format!("package name {name:?} is reserved"), file, decl.line));
            }
            debug!(path = text, "importing package stub");
            self.env.packages.insert(package);
            self.import(package, stub);
            self.uses.push(text.to_owned());
        }
        Ok(())
    }

    /// Bring the public declarations of a used package into scope, qualified
    /// by `package`. Declarations that cannot be resolved, such as those
    /// naming types from the stub's own dependencies, are skipped.
    fn import(&mut self, package: TokenId, stub: &File) {
        let home = Some(package);
        let public = stub
            .decls
            .iter()
            .filter(|d| d.visibility().is_some_and(|v| v.is_public()));

        for decl in public.clone() {
            let origin = Origin::new(&stub.filename, decl.line);
            match &decl.kind {
                DeclKind::Status { literal, .. } => {
                    self.env.statuses.insert(QId::new(home, *literal), origin);
                }
                DeclKind::Struct {
                    name, suspendible, ..
                } => {
                    self.env.structs.insert(
                        QId::new(home, *name),
                        StructInfo {
                            suspendible: *suspendible,
                            fields: Vec::new(),
                            origin,
                        },
                    );
                }
                _ => {}
            }
        }

        for decl in public {
            let origin = Origin::new(&stub.filename, decl.line);
            match &decl.kind {
                DeclKind::Const { name, ty, value, .. } => {
                    let Ok(typ) = self.env.resolve_type(self.map, ty, home) else {
                        debug!(name = self.map.by_id(*name), "skipping unresolvable const");
                        continue;
                    };
                    let value = self.env.const_value(self.map, value, home);
                    self.env.consts.insert(
                        QId::new(home, *name),
                        ConstInfo {
                            ty: typ,
                            value,
                            origin,
                        },
                    );
                }
                DeclKind::Struct { name, fields, .. } => {
                    let resolved: Result<Vec<_>, String> = fields
                        .iter()
                        .map(|f| Ok((f.name, self.env.resolve_type(self.map, &f.ty, home)?)))
                        .collect();
                    if let (Ok(resolved), Some(info)) =
                        (resolved, self.env.structs.get_mut(&QId::new(home, *name)))
                    {
                        info.fields = resolved;
                    }
                }
                DeclKind::Func(func) => {
                    let key = FuncKey {
                        package: home,
                        receiver: func.receiver,
                        name: func.name,
                    };
                    match self.signature(func, home, origin) {
                        Ok(info) => {
                            self.env.funcs.insert(key, info);
                        }
                        Err(message) => {
                            debug!(func = %key.str(self.map), %message, "skipping unresolvable function");
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn check_statuses(&mut self, files: &[File]) -> Result<(), CheckError> {
        for (file, decl) in decls(files) {
            let DeclKind::Status { literal, .. } = decl.kind else {
                continue;
            };
            let qid = QId::new(None, literal);
            if let Some(prev) = self.env.statuses.get(&qid) {
                let name = self.map.by_id(literal).to_owned();
                return Err(duplicate("status", name, file, decl.line, prev));
            }
            self.env.statuses.insert(qid, Origin::new(file, decl.line));
        }
        Ok(())
    }

    fn check_consts(&mut self, files: &[File]) -> Result<(), CheckError> {
        for (file, decl) in decls(files) {
            let DeclKind::Const { name, ty, value, .. } = &decl.kind else {
                continue;
            };
            let qid = QId::new(None, *name);
            let text = self.map.by_id(*name);
            if let Some(prev) = self.env.consts.get(&qid) {
                return Err(duplicate("const", text.to_owned(), file, decl.line, &prev.origin));
            }
            let typ = self
                .env
                .resolve_type(self.map, ty, None)
                .map_err(|m| invalid(m, file, decl.line))?;
            let value = match &typ {
                Typ::Num { .. } | Typ::Bool => Some(self.const_in_bounds(value, &typ, file, decl.line)?),
                Typ::Array { .. } => {
                    self.check_const_list(value, &typ, file, decl.line)?;
                    None
                }
                _ => {
                    return Err(invalid(
                        format!("const {text} has type {}, which is not numeric", typ.str(self.map)),
                        file,
                        decl.line,
                    ))
                }
            };
            self.env.consts.insert(
                qid,
                ConstInfo {
                    ty: typ,
                    value,
                    origin: Origin::new(file, decl.line),
                },
            );
        }
        Ok(())
    }

    fn const_in_bounds(&self, value: &Expr, typ: &Typ, file: &str, line: u32) -> Result<i128, CheckError> {
        let Some(v) = self.env.const_value(self.map, value, None) else {
            return Err(invalid(
                format!("const value {:?} is not constant", value.str(self.map)),
                file,
                line,
            ));
        };
        if let Some(within) = typ.bounds() {
            if !within.contains(v) {
                return Err(CheckError::OutOfBounds {
                    expr: value.str(self.map),
                    bounds: Interval::point(v),
                    within,
                    file: file.to_owned(),
                    line,
                    facts: Vec::new(),
                });
            }
        }
        Ok(v)
    }

    /// An array const is a list literal with one constant per element.
    fn check_const_list(&self, value: &Expr, typ: &Typ, file: &str, line: u32) -> Result<(), CheckError> {
        let Typ::Array { len, elem } = typ else {
            self.const_in_bounds(value, typ, file, line)?;
            return Ok(());
        };
        let Expr::List(elems) = value else {
            return Err(invalid(
                format!("array const value {:?} is not a list", value.str(self.map)),
                file,
                line,
            ));
        };
        if i128::try_from(elems.len()).ok() != Some(*len) {
            return Err(invalid(
                format!("array const has {} elements, its type {} needs {len}", elems.len(), typ.str(self.map)),
                file,
                line,
            ));
        }
        for e in elems {
            self.check_const_list(e, elem, file, line)?;
        }
        Ok(())
    }

    fn check_structs(&mut self, files: &[File]) -> Result<(), CheckError> {
        for (file, decl) in decls(files) {
            let DeclKind::Struct {
                name, suspendible, ..
            } = &decl.kind
            else {
                continue;
            };
            let qid = QId::new(None, *name);
            if let Some(prev) = self.env.structs.get(&qid) {
                let text = self.map.by_id(*name).to_owned();
                return Err(duplicate("struct", text, file, decl.line, &prev.origin));
            }
            self.env.structs.insert(
                qid,
                StructInfo {
                    suspendible: *suspendible,
                    fields: Vec::new(),
                    origin: Origin::new(file, decl.line),
                },
            );
        }

        let mut order = Vec::new();
        for (file, decl) in decls(files) {
            let DeclKind::Struct { name, fields, .. } = &decl.kind else {
                continue;
            };
            let resolved = self.struct_fields(*name, fields, file)?;
            if let Some(info) = self.env.structs.get_mut(&QId::new(None, *name)) {
                info.fields = resolved;
            }
            order.push((*name, file, decl.line));
        }
        self.check_struct_cycles(&order)
    }

    fn struct_fields(&self, name: TokenId, fields: &[Field], file: &str) -> Result<Vec<(TokenId, Typ)>, CheckError> {
        let mut resolved: Vec<(TokenId, Typ)> = Vec::with_capacity(fields.len());
        for field in fields {
            let fname = self.map.by_id(field.name);
            if resolved.iter().any(|(n, _)| *n == field.name) {
                return Err(invalid(
                    format!("duplicate field {fname:?} in struct {}", self.map.by_id(name)),
                    file,
                    field.line,
                ));
            }
            let typ = self
                .env
                .resolve_type(self.map, &field.ty, None)
                .map_err(|m| invalid(m, file, field.line))?;
            if typ.has_pointers() {
                return Err(invalid(
                    format!("field {fname:?} of type {} may not hold a pointer", typ.str(self.map)),
                    file,
                    field.line,
                ));
            }
            resolved.push((field.name, typ));
        }
        Ok(resolved)
    }

    /// Reject a struct that contains itself by value, directly or not.
    fn check_struct_cycles(&self, order: &[(TokenId, &str, u32)]) -> Result<(), CheckError> {
        let mut done: FxHashSet<TokenId> = FxHashSet::default();
        for &(name, file, line) in order {
            let mut active = FxHashSet::default();
            if self.contains_cycle(name, &mut active, &mut done) {
                return Err(invalid(
                    format!("cyclical struct definitions involving {}", self.map.by_id(name)),
                    file,
                    line,
                ));
            }
        }
        Ok(())
    }

    fn contains_cycle(&self, name: TokenId, active: &mut FxHashSet<TokenId>, done: &mut FxHashSet<TokenId>) -> bool {
        if done.contains(&name) {
            return false;
        }
        if !active.insert(name) {
            return true;
        }
        if let Some(info) = self.env.structs.get(&QId::new(None, name)) {
            for (_, typ) in &info.fields {
                let mut inner = typ;
                while let Typ::Array { elem, .. } = inner {
                    inner = elem;
                }
                if let Typ::Struct(QId { package: None, name: field_struct }) = inner {
                    if self.contains_cycle(*field_struct, active, done) {
                        return true;
                    }
                }
            }
        }
        active.remove(&name);
        done.insert(name);
        false
    }

    fn check_signatures(&mut self, files: &[File]) -> Result<(), CheckError> {
        for (file, decl) in decls(files) {
            let DeclKind::Func(func) = &decl.kind else {
                continue;
            };
            let key = local_key(func);
            if let Some(prev) = self.env.funcs.get(&key) {
                return Err(duplicate("function", key.str(self.map), file, decl.line, &prev.origin));
            }
            if let Some(receiver) = func.receiver {
                let Some(recv) = self.env.structs.get(&QId::new(None, receiver)) else {
                    return Err(invalid(
                        format!("receiver of {} is not a struct of this package", key.str(self.map)),
                        file,
                        decl.line,
                    ));
                };
                if func.effect == Effect::Suspendible && !recv.suspendible {
                    return Err(invalid(
                        format!(
                            "suspendible method {} needs a suspendible receiver {}?",
                            key.str(self.map),
                            self.map.by_id(receiver)
                        ),
                        file,
                        decl.line,
                    ));
                }
                if recv.fields.iter().any(|(n, _)| *n == func.name) {
                    return Err(invalid(
                        format!("method {} has the same name as a field", key.str(self.map)),
                        file,
                        decl.line,
                    ));
                }
            }
            let info = self
                .signature(func, None, Origin::new(file, decl.line))
                .map_err(|m| invalid(m, file, decl.line))?;
            self.env.funcs.insert(key, info);
        }
        Ok(())
    }

    /// Resolve a function's parameters, return type and contract.
    fn signature(&self, func: &Func, home: Option<TokenId>, origin: Origin) -> Result<FuncInfo, String> {
        let mut names: FxHashSet<TokenId> = FxHashSet::default();
        let mut params = |fields: &[Field]| -> Result<Vec<(TokenId, Typ)>, String> {
            fields
                .iter()
                .map(|f| {
                    if !names.insert(f.name) {
                        return Err(format!("duplicate parameter {:?}", self.map.by_id(f.name)));
                    }
                    Ok((f.name, self.env.resolve_type(self.map, &f.ty, home)?))
                })
                .collect()
        };
        let inputs = params(&func.inputs)?;
        let outputs = params(func.outputs.as_deref().unwrap_or_default())?;
        let ret = func
            .ret
            .as_ref()
            .map(|t| self.env.resolve_type(self.map, t, home))
            .transpose()?;
        let contract = |keyword: Key| -> Vec<Expr> {
            func.asserts
                .iter()
                .filter(|a| a.keyword == keyword)
                .map(|a| a.condition.clone())
                .collect()
        };
        Ok(FuncInfo {
            effect: func.effect,
            inputs,
            outputs,
            ret,
            pre: contract(Key::PRE),
            post: contract(Key::POST),
            origin,
        })
    }
}
