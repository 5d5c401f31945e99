//! Declarations visible while checking one package.
//!
//! Names declared by the package itself are stored with no package
//! qualifier. Names imported from a used package are qualified by that
//! package's name, the last element of its `use` path.

use rustc_hash::{FxHashMap, FxHashSet};
use wuffs_ir::ast::{Effect, Expr, Refinement, TypeExpr};
use wuffs_ir::{Interval, Key, QId, TokenId, TokenMap};

use crate::simplify::fold;
use crate::typ::{machine_range, FuncKey, Typ};

/// Where a declaration was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Origin {
    pub file: String,
    pub line: u32,
}

impl Origin {
    pub fn new(file: &str, line: u32) -> Self {
        Origin {
            file: file.to_owned(),
            line,
        }
    }
}

pub(crate) struct ConstInfo {
    pub ty: Typ,
    /// `None` for array constants.
    pub value: Option<i128>,
    pub origin: Origin,
}

pub(crate) struct StructInfo {
    pub suspendible: bool,
    /// Filled in once every struct name is known.
    pub fields: Vec<(TokenId, Typ)>,
    pub origin: Origin,
}

pub(crate) struct FuncInfo {
    pub effect: Effect,
    pub inputs: Vec<(TokenId, Typ)>,
    pub outputs: Vec<(TokenId, Typ)>,
    pub ret: Option<Typ>,
    /// Contract conditions, in terms of `this` and the inputs.
    pub pre: Vec<Expr>,
    pub post: Vec<Expr>,
    pub origin: Origin,
}

impl FuncInfo {
    /// The type of a call to this function.
    pub fn result(&self) -> Typ {
        match (&self.ret, self.effect) {
            (Some(ret), _) => ret.clone(),
            (None, Effect::Suspendible) => Typ::Status,
            (None, _) => Typ::Unit,
        }
    }
}

#[derive(Default)]
pub(crate) struct Env {
    pub consts: FxHashMap<QId, ConstInfo>,
    pub statuses: FxHashMap<QId, Origin>,
    pub structs: FxHashMap<QId, StructInfo>,
    pub funcs: FxHashMap<FuncKey, FuncInfo>,
    /// Names of the used packages.
    pub packages: FxHashSet<TokenId>,
}

impl Env {
    /// The value of a constant expression. `home` qualifies bare names.
    pub fn const_value(&self, map: &TokenMap, expr: &Expr, home: Option<TokenId>) -> Option<i128> {
        fold(map, expr, &|leaf| self.const_leaf(leaf, home))
    }

    /// The value of a named constant, `NAME` or `pkg.NAME`.
    pub fn const_leaf(&self, expr: &Expr, home: Option<TokenId>) -> Option<i128> {
        let qid = match expr {
            Expr::Ident(name) => QId::new(home, *name),
            Expr::Select { base, field } => {
                let package = base.as_ident().filter(|p| self.packages.contains(p))?;
                QId::new(Some(package), *field)
            }
            _ => return None,
        };
        self.consts.get(&qid).and_then(|c| c.value)
    }

    /// Resolve a type expression. Bare struct names are looked up in `home`.
    pub fn resolve_type(
        &self,
        map: &TokenMap,
        ty: &TypeExpr,
        home: Option<TokenId>,
    ) -> Result<Typ, String> {
        let wrap = |inner: &TypeExpr| self.resolve_type(map, inner, home).map(Box::new);
        match ty {
            TypeExpr::Named {
                package,
                name,
                refinement,
            } => {
                let typ = self.resolve_name(map, ty, *package, *name, home)?;
                match refinement {
                    Some(r) => self.refine(map, ty, typ, r, home),
                    None => Ok(typ),
                }
            }
            TypeExpr::Array { len, elem } => {
                let Some(n) = self.const_value(map, len, home) else {
                    return Err(format!(
                        "array length {:?} is not a constant",
                        len.str(map)
                    ));
                };
                if n <= 0 {
                    return Err(format!("array length {n} is not positive"));
                }
                Ok(Typ::Array {
                    len: n,
                    elem: wrap(elem)?,
                })
            }
            TypeExpr::Slice(elem) => Ok(Typ::Slice(wrap(elem)?)),
            TypeExpr::Table(elem) => Ok(Typ::Table(wrap(elem)?)),
            TypeExpr::Ptr(elem) => Ok(Typ::Ptr(wrap(elem)?)),
            TypeExpr::Nptr(elem) => Ok(Typ::Nptr(wrap(elem)?)),
        }
    }

    fn resolve_name(
        &self,
        map: &TokenMap,
        ty: &TypeExpr,
        package: Option<TokenId>,
        name: TokenId,
        home: Option<TokenId>,
    ) -> Result<Typ, String> {
        let in_base = package.map_or(true, |p| p.key() == Key::BASE);
        if in_base {
            let builtin = match name.key() {
                Key::BOOL => Some(Typ::Bool),
                Key::STATUS => Some(Typ::Status),
                Key::IO_READER => Some(Typ::IoReader),
                Key::IO_WRITER => Some(Typ::IoWriter),
                key => Typ::num(key),
            };
            if let Some(typ) = builtin {
                return Ok(typ);
            }
        }

        let owner = match package {
            Some(p) if p.key() == Key::BASE => {
                return Err(format!("unknown type {:?}", ty.str(map)));
            }
            Some(p) if !self.packages.contains(&p) => {
                return Err(format!(
                    "unknown package {:?} in type {:?}",
                    map.by_id(p),
                    ty.str(map)
                ));
            }
            Some(p) => Some(p),
            None => home,
        };
        let qid = QId::new(owner, name);
        if self.structs.contains_key(&qid) {
            Ok(Typ::Struct(qid))
        } else {
            Err(format!("unknown type {:?}", ty.str(map)))
        }
    }

    fn refine(
        &self,
        map: &TokenMap,
        ty: &TypeExpr,
        typ: Typ,
        refinement: &Refinement,
        home: Option<TokenId>,
    ) -> Result<Typ, String> {
        let Typ::Num { key, range } = typ else {
            return Err(format!(
                "cannot refine non-numeric type {:?}",
                ty.str(map)
            ));
        };
        let bound = |e: &Option<Expr>| -> Result<Option<i128>, String> {
            match e {
                None => Ok(None),
                Some(e) => self
                    .const_value(map, e, home)
                    .map(Some)
                    .ok_or_else(|| format!("type refinement {:?} is not a constant", e.str(map))),
            }
        };
        let refined = Interval {
            lo: bound(&refinement.min)?.or(range.lo),
            hi: bound(&refinement.max)?.or(range.hi),
        };
        let machine = machine_range(key).unwrap_or(range);
        if refined.is_empty() || !refined.is_subset_of(machine) {
            return Err(format!(
                "type refinement {refined} for {:?} is out of bounds",
                ty.str(map)
            ));
        }
        Ok(Typ::Num {
            key,
            range: refined,
        })
    }
}
