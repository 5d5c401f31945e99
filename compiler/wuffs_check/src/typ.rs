//! Resolved types.
//!
//! A [`Typ`] is what a [`TypeExpr`](wuffs_ir::ast::TypeExpr) means once its
//! names are looked up and its refinement is evaluated. Numeric types carry
//! the interval their values may take: the machine range for a plain
//! `base.u32`, or the declared range for `base.u32[..= 20]`.

use wuffs_ir::{Interval, Key, QId, TokenId, TokenMap};

#[cfg(test)]
mod tests;

/// A function as named by a call: the package it lives in, its receiver
/// struct and its name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FuncKey {
    pub package: Option<TokenId>,
    pub receiver: Option<TokenId>,
    pub name: TokenId,
}

impl FuncKey {
    pub fn str(&self, map: &TokenMap) -> String {
        let mut out = String::new();
        if let Some(package) = self.package {
            out.push_str(map.by_id(package));
            out.push('.');
        }
        if let Some(receiver) = self.receiver {
            out.push_str(map.by_id(receiver));
            out.push('.');
        }
        out.push_str(map.by_id(self.name));
        out
    }
}

/// What a selector like `this.f` or `x.length` refers to before it is called.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Callee {
    User(FuncKey),
    /// The built-in `length()` of arrays, slices and tables.
    Length,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Typ {
    /// Integer literals and constant expressions with no machine type yet.
    Ideal,
    Num {
        key: Key,
        range: Interval,
    },
    Bool,
    Status,
    IoReader,
    IoWriter,
    Struct(QId),
    Array {
        len: i128,
        elem: Box<Typ>,
    },
    Slice(Box<Typ>),
    Table(Box<Typ>),
    Ptr(Box<Typ>),
    Nptr(Box<Typ>),
    /// The result of a call to a function with no return type.
    Unit,
    Func(Callee),
}

/// The values a machine integer type can hold.
pub fn machine_range(key: Key) -> Option<Interval> {
    let range = match key {
        Key::I8 => Interval::new(i128::from(i8::MIN), i128::from(i8::MAX)),
        Key::I16 => Interval::new(i128::from(i16::MIN), i128::from(i16::MAX)),
        Key::I32 => Interval::new(i128::from(i32::MIN), i128::from(i32::MAX)),
        Key::I64 => Interval::new(i128::from(i64::MIN), i128::from(i64::MAX)),
        Key::U8 => Interval::new(0, i128::from(u8::MAX)),
        Key::U16 => Interval::new(0, i128::from(u16::MAX)),
        Key::U32 => Interval::new(0, i128::from(u32::MAX)),
        Key::U64 => Interval::new(0, i128::from(u64::MAX)),
        _ => return None,
    };
    Some(range)
}

const BOOL_RANGE: Interval = Interval::new(0, 1);

impl Typ {
    /// The unrefined numeric type for `key`, or `None` if `key` is not one.
    pub fn num(key: Key) -> Option<Typ> {
        machine_range(key).map(|range| Typ::Num { key, range })
    }

    pub fn is_ideal(&self) -> bool {
        matches!(self, Typ::Ideal)
    }

    pub fn is_num(&self) -> bool {
        matches!(self, Typ::Num { .. })
    }

    pub fn is_num_or_ideal(&self) -> bool {
        matches!(self, Typ::Num { .. } | Typ::Ideal)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Typ::Bool)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Typ::Num {
                key: Key::U8 | Key::U16 | Key::U32 | Key::U64,
                ..
            }
        )
    }

    /// Whether the type holds a pointer anywhere inside it.
    pub fn has_pointers(&self) -> bool {
        match self {
            Typ::Ptr(_) | Typ::Nptr(_) => true,
            Typ::Array { elem, .. } | Typ::Slice(elem) | Typ::Table(elem) => elem.has_pointers(),
            _ => false,
        }
    }

    /// The values this type admits, if it is an integer or boolean.
    pub fn bounds(&self) -> Option<Interval> {
        match self {
            Typ::Num { range, .. } => Some(*range),
            Typ::Bool => Some(BOOL_RANGE),
            _ => None,
        }
    }

    /// The machine range, ignoring any refinement.
    pub fn machine_bounds(&self) -> Option<Interval> {
        match self {
            Typ::Num { key, .. } => machine_range(*key),
            Typ::Bool => Some(BOOL_RANGE),
            _ => None,
        }
    }

    /// The same type with every refinement removed.
    #[must_use]
    pub fn unrefined(&self) -> Typ {
        match self {
            Typ::Num { key, range } => Typ::Num {
                key: *key,
                range: machine_range(*key).unwrap_or(*range),
            },
            Typ::Array { len, elem } => Typ::Array {
                len: *len,
                elem: Box::new(elem.unrefined()),
            },
            Typ::Slice(elem) => Typ::Slice(Box::new(elem.unrefined())),
            Typ::Table(elem) => Typ::Table(Box::new(elem.unrefined())),
            Typ::Ptr(elem) => Typ::Ptr(Box::new(elem.unrefined())),
            Typ::Nptr(elem) => Typ::Nptr(Box::new(elem.unrefined())),
            other => other.clone(),
        }
    }

    pub fn eq_ignoring_refinements(&self, other: &Typ) -> bool {
        self.unrefined() == other.unrefined()
    }

    /// Whether a value of type `src` may be stored in a slot of this type.
    /// Bounds are checked separately.
    pub fn accepts(&self, src: &Typ) -> bool {
        (src.is_ideal() && self.is_num()) || self.eq_ignoring_refinements(src)
    }

    /// The element type of an array, slice or table.
    pub fn element(&self) -> Option<&Typ> {
        match self {
            Typ::Array { elem, .. } | Typ::Slice(elem) | Typ::Table(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn str(&self, map: &TokenMap) -> String {
        match self {
            Typ::Ideal => "ideal".to_owned(),
            Typ::Num { key, range } => {
                let name = format!("base.{}", map.by_key(*key));
                if machine_range(*key) == Some(*range) {
                    name
                } else {
                    format!("{name}{range}")
                }
            }
            Typ::Bool => "base.bool".to_owned(),
            Typ::Status => "base.status".to_owned(),
            Typ::IoReader => "base.io_reader".to_owned(),
            Typ::IoWriter => "base.io_writer".to_owned(),
            Typ::Struct(qid) => qid.str(map),
            Typ::Array { len, elem } => format!("array[{len}] {}", elem.str(map)),
            Typ::Slice(elem) => format!("slice {}", elem.str(map)),
            Typ::Table(elem) => format!("table {}", elem.str(map)),
            Typ::Ptr(elem) => format!("ptr {}", elem.str(map)),
            Typ::Nptr(elem) => format!("nptr {}", elem.str(map)),
            Typ::Unit => "()".to_owned(),
            Typ::Func(Callee::User(key)) => format!("func {}", key.str(map)),
            Typ::Func(Callee::Length) => "func length".to_owned(),
        }
    }
}
