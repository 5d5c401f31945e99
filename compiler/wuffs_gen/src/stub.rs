//! Public surface stubs.
//!
//! A stub is a package reduced to what its users may see: the package id,
//! its `use`s, and the public consts, statuses, structs and function
//! signatures. Struct fields, function bodies, contracts and private
//! declarations are dropped. Stubs are ordinary source and parse as such;
//! dependents are checked against them.

use wuffs_check::Package;
use wuffs_ir::ast::{Decl, DeclKind, Field, Func};
use wuffs_ir::TokenMap;

use crate::resolve::PackagePath;
use crate::GenError;


pub const STUB_HEADER: &str = "// Code generated by running \"wuffs gen\". DO NOT EDIT.\n";

/// The order declarations appear in a stub.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Const,
    Status,
    Struct,
    Func,
}

fn section(decl: &Decl) -> Option<Section> {
    if !decl.visibility().is_some_and(|v| v.is_public()) {
        return None;
    }
    match decl.kind {
        DeclKind::Const { .. } => Some(Section::Const),
        DeclKind::Status { .. } => Some(Section::Status),
        DeclKind::Struct { .. } => Some(Section::Struct),
        DeclKind::Func(_) => Some(Section::Func),
        DeclKind::Use { .. } | DeclKind::PackageId(_) => None,
    }
}

/// Render the stub of a checked package.
pub fn emit_stub(map: &TokenMap, path: &PackagePath, package: &Package) -> Result<String, GenError> {
    let Some((id, value)) = &package.package_id else {
        return Err(GenError::MissingPackageId {
            package: path.to_string(),
        });
    };

    let mut out = String::new();
    out.push_str(STUB_HEADER);
    out.push_str(&format!("\npackageid {id:?}  // __pkg{value:08X}\n"));

    if !package.uses.is_empty() {
        out.push('\n');
        for used in &package.uses {
            out.push_str(&format!("use {used:?}\n"));
        }
    }

    let mut decls: Vec<(Section, &Decl)> = package
        .files
        .iter()
        .flat_map(|f| &f.decls)
        .filter_map(|d| section(d).map(|s| (s, d)))
        .collect();
    decls.sort_by_key(|&(s, _)| s);

    let mut previous = None;
    for (s, decl) in decls {
        if previous != Some(s) {
            out.push('\n');
            previous = Some(s);
        }
        emit_decl(&mut out, map, decl);
    }
    Ok(out)
}

fn emit_decl(out: &mut String, map: &TokenMap, decl: &Decl) {
    match &decl.kind {
        DeclKind::Const {
            name, ty, value, ..
        } => {
            out.push_str(&format!(
                "pub const {} {} = {}\n",
                map.by_id(*name),
                ty.display(map),
                value.display(map)
            ));
        }
        DeclKind::Status { literal, .. } => {
            out.push_str(&format!("pub status {}\n", map.by_id(*literal)));
        }
        DeclKind::Struct {
            name, suspendible, ..
        } => {
            let marker = if *suspendible { "?" } else { "" };
            out.push_str(&format!("pub struct {}{marker}()\n", map.by_id(*name)));
        }
        DeclKind::Func(func) => emit_func(out, map, func),
        DeclKind::Use { .. } | DeclKind::PackageId(_) => {}
    }
}

fn emit_fields(out: &mut String, map: &TokenMap, fields: &[Field]) {
    out.push('(');
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{}: {}", map.by_id(field.name), field.ty.display(map)));
    }
    out.push(')');
}

fn emit_func(out: &mut String, map: &TokenMap, func: &Func) {
    out.push_str("pub func ");
    if let Some(receiver) = func.receiver {
        out.push_str(map.by_id(receiver));
        out.push('.');
    }
    out.push_str(map.by_id(func.name));
    out.push_str(func.effect.marker());
    emit_fields(out, map, &func.inputs);
    if let Some(outputs) = &func.outputs {
        emit_fields(out, map, outputs);
    }
    if let Some(ret) = &func.ret {
        out.push_str(&format!(" {}", ret.display(map)));
    }
    out.push_str(" { }\n");
}
