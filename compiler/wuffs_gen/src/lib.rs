//! Wuffs Gen - from package paths to generated code
//!
//! The driver finds the packages to build, orders them so every package
//! follows the packages it uses, checks each one against its dependencies'
//! stubs, and hands it to one [`CodeGenerator`] per target language. All
//! output goes through an [`OutputWriter`], which leaves unchanged files
//! alone.
//!
//! # Module Structure
//!
//! - `config`: [`GenConfig`] and root directory discovery
//! - `resolve`: the dependency worklist
//! - `backend`: the generator trait and the process adapter
//! - `driver`: `gen`, `genlib`, `genrelease` and `check`
//! - `stub`: public surface stubs
//! - `output`, `release`: file writing and release naming

mod backend;
mod config;
mod driver;
mod error;
mod output;
mod release;
mod resolve;
mod stub;

use std::path::Path;

use wuffs_ir::ast::File;
use wuffs_ir::TokenMap;

pub use backend::{CodeGenerator, GenRequest, GenlibRequest, ProcessBackend, ReleaseRequest};
pub use config::{find_root, parse_langs, valid_name, GenConfig, ROOT_ENV, ROOT_MARKER};
pub use driver::{Driver, ReleaseOptions};
pub use error::GenError;
pub use output::{OutputWriter, WriteOutcome};
pub use release::{find_files, release_ext, release_path, Version};
pub use resolve::{resolve, LoadError, PackageLoader, PackagePath, ResolveError, BASE};
pub use stub::{emit_stub, STUB_HEADER};

/// Separates the header from the implementation in C backend output.
pub const C_HEADER_ENDS_HERE: &str = "\n// C HEADER ENDS HERE.\n\n";

/// Lex and parse one source text.
pub fn parse_source(map: &TokenMap, filename: &str, source: &[u8]) -> Result<File, GenError> {
    let tokens = wuffs_lexer::lex(map, filename, source)?;
    Ok(wuffs_parse::parse(map, filename, &tokens)?)
}

/// Read, lex and parse one source file.
pub fn parse_file(map: &TokenMap, path: &Path) -> Result<File, GenError> {
    let source = std::fs::read(path).map_err(|e| GenError::io(path, e))?;
    parse_source(map, &path.display().to_string(), &source)
}
