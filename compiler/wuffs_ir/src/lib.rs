//! Wuffs IR - shared types for the compiler front end
//!
//! This crate contains the data structures every later phase works with:
//! - Tokens: packed key + flag ids and the built-in operator tables
//! - `TokenMap`: the name ⇄ id table for one compilation
//! - Intervals for bounds checking
//! - AST nodes (declarations, statements, expressions, types)
//! - Status values and base-38 package identifiers
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers and literals are `TokenId(u32)`
//! - **Explicit Context**: a `TokenMap` is passed by reference, never global
//! - **Positionless Expressions**: expressions compare structurally so they
//!   can be used as facts

pub mod ast;
pub mod base38;
mod interval;
mod status;
pub mod token;
mod token_map;

pub use interval::Interval;
pub use status::Status;
pub use token::{Flags, Key, QId, QQId, Token, TokenId};
pub use token_map::{TokenMap, TokenMapError};
