//! Grammar Modules
//!
//! Each module extends `Parser` with methods for one family of productions:
//!
//! - `decl`: top-level declarations (`use`, `const`, `status`, `struct`, `func`)
//! - `stmt`: blocks, statements and assert clauses
//! - `expr`: operands, postfix chains and the single-operator expression form
//! - `ty`: type expressions and range refinements
//!
//! Statements and declarations end at `;`, which the lexer inserts at line
//! ends, so productions never look at newlines.

mod decl;
mod expr;
mod stmt;
mod ty;
