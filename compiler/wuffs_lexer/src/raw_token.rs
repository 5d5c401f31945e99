//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! interning and semicolon insertion.

use logos::{Lexer, Logos};
use wuffs_ir::token::{lone_squiggle, squiggle_suffixes};
use wuffs_ir::Key;

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("\n")]
    Newline,

    #[token("ℤ")]
    DoubleZ,

    /// Keywords and built-in names are resolved during conversion.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// Digits plus any trailing identifier bytes, validated during
    /// conversion so that `12ab` is one bad literal rather than two tokens.
    #[regex(r"[0-9][0-9a-zA-Z_]*")]
    Number,

    #[regex(r#""[^"\n]*""#)]
    DoubleQuoted,

    #[regex(r"'([^'\\\n]|\\[^\n])*'(be|le)?")]
    SingleQuoted,

    #[regex(r#""[^"\n]*"#)]
    UnterminatedDoubleQuoted,

    #[regex(r"'([^'\\\n]|\\[^\n])*")]
    UnterminatedSingleQuoted,

    #[regex(r"[()\[\]{},;?:$]", lone)]
    Punct(Key),

    #[regex(r"[!%&*+\-./<=>^|~]", squiggle)]
    Squiggle(Key),
}

fn lone(lex: &mut Lexer<RawToken>) -> Option<Key> {
    lex.slice().bytes().next().and_then(lone_squiggle)
}

/// Commit to the first candidate suffix that follows the leading byte.
fn squiggle(lex: &mut Lexer<RawToken>) -> Option<Key> {
    let first = lex.slice().bytes().next()?;
    let rest = lex.remainder();
    let (suffix, key) = squiggle_suffixes(first)
        .iter()
        .find(|(suffix, _)| rest.starts_with(suffix))?;
    lex.bump(suffix.len());
    Some(*key)
}
