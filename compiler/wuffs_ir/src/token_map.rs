//! Bidirectional map between token strings and [`TokenId`]s.
//!
//! Built-in keys are seeded at construction. Every other identifier or
//! literal gets the next free key at or above [`Key::NUM_BUILT_IN`]. The
//! same string always maps to the same id for the lifetime of the map.

use crate::token::{Flags, Key, TokenId, BUILT_IN_NAMES};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

#[cfg(test)]
mod tests;

/// Error when inserting a token fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenMapError {
    /// More than 65535 distinct tokens.
    TooManyTokens,
    /// The string does not start like an identifier or a literal.
    Unclassifiable(String),
}

impl std::fmt::Display for TokenMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenMapError::TooManyTokens => write!(
                f,
                "too many distinct tokens: max is {} (0x{:X})",
                u16::MAX,
                u16::MAX
            ),
            TokenMapError::Unclassifiable(s) => write!(f, "cannot classify token {s:?}"),
        }
    }
}

impl std::error::Error for TokenMapError {}

struct Inner {
    by_name: FxHashMap<&'static str, TokenId>,
    /// Names of dynamic keys, indexed by `key - NUM_BUILT_IN`.
    by_key: Vec<&'static str>,
}

/// Token string table shared by every file of a compilation.
///
/// Uses a `RwLock` so lookups from the checker never contend with each
/// other. Strings are leaked to get `'static` lifetime, like any interner
/// whose entries live for the whole process.
pub struct TokenMap {
    inner: RwLock<Inner>,
}

impl TokenMap {
    /// Create a map seeded with every built-in name.
    pub fn new() -> Self {
        let mut by_name = FxHashMap::default();
        for &(key, name) in BUILT_IN_NAMES {
            by_name.insert(name, TokenId::built_in(key));
        }
        TokenMap {
            inner: RwLock::new(Inner {
                by_name,
                by_key: Vec::with_capacity(256),
            }),
        }
    }

    /// Look up or assign the id for `name`.
    pub fn insert(&self, name: &str) -> Result<TokenId, TokenMapError> {
        if let Some(&id) = self.inner.read().by_name.get(name) {
            return Ok(id);
        }

        let flags = classify(name).ok_or_else(|| TokenMapError::Unclassifiable(name.to_owned()))?;

        let mut guard = self.inner.write();
        if let Some(&id) = guard.by_name.get(name) {
            return Ok(id);
        }

        let raw = usize::from(Key::NUM_BUILT_IN) + guard.by_key.len();
        let raw = u16::try_from(raw).map_err(|_| TokenMapError::TooManyTokens)?;
        if raw == u16::MAX {
            return Err(TokenMapError::TooManyTokens);
        }

        let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let id = TokenId::new(Key::new(raw), flags);
        guard.by_key.push(leaked);
        guard.by_name.insert(leaked, id);
        Ok(id)
    }

    /// The id for `name`, if it has been seen.
    pub fn by_name(&self, name: &str) -> Option<TokenId> {
        self.inner.read().by_name.get(name).copied()
    }

    /// The string for `id`. Unknown ids give the empty string.
    pub fn by_id(&self, id: TokenId) -> &'static str {
        self.by_key(id.key())
    }

    pub fn by_key(&self, key: Key) -> &'static str {
        if key.is_built_in() {
            return built_in_name(key).unwrap_or("");
        }
        let index = usize::from(key.raw() - Key::NUM_BUILT_IN);
        self.inner.read().by_key.get(index).copied().unwrap_or("")
    }

    /// Number of dynamically assigned keys.
    pub fn len(&self) -> usize {
        self.inner.read().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TokenMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMap").field("len", &self.len()).finish()
    }
}

/// The display name of a built-in key. Disambiguated operator forms show
/// as the operator they came from.
fn built_in_name(key: Key) -> Option<&'static str> {
    let ambiguous = key.ambiguous_form();
    let key = if ambiguous == Key::INVALID {
        key
    } else {
        ambiguous
    };
    BUILT_IN_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, name)| name)
}

fn classify(name: &str) -> Option<Flags> {
    let first = name.chars().next()?;
    match first {
        '"' | '\'' => Some(Flags::STR_LITERAL | Flags::LITERAL),
        '0'..='9' => Some(Flags::NUM_LITERAL | Flags::LITERAL),
        c if c == '_' || c.is_ascii_alphabetic() => Some(Flags::IDENT),
        _ => None,
    }
}
