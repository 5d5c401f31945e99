//! Dependency resolution.
//!
//! [`resolve`] walks `use` declarations from the requested packages and
//! returns every package reached, each after all of the packages it uses.
//! The walk keeps its own stack over an arena of package indices, so deep
//! dependency chains cannot overflow the call stack.

use std::error::Error;
use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace};
use wuffs_check::valid_use_path;
use wuffs_ir::token::unescape;
use wuffs_ir::{TokenId, TokenMap};

#[cfg(test)]
mod tests;

/// The implicit package every other package depends on.
pub const BASE: &str = "base";

pub type LoadError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid package path {path:?}")]
    InvalidPath { path: String },

    /// The packages on the cycle, with the first repeated at the end.
    #[error("use cycle: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    #[error("package {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },
}

/// A validated `/`-separated package path such as `std/gif`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackagePath(String);

impl PackagePath {
    pub fn new(path: &str) -> Result<Self, ResolveError> {
        if valid_use_path(path) {
            Ok(PackagePath(path.to_owned()))
        } else {
            Err(ResolveError::InvalidPath {
                path: path.to_owned(),
            })
        }
    }

    pub fn base() -> Self {
        PackagePath(BASE.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path element, which is the package's name.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds the packages a package uses.
pub trait PackageLoader {
    /// The `use` paths of `package`, as interned string literals.
    fn uses(&mut self, map: &TokenMap, package: &PackagePath) -> Result<Vec<TokenId>, LoadError>;
}

/// One bit per arena slot.
#[derive(Default)]
struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    fn insert(&mut self, i: usize) {
        let word = i / 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (i % 64);
    }

    fn remove(&mut self, i: usize) {
        if let Some(w) = self.words.get_mut(i / 64) {
            *w &= !(1 << (i % 64));
        }
    }

    fn contains(&self, i: usize) -> bool {
        self.words
            .get(i / 64)
            .is_some_and(|w| w & (1 << (i % 64)) != 0)
    }
}

struct Node {
    path: PackagePath,
    /// Arena indices of the used packages, once loaded.
    uses: Option<Vec<usize>>,
}

#[derive(Default)]
struct Arena {
    nodes: Vec<Node>,
    index: FxHashMap<PackagePath, usize>,
}

impl Arena {
    fn intern(&mut self, path: PackagePath) -> usize {
        if let Some(&i) = self.index.get(&path) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(path.clone(), i);
        self.nodes.push(Node { path, uses: None });
        i
    }
}

/// Every package reachable from `requested`, ordered so each package comes
/// after the packages it uses. [`BASE`] comes first, exactly once.
pub fn resolve(
    loader: &mut dyn PackageLoader,
    map: &TokenMap,
    requested: &[PackagePath],
) -> Result<Vec<PackagePath>, ResolveError> {
    let mut arena = Arena::default();
    let base = arena.intern(PackagePath::base());
    let mut done = BitSet::default();
    let mut active = BitSet::default();
    done.insert(base);
    let mut order = vec![PackagePath::base()];

    for root in requested {
        let root = arena.intern(root.clone());
        if done.contains(root) {
            continue;
        }
        // (node, index of the next use to visit)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        active.insert(root);
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            top.1 += 1;
            if arena.nodes[node].uses.is_none() {
                let uses = load_uses(loader, map, &arena.nodes[node].path)?;
                let ids = uses.into_iter().map(|p| arena.intern(p)).collect();
                arena.nodes[node].uses = Some(ids);
            }
            let child = arena.nodes[node]
                .uses
                .as_ref()
                .and_then(|uses| uses.get(next).copied());
            let Some(child) = child else {
                stack.pop();
                active.remove(node);
                done.insert(node);
                trace!(package = %arena.nodes[node].path, "resolved");
                order.push(arena.nodes[node].path.clone());
                continue;
            };
            if done.contains(child) {
                continue;
            }
            if active.contains(child) {
                return Err(cycle_error(&arena, &stack, child));
            }
            active.insert(child);
            stack.push((child, 0));
        }
    }
    debug!(packages = order.len(), "resolved dependencies");
    Ok(order)
}

fn load_uses(
    loader: &mut dyn PackageLoader,
    map: &TokenMap,
    path: &PackagePath,
) -> Result<Vec<PackagePath>, ResolveError> {
    let ids = loader
        .uses(map, path)
        .map_err(|source| ResolveError::Load {
            path: path.to_string(),
            source,
        })?;
    ids.into_iter()
        .map(|id| {
            let text = map.by_id(id);
            let used = unescape(text).ok_or_else(|| ResolveError::InvalidPath {
                path: text.to_owned(),
            })?;
            PackagePath::new(used)
        })
        .collect()
}

fn cycle_error(arena: &Arena, stack: &[(usize, usize)], repeated: usize) -> ResolveError {
    let start = stack
        .iter()
        .position(|&(node, _)| node == repeated)
        .unwrap_or(0);
    let mut cycle: Vec<String> = stack[start..]
        .iter()
        .map(|&(node, _)| arena.nodes[node].path.to_string())
        .collect();
    cycle.push(arena.nodes[repeated].path.to_string());
    ResolveError::Cycle { cycle }
}
