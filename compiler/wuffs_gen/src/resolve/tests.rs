#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

/// Packages and the paths they use, as written in source.
#[derive(Default)]
struct FakeLoader {
    graph: FxHashMap<String, Vec<String>>,
    loads: Vec<String>,
}

impl FakeLoader {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        FakeLoader {
            graph: edges
                .iter()
                .map(|(p, uses)| ((*p).to_owned(), uses.iter().map(|u| (*u).to_owned()).collect()))
                .collect(),
            loads: Vec::new(),
        }
    }
}

impl PackageLoader for FakeLoader {
    fn uses(&mut self, map: &TokenMap, package: &PackagePath) -> Result<Vec<TokenId>, LoadError> {
        self.loads.push(package.to_string());
        let Some(uses) = self.graph.get(package.as_str()) else {
            return Err(format!("no such package {package}").into());
        };
        uses.iter()
            .map(|u| map.insert(&format!("{u:?}")).map_err(Into::into))
            .collect()
    }
}

fn paths(names: &[&str]) -> Vec<PackagePath> {
    names.iter().map(|n| PackagePath::new(n).unwrap()).collect()
}

fn order(loader: &mut FakeLoader, requested: &[&str]) -> Result<Vec<String>, ResolveError> {
    let map = TokenMap::new();
    let resolved = resolve(loader, &map, &paths(requested))?;
    Ok(resolved.iter().map(ToString::to_string).collect())
}

#[test]
fn test_chain() {
    let mut loader = FakeLoader::new(&[("p", &["q"]), ("q", &["r"]), ("r", &[])]);
    assert_eq!(order(&mut loader, &["p"]).unwrap(), vec!["base", "r", "q", "p"]);
}

#[test]
fn test_diamond_loads_each_package_once() {
    let mut loader = FakeLoader::new(&[
        ("std/top", &["std/left", "std/right"]),
        ("std/left", &["std/bottom"]),
        ("std/right", &["std/bottom", "base"]),
        ("std/bottom", &[]),
    ]);
    assert_eq!(
        order(&mut loader, &["std/top", "std/right"]).unwrap(),
        vec!["base", "std/bottom", "std/left", "std/right", "std/top"]
    );
    let mut loads = loader.loads.clone();
    loads.sort();
    loads.dedup();
    assert_eq!(loads.len(), loader.loads.len());
}

#[test]
fn test_base_exactly_once() {
    let mut loader = FakeLoader::new(&[("a", &["base"])]);
    assert_eq!(order(&mut loader, &["base", "a"]).unwrap(), vec!["base", "a"]);
    assert!(!loader.loads.contains(&"base".to_owned()));
}

#[test]
fn test_cycle() {
    let mut loader = FakeLoader::new(&[("a", &["b"]), ("b", &["a"])]);
    let err = order(&mut loader, &["a"]).unwrap_err();
    assert_eq!(err.to_string(), "use cycle: a -> b -> a");

    let mut loader = FakeLoader::new(&[("x", &["y"]), ("y", &["z"]), ("z", &["y"])]);
    let err = order(&mut loader, &["x"]).unwrap_err();
    assert_eq!(err.to_string(), "use cycle: y -> z -> y");

    let mut loader = FakeLoader::new(&[("s", &["s"])]);
    let err = order(&mut loader, &["s"]).unwrap_err();
    assert_eq!(err.to_string(), "use cycle: s -> s");
}

#[test]
fn test_invalid_use_path() {
    let mut loader = FakeLoader::new(&[("a", &["std/../b"])]);
    match order(&mut loader, &["a"]) {
        Err(ResolveError::InvalidPath { path }) => assert_eq!(path, "std/../b"),
        other => panic!("expected InvalidPath, got {other:?}"),
    }
}

#[test]
fn test_load_error() {
    let mut loader = FakeLoader::new(&[("a", &["missing"])]);
    let err = order(&mut loader, &["a"]).unwrap_err();
    assert!(matches!(err, ResolveError::Load { ref path, .. } if path == "missing"));
    assert_eq!(err.to_string(), "package missing: no such package missing");
}

#[test]
fn test_package_path() {
    let path = PackagePath::new("std/gif").unwrap();
    assert_eq!(path.name(), "gif");
    assert_eq!(path.as_str(), "std/gif");
    assert!(!path.is_base());
    assert!(PackagePath::base().is_base());
    assert!(PackagePath::new("").is_err());
    assert!(PackagePath::new("/std").is_err());
    assert!(PackagePath::new("./std").is_err());
}

#[test]
fn test_bitset() {
    let mut set = BitSet::default();
    set.insert(3);
    set.insert(130);
    assert!(set.contains(3));
    assert!(set.contains(130));
    assert!(!set.contains(64));
    set.remove(130);
    assert!(!set.contains(130));
    set.remove(9999);
}

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_order {
    use super::*;
    use proptest::prelude::*;

    /// Package `pN` may only use packages with a smaller number.
    fn dag() -> impl Strategy<Value = Vec<Vec<usize>>> {
        (1usize..12).prop_flat_map(|n| {
            (0..n)
                .map(|i| proptest::collection::vec(0..i.max(1), 0..=i.min(3)))
                .collect::<Vec<_>>()
                .prop_map(|uses| {
                    uses.into_iter()
                        .enumerate()
                        .map(|(i, u)| u.into_iter().filter(|&j| j < i).collect())
                        .collect()
                })
        })
    }

    proptest! {
        #[test]
        fn every_package_follows_its_uses(graph in dag()) {
            let names: Vec<String> = (0..graph.len()).map(|i| format!("p{i}")).collect();
            let mut loader = FakeLoader::default();
            for (i, uses) in graph.iter().enumerate() {
                loader.graph.insert(names[i].clone(), uses.iter().map(|&j| names[j].clone()).collect());
            }
            let requested: Vec<&str> = names.iter().rev().map(String::as_str).collect();
            let got = order(&mut loader, &requested).unwrap();

            prop_assert_eq!(got.len(), names.len() + 1);
            prop_assert_eq!(got[0].as_str(), "base");
            let position = |name: &str| got.iter().position(|g| g == name).unwrap();
            for (i, uses) in graph.iter().enumerate() {
                for &j in uses {
                    prop_assert!(position(&names[j]) < position(&names[i]));
                }
            }
        }
    }
}
