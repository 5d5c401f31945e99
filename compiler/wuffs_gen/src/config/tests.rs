#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_defaults() {
    let config = GenConfig::new("/w");
    assert_eq!(config.root, PathBuf::from("/w"));
    assert_eq!(config.langs, vec!["c".to_owned()]);
    assert_eq!(config.prefix, "wuffs-");
    assert!(!config.skip_gen_deps);
}

#[test]
fn test_valid_name() {
    assert!(valid_name("c"));
    assert!(valid_name("gif89"));
    assert!(!valid_name(""));
    assert!(!valid_name("Go"));
    assert!(!valid_name("c++"));
    assert!(!valid_name("std/gif"));
}

#[test]
fn test_parse_langs() {
    assert_eq!(
        parse_langs("c,go,rs").unwrap(),
        vec!["c".to_owned(), "go".to_owned(), "rs".to_owned()]
    );
    assert!(parse_langs("").unwrap().is_empty());
    match parse_langs("c,,go") {
        Err(GenError::InvalidName { what, name }) => {
            assert_eq!(what, "lang");
            assert_eq!(name, "");
        }
        other => panic!("expected InvalidName, got {other:?}"),
    }
}

#[test]
fn test_find_root_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(dir.path().join(ROOT_MARKER), "").unwrap();

    let flag = Path::new("/from/flag");
    assert_eq!(
        find_root(Some(flag), Some("/from/env".into()), &nested),
        PathBuf::from("/from/flag")
    );
    assert_eq!(
        find_root(None, Some("/from/env".into()), &nested),
        PathBuf::from("/from/env")
    );
    assert_eq!(find_root(None, Some(OsString::new()), &nested), dir.path());
    assert_eq!(find_root(None, None, &nested), dir.path());
}

#[test]
fn test_find_root_fallback() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(find_root(None, None, dir.path()), PathBuf::from("."));
}
