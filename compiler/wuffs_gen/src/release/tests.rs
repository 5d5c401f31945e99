#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_version() {
    assert_eq!(
        Version::parse("1.2.3").unwrap(),
        Version {
            major: 1,
            minor: 2,
            patch: 3,
            extension: None,
        }
    );
    let beta = Version::parse("0.3.0-beta.4").unwrap();
    assert_eq!(beta.extension.as_deref(), Some("beta.4"));
    assert_eq!(beta.to_string(), "0.3.0-beta.4");
}

#[test]
fn test_parse_version_rejects() {
    for bad in ["", "1.2", "1.2.3.4", "1.x.3", "1.2.3 ", "1;2;3", "1.2.70000"] {
        assert!(
            matches!(Version::parse(bad), Err(GenError::BadVersion(ref v)) if v == bad),
            "{bad:?} parsed"
        );
    }
}

#[test]
fn test_release_path() {
    let root = Path::new("/w");
    let snapshot = Version::parse("0.0.0").unwrap();
    assert_eq!(
        release_path(root, "c", &snapshot),
        PathBuf::from("/w/release/c/unsupported-snapshot.h")
    );
    let v = Version::parse("0.2.1").unwrap();
    assert_eq!(
        release_path(root, "go", &v),
        PathBuf::from("/w/release/go/wuffs-v0.2.go")
    );
}

#[test]
fn test_find_files() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("std");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("gif.h"), "").unwrap();
    fs::write(sub.join("gif.c"), "").unwrap();
    fs::write(dir.path().join("base.h"), "").unwrap();

    let found = find_files(dir.path(), "h").unwrap();
    assert_eq!(found, vec![dir.path().join("base.h"), sub.join("gif.h")]);
    assert!(find_files(&dir.path().join("missing"), "h").is_err());
}
