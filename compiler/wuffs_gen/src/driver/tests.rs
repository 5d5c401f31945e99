#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::output::WriteOutcome;
use crate::resolve::ResolveError;
use crate::stub::STUB_HEADER;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Calls {
    gen: Vec<(String, Vec<PathBuf>)>,
    genlib: Vec<(PathBuf, PathBuf, Vec<String>)>,
    release: Vec<(String, String, String, Vec<PathBuf>)>,
}

/// Records its requests and returns canned output.
struct FakeGenerator {
    lang: &'static str,
    sentinel: bool,
    calls: Rc<RefCell<Calls>>,
}

impl CodeGenerator for FakeGenerator {
    fn lang(&self) -> &str {
        self.lang
    }

    fn generate(&self, request: &GenRequest<'_>) -> Result<Vec<u8>, GenError> {
        self.calls
            .borrow_mut()
            .gen
            .push((request.package_name.to_owned(), request.files.to_vec()));
        let mut out = format!("// {} interface\n", request.package_name);
        if self.sentinel {
            out.push_str(C_HEADER_ENDS_HERE);
        }
        out.push_str("// implementation\n");
        Ok(out.into_bytes())
    }

    fn generate_library(&self, request: &GenlibRequest<'_>) -> Result<(), GenError> {
        self.calls.borrow_mut().genlib.push((
            request.dst_dir.to_path_buf(),
            request.src_dir.to_path_buf(),
            request.packages.iter().map(ToString::to_string).collect(),
        ));
        Ok(())
    }

    fn generate_release(&self, request: &ReleaseRequest<'_>) -> Result<Vec<u8>, GenError> {
        self.calls.borrow_mut().release.push((
            request.revision.to_owned(),
            request.commit_date.to_owned(),
            request.version.to_string(),
            request.files.to_vec(),
        ));
        Ok(b"// release\n".to_vec())
    }
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// `std/p` uses `std/q`, which uses `std/r`.
fn tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "std/r/r.wuffs",
        "packageid \"r\"\npub const MAX base.u32 = 10\n",
    );
    write(
        root,
        "std/q/q.wuffs",
        "packageid \"q\"\n\
         use \"std/r\"\n\
         pub const LIMIT base.u32 = 3\n\
         pub func f(x: base.u32[..= r.MAX]) base.u32 {\n\
         return x + 1\n\
         }\n",
    );
    write(
        root,
        "std/p/p.wuffs",
        "packageid \"p\"\nuse \"std/q\"\npub const P base.u32 = 4\n",
    );
    dir
}

fn fake(lang: &'static str, sentinel: bool) -> (Box<dyn CodeGenerator>, Rc<RefCell<Calls>>) {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let generator: Box<dyn CodeGenerator> = Box::new(FakeGenerator {
        lang,
        sentinel,
        calls: Rc::clone(&calls),
    });
    (generator, calls)
}

fn driver<'m>(map: &'m TokenMap, root: &Path, generators: Vec<Box<dyn CodeGenerator>>) -> Driver<'m> {
    Driver::with_generators(map, GenConfig::new(root), generators).unwrap()
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

fn names(paths: &[PackagePath]) -> Vec<&str> {
    paths.iter().map(PackagePath::as_str).collect()
}

#[test]
fn test_gen_dependencies_first() {
    let dir = tree();
    let map = TokenMap::new();
    let (c, calls) = fake("c", true);
    let mut driver = driver(&map, dir.path(), vec![c]);
    driver.gen(&args(&["std/p"])).unwrap();

    let generated: Vec<String> = calls.borrow().gen.iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(generated, vec!["r", "q", "p"]);
    assert_eq!(
        calls.borrow().gen[1].1,
        vec![dir.path().join("std").join("q").join("q.wuffs")]
    );
    assert_eq!(names(driver.affected()), vec!["std/r", "std/q", "std/p"]);
}

#[test]
fn test_gen_writes_outputs() {
    let dir = tree();
    let root = dir.path();
    let map = TokenMap::new();
    let (c, _) = fake("c", true);
    let mut driver = driver(&map, root, vec![c]);
    driver.gen(&args(&["std/q"])).unwrap();

    let c_out = fs::read_to_string(root.join("gen/c/std/q.c")).unwrap();
    assert_eq!(
        c_out,
        format!("// q interface\n{C_HEADER_ENDS_HERE}// implementation\n")
    );
    let h_out = fs::read_to_string(root.join("gen/c/std/q.h")).unwrap();
    assert_eq!(h_out, "// q interface");

    let stub = fs::read_to_string(root.join("gen/wuffs/std/q.wuffs")).unwrap();
    assert!(stub.starts_with(STUB_HEADER), "{stub}");
    assert!(stub.contains("use \"std/r\""), "{stub}");
    assert!(stub.contains("pub const LIMIT base.u32 = 3"), "{stub}");
    assert!(root.join("gen/wuffs/std/r.wuffs").is_file());
    assert!(!root.join("gen/wuffs/std/p.wuffs").exists());

    assert_eq!(driver.writer().count(WriteOutcome::Wrote), 6);
}

#[test]
fn test_second_run_is_unchanged() {
    let dir = tree();
    let map = TokenMap::new();
    let (c, _) = fake("c", true);
    driver(&map, dir.path(), vec![c]).gen(&args(&["std/p"])).unwrap();

    let (c, _) = fake("c", true);
    let mut again = driver(&map, dir.path(), vec![c]);
    again.gen(&args(&["std/p"])).unwrap();
    assert_eq!(again.writer().count(WriteOutcome::Wrote), 0);
    assert_eq!(again.writer().count(WriteOutcome::Unchanged), 9);
}

#[test]
fn test_missing_sentinel() {
    let dir = tree();
    let map = TokenMap::new();
    let (c, _) = fake("c", false);
    let err = driver(&map, dir.path(), vec![c])
        .gen(&args(&["std/r"]))
        .unwrap_err();
    assert!(matches!(&err, GenError::MissingSentinel { command } if command == "wuffs-c"));
    assert!(err.to_string().contains("C HEADER ENDS HERE"), "{err}");
}

#[test]
fn test_other_languages_have_no_header() {
    let dir = tree();
    let root = dir.path();
    let map = TokenMap::new();
    let (go, _) = fake("go", false);
    driver(&map, root, vec![go]).gen(&args(&["std/r"])).unwrap();
    assert!(root.join("gen/go/std/r.go").is_file());
    assert!(!root.join("gen/go/std/r.h").exists());
}

#[test]
fn test_recursive_expansion() {
    let dir = tree();
    let root = dir.path();
    fs::create_dir_all(root.join("std/empty")).unwrap();
    write(root, "std/Upper/x.wuffs", "packageid \"x\"\n");
    let map = TokenMap::new();
    let (c, calls) = fake("c", true);
    let mut driver = driver(&map, root, vec![c]);

    let expanded = driver.expand(&[]).unwrap();
    assert_eq!(names(&expanded), vec!["std/p", "std/q", "std/r"]);
    let expanded = driver.expand(&args(&["std/r", "std/..."])).unwrap();
    assert_eq!(names(&expanded), vec!["std/r", "std/p", "std/q"]);

    driver.gen(&[]).unwrap();
    assert_eq!(calls.borrow().gen.len(), 3);
}

#[test]
fn test_invalid_argument() {
    let dir = tree();
    let map = TokenMap::new();
    let err = driver(&map, dir.path(), vec![])
        .gen(&args(&["std/Q"]))
        .unwrap_err();
    assert!(matches!(err, GenError::Resolve(ResolveError::InvalidPath { .. })));
}

#[test]
fn test_check_error_stops_generation() {
    let dir = tree();
    write(
        dir.path(),
        "std/q/extra.wuffs",
        "pri func g(a: base.u8, b: base.u8) base.u8 {\nreturn a + b\n}\n",
    );
    let map = TokenMap::new();
    let (c, calls) = fake("c", true);
    let err = driver(&map, dir.path(), vec![c])
        .gen(&args(&["std/p"]))
        .unwrap_err();
    assert!(err.to_string().contains("a + b"), "{err}");
    assert!(matches!(err, GenError::Check(_)));
    let generated: Vec<String> = calls.borrow().gen.iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(generated, vec!["r"]);
}

#[test]
fn test_skip_gen_deps() {
    let dir = tree();
    let map = TokenMap::new();
    let mut config = GenConfig::new(dir.path());
    config.skip_gen_deps = true;

    let (c, _) = fake("c", true);
    let err = Driver::with_generators(&map, config.clone(), vec![c])
        .unwrap()
        .gen(&args(&["std/q"]))
        .unwrap_err();
    assert!(err.to_string().contains("no stub"), "{err}");

    let (c, _) = fake("c", true);
    driver(&map, dir.path(), vec![c]).gen(&args(&["std/r"])).unwrap();

    let (c, calls) = fake("c", true);
    let mut only_q = Driver::with_generators(&map, config, vec![c]).unwrap();
    only_q.gen(&args(&["std/q"])).unwrap();
    let generated: Vec<String> = calls.borrow().gen.iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(generated, vec!["q"]);
}

#[test]
fn test_use_cycle() {
    let dir = tree();
    write(
        dir.path(),
        "std/r/r.wuffs",
        "packageid \"r\"\nuse \"std/p\"\n",
    );
    let map = TokenMap::new();
    let err = driver(&map, dir.path(), vec![])
        .gen(&args(&["std/p"]))
        .unwrap_err();
    assert_eq!(err.to_string(), "use cycle: std/p -> std/q -> std/r -> std/p");
}

#[test]
fn test_genlib() {
    let dir = tree();
    let root = dir.path();
    let map = TokenMap::new();
    let (c, calls) = fake("c", true);
    let mut driver = driver(&map, root, vec![c]);
    driver.gen(&args(&["std/q"])).unwrap();
    driver.genlib().unwrap();

    let calls = calls.borrow();
    assert_eq!(
        calls.genlib,
        vec![(
            root.join("gen").join("lib").join("c"),
            root.join("gen").join("c"),
            vec!["std/r".to_owned(), "std/q".to_owned()],
        )]
    );
}

#[test]
fn test_genrelease() {
    let dir = tree();
    let root = dir.path();
    let map = TokenMap::new();
    let (c, calls) = fake("c", true);
    let mut driver = driver(&map, root, vec![c]);
    driver.gen(&args(&["std/q"])).unwrap();

    let options = ReleaseOptions {
        version: Version::default(),
        revision: "abc123".to_owned(),
        commit_date: "2024-01-02".to_owned(),
    };
    driver.genrelease(&options).unwrap();

    let out = root.join("release/c/unsupported-snapshot.h");
    assert_eq!(fs::read(&out).unwrap(), b"// release\n");
    let calls = calls.borrow();
    assert_eq!(
        calls.release,
        vec![(
            "abc123".to_owned(),
            "2024-01-02".to_owned(),
            "0.0.0".to_owned(),
            vec![root.join("gen/c/std/q.h"), root.join("gen/c/std/r.h")],
        )]
    );
}

#[test]
fn test_no_langs_writes_nothing() {
    let dir = tree();
    let map = TokenMap::new();
    let mut driver = driver(&map, dir.path(), vec![]);
    driver.gen(&args(&["std/p"])).unwrap();
    assert_eq!(names(driver.affected()), vec!["std/r", "std/q", "std/p"]);
    assert!(driver.writer().log().is_empty());
    assert!(!dir.path().join("gen").exists());
}

#[test]
fn test_invalid_generator_lang() {
    let map = TokenMap::new();
    let (bad, _) = fake("C++", true);
    let err = Driver::with_generators(&map, GenConfig::new("."), vec![bad]).err();
    assert!(matches!(err, Some(GenError::InvalidName { what: "lang", .. })));
}

#[test]
fn test_check_files() {
    let dir = tree();
    let map = TokenMap::new();
    let mut driver = driver(&map, dir.path(), vec![]);
    let package = driver
        .check_files(&[dir.path().join("std/r/r.wuffs")])
        .unwrap();
    assert_eq!(package.package_id.map(|(id, _)| id), Some("r".to_owned()));
}
