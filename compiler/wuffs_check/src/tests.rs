#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;
use wuffs_ir::ast::File;
use wuffs_ir::{Interval, TokenMap};

fn parse_file(map: &TokenMap, filename: &str, src: &str) -> File {
    let tokens = wuffs_lexer::lex(map, filename, src.as_bytes()).unwrap();
    wuffs_parse::parse(map, filename, &tokens).unwrap()
}

fn check_with(src: &str, deps: &Dependencies, map: &TokenMap) -> Result<Package, CheckError> {
    let file = parse_file(map, "a.wuffs", src);
    Checker::new(map).unwrap().check(vec![file], deps)
}

fn check(src: &str) -> Result<Package, CheckError> {
    check_with(src, &Dependencies::default(), &TokenMap::new())
}

fn check_err(src: &str) -> CheckError {
    match check(src) {
        Ok(_) => panic!("expected an error checking:\n{src}"),
        Err(err) => err,
    }
}

fn assert_invalid(src: &str, needle: &str) {
    let err = check_err(src);
    assert!(
        matches!(err, CheckError::Invalid { .. }),
        "not Invalid: {err:?}"
    );
    assert!(
        err.to_string().contains(needle),
        "{err} does not mention {needle:?}"
    );
}

// --- Packages ---

#[test]
fn test_refined_sum_fits() {
    let package = check(
        "packageid \"test\"\n\
         pub struct T()\n\
         pub func T.f!(x: base.u32[..= 10]) {\n\
         var y: base.u32[..= 20]\n\
         y = x + x\n\
         }\n",
    )
    .unwrap();
    let (name, value) = package.package_id.unwrap();
    assert_eq!(name, "test");
    assert_ne!(value, 0);
    assert!(package.uses.is_empty());
    assert_eq!(package.files.len(), 1);
}

#[test]
fn test_refined_sum_out_of_bounds() {
    let err = check_err(
        "packageid \"test\"\n\
         pub struct T()\n\
         pub func T.f!(x: base.u32[..= 200]) {\n\
         var y: base.u32[..= 20]\n\
         y = x + x\n\
         }\n",
    );
    match err {
        CheckError::OutOfBounds {
            expr,
            bounds,
            within,
            file,
            line,
            facts,
        } => {
            assert_eq!(expr, "x + x");
            assert_eq!(bounds, Interval::new(0, 400));
            assert_eq!(within, Interval::new(0, 20));
            assert_eq!(file, "a.wuffs");
            assert_eq!(line, 5);
            assert_eq!(facts, vec!["y == 0".to_owned()]);
        }
        other => panic!("not OutOfBounds: {other:?}"),
    }
}

#[test]
fn test_missing_packageid() {
    assert_invalid("pub struct T()\n", "missing packageid");
}

#[test]
fn test_private_package_needs_no_packageid() {
    let package = check("pri struct T()\n").unwrap();
    assert_eq!(package.package_id, None);
}

#[test]
fn test_duplicate_struct() {
    match check_err("pri struct S()\npri struct S()\n") {
        CheckError::Duplicate {
            what,
            name,
            line,
            other_line,
            ..
        } => {
            assert_eq!(what, "struct");
            assert_eq!(name, "S");
            assert_eq!(line, 2);
            assert_eq!(other_line, 1);
        }
        other => panic!("not Duplicate: {other:?}"),
    }
}

#[test]
fn test_struct_cycle() {
    assert_invalid(
        "pri struct A(b: B)\npri struct B(a: array[2] A)\n",
        "cyclical struct definitions",
    );
}

#[test]
fn test_struct_may_not_hold_pointers() {
    let err = check_err("pri struct A(p: ptr base.u8)\n");
    assert!(matches!(err, CheckError::Invalid { line: 1, .. }), "{err:?}");
}

#[test]
fn test_refinement_outside_machine_range() {
    assert_invalid("pri func f(x: base.u8[..= 300]) {}\n", "out of bounds");
}

#[test]
fn test_const_out_of_bounds() {
    let err = check_err("pri const C base.u8 = 256\n");
    assert!(matches!(err, CheckError::OutOfBounds { .. }), "{err:?}");
}

#[test]
fn test_const_refinement() {
    check(
        "pri const N base.u32 = 16\n\
         pri func f(x: base.u32[..= N]) base.u32 {\n\
         return x + N\n\
         }\n",
    )
    .unwrap();
}

// --- Typing ---

#[test]
fn test_unknown_identifier() {
    assert_invalid(
        "pri func f() base.u8 {\nreturn zz\n}\n",
        "unknown identifier",
    );
}

#[test]
fn test_stronger_effect() {
    assert_invalid(
        "pri func g!() {}\npri func f() {\ng!()\n}\n",
        "stronger effect",
    );
}

#[test]
fn test_inputs_are_read_only() {
    assert_invalid(
        "pri func f(x: base.u8) {\nx = 1\n}\n",
        "read-only",
    );
}

#[test]
fn test_undeclared_status() {
    assert_invalid(
        "pri func f?() {\nreturn \"#nope\"\n}\n",
        "undeclared status",
    );
    check(
        "pri status \"#nope\"\n\
         pri func f?() {\n\
         return \"#nope\"\n\
         }\n",
    )
    .unwrap();
}

#[test]
fn test_duplicate_variable() {
    assert_invalid(
        "pri func f() {\nvar a: base.u8\nvar a: base.u8\n}\n",
        "duplicate variable",
    );
}

#[test]
fn test_break_outside_loop() {
    assert_invalid("pri func f() {\nbreak\n}\n", "outside a loop");
}

// --- Bounds ---

#[test]
fn test_unrefined_sum_overflows() {
    match check_err("pri func f(a: base.u8, b: base.u8) base.u8 {\nreturn a + b\n}\n") {
        CheckError::OutOfBounds {
            expr,
            bounds,
            within,
            line,
            ..
        } => {
            assert_eq!(expr, "a + b");
            assert_eq!(bounds, Interval::new(0, 510));
            assert_eq!(within, Interval::new(0, 255));
            assert_eq!(line, 2);
        }
        other => panic!("not OutOfBounds: {other:?}"),
    }
}

#[test]
fn test_if_condition_narrows() {
    check(
        "pri func f(a: base.u8) base.u8 {\n\
         if a < 200 {\n\
         return a + 50\n\
         }\n\
         return 0\n\
         }\n",
    )
    .unwrap();
}

#[test]
fn test_condition_mentioning_its_variable_on_both_sides() {
    let src = |value: &str, bound: &str| {
        format!(
            "pri func f(x: base.i32[0 ..= 100]) {{\n\
             var y: base.i32[0 ..= {bound}]\n\
             if x <= (10 - x) {{\n\
             y = {value}\n\
             }}\n\
             }}\n"
        )
    };
    check(&src("20 - x", "100")).unwrap();

    match check(&src("50 - x", "40")).unwrap_err() {
        CheckError::OutOfBounds {
            expr,
            bounds,
            within,
            line,
            ..
        } => {
            assert_eq!(expr, "50 - x");
            assert_eq!(bounds, Interval::new(0, 50));
            assert_eq!(within, Interval::new(0, 40));
            assert_eq!(line, 4);
        }
        other => panic!("not OutOfBounds: {other:?}"),
    }
}

#[test]
fn test_condition_below_every_integer() {
    assert_invalid(
        "pri func f(x: base.i32) {\n\
         var y: base.i32\n\
         if x < (-170141183460469231731687303715884105727 - 1) {\n\
         y = x\n\
         }\n\
         }\n",
        "inconsistent with fact",
    );
}

#[test]
fn test_compound_assignment_reading_its_target() {
    let err = check_err(
        "pri func f() {\n\
         var x: base.u32[..= 10]\n\
         x = 3\n\
         x += x\n\
         assert x == (3 + x)\n\
         }\n",
    );
    assert!(matches!(err, CheckError::Unproven { line: 5, .. }), "{err:?}");

    let err = check_err(
        "pri func f() {\n\
         var x: base.u32[..= 10]\n\
         x = 3\n\
         x -= x\n\
         assert x == 3\n\
         }\n",
    );
    assert!(matches!(err, CheckError::Unproven { line: 5, .. }), "{err:?}");
}

#[test]
fn test_division_by_zero_range() {
    let err = check_err("pri func f(a: base.u8, b: base.u8) base.u8 {\nreturn a / b\n}\n");
    assert!(err.to_string().contains("a / b"), "{err}");
}

#[test]
fn test_array_index() {
    let err = check_err(
        "pri struct S(a: array[4] base.u8)\n\
         pri func S.get(i: base.u32) base.u8 {\n\
         return this.a[i]\n\
         }\n",
    );
    match err {
        CheckError::OutOfBounds { expr, within, .. } => {
            assert_eq!(expr, "i");
            assert_eq!(within, Interval::new(0, 3));
        }
        other => panic!("not OutOfBounds: {other:?}"),
    }

    check(
        "pri struct S(a: array[4] base.u8)\n\
         pri func S.get(i: base.u32[..= 3]) base.u8 {\n\
         return this.a[i]\n\
         }\n",
    )
    .unwrap();
}

// --- Proofs ---

const RULE_SRC: &str = "pri func f(a: base.u32, b: base.u32, c: base.u32) {\n\
                        if (a < c) and (c <= b) {\n\
                        assert a < b via \"a < b: a < c; c <= b\"(c: c)\n\
                        }\n\
                        }\n";

#[test]
fn test_assert_via_rule() {
    check(RULE_SRC).unwrap();
}

#[test]
fn test_assert_without_rule_is_unproven() {
    let src = RULE_SRC.replace(" via \"a < b: a < c; c <= b\"(c: c)", "");
    let err = check(&src).unwrap_err();
    assert!(matches!(err, CheckError::Unproven { line: 3, .. }), "{err:?}");
}

#[test]
fn test_rule_hypotheses_must_hold() {
    let src = RULE_SRC.replace("(a < c) and (c <= b)", "a < c");
    let err = check(&src).unwrap_err();
    match &err {
        CheckError::Unproven { condition, detail, .. } => {
            assert_eq!(condition, "a < b");
            assert_eq!(
                detail.as_deref(),
                Some("\"a < b: a < c; c <= b\" requires \"c <= b\"")
            );
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

#[test]
fn test_rule_reports_first_unmet_hypothesis() {
    let src = RULE_SRC.replace("(a < c) and (c <= b)", "c <= b");
    match check(&src).unwrap_err() {
        CheckError::Unproven { condition, detail, .. } => {
            assert_eq!(condition, "a < b");
            assert_eq!(
                detail.as_deref(),
                Some("\"a < b: a < c; c <= b\" requires \"a < c\"")
            );
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

#[test]
fn test_rule_needs_its_argument() {
    let src = RULE_SRC.replace("(c: c)", "()");
    let err = check(&src).unwrap_err();
    assert!(err.to_string().contains("needs an argument"), "{err}");
}

#[test]
fn test_unknown_rule() {
    let src = RULE_SRC.replace("a < b: a < c; c <= b", "a < b: magic");
    assert_invalid(&src, "no such reason");
}

#[test]
fn test_loop_invariant() {
    check(
        "pri func sum(n: base.u32[..= 100]) base.u32 {\n\
         var i: base.u32[..= 100]\n\
         var total: base.u32\n\
         while i < n, inv i <= n {\n\
         assert i < 100 via \"a < b: a < c; c <= b\"(c: n)\n\
         total = total ~sat+ i\n\
         i += 1\n\
         }\n\
         return total\n\
         }\n",
    )
    .unwrap();
}

#[test]
fn test_loop_invariant_must_hold_on_entry() {
    let err = check_err(
        "pri func f(n: base.u32) {\n\
         var i: base.u32\n\
         i = 5\n\
         while i < n, inv i == 0 {\n\
         i += 0\n\
         }\n\
         }\n",
    );
    assert!(matches!(err, CheckError::Unproven { line: 4, .. }), "{err:?}");
}

#[test]
fn test_loop_invariant_must_hold_after_body() {
    match check_err(
        "pri func f(n: base.u32[..= 100]) {\n\
         var i: base.u32[..= 100]\n\
         while i < n, inv i <= n {\n\
         i = 100\n\
         }\n\
         }\n",
    ) {
        CheckError::Unproven {
            condition,
            line,
            facts,
            ..
        } => {
            assert_eq!(condition, "i <= n");
            assert_eq!(line, 3);
            assert_eq!(facts, vec!["i == 100".to_owned()]);
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

/// A loop counting `i` up to `n` that breaks early at 50.
fn breaking_loop(post: &str) -> String {
    format!(
        "pri func f(n: base.u32[..= 100]) {{\n\
         var i: base.u32[..= 100]\n\
         while i < n, inv i <= n, post {post} {{\n\
         if i == 50 {{\n\
         break\n\
         }}\n\
         assert i < 100 via \"a < b: a < c; c <= b\"(c: n)\n\
         i += 1\n\
         }}\n\
         }}\n"
    )
}

#[test]
fn test_break_must_establish_post() {
    check(&breaking_loop("i <= n")).unwrap();

    // The normal exit proves `i >= n`, the early break does not.
    match check(&breaking_loop("i >= n")).unwrap_err() {
        CheckError::Unproven {
            condition, line, ..
        } => {
            assert_eq!(condition, "i >= n");
            assert_eq!(line, 3);
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

#[test]
fn test_continue_must_keep_invariant() {
    let err = check_err(
        "pri func f(n: base.u32[..= 100]) {\n\
         var i: base.u32[..= 100]\n\
         while i < n, inv i <= n {\n\
         if i == 50 {\n\
         i = 100\n\
         continue\n\
         }\n\
         assert i < 100 via \"a < b: a < c; c <= b\"(c: n)\n\
         i += 1\n\
         }\n\
         }\n",
    );
    match err {
        CheckError::Unproven {
            condition, line, ..
        } => {
            assert_eq!(condition, "i <= n");
            assert_eq!(line, 3);
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

#[test]
fn test_post_checked_on_loop_exit() {
    let src = |post: &str| {
        format!(
            "pri func f(n: base.u32) {{\n\
             var i: base.u32\n\
             while i < n, post {post} {{\n\
             i = n\n\
             }}\n\
             assert {post}\n\
             }}\n"
        )
    };
    check(&src("i >= n")).unwrap();

    match check(&src("i > n")).unwrap_err() {
        CheckError::Unproven {
            condition, line, ..
        } => {
            assert_eq!(condition, "i > n");
            assert_eq!(line, 3);
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

#[test]
fn test_precondition_at_call_site() {
    let src = |input: &str| {
        format!(
            "pri struct T()\n\
             pri func T.h(x: base.u32), pre x < 100 {{}}\n\
             pri func T.g(y: {input}) {{\n\
             this.h(x: y)\n\
             }}\n"
        )
    };
    check(&src("base.u32[..= 50]")).unwrap();

    let err = check(&src("base.u32")).unwrap_err();
    match err {
        CheckError::Unproven {
            condition, detail, ..
        } => {
            assert_eq!(condition, "y < 100");
            assert_eq!(detail.as_deref(), Some("precondition of T.h"));
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

#[test]
fn test_postcondition_checked_at_return() {
    let src = |bound: &str| {
        format!(
            "pri func f(x: base.u32[..= {bound}]) base.u32, post x < 10 {{\n\
             return 0\n\
             }}\n"
        )
    };
    check(&src("9")).unwrap();
    let err = check(&src("10")).unwrap_err();
    match err {
        CheckError::Unproven { detail, .. } => {
            assert_eq!(detail.as_deref(), Some("postcondition"));
        }
        other => panic!("not Unproven: {other:?}"),
    }
}

// --- Dependencies ---

fn foo_deps(map: &TokenMap) -> Dependencies {
    let stub = parse_file(
        map,
        "std/foo.wuffs",
        "packageid \"foo\"\n\
         pub const MAX base.u32 = 10\n\
         pub status \"#oops\"\n",
    );
    let mut deps = Dependencies::default();
    deps.insert("std/foo".to_owned(), stub);
    deps
}

#[test]
fn test_used_package_consts() {
    let map = TokenMap::new();
    let package = check_with(
        "use \"std/foo\"\n\
         pri func f(x: base.u32[..= foo.MAX]) base.u32 {\n\
         return x + 1\n\
         }\n",
        &foo_deps(&map),
        &map,
    )
    .unwrap();
    assert_eq!(package.uses, vec!["std/foo".to_owned()]);
}

#[test]
fn test_missing_stub() {
    let map = TokenMap::new();
    let err = check_with("use \"std/bar\"\n", &foo_deps(&map), &map).unwrap_err();
    assert!(err.to_string().contains("no stub"), "{err}");
}

#[test]
fn test_valid_use_path() {
    assert!(valid_use_path("std/zlib"));
    assert!(valid_use_path("deflate"));
    assert!(!valid_use_path(""));
    assert!(!valid_use_path("std//zlib"));
    assert!(!valid_use_path("std/Zlib"));
    assert!(!valid_use_path("/std"));
    assert!(!valid_use_path("std/../x"));
}
