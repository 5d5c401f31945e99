#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

fn expr(map: &TokenMap, src: &str) -> Expr {
    let tokens = wuffs_lexer::lex(map, "a.wuffs", src.as_bytes()).unwrap();
    wuffs_parse::parse_expr(map, "a.wuffs", &tokens).unwrap()
}

fn simplified(map: &TokenMap, src: &str) -> String {
    simplify(map, &expr(map, src)).str(map)
}

#[test]
fn test_fold_literals() {
    let map = TokenMap::new();
    assert_eq!(fold(&map, &expr(&map, "(1 + 2) * 3"), &no_leaf), Some(9));
    assert_eq!(fold(&map, &expr(&map, "0x10 >> 2"), &no_leaf), Some(4));
    assert_eq!(fold(&map, &expr(&map, "-(4 - 6)"), &no_leaf), Some(2));
    assert_eq!(fold(&map, &expr(&map, "1 + 2 + 3"), &no_leaf), Some(6));
    assert_eq!(fold(&map, &expr(&map, "true and false"), &no_leaf), Some(0));
    assert_eq!(fold(&map, &expr(&map, "x + 1"), &no_leaf), None);
}

#[test]
fn test_fold_leaf() {
    let map = TokenMap::new();
    let n = map.insert("n").unwrap();
    let leaf = |e: &Expr| (e.as_ident() == Some(n)).then_some(7);
    assert_eq!(fold(&map, &expr(&map, "n * 2"), &leaf), Some(14));
    assert_eq!(fold(&map, &expr(&map, "m * 2"), &leaf), None);
}

#[test]
fn test_binary_const_edges() {
    assert_eq!(binary_const(Key::X_BINARY_SLASH, 7, 0), None);
    assert_eq!(binary_const(Key::X_BINARY_PERCENT, 7, 0), None);
    assert_eq!(binary_const(Key::X_BINARY_SHIFT_L, 1, -1), None);
    assert_eq!(binary_const(Key::X_BINARY_SHIFT_L, 1, 200), None);
    assert_eq!(binary_const(Key::X_BINARY_SHIFT_L, 3, 4), Some(48));
    assert_eq!(binary_const(Key::X_BINARY_SHIFT_R, 5, 300), Some(0));
    assert_eq!(binary_const(Key::X_BINARY_PLUS, i128::MAX, 1), None);
    assert_eq!(binary_const(Key::X_BINARY_TILDE_MOD_PLUS, 1, 1), None);
    assert_eq!(binary_const(Key::X_BINARY_GREATER_EQ, 3, 3), Some(1));
}

#[test]
fn test_simplify() {
    let map = TokenMap::new();
    assert_eq!(simplified(&map, "1 + 2"), "3");
    assert_eq!(simplified(&map, "(x + y) - y"), "x");
    assert_eq!(simplified(&map, "(x + y) - x"), "y");
    assert_eq!(simplified(&map, "x - x"), "0");
    assert_eq!(simplified(&map, "x < (100 + 1)"), "x < 101");
    assert_eq!(simplified(&map, "x + 1"), "x + 1");
}

#[test]
fn test_const_expr() {
    let map = TokenMap::new();
    assert_eq!(const_expr(&map, 0).unwrap(), Expr::zero());
    assert_eq!(const_expr(&map, 42).unwrap().str(&map), "42");
    let negative = const_expr(&map, -5).unwrap();
    assert_eq!(negative.str(&map), "-5");
    assert_eq!(fold(&map, &negative, &no_leaf), Some(-5));
}

#[test]
fn test_invert() {
    let map = TokenMap::new();
    assert_eq!(invert(&expr(&map, "a < b")).str(&map), "a >= b");
    assert_eq!(invert(&expr(&map, "a == b")).str(&map), "a != b");
    assert_eq!(
        invert(&expr(&map, "(a < b) and (c > d)")).str(&map),
        "(a >= b) or (c <= d)"
    );
    assert_eq!(invert(&expr(&map, "not a")), expr(&map, "a"));
    assert_eq!(invert(&expr(&map, "a")).str(&map), "not a");
}

#[test]
fn test_mirror_and_negate() {
    assert_eq!(
        mirror_comparison(Key::X_BINARY_LESS_THAN),
        Some(Key::X_BINARY_GREATER_THAN)
    );
    assert_eq!(
        mirror_comparison(Key::X_BINARY_EQ_EQ),
        Some(Key::X_BINARY_EQ_EQ)
    );
    assert_eq!(mirror_comparison(Key::X_BINARY_PLUS), None);
    assert_eq!(
        negate_comparison(Key::X_BINARY_LESS_EQ),
        Some(Key::X_BINARY_GREATER_THAN)
    );
}

#[test]
fn test_substitute_idents_is_simultaneous() {
    let map = TokenMap::new();
    let a = map.insert("a").unwrap();
    let b = map.insert("b").unwrap();
    let swapped = substitute_idents(&expr(&map, "a < b"), &|id| {
        if id == a {
            Some(Expr::ident(b))
        } else if id == b {
            Some(Expr::ident(a))
        } else {
            None
        }
    });
    assert_eq!(swapped.str(&map), "b < a");
}

#[test]
fn test_substitute_idents_keeps_field_names() {
    let map = TokenMap::new();
    let x = map.insert("x").unwrap();
    let y = map.insert("y").unwrap();
    let sub = |id: TokenId| (id == x).then(|| Expr::ident(y));
    let out = substitute_idents(&expr(&map, "x.x + this.f(a: x)"), &sub);
    assert_eq!(out.str(&map), "y.x + this.f(a: y)");
}
