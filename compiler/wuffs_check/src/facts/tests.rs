#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;
use wuffs_ir::token::parse_num_literal;

fn expr(map: &TokenMap, src: &str) -> Expr {
    let tokens = wuffs_lexer::lex(map, "a.wuffs", src.as_bytes()).unwrap();
    wuffs_parse::parse_expr(map, "a.wuffs", &tokens).unwrap()
}

fn facts(map: &TokenMap, srcs: &[&str]) -> FactSet {
    let mut set = FactSet::new();
    for src in srcs {
        set.append(expr(map, src));
    }
    set
}

fn literal(map: &TokenMap) -> impl Fn(&Expr) -> Option<i128> + '_ {
    move |e: &Expr| match e {
        Expr::Literal(id) if id.is_num_literal() => parse_num_literal(map.by_id(*id)),
        _ => None,
    }
}

#[test]
fn test_append_splits_conjunctions() {
    let map = TokenMap::new();
    let set = facts(&map, &["(a < b) and (c < d)", "e and f and g"]);
    assert_eq!(
        set.render(&map),
        vec!["a < b", "c < d", "e", "f", "g"]
    );
}

#[test]
fn test_append_dedupes() {
    let map = TokenMap::new();
    let set = facts(&map, &["a < b", "a < b", "b > a"]);
    assert_eq!(set.len(), 2);
    assert!(set.contains(&expr(&map, "b > a")));
}

#[test]
fn test_append_brings_equals() {
    let map = TokenMap::new();
    let set = facts(&map, &["x == y", "y == x", "x"]);
    assert!(set.contains(&expr(&map, "y")));
    assert!(set.contains(&expr(&map, "x")));
}

#[test]
fn test_retain_unmentioned() {
    let map = TokenMap::new();
    let mut set = facts(&map, &["a < b", "c < d", "a.f == 3"]);
    set.retain_unmentioned(&expr(&map, "a"));
    assert_eq!(set.render(&map), vec!["c < d"]);
}

#[test]
fn test_refine() {
    let map = TokenMap::new();
    let x = expr(&map, "x");
    let set = facts(&map, &["x < 10", "3 <= x", "x != 9"]);
    assert_eq!(
        set.refine(&x, Interval::new(0, 255), literal(&map)),
        Ok(Interval::new(3, 8))
    );

    let eq = facts(&map, &["x == 4"]);
    assert_eq!(
        eq.refine(&x, Interval::new(0, 255), literal(&map)),
        Ok(Interval::point(4))
    );

    let untouched = facts(&map, &["y < 10", "x < z"]);
    assert_eq!(
        untouched.refine(&x, Interval::new(0, 255), literal(&map)),
        Ok(Interval::new(0, 255))
    );
}

#[test]
fn test_refine_contradiction() {
    let map = TokenMap::new();
    let x = expr(&map, "x");
    let set = facts(&map, &["x > 20"]);
    let err = set
        .refine(&x, Interval::new(0, 10), literal(&map))
        .unwrap_err();
    assert_eq!(err.fact, expr(&map, "x > 20"));
    assert_eq!(err.before, Interval::new(0, 10));

    let eq = facts(&map, &["x == 300"]);
    assert!(eq.refine(&x, Interval::new(0, 255), literal(&map)).is_err());
}

#[test]
fn test_refine_at_the_ends_of_i128() {
    let map = TokenMap::new();
    let x = expr(&map, "x");
    let extremes = |e: &Expr| match e {
        Expr::Ident(id) if map.by_id(*id) == "lowest" => Some(i128::MIN),
        Expr::Ident(id) if map.by_id(*id) == "highest" => Some(i128::MAX),
        _ => None,
    };
    let wide = Interval::new(i128::MIN, i128::MAX);

    let err = facts(&map, &["x < lowest"]).refine(&x, wide, extremes).unwrap_err();
    assert_eq!(err.fact, expr(&map, "x < lowest"));
    assert_eq!(err.before, wide);

    assert!(facts(&map, &["x > highest"]).refine(&x, wide, extremes).is_err());
    assert!(facts(&map, &["x != highest"])
        .refine(&x, Interval::point(i128::MAX), extremes)
        .is_err());
    assert!(facts(&map, &["x != lowest"])
        .refine(&x, Interval::point(i128::MIN), extremes)
        .is_err());
    assert_eq!(
        facts(&map, &["x != highest"]).refine(&x, wide, extremes),
        Ok(Interval::new(i128::MIN, i128::MAX - 1))
    );
}

#[test]
fn test_refine_unbounded_is_untouched() {
    let map = TokenMap::new();
    let set = facts(&map, &["x < 10"]);
    assert_eq!(
        set.refine(&expr(&map, "x"), Interval::UNBOUNDED, literal(&map)),
        Ok(Interval::UNBOUNDED)
    );
}

#[test]
fn test_update() {
    let map = TokenMap::new();
    let mut set = facts(&map, &["i < n", "j < n"]);
    let i = expr(&map, "i");
    set.update(|x| {
        if x.mentions(&i) {
            None
        } else {
            Some(x.clone())
        }
    });
    assert_eq!(set.render(&map), vec!["j < n"]);
}

#[test]
fn test_intersect() {
    let map = TokenMap::new();
    let a = facts(&map, &["p", "q", "r"]);
    let b = facts(&map, &["r", "p"]);
    assert_eq!(FactSet::intersect(&[a, b]).render(&map), vec!["p", "r"]);
    assert!(FactSet::intersect(&[]).is_empty());
}

#[test]
fn test_other_hand_side() {
    let map = TokenMap::new();
    let fact = expr(&map, "10 > x");
    let (op, other) = other_hand_side(&fact, &expr(&map, "x")).unwrap();
    assert_eq!(op, Key::X_BINARY_LESS_THAN);
    assert_eq!(other.str(&map), "10");
    assert!(other_hand_side(&fact, &expr(&map, "y")).is_none());
    assert!(other_hand_side(&expr(&map, "x + 1"), &expr(&map, "x")).is_none());
}

#[test]
fn test_display() {
    let map = TokenMap::new();
    let set = facts(&map, &["a < b", "c"]);
    assert_eq!(set.display(&map).to_string(), "a < b\nc");
}
