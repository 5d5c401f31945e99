#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_built_ins_seeded() {
    let map = TokenMap::new();
    assert_eq!(map.by_name("u32"), Some(TokenId::built_in(Key::U32)));
    assert_eq!(map.by_name("<<="), Some(TokenId::built_in(Key::SHIFT_L_EQ)));
    assert_eq!(map.by_name("~sat+"), Some(TokenId::built_in(Key::TILDE_SAT_PLUS)));
    assert_eq!(map.by_name("nope"), None);
    assert!(map.is_empty());
}

#[test]
fn test_insert_is_stable() {
    let map = TokenMap::new();
    let a = map.insert("foo").unwrap();
    let b = map.insert("foo").unwrap();
    let c = map.insert("bar").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.key(), Key::new(Key::NUM_BUILT_IN));
    assert_eq!(map.by_id(a), "foo");
    assert_eq!(map.by_id(c), "bar");
    assert_eq!(map.len(), 2);
}

#[test]
fn test_insert_built_in_returns_built_in() {
    let map = TokenMap::new();
    assert_eq!(map.insert("if").unwrap(), TokenId::built_in(Key::IF));
    assert_eq!(map.insert("0").unwrap(), TokenId::built_in(Key::ZERO));
    assert!(map.is_empty());
}

#[test]
fn test_insert_classifies() {
    let map = TokenMap::new();
    let ident = map.insert("width").unwrap();
    let num = map.insert("0x10").unwrap();
    let s = map.insert("\"#bad header\"").unwrap();
    assert!(ident.is_ident());
    assert!(num.is_num_literal() && num.is_literal());
    assert!(s.is_str_literal() && s.is_literal());
    assert_eq!(
        map.insert("@@"),
        Err(TokenMapError::Unclassifiable("@@".to_owned()))
    );
}

#[test]
fn test_x_forms_display_as_operator() {
    let map = TokenMap::new();
    assert_eq!(map.by_key(Key::X_BINARY_PLUS), "+");
    assert_eq!(map.by_key(Key::X_UNARY_NOT), "not");
    assert_eq!(map.by_key(Key::X_ASSOCIATIVE_AND), "and");
    assert_eq!(map.by_key(Key::X_BINARY_AS), "as");
}

#[test]
fn test_too_many_tokens() {
    let map = TokenMap::new();
    let capacity = usize::from(u16::MAX - Key::NUM_BUILT_IN);
    for i in 0..capacity {
        map.insert(&format!("t{i}")).unwrap();
    }
    assert_eq!(map.insert("one_more"), Err(TokenMapError::TooManyTokens));
    assert_eq!(
        map.insert("t0").unwrap().key(),
        Key::new(Key::NUM_BUILT_IN)
    );
}
