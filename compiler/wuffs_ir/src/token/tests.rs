use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_token_id_packs_key_and_flags() {
    let id = TokenId::new(Key::new(0x1234), Flags::IDENT);
    assert_eq!(id.key(), Key::new(0x1234));
    assert_eq!(id.flags(), Flags::IDENT);
    assert_eq!(id.raw(), 0x1234_0080);
    assert!(id.is_ident());
    assert!(!id.is_literal());
}

#[test]
fn test_built_in_flags() {
    assert_eq!(TokenId::built_in(Key::U32).flags(), Flags::IDENT);
    assert_eq!(TokenId::built_in(Key::TRUE).flags(), Flags::LITERAL);
    assert!(TokenId::built_in(Key::ZERO).is_num_literal());
    assert_eq!(TokenId::built_in(Key::PLUS).flags(), Flags::OTHER);
    assert_eq!(TokenId::built_in(Key::IF).flags(), Flags::OTHER);
}

#[test]
fn test_disambiguation_forms() {
    assert_eq!(Key::PLUS.unary_form(), Key::X_UNARY_PLUS);
    assert_eq!(Key::PLUS.binary_form(), Key::X_BINARY_PLUS);
    assert_eq!(Key::PLUS.associative_form(), Key::X_ASSOCIATIVE_PLUS);
    assert_eq!(Key::MINUS.associative_form(), Key::INVALID);
    assert_eq!(Key::NOT.binary_form(), Key::INVALID);
    assert_eq!(Key::AS.binary_form(), Key::X_BINARY_AS);

    // Disambiguated forms map to themselves and back to the lexer form.
    assert_eq!(Key::X_BINARY_PLUS.binary_form(), Key::X_BINARY_PLUS);
    assert_eq!(Key::X_UNARY_MINUS.ambiguous_form(), Key::MINUS);
    assert_eq!(Key::X_ASSOCIATIVE_OR.ambiguous_form(), Key::OR);
}

#[test]
fn test_op_predicates() {
    assert!(Key::PLUS.is_unary_op());
    assert!(Key::PLUS.is_binary_op());
    assert!(Key::PLUS.is_associative_op());
    assert!(!Key::SLASH.is_associative_op());
    assert!(!Key::IF.is_binary_op());

    assert!(Key::X_UNARY_NOT.is_x_unary_op());
    assert!(!Key::X_UNARY_NOT.is_x_binary_op());
    assert!(Key::X_BINARY_LESS_EQ.is_x_binary_op());
    assert!(Key::X_BINARY_LESS_EQ.is_x_comparison());
    assert!(!Key::X_BINARY_PLUS.is_x_comparison());
    assert!(Key::X_ASSOCIATIVE_AND.is_x_associative_op());
}

#[test]
fn test_assign_binary_forms() {
    assert_eq!(Key::PLUS_EQ.assign_binary_form(), Key::X_BINARY_PLUS);
    assert_eq!(
        Key::TILDE_SAT_MINUS_EQ.assign_binary_form(),
        Key::X_BINARY_TILDE_SAT_MINUS
    );
    assert_eq!(Key::EQ.assign_binary_form(), Key::INVALID);
    assert!(Key::EQ.is_assign());
    assert!(Key::SHIFT_L_EQ.is_assign());
    assert!(!Key::SHIFT_L.is_assign());
}

#[test]
fn test_implicit_semicolon() {
    assert!(TokenId::built_in(Key::CLOSE_PAREN).is_implicit_semicolon());
    assert!(TokenId::built_in(Key::RETURN).is_implicit_semicolon());
    assert!(TokenId::built_in(Key::TRUE).is_implicit_semicolon());
    assert!(TokenId::built_in(Key::U8).is_implicit_semicolon());
    assert!(!TokenId::built_in(Key::OPEN_CURLY).is_implicit_semicolon());
    assert!(!TokenId::built_in(Key::PLUS).is_implicit_semicolon());
    assert!(!TokenId::built_in(Key::COMMA).is_implicit_semicolon());
}

#[test]
fn test_open_close() {
    assert!(Key::OPEN_BRACKET.is_open());
    assert!(Key::CLOSE_CURLY.is_close());
    assert!(!Key::CLOSE_CURLY.is_open());
    assert!(Key::U16.is_num_type());
    assert!(!Key::BOOL.is_num_type());
}

#[test]
fn test_squiggle_suffixes_longest_first() {
    for byte in b"!%&*+-./<=>^|~" {
        let suffixes = squiggle_suffixes(*byte);
        assert!(!suffixes.is_empty(), "no suffixes for {}", *byte as char);
        for pair in suffixes.windows(2) {
            let (a, b) = (pair[0].0, pair[1].0);
            // A suffix never shadows a longer one listed after it.
            assert!(
                !b.starts_with(a) || a == b,
                "{:?} shadows {:?} for {}",
                a,
                b,
                *byte as char
            );
        }
    }
    assert!(squiggle_suffixes(b'~').iter().all(|(s, _)| !s.is_empty()));
}

#[test]
fn test_lone_squiggles() {
    assert_eq!(lone_squiggle(b'('), Some(Key::OPEN_PAREN));
    assert_eq!(lone_squiggle(b'$'), Some(Key::DOLLAR));
    assert_eq!(lone_squiggle(b'+'), None);
}

#[test]
fn test_unescape() {
    assert_eq!(unescape("\"foo\""), Some("foo"));
    assert_eq!(unescape("'ab'"), Some("ab"));
    assert_eq!(unescape("\"#bad\""), Some("#bad"));
    assert_eq!(unescape("foo"), None);
    assert_eq!(unescape("\""), None);
}

#[test]
fn test_parse_num_literal() {
    assert_eq!(parse_num_literal("0"), Some(0));
    assert_eq!(parse_num_literal("1_000"), Some(1000));
    assert_eq!(parse_num_literal("0xFF"), Some(255));
    assert_eq!(parse_num_literal("0x_dead_beef"), Some(0xdead_beef));
    assert_eq!(parse_num_literal("0x"), None);
    assert_eq!(parse_num_literal("12ab"), None);
}

#[test]
fn test_built_in_names_unique() {
    let mut seen = std::collections::HashSet::new();
    for (key, name) in BUILT_IN_NAMES {
        assert!(key.is_built_in());
        assert!(seen.insert(*name), "duplicate name {name}");
    }
}

#[test]
fn test_unescape_bytes() {
    assert_eq!(unescape_bytes("'a'"), Some(vec![b'a']));
    assert_eq!(unescape_bytes("'\\x89PNG'be"), Some(vec![0x89, b'P', b'N', b'G']));
    assert_eq!(unescape_bytes("'\\n\\0'le"), Some(vec![b'\n', 0]));
    assert_eq!(unescape_bytes("'\\q'"), None);
    assert_eq!(unescape_bytes("'\\x4'"), None);
    assert_eq!(unescape_bytes("\"a\""), None);
}
