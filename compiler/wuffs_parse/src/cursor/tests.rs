use super::*;
use pretty_assertions::assert_eq;

fn tokens() -> Vec<Token> {
    vec![
        Token::new(TokenId::built_in(Key::RETURN), 3),
        Token::new(TokenId::built_in(Key::TRUE), 3),
        Token::new(TokenId::built_in(Key::SEMICOLON), 4),
    ]
}

#[test]
fn test_cursor_navigation() {
    let tokens = tokens();
    let mut cursor = Cursor::new(&tokens);
    assert_eq!(cursor.current_key(), Key::RETURN);
    assert_eq!(cursor.peek_key(1), Key::TRUE);
    assert_eq!(cursor.peek_key(5), Key::INVALID);
    assert_eq!(cursor.advance(), TokenId::built_in(Key::RETURN));
    assert!(cursor.check(Key::TRUE));
    assert!(!cursor.eat(Key::SEMICOLON));
    assert!(cursor.eat(Key::TRUE));
    assert_eq!(cursor.line(), 4);
    assert_eq!(cursor.position(), 2);
}

#[test]
fn test_cursor_end() {
    let tokens = tokens();
    let mut cursor = Cursor::new(&tokens);
    for _ in 0..3 {
        cursor.advance();
    }
    assert!(cursor.is_at_end());
    assert_eq!(cursor.current_id(), TokenId::INVALID);
    assert_eq!(cursor.advance(), TokenId::INVALID);
    assert!(!cursor.check(Key::INVALID));
    assert_eq!(cursor.line(), 4);
    assert_eq!(Cursor::new(&[]).line(), 1);
}
