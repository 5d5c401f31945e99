use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_status() {
    assert_eq!(
        Status::parse("#bad header"),
        Some(Status::Error("bad header".to_owned()))
    );
    assert_eq!(
        Status::parse("@short read"),
        Some(Status::Suspension("short read".to_owned()))
    );
    assert_eq!(Status::parse("?odd"), None);
    assert_eq!(Status::parse("#"), None);
    assert_eq!(Status::parse(""), None);
}

#[test]
fn test_status_display() {
    let s = Status::parse("#bad header");
    assert_eq!(s.as_ref().map(ToString::to_string), Some("#bad header".to_owned()));
    assert_eq!(s.as_ref().map(Status::message), Some("bad header"));
    assert!(s.is_some_and(|s| s.is_error()));
    assert_eq!(Status::Ok.to_string(), "");
}
