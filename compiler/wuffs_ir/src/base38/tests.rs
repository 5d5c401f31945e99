use super::*;
use pretty_assertions::assert_eq;

fn mk(a: u32, b: u32, c: u32, d: u32) -> u32 {
    a * 38 * 38 * 38 + b * 38 * 38 + c * 38 + d
}

#[test]
fn test_max_bits() {
    assert_eq!(MAX, 38 * 38 * 38 * 38 - 1);
    assert!(1 << (MAX_BITS - 1) <= MAX && MAX < 1 << MAX_BITS);
}

#[test]
fn test_encode_valid() {
    let cases = [
        ("    ", mk(0, 0, 0, 0)),
        ("0   ", mk(1, 0, 0, 0)),
        ("   0", mk(0, 0, 0, 1)),
        ("??12", mk(11, 11, 2, 3)),
        ("789a", mk(8, 9, 10, 12)),
        (" m0m", mk(0, 24, 1, 24)),
        ("z?z9", mk(37, 11, 37, 10)),
        ("zzzz", MAX),
    ];
    for (s, want) in cases {
        assert_eq!(encode(s), Some(want), "{s:?}");
    }
}

#[test]
fn test_encode_invalid() {
    for s in ["", " ", "   ", "....", "     ", "Abcd", "a\0cd", "ab+d", "abc\u{80}"] {
        assert_eq!(encode(s), None, "{s:?}");
    }
}

#[test]
fn test_encode_padded() {
    assert_eq!(encode_padded("gif"), encode("gif "));
    assert_eq!(encode_padded("crc3"), encode("crc3"));
    assert_eq!(encode_padded("crc32"), None);
}
