#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_machine_ranges() {
    assert_eq!(machine_range(Key::U8), Some(Interval::new(0, 255)));
    assert_eq!(machine_range(Key::I8), Some(Interval::new(-128, 127)));
    assert_eq!(
        machine_range(Key::U64),
        Some(Interval::new(0, i128::from(u64::MAX)))
    );
    assert_eq!(
        machine_range(Key::I64),
        Some(Interval::new(i128::from(i64::MIN), i128::from(i64::MAX)))
    );
    assert_eq!(machine_range(Key::BOOL), None);
}

#[test]
fn test_str() {
    let map = TokenMap::new();
    let u32 = Typ::num(Key::U32).unwrap();
    assert_eq!(u32.str(&map), "base.u32");

    let refined = Typ::Num {
        key: Key::U32,
        range: Interval::new(0, 20),
    };
    assert_eq!(refined.str(&map), "base.u32[0 ..= 20]");

    let array = Typ::Array {
        len: 4,
        elem: Box::new(Typ::num(Key::U8).unwrap()),
    };
    assert_eq!(array.str(&map), "array[4] base.u8");
    assert_eq!(Typ::Unit.str(&map), "()");
    assert_eq!(
        Typ::Slice(Box::new(Typ::num(Key::U8).unwrap())).str(&map),
        "slice base.u8"
    );
}

#[test]
fn test_accepts_ignores_refinements() {
    let u32 = Typ::num(Key::U32).unwrap();
    let small = Typ::Num {
        key: Key::U32,
        range: Interval::new(0, 20),
    };
    assert!(small.accepts(&u32));
    assert!(u32.accepts(&small));
    assert!(u32.accepts(&Typ::Ideal));
    assert!(!u32.accepts(&Typ::num(Key::U64).unwrap()));
    assert!(!Typ::Bool.accepts(&Typ::Ideal));
    assert_eq!(small.unrefined(), u32);
}

#[test]
fn test_unrefined_nested() {
    let refined = Typ::Array {
        len: 2,
        elem: Box::new(Typ::Num {
            key: Key::U8,
            range: Interval::new(1, 3),
        }),
    };
    assert_eq!(
        refined.unrefined(),
        Typ::Array {
            len: 2,
            elem: Box::new(Typ::num(Key::U8).unwrap()),
        }
    );
}

#[test]
fn test_has_pointers() {
    let u8 = Typ::num(Key::U8).unwrap();
    assert!(!u8.has_pointers());
    assert!(Typ::Ptr(Box::new(u8.clone())).has_pointers());
    assert!(Typ::Array {
        len: 3,
        elem: Box::new(Typ::Nptr(Box::new(u8.clone()))),
    }
    .has_pointers());
    assert!(!Typ::Slice(Box::new(u8)).has_pointers());
}

#[test]
fn test_bounds() {
    let small = Typ::Num {
        key: Key::U16,
        range: Interval::new(5, 9),
    };
    assert_eq!(small.bounds(), Some(Interval::new(5, 9)));
    assert_eq!(small.machine_bounds(), Some(Interval::new(0, 65535)));
    assert_eq!(Typ::Bool.bounds(), Some(Interval::new(0, 1)));
    assert_eq!(Typ::Status.bounds(), None);
    assert!(small.is_unsigned());
    assert!(!Typ::num(Key::I16).unwrap().is_unsigned());
}

#[test]
fn test_func_key_str() {
    let map = TokenMap::new();
    let key = FuncKey {
        package: Some(map.insert("zlib").unwrap()),
        receiver: Some(map.insert("decoder").unwrap()),
        name: map.insert("decode").unwrap(),
    };
    assert_eq!(key.str(&map), "zlib.decoder.decode");

    let free = FuncKey {
        package: None,
        receiver: None,
        name: map.insert("helper").unwrap(),
    };
    assert_eq!(free.str(&map), "helper");
    assert_eq!(Typ::Func(Callee::User(free)).str(&map), "func helper");
}
