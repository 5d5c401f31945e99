//! Token model: keys, flags and the built-in tables.
//!
//! A [`TokenId`] packs a [`Key`] (high 16 bits) and [`Flags`] (low 16 bits).
//! Keys below [`Key::NUM_BUILT_IN`] are fixed; identifiers and literals seen
//! in source are handed fresh keys by a [`TokenMap`](crate::TokenMap).
//!
//! # Key Layout
//!
//! - `0x00` invalid, `0x01` the ideal integer type `ℤ`
//! - `0x10..=0x1F` punctuation, such as `(` and `;`
//! - `0x20..=0x3F` assignments, such as `=` and `+=`
//! - `0x40..=0x5F` operators, such as `+`, `==` and `not`
//! - `0x60..=0x7F` keywords, such as `if` and `return`
//! - `0x80..=0x87` type modifiers, such as `ptr` and `slice`
//! - `0x88..=0x8F` literals `false`, `true` and `0`
//! - `0x90..=0xCF` built-in identifiers, such as `u32` and `this`
//! - `0xD0..=0xFF` disambiguated operator forms (unary `+` vs binary `+`)
//!
//! The lexer only ever produces ambiguous operator keys. The parser picks
//! the unary, binary or associative form once it knows the operator's
//! position.

use bitflags::bitflags;

#[cfg(test)]
mod tests;

bitflags! {
    /// Token class bits, the low 16 bits of a [`TokenId`].
    ///
    /// A valid token has non-zero flags. If no other class applies, `OTHER`
    /// is set.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Flags: u16 {
        const OTHER = 0x0001;
        const LITERAL = 0x0010;
        const NUM_LITERAL = 0x0020;
        const STR_LITERAL = 0x0040;
        const IDENT = 0x0080;
    }
}

bitflags! {
    /// Per-key syntactic classes used by the lexer and parser.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    struct KeyClass: u8 {
        const OPEN = 1 << 0;
        const CLOSE = 1 << 1;
        const IMPLICIT_SEMICOLON = 1 << 2;
        const ASSIGN = 1 << 3;
        const NUM_TYPE = 1 << 4;
    }
}

/// Semantic identity of a token, the high 16 bits of a [`TokenId`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Key(u16);

impl Key {
    /// Keys below this value are built in; the rest are assigned by a map.
    pub const NUM_BUILT_IN: u16 = 256;

    pub const INVALID: Key = Key(0x00);
    pub const DOUBLE_Z: Key = Key(0x01);

    pub const OPEN_PAREN: Key = Key(0x10);
    pub const CLOSE_PAREN: Key = Key(0x11);
    pub const OPEN_BRACKET: Key = Key(0x12);
    pub const CLOSE_BRACKET: Key = Key(0x13);
    pub const OPEN_CURLY: Key = Key(0x14);
    pub const CLOSE_CURLY: Key = Key(0x15);
    pub const DOT: Key = Key(0x16);
    pub const DOT_DOT: Key = Key(0x17);
    pub const DOT_DOT_EQ: Key = Key(0x18);
    pub const COMMA: Key = Key(0x19);
    pub const EXCLAM: Key = Key(0x1A);
    pub const QUESTION: Key = Key(0x1B);
    pub const COLON: Key = Key(0x1C);
    pub const SEMICOLON: Key = Key(0x1D);
    pub const DOLLAR: Key = Key(0x1E);

    pub const EQ: Key = Key(0x20);
    pub const PLUS_EQ: Key = Key(0x21);
    pub const MINUS_EQ: Key = Key(0x22);
    pub const STAR_EQ: Key = Key(0x23);
    pub const SLASH_EQ: Key = Key(0x24);
    pub const SHIFT_L_EQ: Key = Key(0x25);
    pub const SHIFT_R_EQ: Key = Key(0x26);
    pub const AMP_EQ: Key = Key(0x27);
    pub const PIPE_EQ: Key = Key(0x28);
    pub const HAT_EQ: Key = Key(0x29);
    pub const PERCENT_EQ: Key = Key(0x2A);
    pub const TILDE_MOD_SHIFT_L_EQ: Key = Key(0x2B);
    pub const TILDE_MOD_PLUS_EQ: Key = Key(0x2C);
    pub const TILDE_MOD_MINUS_EQ: Key = Key(0x2D);
    pub const TILDE_MOD_STAR_EQ: Key = Key(0x2E);
    pub const TILDE_SAT_PLUS_EQ: Key = Key(0x2F);
    pub const TILDE_SAT_MINUS_EQ: Key = Key(0x30);

    pub const PLUS: Key = Key(0x40);
    pub const MINUS: Key = Key(0x41);
    pub const STAR: Key = Key(0x42);
    pub const SLASH: Key = Key(0x43);
    pub const SHIFT_L: Key = Key(0x44);
    pub const SHIFT_R: Key = Key(0x45);
    pub const AMP: Key = Key(0x46);
    pub const PIPE: Key = Key(0x47);
    pub const HAT: Key = Key(0x48);
    pub const PERCENT: Key = Key(0x49);
    pub const TILDE_MOD_SHIFT_L: Key = Key(0x4A);
    pub const TILDE_MOD_PLUS: Key = Key(0x4B);
    pub const TILDE_MOD_MINUS: Key = Key(0x4C);
    pub const TILDE_MOD_STAR: Key = Key(0x4D);
    pub const TILDE_SAT_PLUS: Key = Key(0x4E);
    pub const TILDE_SAT_MINUS: Key = Key(0x4F);
    pub const NOT_EQ: Key = Key(0x50);
    pub const LESS_THAN: Key = Key(0x51);
    pub const LESS_EQ: Key = Key(0x52);
    pub const EQ_EQ: Key = Key(0x53);
    pub const GREATER_EQ: Key = Key(0x54);
    pub const GREATER_THAN: Key = Key(0x55);
    pub const AND: Key = Key(0x56);
    pub const OR: Key = Key(0x57);
    pub const NOT: Key = Key(0x58);
    pub const AS: Key = Key(0x59);

    pub const FUNC: Key = Key(0x60);
    pub const ASSERT: Key = Key(0x61);
    pub const WHILE: Key = Key(0x62);
    pub const IF: Key = Key(0x63);
    pub const ELSE: Key = Key(0x64);
    pub const RETURN: Key = Key(0x65);
    pub const BREAK: Key = Key(0x66);
    pub const CONTINUE: Key = Key(0x67);
    pub const STRUCT: Key = Key(0x68);
    pub const USE: Key = Key(0x69);
    pub const VAR: Key = Key(0x6A);
    pub const PRE: Key = Key(0x6B);
    pub const INV: Key = Key(0x6C);
    pub const POST: Key = Key(0x6D);
    pub const VIA: Key = Key(0x6E);
    pub const PUB: Key = Key(0x6F);
    pub const PRI: Key = Key(0x70);
    pub const CONST: Key = Key(0x71);
    pub const PACKAGE_ID: Key = Key(0x72);

    pub const ARRAY: Key = Key(0x80);
    pub const NPTR: Key = Key(0x81);
    pub const PTR: Key = Key(0x82);
    pub const SLICE: Key = Key(0x83);
    pub const TABLE: Key = Key(0x84);

    pub const FALSE: Key = Key(0x88);
    pub const TRUE: Key = Key(0x89);
    pub const ZERO: Key = Key(0x8A);

    pub const UNDERSCORE: Key = Key(0x90);
    pub const THIS: Key = Key(0x91);
    pub const BASE: Key = Key(0x92);
    pub const I8: Key = Key(0x98);
    pub const I16: Key = Key(0x99);
    pub const I32: Key = Key(0x9A);
    pub const I64: Key = Key(0x9B);
    pub const U8: Key = Key(0x9C);
    pub const U16: Key = Key(0x9D);
    pub const U32: Key = Key(0x9E);
    pub const U64: Key = Key(0x9F);
    pub const BOOL: Key = Key(0xA0);
    pub const STATUS: Key = Key(0xA1);
    pub const IO_READER: Key = Key(0xA2);
    pub const IO_WRITER: Key = Key(0xA3);
    pub const LENGTH: Key = Key(0xA8);

    pub const X_UNARY_PLUS: Key = Key(0xD0);
    pub const X_UNARY_MINUS: Key = Key(0xD1);
    pub const X_UNARY_NOT: Key = Key(0xD2);

    pub const X_BINARY_PLUS: Key = Key(0xD8);
    pub const X_BINARY_MINUS: Key = Key(0xD9);
    pub const X_BINARY_STAR: Key = Key(0xDA);
    pub const X_BINARY_SLASH: Key = Key(0xDB);
    pub const X_BINARY_SHIFT_L: Key = Key(0xDC);
    pub const X_BINARY_SHIFT_R: Key = Key(0xDD);
    pub const X_BINARY_AMP: Key = Key(0xDE);
    pub const X_BINARY_PIPE: Key = Key(0xDF);
    pub const X_BINARY_HAT: Key = Key(0xE0);
    pub const X_BINARY_PERCENT: Key = Key(0xE1);
    pub const X_BINARY_TILDE_MOD_SHIFT_L: Key = Key(0xE2);
    pub const X_BINARY_TILDE_MOD_PLUS: Key = Key(0xE3);
    pub const X_BINARY_TILDE_MOD_MINUS: Key = Key(0xE4);
    pub const X_BINARY_TILDE_MOD_STAR: Key = Key(0xE5);
    pub const X_BINARY_TILDE_SAT_PLUS: Key = Key(0xE6);
    pub const X_BINARY_TILDE_SAT_MINUS: Key = Key(0xE7);
    pub const X_BINARY_NOT_EQ: Key = Key(0xE8);
    pub const X_BINARY_LESS_THAN: Key = Key(0xE9);
    pub const X_BINARY_LESS_EQ: Key = Key(0xEA);
    pub const X_BINARY_EQ_EQ: Key = Key(0xEB);
    pub const X_BINARY_GREATER_EQ: Key = Key(0xEC);
    pub const X_BINARY_GREATER_THAN: Key = Key(0xED);
    pub const X_BINARY_AND: Key = Key(0xEE);
    pub const X_BINARY_OR: Key = Key(0xEF);
    pub const X_BINARY_AS: Key = Key(0xF0);

    pub const X_ASSOCIATIVE_PLUS: Key = Key(0xF8);
    pub const X_ASSOCIATIVE_STAR: Key = Key(0xF9);
    pub const X_ASSOCIATIVE_AMP: Key = Key(0xFA);
    pub const X_ASSOCIATIVE_PIPE: Key = Key(0xFB);
    pub const X_ASSOCIATIVE_HAT: Key = Key(0xFC);
    pub const X_ASSOCIATIVE_AND: Key = Key(0xFD);
    pub const X_ASSOCIATIVE_OR: Key = Key(0xFE);

    /// Create a key from its raw value.
    pub const fn new(raw: u16) -> Self {
        Key(raw)
    }

    /// The raw 16-bit value.
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn table_lookup(self, table: &[Key; 256]) -> Key {
        table.get(self.index()).copied().unwrap_or(Key::INVALID)
    }

    #[inline]
    fn class(self) -> KeyClass {
        KEY_CLASSES
            .get(self.index())
            .map_or(KeyClass::empty(), |&bits| KeyClass::from_bits_retain(bits))
    }

    pub fn is_built_in(self) -> bool {
        self.0 < Self::NUM_BUILT_IN
    }

    /// The unary form of an operator, or `INVALID` if it has none.
    pub fn unary_form(self) -> Key {
        self.table_lookup(&UNARY_FORMS)
    }

    /// The binary form of an operator, or `INVALID` if it has none.
    pub fn binary_form(self) -> Key {
        self.table_lookup(&BINARY_FORMS)
    }

    /// The associative form of an operator, or `INVALID` if it has none.
    pub fn associative_form(self) -> Key {
        self.table_lookup(&ASSOCIATIVE_FORMS)
    }

    /// The lexer-level operator a disambiguated form came from.
    pub fn ambiguous_form(self) -> Key {
        self.table_lookup(&AMBIGUOUS_FORMS)
    }

    /// The binary operator applied by a compound assignment (`+=` gives
    /// binary `+`), or `INVALID` for plain `=`.
    pub fn assign_binary_form(self) -> Key {
        self.table_lookup(&ASSIGN_BINARY_FORMS)
    }

    fn is_op(self) -> bool {
        (Key::PLUS.0..=Key::AS.0).contains(&self.0)
    }

    fn is_x_op(self) -> bool {
        (Key::X_UNARY_PLUS.0..=Key::X_ASSOCIATIVE_OR.0).contains(&self.0)
    }

    pub fn is_unary_op(self) -> bool {
        self.is_op() && self.unary_form() != Key::INVALID
    }

    pub fn is_binary_op(self) -> bool {
        self.is_op() && self.binary_form() != Key::INVALID
    }

    pub fn is_associative_op(self) -> bool {
        self.is_op() && self.associative_form() != Key::INVALID
    }

    pub fn is_x_unary_op(self) -> bool {
        self.is_x_op() && self.unary_form() == self
    }

    pub fn is_x_binary_op(self) -> bool {
        self.is_x_op() && self.binary_form() == self
    }

    pub fn is_x_associative_op(self) -> bool {
        self.is_x_op() && self.associative_form() == self
    }

    /// Binary comparison forms: `!=`, `<`, `<=`, `==`, `>=`, `>`.
    pub fn is_x_comparison(self) -> bool {
        (Key::X_BINARY_NOT_EQ.0..=Key::X_BINARY_GREATER_THAN.0).contains(&self.0)
    }

    pub fn is_open(self) -> bool {
        self.class().contains(KeyClass::OPEN)
    }

    pub fn is_close(self) -> bool {
        self.class().contains(KeyClass::CLOSE)
    }

    pub fn is_assign(self) -> bool {
        self.class().contains(KeyClass::ASSIGN)
    }

    pub fn is_num_type(self) -> bool {
        self.class().contains(KeyClass::NUM_TYPE)
    }
}

/// A key plus its flags.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct TokenId(u32);

/// Number of low bits holding [`Flags`].
const FLAGS_BITS: u32 = 16;

impl TokenId {
    pub const INVALID: TokenId = TokenId(0);

    #[inline]
    pub const fn new(key: Key, flags: Flags) -> Self {
        TokenId(((key.0 as u32) << FLAGS_BITS) | flags.bits() as u32)
    }

    /// The canonical id of a built-in key.
    pub const fn built_in(key: Key) -> Self {
        TokenId::new(key, built_in_flags(key))
    }

    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "shifting a u32 right by 16 leaves 16 bits"
    )]
    pub const fn key(self) -> Key {
        Key((self.0 >> FLAGS_BITS) as u16)
    }

    #[inline]
    #[expect(clippy::cast_possible_truncation, reason = "masked to the low 16 bits")]
    pub const fn flags(self) -> Flags {
        Flags::from_bits_retain((self.0 & 0xFFFF) as u16)
    }

    /// The raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn is_literal(self) -> bool {
        self.flags().contains(Flags::LITERAL)
    }

    pub fn is_num_literal(self) -> bool {
        self.flags().contains(Flags::NUM_LITERAL)
    }

    pub fn is_str_literal(self) -> bool {
        self.flags().contains(Flags::STR_LITERAL)
    }

    pub fn is_ident(self) -> bool {
        self.flags().contains(Flags::IDENT)
    }

    /// Whether a newline after this token ends the statement.
    pub fn is_implicit_semicolon(self) -> bool {
        self.is_literal()
            || self.is_ident()
            || self.key().class().contains(KeyClass::IMPLICIT_SEMICOLON)
    }
}

/// Flags carried by a built-in key.
const fn built_in_flags(key: Key) -> Flags {
    match key.0 {
        0x88 | 0x89 => Flags::LITERAL,
        0x8A => Flags::LITERAL.union(Flags::NUM_LITERAL),
        0x90..=0xCF => Flags::IDENT,
        _ => Flags::OTHER,
    }
}

/// A lexed token and the line it was seen on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub id: TokenId,
    pub line: u32,
}

impl Token {
    pub fn new(id: TokenId, line: u32) -> Self {
        Token { id, line }
    }
}

/// A qualified name such as `pkg.name`. The package is absent for a plain
/// `name`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QId {
    pub package: Option<TokenId>,
    pub name: TokenId,
}

impl QId {
    pub fn new(package: Option<TokenId>, name: TokenId) -> Self {
        QId { package, name }
    }

    pub fn str(&self, map: &crate::TokenMap) -> String {
        match self.package {
            Some(package) => format!("{}.{}", map.by_id(package), map.by_id(self.name)),
            None => map.by_id(self.name).to_owned(),
        }
    }
}

/// A doubly qualified name such as `recvPkg.recvType.funcName`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QQId {
    pub receiver: Option<QId>,
    pub name: TokenId,
}

impl QQId {
    pub fn new(receiver: Option<QId>, name: TokenId) -> Self {
        QQId { receiver, name }
    }

    pub fn str(&self, map: &crate::TokenMap) -> String {
        match &self.receiver {
            Some(receiver) => format!("{}.{}", receiver.str(map), map.by_id(self.name)),
            None => map.by_id(self.name).to_owned(),
        }
    }
}

/// Strip the quotes from a string literal. Literals never contain escapes.
pub fn unescape(literal: &str) -> Option<&str> {
    let inner = literal.strip_prefix('"')?.strip_suffix('"');
    if let Some(inner) = inner {
        return Some(inner);
    }
    literal.strip_prefix('\'')?.strip_suffix('\'')
}

/// Decode a `'...'` literal, with an optional `be` or `le` suffix, to the
/// bytes it denotes. Supports `\\`, `\'`, `\"`, `\0`, `\n`, `\r`, `\t`
/// and `\xHH` escapes.
pub fn unescape_bytes(literal: &str) -> Option<Vec<u8>> {
    let body = literal.strip_prefix('\'')?;
    let body = body
        .strip_suffix("'be")
        .or_else(|| body.strip_suffix("'le"))
        .or_else(|| body.strip_suffix('\''))?;

    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c != b'\\' {
            out.push(c);
            i += 1;
            continue;
        }
        let escaped = *bytes.get(i + 1)?;
        let simple = match escaped {
            b'\\' => Some(b'\\'),
            b'\'' => Some(b'\''),
            b'"' => Some(b'"'),
            b'0' => Some(0),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            _ => None,
        };
        if let Some(b) = simple {
            out.push(b);
            i += 2;
            continue;
        }
        if escaped != b'x' {
            return None;
        }
        let hex = body.get(i + 2..i + 4)?;
        out.push(u8::from_str_radix(hex, 16).ok()?);
        i += 4;
    }
    Some(out)
}

/// Parse a numeric literal as lexed: decimal or `0x` hex, with `_`
/// separators.
pub fn parse_num_literal(text: &str) -> Option<i128> {
    let (digits, radix) = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() {
        return None;
    }
    i128::from_str_radix(&digits, radix).ok()
}

/// Names of the keys the lexer can produce, in key order.
pub(crate) const BUILT_IN_NAMES: &[(Key, &str)] = &[
    (Key::DOUBLE_Z, "ℤ"),
    (Key::OPEN_PAREN, "("),
    (Key::CLOSE_PAREN, ")"),
    (Key::OPEN_BRACKET, "["),
    (Key::CLOSE_BRACKET, "]"),
    (Key::OPEN_CURLY, "{"),
    (Key::CLOSE_CURLY, "}"),
    (Key::DOT, "."),
    (Key::DOT_DOT, ".."),
    (Key::DOT_DOT_EQ, "..="),
    (Key::COMMA, ","),
    (Key::EXCLAM, "!"),
    (Key::QUESTION, "?"),
    (Key::COLON, ":"),
    (Key::SEMICOLON, ";"),
    (Key::DOLLAR, "$"),
    (Key::EQ, "="),
    (Key::PLUS_EQ, "+="),
    (Key::MINUS_EQ, "-="),
    (Key::STAR_EQ, "*="),
    (Key::SLASH_EQ, "/="),
    (Key::SHIFT_L_EQ, "<<="),
    (Key::SHIFT_R_EQ, ">>="),
    (Key::AMP_EQ, "&="),
    (Key::PIPE_EQ, "|="),
    (Key::HAT_EQ, "^="),
    (Key::PERCENT_EQ, "%="),
    (Key::TILDE_MOD_SHIFT_L_EQ, "~mod<<="),
    (Key::TILDE_MOD_PLUS_EQ, "~mod+="),
    (Key::TILDE_MOD_MINUS_EQ, "~mod-="),
    (Key::TILDE_MOD_STAR_EQ, "~mod*="),
    (Key::TILDE_SAT_PLUS_EQ, "~sat+="),
    (Key::TILDE_SAT_MINUS_EQ, "~sat-="),
    (Key::PLUS, "+"),
    (Key::MINUS, "-"),
    (Key::STAR, "*"),
    (Key::SLASH, "/"),
    (Key::SHIFT_L, "<<"),
    (Key::SHIFT_R, ">>"),
    (Key::AMP, "&"),
    (Key::PIPE, "|"),
    (Key::HAT, "^"),
    (Key::PERCENT, "%"),
    (Key::TILDE_MOD_SHIFT_L, "~mod<<"),
    (Key::TILDE_MOD_PLUS, "~mod+"),
    (Key::TILDE_MOD_MINUS, "~mod-"),
    (Key::TILDE_MOD_STAR, "~mod*"),
    (Key::TILDE_SAT_PLUS, "~sat+"),
    (Key::TILDE_SAT_MINUS, "~sat-"),
    (Key::NOT_EQ, "!="),
    (Key::LESS_THAN, "<"),
    (Key::LESS_EQ, "<="),
    (Key::EQ_EQ, "=="),
    (Key::GREATER_EQ, ">="),
    (Key::GREATER_THAN, ">"),
    (Key::AND, "and"),
    (Key::OR, "or"),
    (Key::NOT, "not"),
    (Key::AS, "as"),
    (Key::FUNC, "func"),
    (Key::ASSERT, "assert"),
    (Key::WHILE, "while"),
    (Key::IF, "if"),
    (Key::ELSE, "else"),
    (Key::RETURN, "return"),
    (Key::BREAK, "break"),
    (Key::CONTINUE, "continue"),
    (Key::STRUCT, "struct"),
    (Key::USE, "use"),
    (Key::VAR, "var"),
    (Key::PRE, "pre"),
    (Key::INV, "inv"),
    (Key::POST, "post"),
    (Key::VIA, "via"),
    (Key::PUB, "pub"),
    (Key::PRI, "pri"),
    (Key::CONST, "const"),
    (Key::PACKAGE_ID, "packageid"),
    (Key::ARRAY, "array"),
    (Key::NPTR, "nptr"),
    (Key::PTR, "ptr"),
    (Key::SLICE, "slice"),
    (Key::TABLE, "table"),
    (Key::FALSE, "false"),
    (Key::TRUE, "true"),
    (Key::ZERO, "0"),
    (Key::UNDERSCORE, "_"),
    (Key::THIS, "this"),
    (Key::BASE, "base"),
    (Key::I8, "i8"),
    (Key::I16, "i16"),
    (Key::I32, "i32"),
    (Key::I64, "i64"),
    (Key::U8, "u8"),
    (Key::U16, "u16"),
    (Key::U32, "u32"),
    (Key::U64, "u64"),
    (Key::BOOL, "bool"),
    (Key::STATUS, "status"),
    (Key::IO_READER, "io_reader"),
    (Key::IO_WRITER, "io_writer"),
    (Key::LENGTH, "length"),
];

const UNARY_PAIRS: &[(Key, Key)] = &[
    (Key::PLUS, Key::X_UNARY_PLUS),
    (Key::MINUS, Key::X_UNARY_MINUS),
    (Key::NOT, Key::X_UNARY_NOT),
];

const BINARY_PAIRS: &[(Key, Key)] = &[
    (Key::PLUS, Key::X_BINARY_PLUS),
    (Key::MINUS, Key::X_BINARY_MINUS),
    (Key::STAR, Key::X_BINARY_STAR),
    (Key::SLASH, Key::X_BINARY_SLASH),
    (Key::SHIFT_L, Key::X_BINARY_SHIFT_L),
    (Key::SHIFT_R, Key::X_BINARY_SHIFT_R),
    (Key::AMP, Key::X_BINARY_AMP),
    (Key::PIPE, Key::X_BINARY_PIPE),
    (Key::HAT, Key::X_BINARY_HAT),
    (Key::PERCENT, Key::X_BINARY_PERCENT),
    (Key::TILDE_MOD_SHIFT_L, Key::X_BINARY_TILDE_MOD_SHIFT_L),
    (Key::TILDE_MOD_PLUS, Key::X_BINARY_TILDE_MOD_PLUS),
    (Key::TILDE_MOD_MINUS, Key::X_BINARY_TILDE_MOD_MINUS),
    (Key::TILDE_MOD_STAR, Key::X_BINARY_TILDE_MOD_STAR),
    (Key::TILDE_SAT_PLUS, Key::X_BINARY_TILDE_SAT_PLUS),
    (Key::TILDE_SAT_MINUS, Key::X_BINARY_TILDE_SAT_MINUS),
    (Key::NOT_EQ, Key::X_BINARY_NOT_EQ),
    (Key::LESS_THAN, Key::X_BINARY_LESS_THAN),
    (Key::LESS_EQ, Key::X_BINARY_LESS_EQ),
    (Key::EQ_EQ, Key::X_BINARY_EQ_EQ),
    (Key::GREATER_EQ, Key::X_BINARY_GREATER_EQ),
    (Key::GREATER_THAN, Key::X_BINARY_GREATER_THAN),
    (Key::AND, Key::X_BINARY_AND),
    (Key::OR, Key::X_BINARY_OR),
    (Key::AS, Key::X_BINARY_AS),
];

const ASSOCIATIVE_PAIRS: &[(Key, Key)] = &[
    (Key::PLUS, Key::X_ASSOCIATIVE_PLUS),
    (Key::STAR, Key::X_ASSOCIATIVE_STAR),
    (Key::AMP, Key::X_ASSOCIATIVE_AMP),
    (Key::PIPE, Key::X_ASSOCIATIVE_PIPE),
    (Key::HAT, Key::X_ASSOCIATIVE_HAT),
    (Key::AND, Key::X_ASSOCIATIVE_AND),
    (Key::OR, Key::X_ASSOCIATIVE_OR),
];

const ASSIGN_PAIRS: &[(Key, Key)] = &[
    (Key::PLUS_EQ, Key::X_BINARY_PLUS),
    (Key::MINUS_EQ, Key::X_BINARY_MINUS),
    (Key::STAR_EQ, Key::X_BINARY_STAR),
    (Key::SLASH_EQ, Key::X_BINARY_SLASH),
    (Key::SHIFT_L_EQ, Key::X_BINARY_SHIFT_L),
    (Key::SHIFT_R_EQ, Key::X_BINARY_SHIFT_R),
    (Key::AMP_EQ, Key::X_BINARY_AMP),
    (Key::PIPE_EQ, Key::X_BINARY_PIPE),
    (Key::HAT_EQ, Key::X_BINARY_HAT),
    (Key::PERCENT_EQ, Key::X_BINARY_PERCENT),
    (Key::TILDE_MOD_SHIFT_L_EQ, Key::X_BINARY_TILDE_MOD_SHIFT_L),
    (Key::TILDE_MOD_PLUS_EQ, Key::X_BINARY_TILDE_MOD_PLUS),
    (Key::TILDE_MOD_MINUS_EQ, Key::X_BINARY_TILDE_MOD_MINUS),
    (Key::TILDE_MOD_STAR_EQ, Key::X_BINARY_TILDE_MOD_STAR),
    (Key::TILDE_SAT_PLUS_EQ, Key::X_BINARY_TILDE_SAT_PLUS),
    (Key::TILDE_SAT_MINUS_EQ, Key::X_BINARY_TILDE_SAT_MINUS),
];

/// Build a form table. Each disambiguated form also maps to itself, so
/// `X_BINARY_PLUS.binary_form() == X_BINARY_PLUS`.
const fn forms(pairs: &[(Key, Key)]) -> [Key; 256] {
    let mut table = [Key::INVALID; 256];
    let mut i = 0;
    while i < pairs.len() {
        let (from, to) = pairs[i];
        table[from.index()] = to;
        table[to.index()] = to;
        i += 1;
    }
    table
}

const fn ambiguous_forms() -> [Key; 256] {
    let mut table = [Key::INVALID; 256];
    let groups: [&[(Key, Key)]; 3] = [UNARY_PAIRS, BINARY_PAIRS, ASSOCIATIVE_PAIRS];
    let mut g = 0;
    while g < groups.len() {
        let pairs = groups[g];
        let mut i = 0;
        while i < pairs.len() {
            let (from, to) = pairs[i];
            table[from.index()] = from;
            table[to.index()] = from;
            i += 1;
        }
        g += 1;
    }
    table
}

const fn assign_forms() -> [Key; 256] {
    let mut table = [Key::INVALID; 256];
    let mut i = 0;
    while i < ASSIGN_PAIRS.len() {
        let (from, to) = ASSIGN_PAIRS[i];
        table[from.index()] = to;
        i += 1;
    }
    table
}

const fn key_classes() -> [u8; 256] {
    let mut table = [0u8; 256];
    table[Key::OPEN_PAREN.index()] = KeyClass::OPEN.bits();
    table[Key::OPEN_BRACKET.index()] = KeyClass::OPEN.bits();
    table[Key::OPEN_CURLY.index()] = KeyClass::OPEN.bits();
    let close = KeyClass::CLOSE.union(KeyClass::IMPLICIT_SEMICOLON).bits();
    table[Key::CLOSE_PAREN.index()] = close;
    table[Key::CLOSE_BRACKET.index()] = close;
    table[Key::CLOSE_CURLY.index()] = close;
    table[Key::RETURN.index()] = KeyClass::IMPLICIT_SEMICOLON.bits();
    table[Key::BREAK.index()] = KeyClass::IMPLICIT_SEMICOLON.bits();
    table[Key::CONTINUE.index()] = KeyClass::IMPLICIT_SEMICOLON.bits();
    let mut k = Key::EQ.index();
    while k <= Key::TILDE_SAT_MINUS_EQ.index() {
        table[k] = KeyClass::ASSIGN.bits();
        k += 1;
    }
    let mut k = Key::I8.index();
    while k <= Key::U64.index() {
        table[k] = KeyClass::NUM_TYPE.bits();
        k += 1;
    }
    table
}

static UNARY_FORMS: [Key; 256] = forms(UNARY_PAIRS);
static BINARY_FORMS: [Key; 256] = forms(BINARY_PAIRS);
static ASSOCIATIVE_FORMS: [Key; 256] = forms(ASSOCIATIVE_PAIRS);
static AMBIGUOUS_FORMS: [Key; 256] = ambiguous_forms();
static ASSIGN_BINARY_FORMS: [Key; 256] = assign_forms();
static KEY_CLASSES: [u8; 256] = key_classes();

/// Punctuation that is always exactly one byte.
pub fn lone_squiggle(byte: u8) -> Option<Key> {
    match byte {
        b'(' => Some(Key::OPEN_PAREN),
        b')' => Some(Key::CLOSE_PAREN),
        b'[' => Some(Key::OPEN_BRACKET),
        b']' => Some(Key::CLOSE_BRACKET),
        b'{' => Some(Key::OPEN_CURLY),
        b'}' => Some(Key::CLOSE_CURLY),
        b',' => Some(Key::COMMA),
        b'?' => Some(Key::QUESTION),
        b':' => Some(Key::COLON),
        b';' => Some(Key::SEMICOLON),
        b'$' => Some(Key::DOLLAR),
        _ => None,
    }
}

/// Candidate suffixes following a leading squiggle byte.
///
/// The first suffix that matches wins, so each list is ordered longest
/// first and ends with the empty suffix where the lone byte is itself a
/// token.
pub fn squiggle_suffixes(byte: u8) -> &'static [(&'static str, Key)] {
    match byte {
        b'!' => &[("=", Key::NOT_EQ), ("", Key::EXCLAM)],
        b'%' => &[("=", Key::PERCENT_EQ), ("", Key::PERCENT)],
        b'&' => &[("=", Key::AMP_EQ), ("", Key::AMP)],
        b'*' => &[("=", Key::STAR_EQ), ("", Key::STAR)],
        b'+' => &[("=", Key::PLUS_EQ), ("", Key::PLUS)],
        b'-' => &[("=", Key::MINUS_EQ), ("", Key::MINUS)],
        b'.' => &[(".=", Key::DOT_DOT_EQ), (".", Key::DOT_DOT), ("", Key::DOT)],
        b'/' => &[("=", Key::SLASH_EQ), ("", Key::SLASH)],
        b'<' => &[
            ("<=", Key::SHIFT_L_EQ),
            ("<", Key::SHIFT_L),
            ("=", Key::LESS_EQ),
            ("", Key::LESS_THAN),
        ],
        b'=' => &[("=", Key::EQ_EQ), ("", Key::EQ)],
        b'>' => &[
            (">=", Key::SHIFT_R_EQ),
            (">", Key::SHIFT_R),
            ("=", Key::GREATER_EQ),
            ("", Key::GREATER_THAN),
        ],
        b'^' => &[("=", Key::HAT_EQ), ("", Key::HAT)],
        b'|' => &[("=", Key::PIPE_EQ), ("", Key::PIPE)],
        b'~' => &[
            ("mod<<=", Key::TILDE_MOD_SHIFT_L_EQ),
            ("mod<<", Key::TILDE_MOD_SHIFT_L),
            ("mod+=", Key::TILDE_MOD_PLUS_EQ),
            ("mod+", Key::TILDE_MOD_PLUS),
            ("mod-=", Key::TILDE_MOD_MINUS_EQ),
            ("mod-", Key::TILDE_MOD_MINUS),
            ("mod*=", Key::TILDE_MOD_STAR_EQ),
            ("mod*", Key::TILDE_MOD_STAR),
            ("sat+=", Key::TILDE_SAT_PLUS_EQ),
            ("sat+", Key::TILDE_SAT_PLUS),
            ("sat-=", Key::TILDE_SAT_MINUS_EQ),
            ("sat-", Key::TILDE_SAT_MINUS),
        ],
        _ => &[],
    }
}
