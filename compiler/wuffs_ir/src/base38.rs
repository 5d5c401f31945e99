//! Base-38 encoding of four-byte package identifiers.
//!
//! Each byte is one of ` 0-9?a-z`. The string `"    "` encodes as zero and
//! `"zzzz"` as [`MAX`].

#[cfg(test)]
mod tests;

/// Inclusive upper bound of [`encode`], `38^4 - 1`.
pub const MAX: u32 = 2_085_135;

/// Bits needed to hold [`MAX`].
pub const MAX_BITS: u32 = 21;

/// Digit value plus one, so zero marks a byte outside the alphabet.
const fn digit_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    table[b' ' as usize] = 1;
    let mut i = 0;
    while i < 10 {
        table[(b'0' + i) as usize] = 2 + i;
        i += 1;
    }
    table[b'?' as usize] = 12;
    let mut i = 0;
    while i < 26 {
        table[(b'a' + i) as usize] = 13 + i;
        i += 1;
    }
    table
}

static DIGITS: [u8; 256] = digit_table();

/// Encode exactly four alphabet bytes, or `None`.
pub fn encode(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.len() != 4 {
        return None;
    }
    bytes.iter().try_fold(0u32, |acc, &b| {
        let digit = DIGITS[usize::from(b)];
        (digit != 0).then(|| acc * 38 + u32::from(digit - 1))
    })
}

/// Encode a package name of up to four bytes, padding it with spaces.
pub fn encode_padded(name: &str) -> Option<u32> {
    if name.len() > 4 {
        return None;
    }
    encode(&format!("{name:<4}"))
}
