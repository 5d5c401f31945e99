//! Integer intervals with optionally unbounded ends.
//!
//! Used by the checker for both type bounds (`u8` is `[0 ..= 255]`) and
//! the derived bounds of arbitrary expressions. Arithmetic is sound: every
//! result contains every value the operation can produce from members of
//! its inputs. Overflow of `i128` saturates to the matching infinity.

use std::cmp::Ordering;
use std::fmt;


/// An interval `[lo ..= hi]`. `None` means unbounded on that side.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Interval {
    pub lo: Option<i128>,
    pub hi: Option<i128>,
}

/// A value on the extended integer line.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Ext {
    NegInf,
    Finite(i128),
    PosInf,
}

impl Ext {
    fn lo(v: Option<i128>) -> Self {
        v.map_or(Ext::NegInf, Ext::Finite)
    }

    fn hi(v: Option<i128>) -> Self {
        v.map_or(Ext::PosInf, Ext::Finite)
    }

    fn finite(self) -> Option<i128> {
        match self {
            Ext::Finite(v) => Some(v),
            _ => None,
        }
    }

    fn signum(self) -> i32 {
        match self {
            Ext::NegInf => -1,
            Ext::PosInf => 1,
            Ext::Finite(v) => match v.cmp(&0) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            },
        }
    }

    fn inf_with_sign(sign: i32) -> Self {
        if sign < 0 {
            Ext::NegInf
        } else {
            Ext::PosInf
        }
    }

    fn neg(self) -> Self {
        match self {
            Ext::NegInf => Ext::PosInf,
            Ext::PosInf => Ext::NegInf,
            Ext::Finite(v) => v.checked_neg().map_or(Ext::PosInf, Ext::Finite),
        }
    }

    /// Addition where `-∞ + +∞` never arises: callers only add matching
    /// ends (lo + lo, hi + hi).
    fn add(self, other: Self) -> Self {
        match (self, other) {
            (Ext::NegInf, _) | (_, Ext::NegInf) => Ext::NegInf,
            (Ext::PosInf, _) | (_, Ext::PosInf) => Ext::PosInf,
            (Ext::Finite(a), Ext::Finite(b)) => a
                .checked_add(b)
                .map_or_else(|| Ext::inf_with_sign(Ext::Finite(a).signum()), Ext::Finite),
        }
    }

    /// Multiplication with `∞ · 0 = 0`.
    fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Ext::Finite(a), Ext::Finite(b)) => a.checked_mul(b).map_or_else(
                || Ext::inf_with_sign(self.signum() * other.signum()),
                Ext::Finite,
            ),
            _ => {
                let sign = self.signum() * other.signum();
                if sign == 0 {
                    Ext::Finite(0)
                } else {
                    Ext::inf_with_sign(sign)
                }
            }
        }
    }

    /// Truncating division by a strictly positive value.
    fn quo(self, divisor: Self) -> Self {
        match (self, divisor) {
            (Ext::Finite(a), Ext::Finite(b)) => Ext::Finite(a / b),
            (Ext::Finite(_), _) => Ext::Finite(0),
            (inf, _) => inf,
        }
    }
}

impl PartialOrd for Ext {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ext {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Ext::NegInf, Ext::NegInf) | (Ext::PosInf, Ext::PosInf) => Ordering::Equal,
            (Ext::NegInf, _) | (_, Ext::PosInf) => Ordering::Less,
            (_, Ext::NegInf) | (Ext::PosInf, _) => Ordering::Greater,
            (Ext::Finite(a), Ext::Finite(b)) => a.cmp(b),
        }
    }
}

impl Interval {
    pub const UNBOUNDED: Interval = Interval { lo: None, hi: None };

    pub const fn new(lo: i128, hi: i128) -> Self {
        Interval {
            lo: Some(lo),
            hi: Some(hi),
        }
    }

    pub const fn point(v: i128) -> Self {
        Interval::new(v, v)
    }

    fn from_ext(lo: Ext, hi: Ext) -> Self {
        Interval {
            lo: lo.finite(),
            hi: hi.finite(),
        }
    }

    fn from_corners(corners: [Ext; 4]) -> Self {
        let mut lo = corners[0];
        let mut hi = corners[0];
        for c in &corners[1..] {
            lo = lo.min(*c);
            hi = hi.max(*c);
        }
        Interval::from_ext(lo, hi)
    }

    fn ext(self) -> (Ext, Ext) {
        (Ext::lo(self.lo), Ext::hi(self.hi))
    }

    /// `Some(v)` if this interval holds exactly one value.
    pub fn as_point(self) -> Option<i128> {
        match (self.lo, self.hi) {
            (Some(lo), Some(hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }

    /// Whether the interval holds no values.
    pub fn is_empty(self) -> bool {
        matches!((self.lo, self.hi), (Some(lo), Some(hi)) if lo > hi)
    }

    pub fn contains(self, v: i128) -> bool {
        self.lo.map_or(true, |lo| lo <= v) && self.hi.map_or(true, |hi| v <= hi)
    }

    /// Whether every member of `self` is a member of `other`.
    pub fn is_subset_of(self, other: Interval) -> bool {
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        b_lo <= a_lo && a_hi <= b_hi
    }

    /// The values in both intervals, or `None` if they are disjoint.
    pub fn intersect(self, other: Interval) -> Option<Interval> {
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        let lo = a_lo.max(b_lo);
        let hi = a_hi.min(b_hi);
        if lo > hi {
            return None;
        }
        Some(Interval::from_ext(lo, hi))
    }

    /// The smallest interval containing both.
    pub fn union(self, other: Interval) -> Interval {
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        Interval::from_ext(a_lo.min(b_lo), a_hi.max(b_hi))
    }

    /// Whether the interval may contain a negative value.
    pub fn may_be_negative(self) -> bool {
        self.lo.map_or(true, |lo| lo < 0)
    }

    pub fn add(self, other: Interval) -> Interval {
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        Interval::from_ext(a_lo.add(b_lo), a_hi.add(b_hi))
    }

    pub fn neg(self) -> Interval {
        let (lo, hi) = self.ext();
        Interval::from_ext(hi.neg(), lo.neg())
    }

    pub fn sub(self, other: Interval) -> Interval {
        self.add(other.neg())
    }

    pub fn mul(self, other: Interval) -> Interval {
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        Interval::from_corners([
            a_lo.mul(b_lo),
            a_lo.mul(b_hi),
            a_hi.mul(b_lo),
            a_hi.mul(b_hi),
        ])
    }

    /// Truncating division. `None` unless the divisor is strictly positive.
    pub fn quo(self, other: Interval) -> Option<Interval> {
        match other.lo {
            Some(lo) if lo > 0 => {}
            _ => return None,
        }
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        Some(Interval::from_corners([
            a_lo.quo(b_lo),
            a_lo.quo(b_hi),
            a_hi.quo(b_lo),
            a_hi.quo(b_hi),
        ]))
    }

    /// Remainder of truncating division by a strictly positive divisor.
    pub fn rem(self, other: Interval) -> Option<Interval> {
        if !matches!(other.lo, Some(lo) if lo > 0) {
            return None;
        }
        let max_rem = other.hi.map(|hi| hi - 1);
        if self.may_be_negative() {
            let neg = max_rem.map(|m| -m);
            return Some(Interval { lo: neg, hi: max_rem });
        }
        let hi = match (self.hi, max_rem) {
            (Some(a), Some(m)) => Some(a.min(m)),
            (Some(a), None) => Some(a),
            (None, m) => m,
        };
        Some(Interval { lo: Some(0), hi })
    }

    /// Left shift. `None` if either side may be negative.
    pub fn shl(self, other: Interval) -> Option<Interval> {
        if self.may_be_negative() || other.may_be_negative() {
            return None;
        }
        let shift = |v: Ext, by: Ext| -> Ext {
            match (v, by) {
                (Ext::Finite(0), _) => Ext::Finite(0),
                (Ext::Finite(v), Ext::Finite(by)) => u32::try_from(by)
                    .ok()
                    .filter(|&by| by < 127 && v.leading_zeros() > by + 1)
                    .map_or(Ext::PosInf, |by| Ext::Finite(v << by)),
                _ => Ext::PosInf,
            }
        };
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        Some(Interval::from_ext(shift(a_lo, b_lo), shift(a_hi, b_hi)))
    }

    /// Right shift. `None` if either side may be negative.
    pub fn shr(self, other: Interval) -> Option<Interval> {
        if self.may_be_negative() || other.may_be_negative() {
            return None;
        }
        let shift = |v: Ext, by: Ext| -> Ext {
            match (v, by) {
                (Ext::Finite(v), Ext::Finite(by)) => {
                    u32::try_from(by).ok().filter(|&by| by < 128).map_or(Ext::Finite(0), |by| {
                        Ext::Finite(v >> by)
                    })
                }
                (Ext::Finite(_), _) => Ext::Finite(0),
                (inf, _) => inf,
            }
        };
        let (a_lo, a_hi) = self.ext();
        let (b_lo, b_hi) = other.ext();
        Some(Interval::from_ext(shift(a_lo, b_hi), shift(a_hi, b_lo)))
    }

    /// Bitwise and. `None` if either side may be negative.
    pub fn bit_and(self, other: Interval) -> Option<Interval> {
        if self.may_be_negative() || other.may_be_negative() {
            return None;
        }
        let hi = match (self.hi, other.hi) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        Some(Interval { lo: Some(0), hi })
    }

    /// Bitwise or. `None` if either side may be negative.
    pub fn bit_or(self, other: Interval) -> Option<Interval> {
        self.bit_mask_union(other)
    }

    /// Bitwise xor. `None` if either side may be negative.
    pub fn xor(self, other: Interval) -> Option<Interval> {
        self.bit_mask_union(other)
    }

    fn bit_mask_union(self, other: Interval) -> Option<Interval> {
        if self.may_be_negative() || other.may_be_negative() {
            return None;
        }
        let hi = match (self.hi, other.hi) {
            (Some(a), Some(b)) => Some(bit_mask(a.max(b))),
            _ => None,
        };
        Some(Interval { lo: Some(0), hi })
    }
}

/// The all-ones value with as many bits as `v` needs.
fn bit_mask(v: i128) -> i128 {
    let bits = 128 - v.leading_zeros();
    if bits >= 127 {
        i128::MAX
    } else {
        (1i128 << bits) - 1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lo {
            Some(lo) => write!(f, "[{lo} ..= ")?,
            None => write!(f, "[-∞ ..= ")?,
        }
        match self.hi {
            Some(hi) => write!(f, "{hi}]"),
            None => write!(f, "+∞]"),
        }
    }
}
