//! Integer value types.
//!
//! The switch lowerer only ever manipulates integers: the index
//! expression, case bounds, and the synthetic subtraction/shift/mask
//! temporaries it introduces. A type is a bit width plus a signedness;
//! bounds are computed in `i128`, which holds every value of every
//! supported type (up to 64 bits) exactly.

use std::fmt;

/// An integer type: bit width (1..=64) and signedness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntType {
    /// Bit width, at most 64.
    pub bits: u8,
    /// `true` for two's-complement signed, `false` for unsigned.
    pub signed: bool,
}

impl IntType {
    /// A signed integer type of the given width.
    #[inline]
    pub fn signed(bits: u8) -> Self {
        debug_assert!(bits >= 1 && bits <= 64, "unsupported width {bits}");
        Self { bits, signed: true }
    }

    /// An unsigned integer type of the given width.
    #[inline]
    pub fn unsigned(bits: u8) -> Self {
        debug_assert!(bits >= 1 && bits <= 64, "unsupported width {bits}");
        Self {
            bits,
            signed: false,
        }
    }

    /// The unsigned type of the same width, used for wrap-around range
    /// tests (`(index - low) as unsigned > high - low`).
    #[inline]
    pub fn as_unsigned(self) -> Self {
        Self::unsigned(self.bits)
    }

    /// Smallest representable value.
    pub fn min_value(self) -> i128 {
        if self.signed {
            -(1i128 << (self.bits - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    pub fn max_value(self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            (1i128 << self.bits) - 1
        }
    }

    /// Whether `v` is representable in this type.
    #[inline]
    pub fn contains(self, v: i128) -> bool {
        v >= self.min_value() && v <= self.max_value()
    }

    /// Truncate `v` into this type with two's-complement wrap-around.
    pub fn wrap(self, v: i128) -> i128 {
        let width = 1i128 << self.bits;
        let masked = v.rem_euclid(width);
        if self.signed && masked > self.max_value() {
            masked - width
        } else {
            masked
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.signed { 'i' } else { 'u' }, self.bits)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn signed_bounds() {
        let t = IntType::signed(8);
        assert_eq!(t.min_value(), -128);
        assert_eq!(t.max_value(), 127);
    }

    #[test]
    fn unsigned_bounds() {
        let t = IntType::unsigned(8);
        assert_eq!(t.min_value(), 0);
        assert_eq!(t.max_value(), 255);
    }

    #[test]
    fn full_width_bounds() {
        assert_eq!(IntType::signed(64).min_value(), i128::from(i64::MIN));
        assert_eq!(IntType::signed(64).max_value(), i128::from(i64::MAX));
        assert_eq!(IntType::unsigned(64).max_value(), i128::from(u64::MAX));
    }

    #[test]
    fn contains_checks_both_bounds() {
        let t = IntType::signed(16);
        assert!(t.contains(-32768));
        assert!(t.contains(32767));
        assert!(!t.contains(32768));
        assert!(!t.contains(-32769));
    }

    #[test]
    fn wrap_unsigned() {
        let t = IntType::unsigned(8);
        assert_eq!(t.wrap(-1), 255);
        assert_eq!(t.wrap(256), 0);
        assert_eq!(t.wrap(300), 44);
    }

    #[test]
    fn wrap_signed() {
        let t = IntType::signed(8);
        assert_eq!(t.wrap(128), -128);
        assert_eq!(t.wrap(-129), 127);
        assert_eq!(t.wrap(42), 42);
    }

    #[test]
    fn as_unsigned_keeps_width() {
        assert_eq!(IntType::signed(32).as_unsigned(), IntType::unsigned(32));
    }

    #[test]
    fn display() {
        assert_eq!(IntType::signed(32).to_string(), "i32");
        assert_eq!(IntType::unsigned(64).to_string(), "u64");
    }
}
