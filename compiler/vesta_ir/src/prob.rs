//! Profile probabilities — fixed-point execution-frequency fractions.
//!
//! Branch probabilities are represented as a fraction of a fixed scale
//! rather than a float, so they can be added, scaled, inverted, and
//! compared deterministically across hosts. All operations saturate;
//! nothing here panics or overflows.

use std::fmt;
use std::ops::{Add, AddAssign};

/// Estimated probability of an edge or a region being reached, as a
/// fixed-point fraction of [`Probability::SCALE`].
///
/// `always()` means "taken on every execution of the source block",
/// `never()` means "not expected to be taken". Probabilities are
/// *estimates*; arithmetic saturates rather than enforcing that the
/// outgoing probabilities of a block sum to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Probability(u32);

impl Probability {
    /// Fixed-point denominator. 10 000 gives basis-point resolution,
    /// enough for the halving chains the switch lowerer produces.
    pub const SCALE: u32 = 10_000;

    /// Certain: the edge is taken on every execution.
    #[inline]
    pub fn always() -> Self {
        Self(Self::SCALE)
    }

    /// Impossible (or merely not expected).
    #[inline]
    pub fn never() -> Self {
        Self(0)
    }

    /// A guessed probability of `num / den`. Saturates at `always()`;
    /// a zero denominator yields `never()`.
    pub fn guessed(num: u64, den: u64) -> Self {
        if den == 0 {
            return Self::never();
        }
        let raw = num.saturating_mul(u64::from(Self::SCALE)) / den;
        Self(u32::try_from(raw.min(u64::from(Self::SCALE))).unwrap_or(Self::SCALE))
    }

    /// Scale by `num / den`, e.g. `apply_scale(1, 2)` halves the mass.
    pub fn apply_scale(self, num: u64, den: u64) -> Self {
        if den == 0 {
            return Self::never();
        }
        let raw = u64::from(self.0).saturating_mul(num) / den;
        Self(u32::try_from(raw.min(u64::from(Self::SCALE))).unwrap_or(Self::SCALE))
    }

    /// The complementary probability.
    #[inline]
    pub fn invert(self) -> Self {
        Self(Self::SCALE - self.0)
    }

    /// Conditional probability of this outcome given that control reached
    /// a point whose total reachable mass is `base` — i.e. `self / base`.
    ///
    /// Clamped to `always()`; a zero base yields `never()`.
    pub fn conditional(self, base: Self) -> Self {
        if base.0 == 0 {
            return Self::never();
        }
        let raw = u64::from(self.0) * u64::from(Self::SCALE) / u64::from(base.0);
        Self(u32::try_from(raw.min(u64::from(Self::SCALE))).unwrap_or(Self::SCALE))
    }

    /// Saturating subtraction of probability mass.
    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Raw fixed-point numerator (out of [`Probability::SCALE`]).
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Add for Probability {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0).min(Self::SCALE))
    }
}

impl AddAssign for Probability {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn always_and_never() {
        assert_eq!(Probability::always().raw(), Probability::SCALE);
        assert_eq!(Probability::never().raw(), 0);
        assert_eq!(Probability::always().invert(), Probability::never());
    }

    #[test]
    fn guessed_fraction() {
        assert_eq!(Probability::guessed(1, 4).raw(), 2_500);
        assert_eq!(Probability::guessed(3, 4).raw(), 7_500);
    }

    #[test]
    fn guessed_zero_denominator_is_never() {
        assert_eq!(Probability::guessed(1, 0), Probability::never());
    }

    #[test]
    fn guessed_saturates() {
        assert_eq!(Probability::guessed(5, 4), Probability::always());
    }

    #[test]
    fn apply_scale_halves() {
        let p = Probability::guessed(1, 2);
        assert_eq!(p.apply_scale(1, 2), Probability::guessed(1, 4));
    }

    #[test]
    fn add_saturates_at_always() {
        let p = Probability::guessed(3, 4) + Probability::guessed(3, 4);
        assert_eq!(p, Probability::always());
    }

    #[test]
    fn conditional_divides() {
        let target = Probability::guessed(1, 4);
        let base = Probability::guessed(1, 2);
        assert_eq!(target.conditional(base), Probability::guessed(1, 2));
    }

    #[test]
    fn conditional_zero_base_is_never() {
        assert_eq!(
            Probability::guessed(1, 4).conditional(Probability::never()),
            Probability::never()
        );
    }

    #[test]
    fn conditional_clamps_at_always() {
        let target = Probability::guessed(1, 2);
        let base = Probability::guessed(1, 4);
        assert_eq!(target.conditional(base), Probability::always());
    }

    #[test]
    fn saturating_sub_floors_at_never() {
        let p = Probability::guessed(1, 4).saturating_sub(Probability::guessed(1, 2));
        assert_eq!(p, Probability::never());
    }

    #[test]
    fn display_formats_percent() {
        assert_eq!(Probability::guessed(1, 4).to_string(), "25.00%");
    }
}
