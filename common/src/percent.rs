//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Floating-point percentage in the `[0, 100]` range.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// Zero percent.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Maximum number of decimal places of a [`Percent`].
    pub const MAX_SCALE: u32 = 2;

    /// Creates a new [`Percent`] by checking the provided value is not less
    /// than `0`, not greater than `100` and has at most
    /// [`Percent::MAX_SCALE`] decimal places (trailing zeros aside).
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        if val < Decimal::ZERO
            || val > Decimal::ONE_HUNDRED
            || val.normalize().scale() > Self::MAX_SCALE
        {
            None
        } else {
            #[expect(
                clippy::allow_attributes,
                reason = "TODO: Remove once clippy is fixed"
            )]
            #[allow(unsafe_code, reason = "invariants checked already")]
            Some(unsafe { Self::new_unchecked(val) })
        }
    }

    /// Creates a new [`Percent`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided value must be within the `[0, 100]` range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(val: Decimal) -> Self {
        Self(val)
    }

    /// Returns the value of this [`Percent`] (`20%` is `20`).
    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }

    /// Returns the share of the whole left after subtracting this [`Percent`]
    /// (`20%` gives `0.8`).
    #[must_use]
    pub fn complement_ratio(self) -> Decimal {
        (Decimal::ONE_HUNDRED - self.0) / Decimal::ONE_HUNDRED
    }
}

impl Default for Percent {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Percent;

    #[test]
    fn from_str_checks_bounds() {
        assert_eq!(
            Percent::from_str("20").unwrap().value(),
            Decimal::from(20),
        );
        assert!(Percent::from_str("0").is_ok());
        assert!(Percent::from_str("100").is_ok());
        assert!(Percent::from_str("12.5").is_ok());

        assert!(Percent::from_str("-0.01").is_err());
        assert!(Percent::from_str("100.01").is_err());
        assert!(Percent::from_str("ten").is_err());
    }

    #[test]
    fn from_str_checks_scale() {
        assert!(Percent::from_str("12.34").is_ok());
        assert!(Percent::from_str("12.500").is_ok());

        assert!(Percent::from_str("12.345").is_err());
        assert!(Percent::from_str("0.001").is_err());
    }

    #[test]
    fn complement_ratio() {
        assert_eq!(
            Percent::from_str("20").unwrap().complement_ratio(),
            Decimal::from_str("0.8").unwrap(),
        );
        assert_eq!(Percent::ZERO.complement_ratio(), Decimal::ONE);
        assert_eq!(
            Percent::from_str("100").unwrap().complement_ratio(),
            Decimal::ZERO,
        );
    }
}
