//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Returns the amount of this [`Money`] in minor units of its
    /// [`Currency`] (cents, Rappen), rounded half away from zero.
    ///
    /// [`None`] is returned if the amount doesn't fit into [`i64`].
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        self.amount
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Indicates whether this [`Money`] is a strictly positive amount.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        write!(f, "{} {}", amount.round_dp(2), currency.code())
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Swiss Franc."]
        Chf = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "US Dollar."]
        Usd = 3,
    }
}

impl Currency {
    /// Returns the upper-case [ISO 4217] code of this [`Currency`].
    ///
    /// [ISO 4217]: https://en.wikipedia.org/wiki/ISO_4217
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Chf => "CHF",
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Chf
    }
}

impl FromStr for Money {
    type Err = &'static str;

    /// Parses `{amount} {currency}` notation, e.g. `12.50 CHF`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, currency) =
            s.trim().rsplit_once(' ').ok_or("missing currency")?;
        let amount =
            Decimal::from_str(amount.trim()).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45 CHF").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Chf,
            },
        );
        assert_eq!(
            Money::from_str("7 eur").unwrap(),
            Money {
                amount: decimal("7"),
                currency: Currency::Eur,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45 GBP").is_err());
        assert!(Money::from_str("abc USD").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money {
                amount: decimal("99.5"),
                currency: Currency::Chf,
            }
            .to_string(),
            "99.5 CHF",
        );
        assert_eq!(Currency::Usd.to_string(), "usd");
    }

    #[test]
    fn minor_units() {
        let money = |s| Money {
            amount: decimal(s),
            currency: Currency::Chf,
        };

        assert_eq!(money("100").minor_units(), Some(10_000));
        assert_eq!(money("19.99").minor_units(), Some(1_999));
        assert_eq!(money("0.005").minor_units(), Some(1));
        assert_eq!(money("0.004").minor_units(), Some(0));
    }

    #[test]
    fn minor_units_overflow_is_none() {
        let huge = Money {
            amount: decimal("70000000000000000000000000000"),
            currency: Currency::Chf,
        };
        assert_eq!(huge.minor_units(), None);

        let max = Money {
            amount: Decimal::MAX,
            currency: Currency::Usd,
        };
        assert_eq!(max.minor_units(), None);

        // Fits into `Decimal`, but not into `i64` after scaling.
        let large = Money {
            amount: decimal("100000000000000000"),
            currency: Currency::Eur,
        };
        assert_eq!(large.minor_units(), None);
    }
}
