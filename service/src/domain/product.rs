//! [`Product`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::media;

/// Product sold in the storefront.
#[derive(Clone, Debug)]
pub struct Product {
    /// ID of this [`Product`].
    pub id: Id,

    /// [`Title`] of this [`Product`].
    pub title: Title,

    /// [`Description`] of this [`Product`].
    pub description: Description,

    /// [`Price`] of this [`Product`] before the discount.
    pub price: Price,

    /// Discount applied to the [`Price`] of this [`Product`].
    pub discount: Percent,

    /// [`media::Image`] of this [`Product`], if any.
    pub image: Option<media::Image>,

    /// [`DateTime`] when this [`Product`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Product`] was updated last time, if ever.
    pub updated_at: Option<ModificationDateTime>,
}

impl Product {
    /// Returns the [`Price`] of this [`Product`] after applying its discount.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.price.discounted(self.discount)
    }
}

/// ID of a [`Product`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Title of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    ///
    /// Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(title: impl AsRef<str>) -> Option<Self> {
        let title = title.as_ref().trim();
        (!title.is_empty() && title.chars().count() <= 256)
            .then(|| Self(title.to_owned()))
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl AsRef<str>) -> Option<Self> {
        let description = description.as_ref().trim();
        (!description.is_empty() && description.chars().count() <= 10_000)
            .then(|| Self(description.to_owned()))
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Non-negative price of a [`Product`] in the storefront currency.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of decimal places of a [`Price`].
    pub const MAX_SCALE: u32 = 2;

    /// Maximum number of integer digits of a [`Price`].
    pub const MAX_INTEGER_DIGITS: u32 = 10;

    /// Creates a new [`Price`] if the provided amount is not negative, has
    /// at most [`Price::MAX_SCALE`] decimal places and at most
    /// [`Price::MAX_INTEGER_DIGITS`] integer digits.
    ///
    /// Trailing fractional zeros don't count as decimal places.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        let limit = Decimal::from(10_i64.pow(Self::MAX_INTEGER_DIGITS));
        (amount >= Decimal::ZERO
            && amount.normalize().scale() <= Self::MAX_SCALE
            && amount < limit)
            .then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Applies the provided discount to this [`Price`], rounding the result
    /// half away from zero to exactly two decimal places.
    ///
    /// As [`Percent`] never exceeds `100`, the result is never negative.
    #[must_use]
    pub fn discounted(self, discount: Percent) -> Self {
        let mut amount = (self.0 * discount.complement_ratio())
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        Self(amount)
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Price`")
    }
}

/// [`DateTime`] when a [`Product`] was created.
pub type CreationDateTime = DateTimeOf<(Product, unit::Creation)>;

/// [`DateTime`] when a [`Product`] was updated.
pub type ModificationDateTime = DateTimeOf<(Product, unit::Modification)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Percent;
    use rust_decimal::Decimal;

    use super::Price;

    fn price(s: &str) -> Price {
        Price::from_str(s).unwrap()
    }

    fn percent(s: &str) -> Percent {
        Percent::from_str(s).unwrap()
    }

    #[test]
    fn effective_price() {
        assert_eq!(
            price("10").discounted(percent("20")).to_string(),
            "8.00",
        );
        assert_eq!(
            price("10").discounted(Percent::ZERO).to_string(),
            "10.00",
        );
        assert_eq!(
            price("100.00").discounted(percent("10")).amount(),
            Decimal::from(90),
        );
        assert_eq!(
            price("19.99").discounted(percent("100")).amount(),
            Decimal::ZERO,
        );
        assert_eq!(
            price("9.99").discounted(percent("33.3")).to_string(),
            "6.66",
        );
    }

    #[test]
    fn price_is_non_negative() {
        assert!(Price::from_str("0").is_ok());
        assert!(Price::from_str(" 100.00 ").is_ok());
        assert!(Price::from_str("-1").is_err());
        assert!(Price::from_str("").is_err());
        assert!(Price::from_str("abc").is_err());
    }

    #[test]
    fn price_fits_into_two_decimal_places() {
        assert!(Price::from_str("10.01").is_ok());
        assert!(Price::from_str("10.010").is_ok());
        assert!(Price::from_str("9999999999.99").is_ok());

        assert!(Price::from_str("10.005").is_err());
        assert!(Price::from_str("0.001").is_err());
        assert!(Price::from_str("10000000000").is_err());
        assert!(Price::from_str("70000000000000000000000000000").is_err());
    }
}
