use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Number of fractional digits carried by every token amount.
pub const AMOUNT_SCALE: u32 = 4;

/// A token quantity with fixed 4-decimal precision.
///
/// Every constructor rounds to [`AMOUNT_SCALE`] digits (midpoint away from
/// zero), so sums of amounts are exact and independent of summation order.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Round an arbitrary decimal to amount precision.
    pub fn new(value: Decimal) -> Self {
        let mut rounded =
            value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(AMOUNT_SCALE);
        Self(rounded)
    }

    /// Build from an integer count of 1/10000 units.
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::new(units, AMOUNT_SCALE))
    }

    /// Largest representable magnitude: `i64::MAX` units of 1/10000, the
    /// ledger's asset range.
    pub fn max_value() -> Self {
        Self(Decimal::new(i64::MAX, AMOUNT_SCALE))
    }

    /// Lenient parse used for snapshot fields: empty or malformed text is zero.
    pub fn parse_or_zero(s: &str) -> Self {
        s.parse().unwrap_or(Self::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    /// Accepts a bare decimal (`"12.5"`) or one followed by a unit (`"12.5000 EOS"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.split_whitespace().next().unwrap_or("");
        let value =
            Decimal::from_str(number).map_err(|_| TypeError::InvalidAmount(s.to_string()))?;
        if value.abs() > Self::max_value().0 {
            return Err(TypeError::InvalidAmount(s.to_string()));
        }
        Ok(Self::new(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        value.rescale(AMOUNT_SCALE);
        write!(f, "{value}")
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// An amount tagged with its token symbol, e.g. `"1.0000 EOS"`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    pub amount: Amount,
    pub symbol: String,
}

impl Asset {
    pub fn new(amount: Amount, symbol: impl Into<String>) -> Self {
        Self {
            amount,
            symbol: symbol.into(),
        }
    }
}

impl FromStr for Asset {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(number), Some(symbol), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TypeError::InvalidAsset(s.to_string()));
        };
        let amount = number
            .parse()
            .map_err(|_| TypeError::InvalidAsset(s.to_string()))?;
        Ok(Self::new(amount, symbol))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.symbol)
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset({self})")
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
