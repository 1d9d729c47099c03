//! Fixed-point money amounts
//!
//! Spend totals are summed in integer minor units (cents) so that financial
//! totals never drift the way repeated `f64` additions do. On the wire an
//! amount is a plain JSON number in major units (`12.5`), and strings such as
//! `"12.50"` are accepted when reading.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minor units per major unit (two decimal places)
pub const MINOR_UNITS: i64 = 100;

/// A money amount held as a whole number of minor units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

/// Error returned when a decimal string is not a valid amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount '{0}': expected a decimal with at most two fractional digits")]
pub struct ParseAmountError(pub String);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from minor units (cents)
    pub const fn from_minor(minor: i64) -> Self {
        Amount(minor)
    }

    /// Minor units (cents)
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Convert a decimal value to the nearest minor unit.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * MINOR_UNITS as f64).round();
        if scaled >= i64::MAX as f64 || scaled <= i64::MIN as f64 {
            return None;
        }
        Some(Amount(scaled as i64))
    }

    /// Value in major units
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / MINOR_UNITS as f64
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = MINOR_UNITS as u64;
        write!(f, "{}{}.{:02}", sign, abs / unit, abs % unit)
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAmountError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(err());
        }
        if fraction.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err())?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| err())? * 10,
            _ => fraction.parse().map_err(|_| err())?,
        };

        let minor = whole
            .checked_mul(MINOR_UNITS)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(err)?;

        Ok(Amount(if negative { -minor } else { minor }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Amount::from_decimal(value)
                .ok_or_else(|| D::Error::custom(format!("amount out of range: {}", value))),
            Repr::Text(text) => text.parse().map_err(D::Error::custom),
        }
    }
}
