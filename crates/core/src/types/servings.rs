//! Daily dose attached to a regimen entry.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ServingsPerDay`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ServingsError {
    /// No value was supplied.
    #[error("servings per day is required")]
    Missing,
    /// The value is not a number.
    #[error("servings per day must be a number (got {0:?})")]
    NotANumber(String),
    /// The value is zero or negative.
    #[error("servings per day must be greater than zero (got {0})")]
    NotPositive(Decimal),
    /// The value is above [`ServingsPerDay::MAX`].
    #[error("servings per day must be at most {max} (got {0})", max = ServingsPerDay::MAX)]
    TooLarge(Decimal),
}

/// Number of servings taken per day. Always strictly positive.
///
/// Fractional doses are allowed (e.g. half a scoop).
///
/// ```
/// use stackwise_core::ServingsPerDay;
///
/// assert_eq!(ServingsPerDay::parse("2").unwrap().to_string(), "2");
/// assert_eq!(ServingsPerDay::parse(" 0.5 ").unwrap().to_string(), "0.5");
/// assert!(ServingsPerDay::parse("").is_err());
/// assert!(ServingsPerDay::parse("two").is_err());
/// assert!(ServingsPerDay::parse("0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ServingsPerDay(Decimal);

impl ServingsPerDay {
    /// Largest accepted daily dose.
    pub const MAX: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

    /// Create from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns `ServingsError::NotPositive` for zero or negative values and
    /// `ServingsError::TooLarge` above [`Self::MAX`].
    pub fn new(value: Decimal) -> Result<Self, ServingsError> {
        if value <= Decimal::ZERO {
            return Err(ServingsError::NotPositive(value));
        }
        if value > Self::MAX {
            return Err(ServingsError::TooLarge(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Parse user-entered text.
    ///
    /// # Errors
    ///
    /// Returns `ServingsError::Missing` for blank input,
    /// `ServingsError::NotANumber` for non-numeric input,
    /// `ServingsError::NotPositive` for zero or negative values and
    /// `ServingsError::TooLarge` above [`Self::MAX`].
    pub fn parse(input: &str) -> Result<Self, ServingsError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ServingsError::Missing);
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| ServingsError::NotANumber(trimmed.to_owned()))?;
        Self::new(value)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }
}

impl Default for ServingsPerDay {
    fn default() -> Self {
        Self(Decimal::ONE)
    }
}

impl fmt::Display for ServingsPerDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ServingsPerDay {
    type Err = ServingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ServingsPerDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
