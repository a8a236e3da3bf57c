//! Body measurement units.
//!
//! Profiles store height in centimeters and weight in kilograms. Feet/inches
//! and pounds exist only at the presentation boundary; conversion happens
//! through the explicit methods below, never implicitly.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Centimeters per foot.
const CM_PER_FOOT: Decimal = Decimal::from_parts(3048, 0, 0, false, 2);
/// Centimeters per inch.
const CM_PER_INCH: Decimal = Decimal::from_parts(254, 0, 0, false, 2);
/// Pounds per kilogram.
const LB_PER_KG: Decimal = Decimal::from_parts(220_462, 0, 0, false, 5);

/// Errors that can occur when constructing a measurement.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// Measurements must be strictly positive.
    #[error("{unit} must be greater than zero (got {value})")]
    NotPositive {
        /// Unit name.
        unit: &'static str,
        /// Rejected value.
        value: Decimal,
    },
    /// Inches component must be below 12.
    #[error("inches must be between 0 and 11 (got {0})")]
    InchesOutOfRange(u32),
    /// Value does not fit the presentation type.
    #[error("{0} is out of range")]
    OutOfRange(Decimal),
}

fn ensure_positive(unit: &'static str, value: Decimal) -> Result<Decimal, UnitError> {
    if value <= Decimal::ZERO {
        return Err(UnitError::NotPositive { unit, value });
    }
    Ok(value)
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Height in centimeters (canonical storage unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(Decimal);

impl Centimeters {
    /// # Errors
    ///
    /// Returns `UnitError::NotPositive` for zero or negative values.
    pub fn new(value: Decimal) -> Result<Self, UnitError> {
        ensure_positive("height", value).map(Self)
    }

    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }

    /// Convert to whole feet and rounded inches.
    ///
    /// An inch component that rounds up to 12 carries into the feet.
    ///
    /// # Errors
    ///
    /// Returns `UnitError::OutOfRange` if the height does not fit in `u32` feet.
    pub fn to_feet_inches(&self) -> Result<FeetInches, UnitError> {
        let whole_feet = (self.0 / CM_PER_FOOT).floor();
        let remainder = self.0 % CM_PER_FOOT;
        let inches = round_half_up(remainder / CM_PER_INCH);

        let mut feet = whole_feet.to_u32().ok_or(UnitError::OutOfRange(self.0))?;
        let mut inches = inches.to_u32().ok_or(UnitError::OutOfRange(self.0))?;
        if inches >= 12 {
            feet += 1;
            inches -= 12;
        }
        Ok(FeetInches { feet, inches })
    }
}

/// Weight in kilograms (canonical storage unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(Decimal);

impl Kilograms {
    /// # Errors
    ///
    /// Returns `UnitError::NotPositive` for zero or negative values.
    pub fn new(value: Decimal) -> Result<Self, UnitError> {
        ensure_positive("weight", value).map(Self)
    }

    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }

    /// Convert to pounds, rounded to a whole pound.
    #[must_use]
    pub fn to_pounds(&self) -> Pounds {
        Pounds(round_half_up(self.0 * LB_PER_KG))
    }
}

/// Height as feet and inches (presentation unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeetInches {
    pub feet: u32,
    pub inches: u32,
}

impl FeetInches {
    /// # Errors
    ///
    /// Returns `UnitError::InchesOutOfRange` if `inches` is 12 or more, and
    /// `UnitError::NotPositive` for a zero height.
    pub fn new(feet: u32, inches: u32) -> Result<Self, UnitError> {
        if inches >= 12 {
            return Err(UnitError::InchesOutOfRange(inches));
        }
        if feet == 0 && inches == 0 {
            return Err(UnitError::NotPositive {
                unit: "height",
                value: Decimal::ZERO,
            });
        }
        Ok(Self { feet, inches })
    }

    #[must_use]
    pub fn to_centimeters(&self) -> Centimeters {
        Centimeters(Decimal::from(self.feet) * CM_PER_FOOT + Decimal::from(self.inches) * CM_PER_INCH)
    }
}

impl fmt::Display for FeetInches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}' {}\"", self.feet, self.inches)
    }
}

/// Weight in pounds (presentation unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pounds(Decimal);

impl Pounds {
    /// # Errors
    ///
    /// Returns `UnitError::NotPositive` for zero or negative values.
    pub fn new(value: Decimal) -> Result<Self, UnitError> {
        ensure_positive("weight", value).map(Self)
    }

    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn to_kilograms(&self) -> Kilograms {
        Kilograms(self.0 / LB_PER_KG)
    }
}

impl fmt::Display for Pounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lbs", self.0.normalize())
    }
}
