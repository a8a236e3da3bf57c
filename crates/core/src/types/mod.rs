//! Core types for Stackwise.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod gender;
pub mod id;
pub mod price;
pub mod servings;
pub mod units;

pub use gender::{Gender, GenderError};
pub use id::*;
pub use price::{Price, PriceError};
pub use servings::{ServingsError, ServingsPerDay};
pub use units::{Centimeters, FeetInches, Kilograms, Pounds, UnitError};
