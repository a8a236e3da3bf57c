//! Stackwise Core - Shared domain types.
//!
//! This crate provides the types used across all Stackwise components:
//! - `tracker` - Regimen membership, cost aggregation and profile assembly
//! - `cli` - Command-line front end for the tracker
//!
//! # Architecture
//!
//! The core crate contains only types and conversions - no I/O, no database
//! access. Storage units (centimeters, kilograms) and presentation units
//! (feet/inches, pounds) are distinct types so they cannot be mixed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, servings, units and gender

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
