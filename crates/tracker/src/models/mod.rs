//! Domain models for the tracker.
//!
//! These types represent validated domain objects, separate from the row
//! types in [`crate::db::rows`].

pub mod catalog;
pub mod profile;
pub mod regimen;

pub use catalog::{Brand, Product, Supplement};
pub use profile::UserProfile;
pub use regimen::{NewRegimenEntry, RegimenEntry, RegimenItem};
