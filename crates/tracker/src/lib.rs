//! Stackwise Tracker - supplement regimen core.
//!
//! Tracks which catalog products a user has added to their personal regimen
//! ("stack") and derives summary metrics from it.
//!
//! # Architecture
//!
//! Data flows one way through the components:
//!
//! ```text
//! catalog -> membership -> regimen -> cost -> profile
//! ```
//!
//! - [`catalog`] - Cached, read-only access to supplements, brands and products
//! - [`membership`] - At-most-one (user, product) guard over the constrained insert
//! - [`regimen`] - Add, list and remove regimen entries
//! - [`cost`] - Pure aggregation of distinct supplements and monthly spend
//! - [`profile`] - Profile view assembly and demographic updates
//!
//! Storage is reached only through the [`db::RegimenBackend`] trait, backed by
//! `PostgreSQL` ([`db::PgStore`]) or an in-process store ([`db::MemoryStore`]).
//! The signed-in user is always passed explicitly; see [`auth`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod catalog;
pub mod config;
pub mod cost;
pub mod db;
pub mod error;
pub mod membership;
pub mod models;
pub mod profile;
pub mod regimen;

pub use error::{Result, TrackerError};
