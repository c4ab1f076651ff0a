//! # Rentora Domain
//!
//! Wire types and error definitions for the Rentora vacation-rental API.
//!
//! This crate contains:
//! - Domain data types (properties, bookings, rates, availability,
//!   messaging, webhooks)
//! - The crate-wide error type [`RentoraError`] and `Result` alias
//!
//! ## Architecture
//! - Depends only on `rentora-common` (for error classification) and
//!   external crates
//! - Pure data structures; no I/O

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod errors;
pub mod types;

pub use errors::{RentoraError, Result};
pub use types::*;
