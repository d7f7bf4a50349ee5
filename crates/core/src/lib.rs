//! Shiplane Core - Shared types library.
//!
//! This crate provides common types used across all Shiplane components:
//! - `server` - JSON API backend (orders, quotes, payments, tracking)
//! - `cli` - Command-line tools for partner management and ad-hoc quoting
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, pincodes, phone
//!   numbers, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
