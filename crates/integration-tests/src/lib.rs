//! Integration tests for Shiplane.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shiplane-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `courier_manager` - Aggregation and recommendation over stub adapters
//! - `payment_signatures` - Checkout and webhook HMAC round-trips
//! - `tracking_merge` - Local + live timeline merging
//!
//! These tests drive the server library directly; no database or network is
//! required (courier adapters are replaced with in-process stubs).
