//! Database operations for the server `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` - Platform users (identity only; auth lives in the frontend)
//! - `addresses` - User pickup/delivery address book
//! - `orders` - Shipment orders
//! - `courier_partners` - Partner registry (code, name, active flag)
//! - `payments` - Gateway payments mirrored locally
//! - `order_tracking` - Tracking timeline (local + fetched live events)
//! - `order_logs` - Append-only audit trail per order
//!
//! Queries use the sqlx runtime API with `FromRow` models from
//! [`crate::models`].

pub mod addresses;
pub mod logs;
pub mod orders;
pub mod partners;
pub mod payments;
pub mod tracking;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use logs::OrderLogRepository;
pub use orders::OrderRepository;
pub use partners::PartnerRepository;
pub use payments::PaymentRepository;
pub use tracking::TrackingRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate partner code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-violation database error to `Conflict`, anything else to
/// `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, conflict_message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(conflict_message.to_owned());
    }
    RepositoryError::Database(e)
}
