//! Courier partner integrations.
//!
//! Each partner (Delhivery, Shadowfax, Xpressbees) exposes its own HTTP API
//! with its own request/response shapes; the adapters here wrap those APIs
//! and normalize everything into common [`Quote`] and [`TrackingEvent`]
//! types. The [`CourierManager`] holds the adapter registry and fans
//! rate/tracking requests out across it.
//!
//! # Architecture
//!
//! - One adapter struct per partner, each a thin typed reqwest client
//! - Adapters implement the object-safe [`CourierService`] trait
//! - Aggregation is best-effort: one partner failing never blocks the others

pub mod cache;
pub mod delhivery;
pub mod manager;
pub mod shadowfax;
pub mod types;
pub mod xpressbees;

pub use cache::QuoteCacheKey;
pub use delhivery::DelhiveryClient;
pub use manager::{CourierManager, merge_events};
pub use shadowfax::ShadowfaxClient;
pub use types::{PartnerFailure, Quote, QuoteSet, RateRequest, TrackingEvent};
pub use xpressbees::XpressbeesClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to a courier partner's API.
#[derive(Debug, Error)]
pub enum CourierError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a partner response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The partner does not serve this lane.
    #[error("Lane not serviceable")]
    NotServiceable,

    /// No registered adapter with this code.
    #[error("Unknown courier partner: {0}")]
    UnknownPartner(String),

    /// The partner does not recognize this AWB.
    #[error("Invalid AWB: {0}")]
    InvalidAwb(String),

    /// Rate limited by the partner.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// A courier partner backend.
///
/// Object-safe so the manager can hold a heterogeneous registry of adapters.
#[async_trait]
pub trait CourierService: Send + Sync {
    /// Stable short code for the partner (matches `courier_partners.code`).
    fn code(&self) -> &'static str;

    /// Human-readable partner name.
    fn name(&self) -> &'static str;

    /// Fetch rate quotes for a shipment.
    ///
    /// An empty vector means the partner does not serve the lane; that is
    /// not an error.
    async fn rates(&self, req: &RateRequest) -> Result<Vec<Quote>, CourierError>;

    /// Fetch live tracking events for an AWB, oldest first.
    async fn track(&self, awb: &str) -> Result<Vec<TrackingEvent>, CourierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_error_display() {
        let err = CourierError::UnknownPartner("acme".to_string());
        assert_eq!(err.to_string(), "Unknown courier partner: acme");

        let err = CourierError::Api {
            status: 503,
            message: "down for maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - down for maintenance");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CourierError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
