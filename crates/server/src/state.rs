//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::couriers::{
    CourierManager, CourierService, DelhiveryClient, QuoteCacheKey, QuoteSet, ShadowfaxClient,
    XpressbeesClient,
};
use crate::payments::RazorpayClient;

/// Quote sets are cached briefly; partner rate cards change slowly.
const QUOTE_CACHE_TTL: Duration = Duration::from_secs(120);
const QUOTE_CACHE_CAPACITY: u64 = 10_000;

/// Error creating application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("courier client error: {0}")]
    Courier(#[from] crate::couriers::CourierError),
    #[error("payment client error: {0}")]
    Payment(#[from] crate::payments::PaymentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    couriers: CourierManager,
    razorpay: RazorpayClient,
    quote_cache: Cache<QuoteCacheKey, QuoteSet>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds one adapter per configured courier partner and registers them
    /// with the manager; whether each is *queried* is decided per-request by
    /// the `courier_partners.active` flags.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the HTTP clients fail to build.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let adapters: Vec<Arc<dyn CourierService>> = vec![
            Arc::new(DelhiveryClient::new(&config.couriers.delhivery)?),
            Arc::new(ShadowfaxClient::new(&config.couriers.shadowfax)?),
            Arc::new(XpressbeesClient::new(&config.couriers.xpressbees)?),
        ];
        let couriers = CourierManager::new(adapters);
        let razorpay = RazorpayClient::new(&config.razorpay)?;

        let quote_cache = Cache::builder()
            .max_capacity(QUOTE_CACHE_CAPACITY)
            .time_to_live(QUOTE_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                couriers,
                razorpay,
                quote_cache,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the courier manager.
    #[must_use]
    pub fn couriers(&self) -> &CourierManager {
        &self.inner.couriers
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn razorpay(&self) -> &RazorpayClient {
        &self.inner.razorpay
    }

    /// Get a reference to the quote cache.
    #[must_use]
    pub fn quote_cache(&self) -> &Cache<QuoteCacheKey, QuoteSet> {
        &self.inner.quote_cache
    }
}
