//! Cache key for aggregated quote sets.
//!
//! Quotes for a lane change slowly, so responses are cached briefly (see
//! `AppState::quote_cache`). The key covers everything that affects the
//! result, including which partners were active when the set was built.

use super::types::RateRequest;

/// Cache key for a quote aggregation request.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct QuoteCacheKey {
    origin: String,
    destination: String,
    weight_grams: u32,
    cod: bool,
    declared_minor_units: Option<i64>,
    /// Active partner codes, sorted for a stable key.
    active: Vec<String>,
}

impl QuoteCacheKey {
    /// Build a key from a rate request and the set of active partner codes.
    #[must_use]
    pub fn new(req: &RateRequest, active: &[String]) -> Self {
        let mut active = active.to_vec();
        active.sort_unstable();
        Self {
            origin: req.origin.as_str().to_owned(),
            destination: req.destination.as_str().to_owned(),
            weight_grams: req.chargeable_weight_grams(),
            cod: req.cod,
            declared_minor_units: req.declared_value.to_minor_units(),
            active,
        }
    }
}
