//! Courier manager: adapter registry, concurrent fan-out, and aggregation.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::instrument;

use super::types::{PartnerFailure, Quote, QuoteSet, RateRequest, TrackingEvent};
use super::{CourierError, CourierService};

/// Registry of courier adapters with best-effort aggregation over them.
///
/// Rate requests fan out to every active adapter concurrently; adapters that
/// error are logged and reported in the result's `failures` instead of
/// failing the whole request.
#[derive(Clone)]
pub struct CourierManager {
    adapters: Vec<Arc<dyn CourierService>>,
}

impl CourierManager {
    /// Create a manager over the given adapters.
    #[must_use]
    pub fn new(adapters: Vec<Arc<dyn CourierService>>) -> Self {
        Self { adapters }
    }

    /// Codes of every registered adapter, in registration order.
    #[must_use]
    pub fn adapter_codes(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.code()).collect()
    }

    /// Fetch quotes from every registered adapter whose code is in `active`,
    /// concurrently, and aggregate the results.
    ///
    /// An adapter returning zero quotes (lane not serviceable) contributes
    /// nothing; an adapter returning an error is recorded as a
    /// [`PartnerFailure`]. The returned set is sorted cheapest-first with the
    /// head as the recommendation.
    #[instrument(skip(self, req), fields(origin = %req.origin, destination = %req.destination))]
    pub async fn quotes(&self, req: &RateRequest, active: &HashSet<String>) -> QuoteSet {
        let selected: Vec<&Arc<dyn CourierService>> = self
            .adapters
            .iter()
            .filter(|a| active.contains(a.code()))
            .collect();

        let results = join_all(
            selected
                .iter()
                .map(|adapter| async move { (adapter.code(), adapter.rates(req).await) }),
        )
        .await;

        let mut quotes: Vec<Quote> = Vec::new();
        let mut failures: Vec<PartnerFailure> = Vec::new();

        for (code, result) in results {
            match result {
                Ok(partner_quotes) => {
                    if partner_quotes.is_empty() {
                        tracing::debug!(partner = code, "no rates for lane");
                    }
                    quotes.extend(partner_quotes);
                }
                Err(e) => {
                    tracing::warn!(partner = code, error = %e, "partner quote failed, skipping");
                    failures.push(PartnerFailure {
                        partner_code: code.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        QuoteSet::from_parts(quotes, failures)
    }

    /// Fetch live tracking events from the adapter with the given code.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::UnknownPartner`] if no adapter matches, or the
    /// adapter's own error if the fetch fails.
    #[instrument(skip(self))]
    pub async fn track(
        &self,
        partner_code: &str,
        awb: &str,
    ) -> Result<Vec<TrackingEvent>, CourierError> {
        let adapter = self
            .adapters
            .iter()
            .find(|a| a.code() == partner_code)
            .ok_or_else(|| CourierError::UnknownPartner(partner_code.to_string()))?;

        adapter.track(awb).await
    }
}

/// Merge a local tracking timeline with live partner events.
///
/// Events are sorted ascending by occurrence time and de-duplicated on
/// (status, occurred-at); when a local row and a live event collide, the
/// earlier-listed (local) one wins.
#[must_use]
pub fn merge_events(
    local: Vec<TrackingEvent>,
    live: Vec<TrackingEvent>,
) -> Vec<TrackingEvent> {
    let mut merged = local;
    merged.extend(live);
    // Stable sort keeps local rows ahead of live duplicates at the same instant
    merged.sort_by_key(|e| e.occurred_at);
    merged.dedup_by(|a, b| a.status == b.status && a.occurred_at == b.occurred_at);
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::couriers::types::inr_quote;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shiplane_core::{Money, Pincode, ShipmentStatus};

    /// Stub adapter returning canned quotes or a canned failure.
    struct StubCourier {
        code: &'static str,
        quotes: Vec<Quote>,
        fail: bool,
    }

    #[async_trait]
    impl CourierService for StubCourier {
        fn code(&self) -> &'static str {
            self.code
        }

        fn name(&self) -> &'static str {
            "Stub"
        }

        async fn rates(&self, _req: &RateRequest) -> Result<Vec<Quote>, CourierError> {
            if self.fail {
                return Err(CourierError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.quotes.clone())
        }

        async fn track(&self, awb: &str) -> Result<Vec<TrackingEvent>, CourierError> {
            if self.fail {
                return Err(CourierError::InvalidAwb(awb.to_string()));
            }
            Ok(vec![event(ShipmentStatus::InTransit, 2, self.code)])
        }
    }

    fn event(status: ShipmentStatus, hour: u32, source: &str) -> TrackingEvent {
        TrackingEvent {
            status,
            description: format!("{status}"),
            location: None,
            source: source.to_string(),
            occurred_at: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
        }
    }

    fn request() -> RateRequest {
        RateRequest {
            origin: Pincode::parse("110001").unwrap(),
            destination: Pincode::parse("560037").unwrap(),
            weight_grams: 500,
            dimensions: None,
            cod: false,
            declared_value: Money::inr(Decimal::from(2000)),
        }
    }

    fn active(codes: &[&str]) -> HashSet<String> {
        codes.iter().map(|c| (*c).to_string()).collect()
    }

    fn manager(adapters: Vec<StubCourier>) -> CourierManager {
        CourierManager::new(
            adapters
                .into_iter()
                .map(|a| Arc::new(a) as Arc<dyn CourierService>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_aggregation_skips_failed_partner() {
        let m = manager(vec![
            StubCourier {
                code: "good",
                quotes: vec![inr_quote("good", "Good", "Surface", Decimal::from(80), Some(3), true)],
                fail: false,
            },
            StubCourier {
                code: "bad",
                quotes: vec![],
                fail: true,
            },
        ]);

        let set = m.quotes(&request(), &active(&["good", "bad"])).await;
        assert_eq!(set.quotes.len(), 1);
        assert_eq!(set.recommended.unwrap().partner_code, "good");
        assert_eq!(set.failures.len(), 1);
        assert_eq!(set.failures.first().unwrap().partner_code, "bad");
    }

    #[tokio::test]
    async fn test_inactive_partner_not_queried() {
        let m = manager(vec![
            StubCourier {
                code: "active",
                quotes: vec![inr_quote("active", "A", "Surface", Decimal::from(90), Some(4), true)],
                fail: false,
            },
            StubCourier {
                code: "disabled",
                quotes: vec![inr_quote("disabled", "D", "Surface", Decimal::from(10), Some(1), true)],
                fail: false,
            },
        ]);

        let set = m.quotes(&request(), &active(&["active"])).await;
        assert_eq!(set.quotes.len(), 1);
        assert_eq!(set.quotes.first().unwrap().partner_code, "active");
    }

    #[tokio::test]
    async fn test_all_partners_failing_yields_empty_set() {
        let m = manager(vec![
            StubCourier {
                code: "a",
                quotes: vec![],
                fail: true,
            },
            StubCourier {
                code: "b",
                quotes: vec![],
                fail: true,
            },
        ]);

        let set = m.quotes(&request(), &active(&["a", "b"])).await;
        assert!(set.quotes.is_empty());
        assert!(set.recommended.is_none());
        assert_eq!(set.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_multiple_service_levels_from_one_partner_kept() {
        let m = manager(vec![StubCourier {
            code: "multi",
            quotes: vec![
                inr_quote("multi", "M", "Surface", Decimal::from(80), Some(5), true),
                inr_quote("multi", "M", "Express", Decimal::from(140), Some(2), true),
            ],
            fail: false,
        }]);

        let set = m.quotes(&request(), &active(&["multi"])).await;
        assert_eq!(set.quotes.len(), 2);
        assert_eq!(set.recommended.unwrap().service_name, "Surface");
    }

    #[tokio::test]
    async fn test_track_unknown_partner() {
        let m = manager(vec![]);
        let err = m.track("nobody", "AWB123").await.unwrap_err();
        assert!(matches!(err, CourierError::UnknownPartner(_)));
    }

    #[tokio::test]
    async fn test_track_dispatches_to_matching_adapter() {
        let m = manager(vec![StubCourier {
            code: "sfx",
            quotes: vec![],
            fail: false,
        }]);
        let events = m.track("sfx", "AWB123").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().unwrap().source, "sfx");
    }

    #[test]
    fn test_merge_events_dedupes_and_sorts() {
        let local = vec![
            event(ShipmentStatus::PickedUp, 1, "local"),
            event(ShipmentStatus::InTransit, 3, "local"),
        ];
        let live = vec![
            event(ShipmentStatus::InTransit, 3, "delhivery"), // duplicate of local
            event(ShipmentStatus::OutForDelivery, 5, "delhivery"),
            event(ShipmentStatus::PickedUp, 1, "delhivery"), // duplicate of local
        ];

        let merged = merge_events(local, live);
        assert_eq!(merged.len(), 3);
        let sources: Vec<&str> = merged.iter().map(|e| e.source.as_str()).collect();
        // Local rows win collisions; the new live event survives
        assert_eq!(sources, ["local", "local", "delhivery"]);
        assert!(merged.windows(2).all(|w| {
            let (Some(a), Some(b)) = (w.first(), w.get(1)) else {
                return true;
            };
            a.occurred_at <= b.occurred_at
        }));
    }

    #[test]
    fn test_merge_events_keeps_distinct_statuses_at_same_instant() {
        let local = vec![event(ShipmentStatus::PickedUp, 1, "local")];
        let live = vec![event(ShipmentStatus::InTransit, 1, "sfx")];
        let merged = merge_events(local, live);
        assert_eq!(merged.len(), 2);
    }
}
