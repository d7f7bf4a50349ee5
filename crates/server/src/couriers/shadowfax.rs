//! Shadowfax API client.
//!
//! Rates come from the serviceability endpoint (POST, JSON body); tracking
//! from the order-track endpoint. Shadowfax reports a TAT in days with every
//! rate, so no estimation heuristics are needed.

use chrono::DateTime;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shiplane_core::ShipmentStatus;

use super::types::{Quote, RateRequest, TrackingEvent};
use super::{CourierError, CourierService};
use crate::config::PartnerApiConfig;

/// Stable partner code, matches the `courier_partners` table.
pub const CODE: &str = "shadowfax";

/// Shadowfax API client.
#[derive(Clone)]
pub struct ShadowfaxClient {
    client: reqwest::Client,
    base_url: String,
}

impl ShadowfaxClient {
    /// Create a new Shadowfax API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &PartnerApiConfig) -> Result<Self, CourierError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| CourierError::Parse(format!("Invalid API token format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl CourierService for ShadowfaxClient {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        "Shadowfax"
    }

    #[instrument(skip(self, req), fields(origin = %req.origin, destination = %req.destination))]
    async fn rates(&self, req: &RateRequest) -> Result<Vec<Quote>, CourierError> {
        let url = format!("{}/api/v3/serviceability/rates/", self.base_url);

        let body = RatesRequestBody {
            pickup_pincode: req.origin.as_str(),
            drop_pincode: req.destination.as_str(),
            weight: req.chargeable_weight_grams(),
            cod_amount: if req.cod {
                req.declared_value.amount.to_string()
            } else {
                "0".to_string()
            },
            declared_value: req.declared_value.amount.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CourierError::RateLimited(60));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CourierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: RatesResponse = response
            .json()
            .await
            .map_err(|e| CourierError::Parse(e.to_string()))?;

        if !parsed.serviceable {
            return Ok(vec![]);
        }

        Ok(parsed
            .rates
            .iter()
            .filter_map(rate_to_quote)
            .collect())
    }

    #[instrument(skip(self))]
    async fn track(&self, awb: &str) -> Result<Vec<TrackingEvent>, CourierError> {
        let url = format!("{}/api/v1/orders/{awb}/track/", self.base_url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CourierError::InvalidAwb(awb.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CourierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TrackResponse = response
            .json()
            .await
            .map_err(|e| CourierError::Parse(e.to_string()))?;

        let mut events: Vec<TrackingEvent> =
            parsed.history.iter().filter_map(history_to_event).collect();
        events.sort_by_key(|e| e.occurred_at);
        Ok(events)
    }
}

// =============================================================================
// Request/response types
// =============================================================================

#[derive(Debug, Serialize)]
struct RatesRequestBody<'a> {
    pickup_pincode: &'a str,
    drop_pincode: &'a str,
    /// Weight in grams.
    weight: u32,
    cod_amount: String,
    declared_value: String,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    serviceable: bool,
    #[serde(default)]
    rates: Vec<ShadowfaxRate>,
}

#[derive(Debug, Deserialize)]
struct ShadowfaxRate {
    service_type: String,
    total_charge: f64,
    #[serde(default)]
    tat_days: Option<u32>,
    #[serde(default)]
    cod_available: bool,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    status: String,
    #[serde(default)]
    remarks: Option<String>,
    #[serde(default)]
    location: Option<String>,
    /// RFC 3339 timestamp with offset, e.g. "2025-03-01T10:30:00+05:30"
    timestamp: String,
}

// =============================================================================
// Normalization
// =============================================================================

fn rate_to_quote(rate: &ShadowfaxRate) -> Option<Quote> {
    let amount = Decimal::from_f64(rate.total_charge)?;
    if amount <= Decimal::ZERO {
        return None;
    }
    Some(Quote {
        partner_code: CODE.to_string(),
        partner_name: "Shadowfax".to_string(),
        service_name: titlecase(&rate.service_type),
        total_charge: shiplane_core::Money::inr(amount.round_dp(2)),
        estimated_days: rate.tat_days,
        cod_available: rate.cod_available,
    })
}

fn history_to_event(entry: &HistoryEntry) -> Option<TrackingEvent> {
    let occurred_at = DateTime::parse_from_rfc3339(&entry.timestamp)
        .ok()?
        .with_timezone(&chrono::Utc);

    let description = entry
        .remarks
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| entry.status.clone());

    Some(TrackingEvent {
        status: map_status(&entry.status),
        description,
        location: entry.location.clone().filter(|s| !s.is_empty()),
        source: CODE.to_string(),
        occurred_at,
    })
}

/// Map a Shadowfax status string to a normalized status.
fn map_status(raw: &str) -> ShipmentStatus {
    match raw.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
        "order_placed" | "pending" => ShipmentStatus::Pending,
        "pickup_scheduled" | "rider_assigned" => ShipmentStatus::PickupScheduled,
        "picked_up" | "pickup_done" => ShipmentStatus::PickedUp,
        "in_transit" | "at_hub" | "shipped" => ShipmentStatus::InTransit,
        "out_for_delivery" => ShipmentStatus::OutForDelivery,
        "delivered" => ShipmentStatus::Delivered,
        "rto_initiated" | "rto_delivered" | "returned" => ShipmentStatus::Rto,
        "undelivered" | "delivery_failed" | "cancelled" => ShipmentStatus::Exception,
        _ => ShipmentStatus::Unknown,
    }
}

/// Uppercase the first ASCII character ("express" -> "Express").
fn titlecase(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status() {
        assert_eq!(map_status("Picked Up"), ShipmentStatus::PickedUp);
        assert_eq!(map_status("out-for-delivery"), ShipmentStatus::OutForDelivery);
        assert_eq!(map_status("RTO Initiated"), ShipmentStatus::Rto);
        assert_eq!(map_status("delivery failed"), ShipmentStatus::Exception);
        assert_eq!(map_status("teleported"), ShipmentStatus::Unknown);
    }

    #[test]
    fn test_rates_response_parses_and_normalizes() {
        let body = r#"{
            "serviceable": true,
            "rates": [
                {"service_type": "express", "total_charge": 95.0, "tat_days": 2, "cod_available": true},
                {"service_type": "standard", "total_charge": 62.5, "tat_days": 4, "cod_available": false}
            ]
        }"#;
        let parsed: RatesResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.serviceable);

        let quotes: Vec<Quote> = parsed.rates.iter().filter_map(rate_to_quote).collect();
        assert_eq!(quotes.len(), 2);
        let first = quotes.first().unwrap();
        assert_eq!(first.service_name, "Express");
        assert_eq!(first.total_charge.amount, Decimal::new(9500, 2));
        assert_eq!(first.estimated_days, Some(2));
        assert!(first.cod_available);
    }

    #[test]
    fn test_unserviceable_lane_has_no_quotes() {
        let body = r#"{"serviceable": false, "rates": []}"#;
        let parsed: RatesResponse = serde_json::from_str(body).unwrap();
        assert!(!parsed.serviceable);
    }

    #[test]
    fn test_history_normalizes_with_offset_timestamp() {
        let body = r#"{
            "history": [
                {"status": "Picked Up", "remarks": "Collected from seller", "location": "Mumbai", "timestamp": "2025-03-01T10:30:00+05:30"},
                {"status": "Out For Delivery", "timestamp": "2025-03-03T08:00:00+05:30"}
            ]
        }"#;
        let parsed: TrackResponse = serde_json::from_str(body).unwrap();
        let events: Vec<TrackingEvent> =
            parsed.history.iter().filter_map(history_to_event).collect();

        assert_eq!(events.len(), 2);
        let first = events.first().unwrap();
        assert_eq!(first.status, ShipmentStatus::PickedUp);
        assert_eq!(first.description, "Collected from seller");
        assert_eq!(first.source, "shadowfax");
        // +05:30 offset converted to UTC
        assert_eq!(first.occurred_at.to_rfc3339(), "2025-03-01T05:00:00+00:00");

        let second = events.get(1).unwrap();
        assert_eq!(second.status, ShipmentStatus::OutForDelivery);
        assert_eq!(second.description, "Out For Delivery");
    }

    #[test]
    fn test_bad_timestamp_dropped() {
        let entry = HistoryEntry {
            status: "Delivered".to_string(),
            remarks: None,
            location: None,
            timestamp: "last tuesday".to_string(),
        };
        assert!(history_to_event(&entry).is_none());
    }

    #[test]
    fn test_titlecase() {
        assert_eq!(titlecase("express"), "Express");
        assert_eq!(titlecase(""), "");
    }
}
