//! Xpressbees API client.
//!
//! Rates come from the serviceability endpoint; tracking from the shipments
//! endpoint. Xpressbees wraps every payload in a `{status, data}` envelope
//! and reports tracking statuses as two-letter codes.

use chrono::NaiveDateTime;
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
pub const CODE: &str = "xpressbees";

/// Xpressbees API client.
#[derive(Clone)]
pub struct XpressbeesClient {
    client: reqwest::Client,
    base_url: String,
}

impl XpressbeesClient {
    /// Create a new Xpressbees API client.
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
impl CourierService for XpressbeesClient {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        "Xpressbees"
    }

    #[instrument(skip(self, req), fields(origin = %req.origin, destination = %req.destination))]
    async fn rates(&self, req: &RateRequest) -> Result<Vec<Quote>, CourierError> {
        let url = format!("{}/api/courier/serviceability", self.base_url);

        let body = ServiceabilityRequest {
            origin: req.origin.as_str(),
            destination: req.destination.as_str(),
            weight: req.chargeable_weight_grams(),
            payment_type: if req.cod { "cod" } else { "prepaid" },
            order_amount: req.declared_value.amount.to_string(),
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

        let parsed: Envelope<Vec<XpressbeesService>> = response
            .json()
            .await
            .map_err(|e| CourierError::Parse(e.to_string()))?;

        // status=false with no data means the lane is not serviceable
        let Some(services) = parsed.data else {
            return Ok(vec![]);
        };

        Ok(services.iter().filter_map(service_to_quote).collect())
    }

    #[instrument(skip(self))]
    async fn track(&self, awb: &str) -> Result<Vec<TrackingEvent>, CourierError> {
        let url = format!("{}/api/shipments2/track/{awb}", self.base_url);

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

        let parsed: Envelope<TrackData> = response
            .json()
            .await
            .map_err(|e| CourierError::Parse(e.to_string()))?;

        let data = parsed
            .data
            .ok_or_else(|| CourierError::InvalidAwb(awb.to_string()))?;

        let mut events: Vec<TrackingEvent> =
            data.history.iter().filter_map(history_to_event).collect();
        events.sort_by_key(|e| e.occurred_at);
        Ok(events)
    }
}

// =============================================================================
// Request/response types
// =============================================================================

#[derive(Debug, Serialize)]
struct ServiceabilityRequest<'a> {
    origin: &'a str,
    destination: &'a str,
    /// Weight in grams.
    weight: u32,
    payment_type: &'a str,
    order_amount: String,
}

/// Xpressbees wraps every response in `{status, data}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    #[allow(dead_code)]
    status: bool,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct XpressbeesService {
    name: String,
    #[serde(default)]
    #[allow(dead_code)]
    freight_charges: f64,
    #[serde(default)]
    cod_charges: f64,
    total_charges: f64,
    #[serde(default)]
    edd_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TrackData {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    status_code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    location: Option<String>,
    /// Naive timestamp, e.g. "2025-03-01 14:30"
    event_time: String,
}

// =============================================================================
// Normalization
// =============================================================================

fn service_to_quote(service: &XpressbeesService) -> Option<Quote> {
    let amount = Decimal::from_f64(service.total_charges)?;
    if amount <= Decimal::ZERO {
        return None;
    }
    Some(Quote {
        partner_code: CODE.to_string(),
        partner_name: "Xpressbees".to_string(),
        service_name: service
            .name
            .strip_prefix("Xpressbees ")
            .unwrap_or(&service.name)
            .to_string(),
        total_charge: shiplane_core::Money::inr(amount.round_dp(2)),
        estimated_days: service.edd_days,
        cod_available: service.cod_charges > 0.0,
    })
}

fn history_to_event(entry: &HistoryEntry) -> Option<TrackingEvent> {
    let occurred_at = NaiveDateTime::parse_from_str(&entry.event_time, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(&entry.event_time, "%Y-%m-%d %H:%M:%S"))
        .ok()?
        .and_utc();

    let status = map_status_code(&entry.status_code);
    let description = entry
        .message
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| status.to_string());

    Some(TrackingEvent {
        status,
        description,
        location: entry.location.clone().filter(|s| !s.is_empty()),
        source: CODE.to_string(),
        occurred_at,
    })
}

/// Map an Xpressbees two-letter status code to a normalized status.
fn map_status_code(code: &str) -> ShipmentStatus {
    match code.to_ascii_uppercase().as_str() {
        "PP" => ShipmentStatus::Pending,
        "PS" => ShipmentStatus::PickupScheduled,
        "PU" => ShipmentStatus::PickedUp,
        "IT" | "RAD" => ShipmentStatus::InTransit,
        "OFD" => ShipmentStatus::OutForDelivery,
        "DL" => ShipmentStatus::Delivered,
        "UD" | "LT" => ShipmentStatus::Exception,
        "RT" | "RTD" => ShipmentStatus::Rto,
        _ => ShipmentStatus::Unknown,
    }
}
