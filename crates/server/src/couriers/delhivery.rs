//! Delhivery API client.
//!
//! Rates come from the invoice-charges endpoint (one call per mode, Surface
//! and Express, issued concurrently); tracking from the packages endpoint.
//! Delhivery reports no explicit delivery estimate with its charges, so the
//! estimate is derived from the rating zone it returns.

use chrono::NaiveDateTime;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use shiplane_core::ShipmentStatus;

use super::types::{Quote, RateRequest, TrackingEvent};
use super::{CourierError, CourierService};
use crate::config::PartnerApiConfig;

/// Stable partner code, matches the `courier_partners` table.
pub const CODE: &str = "delhivery";

/// Delhivery API client.
#[derive(Clone)]
pub struct DelhiveryClient {
    client: reqwest::Client,
    base_url: String,
}

impl DelhiveryClient {
    /// Create a new Delhivery API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &PartnerApiConfig) -> Result<Self, CourierError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Token {}", config.api_token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| CourierError::Parse(format!("Invalid API token format: {e}")))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch invoice charges for one shipping mode (`"S"` surface, `"E"` express).
    async fn charges(
        &self,
        req: &RateRequest,
        mode: &str,
    ) -> Result<Vec<DelhiveryCharge>, CourierError> {
        let url = format!("{}/api/kinko/v1/invoice/charges/.json", self.base_url);

        let payment_type = if req.cod { "COD" } else { "Pre-paid" };
        let cod_amount = if req.cod {
            req.declared_value.amount.to_string()
        } else {
            "0".to_string()
        };
        let weight = req.chargeable_weight_grams().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("md", mode),
                ("ss", "Delivered"),
                ("o_pin", req.origin.as_str()),
                ("d_pin", req.destination.as_str()),
                ("cgm", weight.as_str()),
                ("pt", payment_type),
                ("cod", cod_amount.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(CourierError::RateLimited(retry_after));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CourierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<DelhiveryCharge>>()
            .await
            .map_err(|e| CourierError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl CourierService for DelhiveryClient {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        "Delhivery"
    }

    #[instrument(skip(self, req), fields(origin = %req.origin, destination = %req.destination))]
    async fn rates(&self, req: &RateRequest) -> Result<Vec<Quote>, CourierError> {
        let (surface, express) = tokio::join!(self.charges(req, "S"), self.charges(req, "E"));

        // One mode failing is tolerable as long as the other quoted
        let mut quotes = Vec::new();
        let mut first_err = None;
        for (service, result) in [("Surface", surface), ("Express", express)] {
            match result {
                Ok(charges) => {
                    quotes.extend(
                        charges
                            .into_iter()
                            .filter_map(|c| charge_to_quote(&c, service)),
                    );
                }
                Err(e) => {
                    tracing::warn!(service, error = %e, "Delhivery mode lookup failed");
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }

        match (quotes.is_empty(), first_err) {
            (true, Some(e)) => Err(e),
            _ => Ok(quotes),
        }
    }

    #[instrument(skip(self))]
    async fn track(&self, awb: &str) -> Result<Vec<TrackingEvent>, CourierError> {
        let url = format!("{}/api/v1/packages/json/", self.base_url);

        let response = self.client.get(&url).query(&[("waybill", awb)]).send().await?;

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

        let body: TrackResponse = response
            .json()
            .await
            .map_err(|e| CourierError::Parse(e.to_string()))?;

        let shipment = body
            .shipment_data
            .into_iter()
            .next()
            .map(|s| s.shipment)
            .ok_or_else(|| CourierError::InvalidAwb(awb.to_string()))?;

        let mut events: Vec<TrackingEvent> = shipment
            .scans
            .into_iter()
            .filter_map(|s| scan_to_event(&s.scan_detail))
            .collect();
        events.sort_by_key(|e| e.occurred_at);
        Ok(events)
    }
}

// =============================================================================
// Response types
// =============================================================================

/// One charge line from the invoice-charges endpoint.
#[derive(Debug, Deserialize)]
struct DelhiveryCharge {
    total_amount: f64,
    #[serde(default)]
    zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(rename = "ShipmentData", default)]
    shipment_data: Vec<ShipmentEntry>,
}

#[derive(Debug, Deserialize)]
struct ShipmentEntry {
    #[serde(rename = "Shipment")]
    shipment: Shipment,
}

#[derive(Debug, Deserialize)]
struct Shipment {
    #[serde(rename = "Scans", default)]
    scans: Vec<ScanEntry>,
}

#[derive(Debug, Deserialize)]
struct ScanEntry {
    #[serde(rename = "ScanDetail")]
    scan_detail: ScanDetail,
}

#[derive(Debug, Deserialize)]
struct ScanDetail {
    #[serde(rename = "Scan")]
    scan: String,
    #[serde(rename = "ScanDateTime")]
    scan_date_time: String,
    #[serde(rename = "ScannedLocation", default)]
    scanned_location: Option<String>,
    #[serde(rename = "Instructions", default)]
    instructions: Option<String>,
}

// =============================================================================
// Normalization
// =============================================================================

fn charge_to_quote(charge: &DelhiveryCharge, service: &str) -> Option<Quote> {
    let amount = Decimal::from_f64(charge.total_amount)?;
    if amount <= Decimal::ZERO {
        return None;
    }
    Some(Quote {
        partner_code: CODE.to_string(),
        partner_name: "Delhivery".to_string(),
        service_name: service.to_string(),
        total_charge: shiplane_core::Money::inr(amount.round_dp(2)),
        estimated_days: charge.zone.as_deref().and_then(zone_to_days),
        // Delhivery supports COD on every serviceable lane
        cod_available: true,
    })
}

/// Rating zone to a delivery estimate in days. Delhivery zones run from A
/// (intra-city) to E (remote).
fn zone_to_days(zone: &str) -> Option<u32> {
    match zone.trim().to_ascii_uppercase().as_str() {
        "A" => Some(2),
        "B" => Some(3),
        "C" => Some(4),
        "D" => Some(5),
        "E" => Some(7),
        _ => None,
    }
}

fn scan_to_event(scan: &ScanDetail) -> Option<TrackingEvent> {
    // Scan timestamps are IST-naive without an offset, e.g. "2025-03-01T10:30:00"
    let occurred_at = NaiveDateTime::parse_from_str(&scan.scan_date_time, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()?
        .and_utc();

    let description = scan
        .instructions
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| scan.scan.clone());

    Some(TrackingEvent {
        status: map_status(&scan.scan),
        description,
        location: scan.scanned_location.clone().filter(|s| !s.is_empty()),
        source: CODE.to_string(),
        occurred_at,
    })
}

/// Map a Delhivery scan string to a normalized status.
fn map_status(raw: &str) -> ShipmentStatus {
    let s = raw.to_ascii_lowercase();
    if s.contains("out for delivery") {
        ShipmentStatus::OutForDelivery
    } else if s.contains("rto") || s.contains("returned") {
        ShipmentStatus::Rto
    } else if s.contains("delivered") {
        ShipmentStatus::Delivered
    } else if s.contains("picked") || s.contains("pick up done") {
        ShipmentStatus::PickedUp
    } else if s.contains("manifested") || s.contains("pickup scheduled") {
        ShipmentStatus::PickupScheduled
    } else if s.contains("in transit") || s.contains("dispatched") || s.contains("reached") {
        ShipmentStatus::InTransit
    } else if s.contains("pending") || s.contains("not picked") {
        ShipmentStatus::Pending
    } else if s.contains("undelivered") || s.contains("failed") || s.contains("exception") {
        ShipmentStatus::Exception
    } else {
        ShipmentStatus::Unknown
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status() {
        assert_eq!(map_status("Out for delivery"), ShipmentStatus::OutForDelivery);
        assert_eq!(map_status("Delivered"), ShipmentStatus::Delivered);
        assert_eq!(map_status("Picked up"), ShipmentStatus::PickedUp);
        assert_eq!(map_status("Manifested"), ShipmentStatus::PickupScheduled);
        assert_eq!(map_status("In Transit - Reached Hub"), ShipmentStatus::InTransit);
        assert_eq!(map_status("RTO Initiated"), ShipmentStatus::Rto);
        assert_eq!(map_status("Undelivered - address issue"), ShipmentStatus::Exception);
        assert_eq!(map_status("Quantum flux"), ShipmentStatus::Unknown);
    }

    #[test]
    fn test_zone_to_days() {
        assert_eq!(zone_to_days("A"), Some(2));
        assert_eq!(zone_to_days(" c "), Some(4));
        assert_eq!(zone_to_days("Z"), None);
    }

    #[test]
    fn test_charge_to_quote() {
        let charge = DelhiveryCharge {
            total_amount: 87.5,
            zone: Some("B".to_string()),
        };
        let quote = charge_to_quote(&charge, "Surface").unwrap();
        assert_eq!(quote.partner_code, "delhivery");
        assert_eq!(quote.service_name, "Surface");
        assert_eq!(quote.total_charge.amount, Decimal::new(8750, 2));
        assert_eq!(quote.estimated_days, Some(3));
    }

    #[test]
    fn test_zero_charge_dropped() {
        let charge = DelhiveryCharge {
            total_amount: 0.0,
            zone: None,
        };
        assert!(charge_to_quote(&charge, "Surface").is_none());
    }

    #[test]
    fn test_charges_response_parses() {
        let body = r#"[{"total_amount": 87.5, "zone": "C", "charge_DL": 70.0}]"#;
        let charges: Vec<DelhiveryCharge> = serde_json::from_str(body).unwrap();
        assert_eq!(charges.len(), 1);
        assert!((charges.first().unwrap().total_amount - 87.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_track_response_parses_and_normalizes() {
        let body = r#"{
            "ShipmentData": [{
                "Shipment": {
                    "Status": {"Status": "In Transit"},
                    "Scans": [
                        {"ScanDetail": {
                            "Scan": "Picked up",
                            "ScanDateTime": "2025-03-01T10:30:00",
                            "ScannedLocation": "Delhi_Hub",
                            "Instructions": "Package picked up from seller"
                        }},
                        {"ScanDetail": {
                            "Scan": "In Transit",
                            "ScanDateTime": "2025-03-02T06:15:00.5",
                            "ScannedLocation": "Gurgaon_GW"
                        }}
                    ]
                }
            }]
        }"#;
        let parsed: TrackResponse = serde_json::from_str(body).unwrap();
        let shipment = parsed.shipment_data.into_iter().next().unwrap().shipment;
        let events: Vec<TrackingEvent> = shipment
            .scans
            .iter()
            .filter_map(|s| scan_to_event(&s.scan_detail))
            .collect();

        assert_eq!(events.len(), 2);
        let first = events.first().unwrap();
        assert_eq!(first.status, ShipmentStatus::PickedUp);
        assert_eq!(first.description, "Package picked up from seller");
        assert_eq!(first.location.as_deref(), Some("Delhi_Hub"));
        assert_eq!(first.source, "delhivery");
        assert_eq!(
            events.get(1).unwrap().status,
            ShipmentStatus::InTransit
        );
    }

    #[test]
    fn test_bad_scan_timestamp_dropped() {
        let scan = ScanDetail {
            scan: "Delivered".to_string(),
            scan_date_time: "yesterday".to_string(),
            scanned_location: None,
            instructions: None,
        };
        assert!(scan_to_event(&scan).is_none());
    }
}
