//! Normalized quote and tracking types shared by all courier adapters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shiplane_core::{Money, Pincode, ShipmentStatus};

/// Package dimensions in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_cm: u32,
    pub width_cm: u32,
    pub height_cm: u32,
}

impl Dimensions {
    /// Volumetric weight in grams using the industry-standard divisor of
    /// 5000 cm³/kg (cm³ / 5000 kg = cm³ / 5 grams).
    #[must_use]
    pub const fn volumetric_weight_grams(&self) -> u32 {
        (self.length_cm * self.width_cm * self.height_cm) / 5
    }
}

/// A rate request for one shipment lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRequest {
    /// Pickup pincode.
    pub origin: Pincode,
    /// Delivery pincode.
    pub destination: Pincode,
    /// Dead weight in grams.
    pub weight_grams: u32,
    /// Package dimensions, if known.
    pub dimensions: Option<Dimensions>,
    /// Whether the shipment collects cash on delivery.
    pub cod: bool,
    /// Declared value of the contents.
    pub declared_value: Money,
}

impl RateRequest {
    /// Billable weight: the greater of dead weight and volumetric weight.
    #[must_use]
    pub fn chargeable_weight_grams(&self) -> u32 {
        let volumetric = self
            .dimensions
            .map_or(0, |d| d.volumetric_weight_grams());
        self.weight_grams.max(volumetric)
    }
}

/// A priced, timed delivery offer from one courier partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Partner short code (e.g., `delhivery`).
    pub partner_code: String,
    /// Partner display name.
    pub partner_name: String,
    /// Partner service level (e.g., `Surface`, `Express`).
    pub service_name: String,
    /// Total charge for the shipment.
    pub total_charge: Money,
    /// Estimated delivery time in days, if the partner reports one.
    pub estimated_days: Option<u32>,
    /// Whether the partner supports COD on this lane.
    pub cod_available: bool,
}

/// A partner that failed to quote, recorded so callers can see who was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerFailure {
    pub partner_code: String,
    pub message: String,
}

/// Aggregated quotes across all active partners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSet {
    /// All collected quotes, cheapest first.
    pub quotes: Vec<Quote>,
    /// The recommended quote: cheapest, ties broken by fewer estimated days.
    pub recommended: Option<Quote>,
    /// Partners that errored and were skipped.
    pub failures: Vec<PartnerFailure>,
}

impl QuoteSet {
    /// Build a quote set from raw per-partner results: sorts cheapest-first
    /// (price ties broken by fewer estimated days; missing estimates lose)
    /// and picks the head as the recommendation.
    #[must_use]
    pub fn from_parts(mut quotes: Vec<Quote>, failures: Vec<PartnerFailure>) -> Self {
        quotes.sort_by(|a, b| {
            a.total_charge
                .amount
                .cmp(&b.total_charge.amount)
                .then_with(|| cmp_estimates(a.estimated_days, b.estimated_days))
        });
        let recommended = quotes.first().cloned();
        Self {
            quotes,
            recommended,
            failures,
        }
    }
}

/// Order estimates ascending, with `None` (no estimate) after any `Some`.
fn cmp_estimates(a: Option<u32>, b: Option<u32>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

/// A normalized tracking event for a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Normalized status.
    pub status: ShipmentStatus,
    /// Human-readable description from the source.
    pub description: String,
    /// Location of the event, if reported.
    pub location: Option<String>,
    /// Where the event came from: `local` or a partner code.
    pub source: String,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Convenience constructor for a quote with an INR charge.
#[must_use]
pub fn inr_quote(
    partner_code: &str,
    partner_name: &str,
    service_name: &str,
    charge: Decimal,
    estimated_days: Option<u32>,
    cod_available: bool,
) -> Quote {
    Quote {
        partner_code: partner_code.to_string(),
        partner_name: partner_name.to_string(),
        service_name: service_name.to_string(),
        total_charge: Money::inr(charge),
        estimated_days,
        cod_available,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pin(s: &str) -> Pincode {
        Pincode::parse(s).unwrap()
    }

    #[test]
    fn test_volumetric_weight() {
        let d = Dimensions {
            length_cm: 30,
            width_cm: 20,
            height_cm: 10,
        };
        // 6000 cm³ / 5000 = 1.2 kg = 1200 g
        assert_eq!(d.volumetric_weight_grams(), 1200);
    }

    #[test]
    fn test_chargeable_weight_takes_max() {
        let mut req = RateRequest {
            origin: pin("110001"),
            destination: pin("560037"),
            weight_grams: 500,
            dimensions: Some(Dimensions {
                length_cm: 30,
                width_cm: 20,
                height_cm: 10,
            }),
            cod: false,
            declared_value: Money::inr(Decimal::from(1000)),
        };
        // volumetric (1200g) > dead (500g)
        assert_eq!(req.chargeable_weight_grams(), 1200);

        req.weight_grams = 2000;
        assert_eq!(req.chargeable_weight_grams(), 2000);

        req.dimensions = None;
        assert_eq!(req.chargeable_weight_grams(), 2000);
    }

    #[test]
    fn test_quote_set_sorts_cheapest_first() {
        let set = QuoteSet::from_parts(
            vec![
                inr_quote("a", "A", "Surface", Decimal::from(120), Some(4), true),
                inr_quote("b", "B", "Express", Decimal::from(90), Some(2), true),
                inr_quote("c", "C", "Surface", Decimal::from(100), Some(3), false),
            ],
            vec![],
        );
        let codes: Vec<&str> = set.quotes.iter().map(|q| q.partner_code.as_str()).collect();
        assert_eq!(codes, ["b", "c", "a"]);
        assert_eq!(set.recommended.unwrap().partner_code, "b");
    }

    #[test]
    fn test_recommendation_tie_broken_by_speed() {
        let set = QuoteSet::from_parts(
            vec![
                inr_quote("slow", "Slow", "Surface", Decimal::from(100), Some(5), true),
                inr_quote("fast", "Fast", "Express", Decimal::from(100), Some(2), true),
            ],
            vec![],
        );
        assert_eq!(set.recommended.unwrap().partner_code, "fast");
    }

    #[test]
    fn test_missing_estimate_loses_tie() {
        let set = QuoteSet::from_parts(
            vec![
                inr_quote("noeta", "NoEta", "Surface", Decimal::from(100), None, true),
                inr_quote("eta", "Eta", "Surface", Decimal::from(100), Some(6), true),
            ],
            vec![],
        );
        assert_eq!(set.recommended.unwrap().partner_code, "eta");
    }

    #[test]
    fn test_empty_quote_set_has_no_recommendation() {
        let set = QuoteSet::from_parts(
            vec![],
            vec![PartnerFailure {
                partner_code: "a".to_string(),
                message: "timeout".to_string(),
            }],
        );
        assert!(set.quotes.is_empty());
        assert!(set.recommended.is_none());
        assert_eq!(set.failures.len(), 1);
    }
}
