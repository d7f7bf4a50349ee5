//! Courier quote and registry route handlers.

use std::collections::HashSet;

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use shiplane_core::{Money, Pincode};

use crate::couriers::types::Dimensions;
use crate::couriers::{QuoteCacheKey, QuoteSet, RateRequest};
use crate::db::PartnerRepository;
use crate::error::{AppError, Result};
use crate::models::CourierPartner;
use crate::state::AppState;

/// Body for `POST /api/couriers/quotes`.
#[derive(Debug, Deserialize)]
pub struct QuoteBody {
    pub origin_pincode: String,
    pub destination_pincode: String,
    pub weight_grams: u32,
    pub length_cm: Option<u32>,
    pub width_cm: Option<u32>,
    pub height_cm: Option<u32>,
    #[serde(default)]
    pub cod: bool,
    pub declared_value: Decimal,
}

impl QuoteBody {
    fn into_rate_request(self) -> Result<RateRequest> {
        let origin = Pincode::parse(&self.origin_pincode)
            .map_err(|e| AppError::BadRequest(format!("origin_pincode: {e}")))?;
        let destination = Pincode::parse(&self.destination_pincode)
            .map_err(|e| AppError::BadRequest(format!("destination_pincode: {e}")))?;

        if self.weight_grams == 0 {
            return Err(AppError::BadRequest(
                "weight_grams must be positive".to_string(),
            ));
        }
        if self.declared_value < Decimal::ZERO {
            return Err(AppError::BadRequest(
                "declared_value cannot be negative".to_string(),
            ));
        }

        // All three dimensions or none
        let dimensions = match (self.length_cm, self.width_cm, self.height_cm) {
            (Some(length_cm), Some(width_cm), Some(height_cm)) => Some(Dimensions {
                length_cm,
                width_cm,
                height_cm,
            }),
            (None, None, None) => None,
            _ => {
                return Err(AppError::BadRequest(
                    "provide all of length_cm, width_cm, height_cm or none".to_string(),
                ));
            }
        };

        Ok(RateRequest {
            origin,
            destination,
            weight_grams: self.weight_grams,
            dimensions,
            cod: self.cod,
            declared_value: Money::inr(self.declared_value),
        })
    }
}

/// Compare rates across all active partners.
///
/// Aggregation is best-effort: partners that error are listed under
/// `failures` and everything else is returned sorted cheapest-first. Results
/// are cached briefly per (lane, weight, COD, active set).
#[instrument(skip(state, body))]
pub async fn quotes(
    State(state): State<AppState>,
    Json(body): Json<QuoteBody>,
) -> Result<Json<QuoteSet>> {
    let req = body.into_rate_request()?;

    let active_codes = PartnerRepository::new(state.pool()).active_codes().await?;
    let key = QuoteCacheKey::new(&req, &active_codes);

    if let Some(cached) = state.quote_cache().get(&key).await {
        tracing::debug!(origin = %req.origin, destination = %req.destination, "quote cache hit");
        return Ok(Json(cached));
    }

    let active: HashSet<String> = active_codes.into_iter().collect();
    let set = state.couriers().quotes(&req, &active).await;

    state.quote_cache().insert(key, set.clone()).await;
    Ok(Json(set))
}

/// List the partner registry with active flags.
#[instrument(skip(state))]
pub async fn list_partners(State(state): State<AppState>) -> Result<Json<Vec<CourierPartner>>> {
    let partners = PartnerRepository::new(state.pool()).list().await?;
    Ok(Json(partners))
}
