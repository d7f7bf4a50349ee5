//! Tracking route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use shiplane_core::{OrderId, OrderStatus};

use crate::couriers::{TrackingEvent, merge_events};
use crate::db::{OrderRepository, PartnerRepository, TrackingRepository};
use crate::error::{AppError, Result};
use crate::models::{Order, TrackingRow};
use crate::state::AppState;

/// A tracking timeline response.
#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub order_status: OrderStatus,
    pub awb: Option<String>,
    /// Whether live partner events are included. `false` means the courier
    /// API was unavailable (or no courier is assigned) and only stored
    /// events are shown.
    pub live: bool,
    pub events: Vec<TrackingEvent>,
}

/// Local tracking timeline for an order.
#[instrument(skip(state))]
pub async fn local(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<TrackingResponse>> {
    let order = load_order(&state, order_id).await?;
    let events = local_events(&state, order_id).await?;

    Ok(Json(response(order, events, false)))
}

/// Enhanced tracking: local timeline merged with live partner events.
///
/// If the order has an assigned courier and AWB, live events are fetched
/// from that partner, persisted back to the local timeline, and merged in.
/// A courier API failure degrades to the local timeline (`live: false`)
/// rather than failing the request.
#[instrument(skip(state))]
pub async fn enhanced(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<TrackingResponse>> {
    let order = load_order(&state, order_id).await?;
    let local = local_events(&state, order_id).await?;

    let Some((partner_code, awb)) = assigned_courier(&state, &order).await? else {
        return Ok(Json(response(order, local, false)));
    };

    match state.couriers().track(&partner_code, &awb).await {
        Ok(live) => {
            // Persist fetched events so the stored timeline converges
            TrackingRepository::new(state.pool())
                .insert_all(order_id, &live)
                .await?;
            Ok(Json(response(order, merge_events(local, live), true)))
        }
        Err(e) => {
            tracing::warn!(
                order_id = %order_id,
                partner = %partner_code,
                error = %e,
                "live tracking unavailable, serving local timeline"
            );
            Ok(Json(response(order, local, false)))
        }
    }
}

fn response(order: Order, events: Vec<TrackingEvent>, live: bool) -> TrackingResponse {
    TrackingResponse {
        order_id: order.id,
        order_number: order.order_number,
        order_status: order.status,
        awb: order.awb,
        live,
        events,
    }
}

async fn load_order(state: &AppState, order_id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
}

async fn local_events(state: &AppState, order_id: OrderId) -> Result<Vec<TrackingEvent>> {
    let rows = TrackingRepository::new(state.pool())
        .list_for_order(order_id)
        .await?;
    Ok(rows.into_iter().map(TrackingRow::into_event).collect())
}

/// The order's assigned (partner code, AWB) pair, if pickup was scheduled.
async fn assigned_courier(state: &AppState, order: &Order) -> Result<Option<(String, String)>> {
    let (Some(partner_id), Some(awb)) = (order.courier_partner_id, order.awb.as_deref()) else {
        return Ok(None);
    };

    let partner = PartnerRepository::new(state.pool()).get(partner_id).await?;
    match partner {
        Some(partner) => Ok(Some((partner.code, awb.to_owned()))),
        None => {
            tracing::warn!(partner_id = %partner_id, "order references unknown partner");
            Ok(None)
        }
    }
}
