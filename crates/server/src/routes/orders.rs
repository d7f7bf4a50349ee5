//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use shiplane_core::{AddressId, OrderId, OrderStatus, ShipmentStatus, UserId};

use crate::couriers::TrackingEvent;
use crate::db::orders::CreateOrder;
use crate::db::{
    AddressRepository, OrderLogRepository, OrderRepository, PartnerRepository, TrackingRepository,
    UserRepository,
};
use crate::error::{AppError, Result};
use crate::models::Order;
use crate::models::tracking::SOURCE_LOCAL;
use crate::state::AppState;

/// Body for `POST /api/orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub user_id: UserId,
    pub pickup_address_id: AddressId,
    pub delivery_address_id: AddressId,
    pub weight_grams: u32,
    pub length_cm: Option<u32>,
    pub width_cm: Option<u32>,
    pub height_cm: Option<u32>,
    pub declared_value: Decimal,
    #[serde(default)]
    pub cod: bool,
    pub cod_amount: Option<Decimal>,
    /// Code of the quoted partner, if the user already picked one.
    pub partner_code: Option<String>,
    /// Shipping charge from the chosen quote.
    pub shipping_charge: Decimal,
}

/// Query for `GET /api/orders`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: UserId,
}

/// Body for `POST /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
    /// Required when moving to `pickup_scheduled`.
    pub partner_code: Option<String>,
    /// Required when moving to `pickup_scheduled`.
    pub awb: Option<String>,
    pub note: Option<String>,
}

/// Body for `POST /api/orders/{id}/cancel`.
#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub user_id: UserId,
    pub reason: Option<String>,
}

/// Create an order.
///
/// Both addresses must belong to the ordering user; COD orders must carry a
/// positive COD amount. The order starts in `pending_payment`.
#[instrument(skip(state, body), fields(user_id = %body.user_id))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<Order>)> {
    validate_create(&body)?;

    let pool = state.pool();

    UserRepository::new(pool)
        .get(body.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("unknown user".to_string()))?;

    let addresses = AddressRepository::new(pool);
    addresses
        .get_for_user(body.pickup_address_id, body.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("pickup address not found".to_string()))?;
    addresses
        .get_for_user(body.delivery_address_id, body.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("delivery address not found".to_string()))?;

    let courier_partner_id = match &body.partner_code {
        Some(code) => {
            let partner = PartnerRepository::new(pool)
                .get_by_code(code)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("unknown partner: {code}")))?;
            Some(partner.id)
        }
        None => None,
    };

    let to_i32 = |v: u32, field: &str| {
        i32::try_from(v).map_err(|_| AppError::BadRequest(format!("{field} too large")))
    };

    let order = OrderRepository::new(pool)
        .create(CreateOrder {
            order_number: generate_order_number(),
            user_id: body.user_id,
            pickup_address_id: body.pickup_address_id,
            delivery_address_id: body.delivery_address_id,
            weight_grams: to_i32(body.weight_grams, "weight_grams")?,
            length_cm: body.length_cm.map(|v| to_i32(v, "length_cm")).transpose()?,
            width_cm: body.width_cm.map(|v| to_i32(v, "width_cm")).transpose()?,
            height_cm: body.height_cm.map(|v| to_i32(v, "height_cm")).transpose()?,
            declared_value: body.declared_value,
            cod: body.cod,
            cod_amount: body.cod_amount,
            courier_partner_id,
            shipping_charge: body.shipping_charge,
        })
        .await?;

    OrderLogRepository::new(pool)
        .append(order.id, "user", "order created")
        .await?;

    tracing::info!(order_number = %order.order_number, "order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// List a user's orders, newest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(params.user_id)
        .await?;
    Ok(Json(orders))
}

/// Fetch one order.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

/// Apply a status transition to an order.
///
/// Transitions are validated against the order lifecycle; moving to
/// `pickup_scheduled` requires a partner code and AWB, which are stamped on
/// the order. Every transition lands in the audit log and (where it maps to
/// a shipment state) the local tracking timeline.
#[instrument(skip(state, body))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Order>> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool);

    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !order.status.can_transition(body.status) {
        return Err(AppError::Conflict(format!(
            "cannot move order from {} to {}",
            order.status, body.status
        )));
    }

    let updated = if body.status == OrderStatus::PickupScheduled {
        let code = body
            .partner_code
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("partner_code required".to_string()))?;
        let awb = body
            .awb
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("awb required".to_string()))?;

        let partner = PartnerRepository::new(pool)
            .get_by_code(code)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("unknown partner: {code}")))?;

        orders.assign_courier(id, partner.id, awb).await?
    } else {
        orders.set_status(id, body.status).await?
    };

    let message = body.note.map_or_else(
        || format!("status changed to {}", body.status),
        |note| format!("status changed to {}: {note}", body.status),
    );
    OrderLogRepository::new(pool)
        .append(id, "system", &message)
        .await?;

    if let Some(status) = shipment_status_for(body.status) {
        TrackingRepository::new(pool)
            .insert(
                id,
                &TrackingEvent {
                    status,
                    description: message,
                    location: None,
                    source: SOURCE_LOCAL.to_string(),
                    occurred_at: Utc::now(),
                },
            )
            .await?;
    }

    Ok(Json(updated))
}

/// Cancel an order that has not shipped yet.
#[instrument(skip(state, body))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<CancelBody>,
) -> Result<Json<Order>> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool);

    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.user_id != body.user_id {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    if !order.status.can_cancel() {
        return Err(AppError::Conflict(format!(
            "order in {} cannot be cancelled",
            order.status
        )));
    }

    let updated = orders.set_status(id, OrderStatus::Cancelled).await?;

    let message = body.reason.map_or_else(
        || "order cancelled".to_string(),
        |reason| format!("order cancelled: {reason}"),
    );
    OrderLogRepository::new(pool)
        .append(id, "user", &message)
        .await?;

    Ok(Json(updated))
}

/// Validate the create-order body fields that need no database access.
fn validate_create(body: &CreateOrderBody) -> Result<()> {
    if body.weight_grams == 0 {
        return Err(AppError::BadRequest(
            "weight_grams must be positive".to_string(),
        ));
    }
    if body.declared_value < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "declared_value cannot be negative".to_string(),
        ));
    }
    if body.shipping_charge < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "shipping_charge cannot be negative".to_string(),
        ));
    }
    if body.cod {
        let valid = body.cod_amount.is_some_and(|amount| amount > Decimal::ZERO);
        if !valid {
            return Err(AppError::BadRequest(
                "cod orders require a positive cod_amount".to_string(),
            ));
        }
    } else if body.cod_amount.is_some() {
        return Err(AppError::BadRequest(
            "cod_amount only applies to cod orders".to_string(),
        ));
    }
    Ok(())
}

/// Public order number: date plus a short random suffix.
fn generate_order_number() -> String {
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!(
        "SL-{}-{}",
        Utc::now().format("%Y%m%d"),
        suffix.to_ascii_uppercase()
    )
}

/// The shipment-timeline status a lifecycle transition corresponds to, if any.
const fn shipment_status_for(status: OrderStatus) -> Option<ShipmentStatus> {
    match status {
        OrderStatus::Confirmed => Some(ShipmentStatus::Pending),
        OrderStatus::PickupScheduled => Some(ShipmentStatus::PickupScheduled),
        OrderStatus::InTransit => Some(ShipmentStatus::InTransit),
        OrderStatus::Delivered => Some(ShipmentStatus::Delivered),
        OrderStatus::Rto => Some(ShipmentStatus::Rto),
        OrderStatus::PendingPayment | OrderStatus::Cancelled => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> CreateOrderBody {
        CreateOrderBody {
            user_id: UserId::new(1),
            pickup_address_id: AddressId::new(1),
            delivery_address_id: AddressId::new(2),
            weight_grams: 500,
            length_cm: None,
            width_cm: None,
            height_cm: None,
            declared_value: Decimal::from(1000),
            cod: false,
            cod_amount: None,
            partner_code: None,
            shipping_charge: Decimal::from(85),
        }
    }

    #[test]
    fn test_validate_create_ok() {
        assert!(validate_create(&body()).is_ok());
    }

    #[test]
    fn test_validate_create_zero_weight() {
        let mut b = body();
        b.weight_grams = 0;
        assert!(validate_create(&b).is_err());
    }

    #[test]
    fn test_validate_create_cod_requires_amount() {
        let mut b = body();
        b.cod = true;
        assert!(validate_create(&b).is_err());

        b.cod_amount = Some(Decimal::from(500));
        assert!(validate_create(&b).is_ok());
    }

    #[test]
    fn test_validate_create_rejects_stray_cod_amount() {
        let mut b = body();
        b.cod_amount = Some(Decimal::from(500));
        assert!(validate_create(&b).is_err());
    }

    #[test]
    fn test_order_number_shape() {
        let n = generate_order_number();
        assert!(n.starts_with("SL-"));
        assert_eq!(n.len(), "SL-20250301-XXXX".len());
    }

    #[test]
    fn test_shipment_status_mapping() {
        assert_eq!(
            shipment_status_for(OrderStatus::Delivered),
            Some(ShipmentStatus::Delivered)
        );
        assert_eq!(shipment_status_for(OrderStatus::Cancelled), None);
        assert_eq!(shipment_status_for(OrderStatus::PendingPayment), None);
    }
}
