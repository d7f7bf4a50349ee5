//! Payment route handlers.
//!
//! Flow: `create` opens a gateway order for an order's shipping charge,
//! `verify` handles the checkout callback (signature over
//! `"{order_id}|{payment_id}"`), and `webhook` consumes gateway events
//! (signature over the raw body). Both signature paths are constant-time;
//! webhook handling is idempotent under redelivery.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use shiplane_core::{Money, OrderId, OrderStatus, PaymentStatus, ShipmentStatus, UserId};

use crate::couriers::TrackingEvent;
use crate::db::{OrderLogRepository, OrderRepository, PaymentRepository, TrackingRepository};
use crate::error::{AppError, Result};
use crate::models::Payment;
use crate::models::tracking::SOURCE_LOCAL;
use crate::payments::webhook::{EVENT_PAYMENT_CAPTURED, EVENT_PAYMENT_FAILED, PaymentEntity};
use crate::payments::{PaymentError, WebhookEvent};
use crate::state::AppState;

/// Signature header set by the gateway on webhook deliveries.
const WEBHOOK_SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Body for `POST /api/payments/create`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub order_id: OrderId,
    pub user_id: UserId,
}

/// Response for `POST /api/payments/create`: everything the checkout
/// frontend needs to open the gateway widget.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub payment: Payment,
    pub gateway_order_id: String,
    pub key_id: String,
    /// Amount in minor units (paise), as the checkout widget expects.
    pub amount: i64,
    pub currency: String,
}

/// Body for `POST /api/payments/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

/// Acknowledgement body for webhook deliveries.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: &'static str,
}

/// Create a payment for an order's shipping charge.
///
/// Opens a gateway order and records it locally in `created` state.
#[instrument(skip(state, body), fields(order_id = %body.order_id))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<CreateResponse>)> {
    let pool = state.pool();

    let order = OrderRepository::new(pool)
        .get(body.order_id)
        .await?
        .filter(|o| o.user_id == body.user_id)
        .ok_or_else(|| AppError::NotFound(format!("order {}", body.order_id)))?;

    if order.status != OrderStatus::PendingPayment {
        return Err(AppError::Conflict(format!(
            "order in {} is not awaiting payment",
            order.status
        )));
    }

    let amount = Money::inr(order.shipping_charge);
    if !amount.is_positive() {
        return Err(AppError::BadRequest(
            "order has no payable shipping charge".to_string(),
        ));
    }

    let gateway_order = state
        .razorpay()
        .create_order(amount, &order.order_number)
        .await?;

    let payment = PaymentRepository::new(pool)
        .create(
            order.id,
            &gateway_order.id,
            order.shipping_charge,
            &gateway_order.currency,
        )
        .await?;

    OrderLogRepository::new(pool)
        .append(
            order.id,
            "user",
            &format!("payment initiated ({})", gateway_order.id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            gateway_order_id: gateway_order.id,
            key_id: state.razorpay().key_id().to_string(),
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            payment,
        }),
    ))
}

/// Verify a checkout callback and capture the payment.
///
/// Replaying a callback for an already-captured payment is a no-op success.
#[instrument(skip(state, body), fields(gateway_order_id = %body.gateway_order_id))]
pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<Payment>> {
    state.razorpay().verify_checkout_signature(
        &body.gateway_order_id,
        &body.gateway_payment_id,
        &body.signature,
    )?;

    let pool = state.pool();
    let payment = PaymentRepository::new(pool)
        .get_by_gateway_order(&body.gateway_order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment {}", body.gateway_order_id)))?;

    if payment.status == PaymentStatus::Captured {
        return Ok(Json(payment));
    }

    let payment = PaymentRepository::new(pool)
        .mark_captured(payment.id, &body.gateway_payment_id)
        .await?;

    confirm_order(pool, payment.order_id, &body.gateway_payment_id, "user").await?;

    Ok(Json(payment))
}

/// Consume a gateway webhook.
///
/// The raw body is HMAC-verified before parsing. `payment.captured` and
/// `payment.failed` update the payment and order; everything else is
/// acknowledged and ignored. Redelivered captures are no-ops.
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Ack>> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Payment(PaymentError::InvalidSignature))?;

    state.razorpay().verify_webhook_signature(&body, signature)?;

    let event = WebhookEvent::from_body(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook: {e}")))?;

    match event.event.as_str() {
        EVENT_PAYMENT_CAPTURED => {
            handle_captured(state.pool(), &event.payload.payment.entity).await?;
        }
        EVENT_PAYMENT_FAILED => {
            handle_failed(state.pool(), &event.payload.payment.entity).await?;
        }
        other => {
            tracing::debug!(event = other, "ignoring webhook event");
        }
    }

    Ok(Json(Ack { status: "ok" }))
}

async fn handle_captured(pool: &PgPool, entity: &PaymentEntity) -> Result<()> {
    let payment = PaymentRepository::new(pool)
        .get_by_gateway_order(&entity.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment {}", entity.order_id)))?;

    if payment.status == PaymentStatus::Captured {
        tracing::debug!(gateway_order_id = %entity.order_id, "capture already processed");
        return Ok(());
    }

    PaymentRepository::new(pool)
        .mark_captured(payment.id, &entity.id)
        .await?;

    confirm_order(pool, payment.order_id, &entity.id, "webhook").await?;
    Ok(())
}

async fn handle_failed(pool: &PgPool, entity: &PaymentEntity) -> Result<()> {
    let payment = PaymentRepository::new(pool)
        .get_by_gateway_order(&entity.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment {}", entity.order_id)))?;

    // A failure event after a successful capture is stale; keep the capture
    if payment.status == PaymentStatus::Captured {
        tracing::warn!(gateway_order_id = %entity.order_id, "failure event for captured payment ignored");
        return Ok(());
    }
    if payment.status == PaymentStatus::Failed {
        return Ok(());
    }

    PaymentRepository::new(pool)
        .mark_failed(payment.id, &entity.id, entity.error_description.as_deref())
        .await?;

    let reason = entity
        .error_description
        .as_deref()
        .unwrap_or("payment failed");
    OrderLogRepository::new(pool)
        .append(payment.order_id, "webhook", &format!("payment failed: {reason}"))
        .await?;

    Ok(())
}

/// Move the paid order to `confirmed`, with audit log and tracking entries.
async fn confirm_order(
    pool: &PgPool,
    order_id: OrderId,
    gateway_payment_id: &str,
    actor: &str,
) -> Result<()> {
    let orders = OrderRepository::new(pool);
    let order = orders
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    // The order may already be confirmed if checkout callback and webhook race
    if order.status == OrderStatus::PendingPayment {
        orders.set_status(order_id, OrderStatus::Confirmed).await?;

        TrackingRepository::new(pool)
            .insert(
                order_id,
                &TrackingEvent {
                    status: ShipmentStatus::Pending,
                    description: "order confirmed, awaiting pickup scheduling".to_string(),
                    location: None,
                    source: SOURCE_LOCAL.to_string(),
                    occurred_at: Utc::now(),
                },
            )
            .await?;
    }

    OrderLogRepository::new(pool)
        .append(
            order_id,
            actor,
            &format!("payment captured ({gateway_payment_id})"),
        )
        .await?;

    Ok(())
}
