//! Payment model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shiplane_core::{OrderId, PaymentId, PaymentStatus};

/// A payment against an order, mirrored from the gateway.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    /// Gateway order id (e.g., `order_EKwxwAgItmmXdp`), unique.
    pub gateway_order_id: String,
    /// Gateway payment id, set once the payment is captured or failed.
    pub gateway_payment_id: Option<String>,
    /// Amount in rupees.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: String,
    pub status: PaymentStatus,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
