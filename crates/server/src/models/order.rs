//! Order and order-log models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shiplane_core::{AddressId, OrderId, OrderLogId, OrderStatus, PartnerId, UserId};

/// A shipment order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    /// Public order number (e.g., `SL-20250301-8F2K`).
    pub order_number: String,
    pub user_id: UserId,
    pub pickup_address_id: AddressId,
    pub delivery_address_id: AddressId,
    /// Dead weight in grams.
    pub weight_grams: i32,
    pub length_cm: Option<i32>,
    pub width_cm: Option<i32>,
    pub height_cm: Option<i32>,
    /// Declared value in rupees.
    pub declared_value: Decimal,
    pub cod: bool,
    pub cod_amount: Option<Decimal>,
    pub status: OrderStatus,
    /// Selected courier, once a quote has been chosen.
    pub courier_partner_id: Option<PartnerId>,
    /// Courier tracking number, once pickup is scheduled.
    pub awb: Option<String>,
    /// Shipping charge in rupees, from the chosen quote.
    pub shipping_charge: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit entry for an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLog {
    pub id: OrderLogId,
    pub order_id: OrderId,
    /// Who acted: `user`, `system`, `webhook`, or a partner code.
    pub actor: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
