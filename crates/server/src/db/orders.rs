//! Order repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use shiplane_core::{AddressId, OrderId, OrderStatus, PartnerId, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::Order;

const ORDER_COLUMNS: &str = r"id, order_number, user_id, pickup_address_id, delivery_address_id,
           weight_grams, length_cm, width_cm, height_cm, declared_value,
           cod, cod_amount, status, courier_partner_id, awb, shipping_charge,
           created_at, updated_at";

/// Parameters for creating an order.
pub struct CreateOrder {
    pub order_number: String,
    pub user_id: UserId,
    pub pickup_address_id: AddressId,
    pub delivery_address_id: AddressId,
    pub weight_grams: i32,
    pub length_cm: Option<i32>,
    pub width_cm: Option<i32>,
    pub height_cm: Option<i32>,
    pub declared_value: Decimal,
    pub cod: bool,
    pub cod_amount: Option<Decimal>,
    pub courier_partner_id: Option<PartnerId>,
    pub shipping_charge: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new order in `pending_payment` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, params: CreateOrder) -> Result<Order, RepositoryError> {
        let query = format!(
            r"
            INSERT INTO orders (order_number, user_id, pickup_address_id, delivery_address_id,
                                weight_grams, length_cm, width_cm, height_cm, declared_value,
                                cod, cod_amount, courier_partner_id, shipping_charge)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ORDER_COLUMNS}
            "
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&params.order_number)
            .bind(params.user_id)
            .bind(params.pickup_address_id)
            .bind(params.delivery_address_id)
            .bind(params.weight_grams)
            .bind(params.length_cm)
            .bind(params.width_cm)
            .bind(params.height_cm)
            .bind(params.declared_value)
            .bind(params.cod)
            .bind(params.cod_amount)
            .bind(params.courier_partner_id)
            .bind(params.shipping_charge)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "order number already exists"))?;

        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(order)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// Set an order's status.
    ///
    /// Transition validity is the caller's responsibility (see
    /// `OrderStatus::can_transition`); this just writes the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let query = format!(
            r"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(self.pool)
            .await?;

        order.ok_or(RepositoryError::NotFound)
    }

    /// Stamp the chosen courier and AWB on an order and move it to
    /// `pickup_scheduled`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn assign_courier(
        &self,
        id: OrderId,
        partner_id: PartnerId,
        awb: &str,
    ) -> Result<Order, RepositoryError> {
        let query = format!(
            r"
            UPDATE orders
            SET courier_partner_id = $2, awb = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(partner_id)
            .bind(awb)
            .bind(OrderStatus::PickupScheduled)
            .fetch_optional(self.pool)
            .await?;

        order.ok_or(RepositoryError::NotFound)
    }
}
