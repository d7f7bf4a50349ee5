//! Payment repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use shiplane_core::{OrderId, PaymentId, PaymentStatus};

use super::{RepositoryError, map_unique_violation};
use crate::models::Payment;

const PAYMENT_COLUMNS: &str = r"id, order_id, gateway_order_id, gateway_payment_id, amount,
           currency, status, failure_reason, created_at, updated_at";

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a freshly created gateway order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the gateway order id is already
    /// recorded.
    pub async fn create(
        &self,
        order_id: OrderId,
        gateway_order_id: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<Payment, RepositoryError> {
        let query = format!(
            r"
            INSERT INTO payments (order_id, gateway_order_id, amount, currency)
            VALUES ($1, $2, $3, $4)
            RETURNING {PAYMENT_COLUMNS}
            "
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(order_id)
            .bind(gateway_order_id)
            .bind(amount)
            .bind(currency)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "gateway order already recorded"))?;

        Ok(payment)
    }

    /// Get a payment by its gateway order id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_gateway_order(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let query = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE gateway_order_id = $1");
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(gateway_order_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(payment)
    }

    /// Latest payment for an order, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Payment>, RepositoryError> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = $1
             ORDER BY created_at DESC LIMIT 1"
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(order_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(payment)
    }

    /// Mark a payment captured, recording the gateway payment id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn mark_captured(
        &self,
        id: PaymentId,
        gateway_payment_id: &str,
    ) -> Result<Payment, RepositoryError> {
        let query = format!(
            r"
            UPDATE payments
            SET status = $2, gateway_payment_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Captured)
            .bind(gateway_payment_id)
            .fetch_optional(self.pool)
            .await?;

        payment.ok_or(RepositoryError::NotFound)
    }

    /// Mark a payment failed with a reason.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn mark_failed(
        &self,
        id: PaymentId,
        gateway_payment_id: &str,
        reason: Option<&str>,
    ) -> Result<Payment, RepositoryError> {
        let query = format!(
            r"
            UPDATE payments
            SET status = $2, gateway_payment_id = $3, failure_reason = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Failed)
            .bind(gateway_payment_id)
            .bind(reason)
            .fetch_optional(self.pool)
            .await?;

        payment.ok_or(RepositoryError::NotFound)
    }
}
