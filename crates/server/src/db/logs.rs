//! Order audit log repository.

use sqlx::PgPool;

use shiplane_core::OrderId;

use super::RepositoryError;
use crate::models::OrderLog;

/// Repository for the append-only order audit trail.
pub struct OrderLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderLogRepository<'a> {
    /// Create a new order log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn append(
        &self,
        order_id: OrderId,
        actor: &str,
        message: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO order_logs (order_id, actor, message)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(order_id)
        .bind(actor)
        .bind(message)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List an order's audit entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, OrderLog>(
            r"
            SELECT id, order_id, actor, message, created_at
            FROM order_logs
            WHERE order_id = $1
            ORDER BY created_at
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(logs)
    }
}
