//! Tracking event repository.

use sqlx::PgPool;

use shiplane_core::OrderId;

use super::RepositoryError;
use crate::couriers::TrackingEvent;
use crate::models::TrackingRow;

/// Repository for order tracking events.
pub struct TrackingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TrackingRepository<'a> {
    /// Create a new tracking repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List an order's tracking events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<TrackingRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, TrackingRow>(
            r"
            SELECT id, order_id, status, description, location, source,
                   occurred_at, created_at
            FROM order_tracking
            WHERE order_id = $1
            ORDER BY occurred_at
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert one tracking event.
    ///
    /// Duplicates on (order, status, occurred-at) are silently skipped, so
    /// replaying a partner feed is safe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        order_id: OrderId,
        event: &TrackingEvent,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO order_tracking (order_id, status, description, location, source, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (order_id, status, occurred_at) DO NOTHING
            ",
        )
        .bind(order_id)
        .bind(event.status)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.source)
        .bind(event.occurred_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Insert a batch of events (e.g., a fetched live timeline), skipping
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn insert_all(
        &self,
        order_id: OrderId,
        events: &[TrackingEvent],
    ) -> Result<(), RepositoryError> {
        for event in events {
            self.insert(order_id, event).await?;
        }
        Ok(())
    }
}
