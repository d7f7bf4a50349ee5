//! Courier partner repository.

use sqlx::PgPool;

use shiplane_core::PartnerId;

use super::{RepositoryError, map_unique_violation};
use crate::models::CourierPartner;

/// Repository for the courier partner registry.
pub struct PartnerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PartnerRepository<'a> {
    /// Create a new partner repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all partners, by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CourierPartner>, RepositoryError> {
        let partners = sqlx::query_as::<_, CourierPartner>(
            r"
            SELECT id, code, name, active, created_at, updated_at
            FROM courier_partners
            ORDER BY code
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(partners)
    }

    /// Codes of all active partners.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_codes(&self) -> Result<Vec<String>, RepositoryError> {
        let codes = sqlx::query_scalar::<_, String>(
            r"
            SELECT code FROM courier_partners
            WHERE active
            ORDER BY code
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(codes)
    }

    /// Get a partner by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PartnerId) -> Result<Option<CourierPartner>, RepositoryError> {
        let partner = sqlx::query_as::<_, CourierPartner>(
            r"
            SELECT id, code, name, active, created_at, updated_at
            FROM courier_partners
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(partner)
    }

    /// Get a partner by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<CourierPartner>, RepositoryError> {
        let partner = sqlx::query_as::<_, CourierPartner>(
            r"
            SELECT id, code, name, active, created_at, updated_at
            FROM courier_partners
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(partner)
    }

    /// Enable or disable a partner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no partner has this code.
    pub async fn set_active(&self, code: &str, active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE courier_partners
            SET active = $2, updated_at = NOW()
            WHERE code = $1
            ",
        )
        .bind(code)
        .bind(active)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert a partner if its code is not registered yet (used by seeding).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn upsert(&self, code: &str, name: &str) -> Result<CourierPartner, RepositoryError> {
        let partner = sqlx::query_as::<_, CourierPartner>(
            r"
            INSERT INTO courier_partners (code, name, active)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (code) DO UPDATE SET name = $2, updated_at = NOW()
            RETURNING id, code, name, active, created_at, updated_at
            ",
        )
        .bind(code)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "partner code already exists"))?;

        Ok(partner)
    }
}
