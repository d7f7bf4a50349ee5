//! Address repository.

use sqlx::PgPool;

use shiplane_core::{AddressId, Phone, Pincode, UserId};

use super::RepositoryError;
use crate::models::Address;

/// Fields for creating or updating an address.
pub struct AddressInput {
    pub contact_name: String,
    pub contact_phone: Phone,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub is_default: bool,
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first, then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, contact_name, contact_phone, line1, line2,
                   city, state, pincode, is_default, created_at, updated_at
            FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Get one of a user's addresses. Ownership is part of the lookup, so a
    /// foreign address behaves like a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, contact_name, contact_phone, line1, line2,
                   city, state, pincode, is_default, created_at, updated_at
            FROM addresses
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Create an address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO addresses (user_id, contact_name, contact_phone, line1, line2,
                                   city, state, pincode, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, contact_name, contact_phone, line1, line2,
                      city, state, pincode, is_default, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(&input.contact_name)
        .bind(&input.contact_phone)
        .bind(&input.line1)
        .bind(&input.line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.pincode)
        .bind(input.is_default)
        .fetch_one(self.pool)
        .await?;

        Ok(address)
    }

    /// Update one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to someone else.
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            UPDATE addresses
            SET contact_name = $3, contact_phone = $4, line1 = $5, line2 = $6,
                city = $7, state = $8, pincode = $9, is_default = $10,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, contact_name, contact_phone, line1, line2,
                      city, state, pincode, is_default, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.contact_name)
        .bind(&input.contact_phone)
        .bind(&input.line1)
        .bind(&input.line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.pincode)
        .bind(input.is_default)
        .fetch_optional(self.pool)
        .await?;

        address.ok_or(RepositoryError::NotFound)
    }

    /// Delete one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to someone else.
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM addresses
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
