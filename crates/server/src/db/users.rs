//! User repository.

use sqlx::PgPool;

use shiplane_core::{Email, Phone, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, name, phone, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, name, phone, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        phone: &Phone,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (email, name, phone)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, phone, created_at, updated_at
            ",
        )
        .bind(email)
        .bind(name)
        .bind(phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        Ok(user)
    }
}
