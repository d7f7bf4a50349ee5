//! User model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shiplane_core::{Email, Phone, UserId};

/// A platform user. Authentication itself lives in the trusted frontend;
/// the API only needs identity for ownership checks.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: Phone,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
