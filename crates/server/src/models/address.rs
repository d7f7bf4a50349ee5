//! Address model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shiplane_core::{AddressId, Phone, Pincode, UserId};

/// A pickup or delivery address in a user's address book.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub contact_name: String,
    pub contact_phone: Phone,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
