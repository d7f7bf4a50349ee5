//! Courier partner model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shiplane_core::PartnerId;

/// A courier partner row. The `code` links the row to its in-process adapter;
/// `active` controls whether the manager queries it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CourierPartner {
    pub id: PartnerId,
    /// Stable short code (e.g., `delhivery`), unique.
    pub code: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
