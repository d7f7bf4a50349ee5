//! Tracking event row model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shiplane_core::{OrderId, ShipmentStatus, TrackingEventId};

use crate::couriers::TrackingEvent;

/// Source tag for events generated by the platform itself.
pub const SOURCE_LOCAL: &str = "local";

/// A stored tracking event for an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrackingRow {
    pub id: TrackingEventId,
    pub order_id: OrderId,
    pub status: ShipmentStatus,
    pub description: String,
    pub location: Option<String>,
    /// `local` or the partner code the event was fetched from.
    pub source: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TrackingRow {
    /// Convert to the normalized event type used by the courier layer.
    #[must_use]
    pub fn into_event(self) -> TrackingEvent {
        TrackingEvent {
            status: self.status,
            description: self.description,
            location: self.location,
            source: self.source,
            occurred_at: self.occurred_at,
        }
    }
}
