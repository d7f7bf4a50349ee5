//! Integration tests for tracking timeline merging.

use chrono::{TimeZone, Utc};

use shiplane_core::ShipmentStatus;
use shiplane_server::couriers::{TrackingEvent, merge_events};

fn event(status: ShipmentStatus, day: u32, hour: u32, source: &str) -> TrackingEvent {
    TrackingEvent {
        status,
        description: status.to_string(),
        location: Some("BLR".to_string()),
        source: source.to_string(),
        occurred_at: Utc
            .with_ymd_and_hms(2025, 3, day, hour, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[test]
fn live_events_extend_the_local_timeline() {
    let local = vec![
        event(ShipmentStatus::Pending, 1, 9, "local"),
        event(ShipmentStatus::PickupScheduled, 1, 12, "local"),
    ];
    let live = vec![
        event(ShipmentStatus::PickedUp, 2, 10, "delhivery"),
        event(ShipmentStatus::InTransit, 3, 6, "delhivery"),
    ];

    let merged = merge_events(local, live);

    assert_eq!(merged.len(), 4);
    let statuses: Vec<ShipmentStatus> = merged.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        [
            ShipmentStatus::Pending,
            ShipmentStatus::PickupScheduled,
            ShipmentStatus::PickedUp,
            ShipmentStatus::InTransit,
        ]
    );
}

#[test]
fn replayed_live_events_collapse() {
    // The enhanced endpoint persists live events, so the next call sees them
    // both stored locally and in the fresh live feed
    let local = vec![
        event(ShipmentStatus::PickedUp, 2, 10, "delhivery"),
        event(ShipmentStatus::InTransit, 3, 6, "delhivery"),
    ];
    let live = vec![
        event(ShipmentStatus::PickedUp, 2, 10, "delhivery"),
        event(ShipmentStatus::InTransit, 3, 6, "delhivery"),
        event(ShipmentStatus::OutForDelivery, 4, 8, "delhivery"),
    ];

    let merged = merge_events(local, live);
    assert_eq!(merged.len(), 3);
}

#[test]
fn merge_is_ordered_even_with_interleaved_sources() {
    let local = vec![
        event(ShipmentStatus::Pending, 1, 9, "local"),
        event(ShipmentStatus::InTransit, 3, 6, "local"),
    ];
    let live = vec![
        event(ShipmentStatus::PickedUp, 2, 10, "shadowfax"),
        event(ShipmentStatus::OutForDelivery, 4, 8, "shadowfax"),
    ];

    let merged = merge_events(local, live);
    for pair in merged.windows(2) {
        let (Some(a), Some(b)) = (pair.first(), pair.get(1)) else {
            continue;
        };
        assert!(a.occurred_at <= b.occurred_at);
    }
}

#[test]
fn empty_live_feed_leaves_local_untouched() {
    let local = vec![event(ShipmentStatus::Pending, 1, 9, "local")];
    let merged = merge_events(local.clone(), vec![]);
    assert_eq!(merged, local);
}
