//! Status enums for orders, payments, and shipments.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, awaiting payment.
    #[default]
    PendingPayment,
    /// Payment captured, awaiting pickup scheduling.
    Confirmed,
    /// Courier assigned, pickup scheduled (order has partner + AWB).
    PickupScheduled,
    /// Shipment moving through the courier network.
    InTransit,
    /// Delivered to the recipient.
    Delivered,
    /// Cancelled before shipment.
    Cancelled,
    /// Returned to origin.
    Rto,
}

impl OrderStatus {
    /// Whether the order can still be cancelled (i.e., has not shipped).
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        matches!(
            self,
            Self::PendingPayment | Self::Confirmed | Self::PickupScheduled
        )
    }

    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// The lifecycle only moves forward; terminal states (`Delivered`,
    /// `Cancelled`, `Rto`) accept no further transitions.
    #[must_use]
    pub const fn can_transition(&self, next: Self) -> bool {
        match self {
            Self::PendingPayment => matches!(next, Self::Confirmed | Self::Cancelled),
            Self::Confirmed => matches!(next, Self::PickupScheduled | Self::Cancelled),
            Self::PickupScheduled => matches!(next, Self::InTransit | Self::Cancelled),
            Self::InTransit => matches!(next, Self::Delivered | Self::Rto),
            Self::Delivered | Self::Cancelled | Self::Rto => false,
        }
    }

    /// Whether this is a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Rto)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PendingPayment => "pending_payment",
            Self::Confirmed => "confirmed",
            Self::PickupScheduled => "pickup_scheduled",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Rto => "rto",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "confirmed" => Ok(Self::Confirmed),
            "pickup_scheduled" => Ok(Self::PickupScheduled),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "rto" => Ok(Self::Rto),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Status of a payment at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Gateway order created, awaiting checkout.
    #[default]
    Created,
    /// Funds captured.
    Captured,
    /// Payment attempt failed.
    Failed,
    /// Captured funds returned.
    Refunded,
}

/// Normalized shipment status, common across all courier partners.
///
/// Each adapter maps its partner's status vocabulary into this enum;
/// partner strings with no mapping become [`ShipmentStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shipment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Shipment registered, not yet handed to the courier.
    Pending,
    /// Pickup scheduled with the courier.
    PickupScheduled,
    /// Package collected from the origin.
    PickedUp,
    /// Moving between courier facilities.
    InTransit,
    /// With the delivery agent.
    OutForDelivery,
    /// Delivered to the recipient.
    Delivered,
    /// A failed attempt or hold (address issue, recipient unavailable).
    Exception,
    /// Return to origin in progress or complete.
    Rto,
    /// Partner status string with no known mapping.
    Unknown,
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::PickupScheduled => "pickup_scheduled",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Exception => "exception",
            Self::Rto => "rto",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::PendingPayment.can_transition(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition(OrderStatus::PickupScheduled));
        assert!(OrderStatus::PickupScheduled.can_transition(OrderStatus::InTransit));
        assert!(OrderStatus::InTransit.can_transition(OrderStatus::Delivered));
        assert!(OrderStatus::InTransit.can_transition(OrderStatus::Rto));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!OrderStatus::Confirmed.can_transition(OrderStatus::PendingPayment));
        assert!(!OrderStatus::InTransit.can_transition(OrderStatus::Confirmed));
        assert!(!OrderStatus::Delivered.can_transition(OrderStatus::InTransit));
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for terminal in [
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Rto,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition(OrderStatus::Confirmed));
            assert!(!terminal.can_transition(OrderStatus::Cancelled));
        }
    }

    #[test]
    fn test_cancel_window_closes_at_shipment() {
        assert!(OrderStatus::PendingPayment.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(OrderStatus::PickupScheduled.can_cancel());
        assert!(!OrderStatus::InTransit.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
    }

    #[test]
    fn test_display_fromstr_roundtrip() {
        for status in [
            OrderStatus::PendingPayment,
            OrderStatus::Confirmed,
            OrderStatus::PickupScheduled,
            OrderStatus::InTransit,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Rto,
        ] {
            let parsed: OrderStatus = status.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::PickupScheduled).expect("serializes");
        assert_eq!(json, "\"pickup_scheduled\"");
        let json = serde_json::to_string(&ShipmentStatus::OutForDelivery).expect("serializes");
        assert_eq!(json, "\"out_for_delivery\"");
    }
}
