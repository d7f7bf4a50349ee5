//! Webhook payload types.
//!
//! Only the payment events the platform reacts to are modeled; everything
//! else is acknowledged and ignored by the route handler.

use serde::Deserialize;

use super::PaymentError;

/// Event name for a captured payment.
pub const EVENT_PAYMENT_CAPTURED: &str = "payment.captured";
/// Event name for a failed payment.
pub const EVENT_PAYMENT_FAILED: &str = "payment.failed";

/// A gateway webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event name (e.g., `payment.captured`).
    pub event: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub payment: PaymentWrapper,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentWrapper {
    pub entity: PaymentEntity,
}

/// The payment entity embedded in webhook payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntity {
    /// Gateway payment id (e.g., `pay_29QQoUBi66xm2f`).
    pub id: String,
    /// Gateway order id this payment belongs to.
    pub order_id: String,
    /// Amount in minor units (paise).
    pub amount: i64,
    /// Failure description, present on `payment.failed`.
    #[serde(default)]
    pub error_description: Option<String>,
}

impl WebhookEvent {
    /// Parse a webhook event from the raw (already signature-verified) body.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Parse` if the body is not a well-formed event.
    pub fn from_body(body: &[u8]) -> Result<Self, PaymentError> {
        serde_json::from_slice(body).map_err(|e| PaymentError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_event_parses() {
        let body = br#"{
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_29QQoUBi66xm2f",
                        "order_id": "order_EKwxwAgItmmXdp",
                        "amount": 9950,
                        "status": "captured"
                    }
                }
            }
        }"#;
        let event = WebhookEvent::from_body(body).unwrap();
        assert_eq!(event.event, EVENT_PAYMENT_CAPTURED);
        assert_eq!(event.payload.payment.entity.id, "pay_29QQoUBi66xm2f");
        assert_eq!(event.payload.payment.entity.amount, 9950);
        assert!(event.payload.payment.entity.error_description.is_none());
    }

    #[test]
    fn test_failed_event_carries_description() {
        let body = br#"{
            "event": "payment.failed",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_FailedOne",
                        "order_id": "order_EKwxwAgItmmXdp",
                        "amount": 9950,
                        "error_description": "Card declined by issuing bank"
                    }
                }
            }
        }"#;
        let event = WebhookEvent::from_body(body).unwrap();
        assert_eq!(event.event, EVENT_PAYMENT_FAILED);
        assert_eq!(
            event.payload.payment.entity.error_description.as_deref(),
            Some("Card declined by issuing bank")
        );
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = WebhookEvent::from_body(b"not json").unwrap_err();
        assert!(matches!(err, PaymentError::Parse(_)));
    }
}
