//! Payment gateway (Razorpay) integration.
//!
//! # Architecture
//!
//! - [`RazorpayClient`] creates gateway orders over REST with basic auth
//! - Checkout callbacks are verified with HMAC-SHA256 over
//!   `"{order_id}|{payment_id}"` using the key secret
//! - Webhooks are verified with HMAC-SHA256 over the raw request body using
//!   the webhook secret, then parsed into a [`webhook::WebhookEvent`]
//!
//! # Security
//!
//! Both signature checks use a constant-time comparison; the raw body must be
//! verified before any JSON parsing happens.

pub mod client;
pub mod webhook;

pub use client::{GatewayOrder, RazorpayClient};
pub use webhook::WebhookEvent;

use thiserror::Error;

/// Errors that can occur when interacting with the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("Gateway error: {status} - {message}")]
    Gateway { status: u16, message: String },

    /// Failed to parse a gateway response or webhook payload.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Amount cannot be represented in gateway minor units.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Constant-time byte comparison to prevent timing attacks.
pub(crate) fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(constant_time_compare(b"", b""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hell"));
        assert!(!constant_time_compare(b"hello", b"helloo"));
    }

    #[test]
    fn test_payment_error_display() {
        let err = PaymentError::Gateway {
            status: 400,
            message: "amount too small".to_string(),
        };
        assert_eq!(err.to_string(), "Gateway error: 400 - amount too small");
        assert_eq!(PaymentError::InvalidSignature.to_string(), "Invalid signature");
    }
}
