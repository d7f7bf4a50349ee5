//! Razorpay REST client and signature verification.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use tracing::instrument;

use shiplane_core::Money;

use super::{PaymentError, constant_time_compare};
use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Razorpay API client.
///
/// Creates gateway orders and verifies the two signature schemes the gateway
/// uses: checkout callbacks (signed with the key secret) and webhooks (signed
/// with the dedicated webhook secret).
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: SecretString,
    webhook_secret: SecretString,
}

/// A gateway order, created before checkout opens.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id (e.g., `order_EKwxwAgItmmXdp`).
    pub id: String,
    /// Amount in minor units (paise).
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Gateway-side status (`created`, `attempted`, `paid`).
    pub status: String,
}

impl RazorpayClient {
    /// Create a new Razorpay API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &RazorpayConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    /// The public key id, needed by the checkout frontend.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a gateway order for the given amount.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` if the amount does not convert
    /// to minor units, `PaymentError::Gateway` on an error response.
    #[instrument(skip(self, amount), fields(receipt = %receipt))]
    pub async fn create_order(
        &self,
        amount: Money,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        let minor = amount
            .to_minor_units()
            .ok_or_else(|| PaymentError::InvalidAmount(amount.to_string()))?;

        let url = format!("{}/v1/orders", self.base_url);
        let body = serde_json::json!({
            "amount": minor,
            "currency": amount.currency.code(),
            "receipt": receipt,
            "payment_capture": 1,
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }

    /// Verify a checkout callback signature.
    ///
    /// The gateway signs `"{order_id}|{payment_id}"` with the key secret and
    /// hands the hex HMAC to the frontend, which relays it here.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` on mismatch.
    #[instrument(skip(self, signature))]
    pub fn verify_checkout_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let payload = format!("{gateway_order_id}|{gateway_payment_id}");
        verify_hmac_hex(self.key_secret.expose_secret(), payload.as_bytes(), signature)
    }

    /// Verify a webhook signature (the `X-Razorpay-Signature` header).
    ///
    /// The signature is the hex HMAC-SHA256 of the raw request body under the
    /// webhook secret. Must be called on the raw bytes, before JSON parsing.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` on mismatch.
    #[instrument(skip(self, body, signature))]
    pub fn verify_webhook_signature(
        &self,
        body: &[u8],
        signature: &str,
    ) -> Result<(), PaymentError> {
        verify_hmac_hex(self.webhook_secret.expose_secret(), body, signature)
    }
}

/// Compute HMAC-SHA256 of `payload` under `secret` and compare (constant
/// time) against the hex-encoded `expected`.
fn verify_hmac_hex(secret: &str, payload: &[u8], expected: &str) -> Result<(), PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(payload);
    let computed = hex::encode(mac.finalize().into_bytes());

    if constant_time_compare(computed.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> RazorpayClient {
        RazorpayClient::new(&RazorpayConfig {
            base_url: "https://api.razorpay.com".to_string(),
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from("checkout-secret"),
            webhook_secret: SecretString::from("webhook-secret"),
        })
        .unwrap()
    }

    fn sign(secret: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_checkout_signature_roundtrip() {
        let client = test_client();
        let signature = sign("checkout-secret", b"order_abc|pay_def");

        assert!(
            client
                .verify_checkout_signature("order_abc", "pay_def", &signature)
                .is_ok()
        );
    }

    #[test]
    fn test_checkout_signature_rejects_swapped_ids() {
        let client = test_client();
        let signature = sign("checkout-secret", b"order_abc|pay_def");

        let err = client
            .verify_checkout_signature("pay_def", "order_abc", &signature)
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidSignature));
    }

    #[test]
    fn test_webhook_signature_roundtrip() {
        let client = test_client();
        let body = br#"{"event":"payment.captured"}"#;
        let signature = sign("webhook-secret", body);

        assert!(client.verify_webhook_signature(body, &signature).is_ok());
    }

    #[test]
    fn test_webhook_signature_rejects_tampered_body() {
        let client = test_client();
        let signature = sign("webhook-secret", br#"{"event":"payment.captured"}"#);

        let err = client
            .verify_webhook_signature(br#"{"event":"payment.failed"}"#, &signature)
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidSignature));
    }

    #[test]
    fn test_webhook_signature_rejects_wrong_secret() {
        let client = test_client();
        let body = br#"{"event":"payment.captured"}"#;
        // Signed with the checkout secret instead of the webhook secret
        let signature = sign("checkout-secret", body);

        assert!(client.verify_webhook_signature(body, &signature).is_err());
    }

    #[test]
    fn test_gateway_order_parses() {
        let body = r#"{
            "id": "order_EKwxwAgItmmXdp",
            "amount": 9950,
            "currency": "INR",
            "status": "created",
            "receipt": "SL-20250301-1042"
        }"#;
        let order: GatewayOrder = serde_json::from_str(body).unwrap();
        assert_eq!(order.id, "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 9950);
        assert_eq!(order.status, "created");
    }
}
