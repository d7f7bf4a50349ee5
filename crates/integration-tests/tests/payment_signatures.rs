//! Integration tests for payment gateway signature verification.
//!
//! Signatures are generated independently here (hmac + sha2 + hex) and
//! verified through the real `RazorpayClient`, matching what the gateway
//! sends in production.

use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;

use shiplane_server::config::RazorpayConfig;
use shiplane_server::payments::{PaymentError, RazorpayClient, WebhookEvent};

type HmacSha256 = Hmac<Sha256>;

const KEY_SECRET: &str = "kYgeSwofcMdoMVLVbhsWqFzf";
const WEBHOOK_SECRET: &str = "whsec_9Xn2pQvTlCeBrAiD";

fn client() -> RazorpayClient {
    RazorpayClient::new(&RazorpayConfig {
        base_url: "https://api.razorpay.com".to_string(),
        key_id: "rzp_test_Fm3qasELJvTm2j".to_string(),
        key_secret: SecretString::from(KEY_SECRET),
        webhook_secret: SecretString::from(WEBHOOK_SECRET),
    })
    .expect("client builds")
}

fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("valid key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

// =============================================================================
// Checkout callback signatures
// =============================================================================

#[test]
fn checkout_signature_verifies() {
    let client = client();
    let signature = sign(KEY_SECRET, b"order_Ab12Cd34|pay_Ef56Gh78");

    assert!(
        client
            .verify_checkout_signature("order_Ab12Cd34", "pay_Ef56Gh78", &signature)
            .is_ok()
    );
}

#[test]
fn checkout_signature_rejects_different_payment() {
    let client = client();
    let signature = sign(KEY_SECRET, b"order_Ab12Cd34|pay_Ef56Gh78");

    let err = client
        .verify_checkout_signature("order_Ab12Cd34", "pay_Other", &signature)
        .expect_err("must reject");
    assert!(matches!(err, PaymentError::InvalidSignature));
}

#[test]
fn checkout_signature_rejects_truncated_signature() {
    let client = client();
    let mut signature = sign(KEY_SECRET, b"order_Ab12Cd34|pay_Ef56Gh78");
    signature.pop();

    assert!(
        client
            .verify_checkout_signature("order_Ab12Cd34", "pay_Ef56Gh78", &signature)
            .is_err()
    );
}

// =============================================================================
// Webhook signatures
// =============================================================================

#[test]
fn webhook_roundtrip_verifies_and_parses() {
    let client = client();
    let body = br#"{
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": "pay_29QQoUBi66xm2f",
                    "order_id": "order_Ab12Cd34",
                    "amount": 8750
                }
            }
        }
    }"#;
    let signature = sign(WEBHOOK_SECRET, body);

    client
        .verify_webhook_signature(body, &signature)
        .expect("signature verifies");

    let event = WebhookEvent::from_body(body).expect("parses");
    assert_eq!(event.event, "payment.captured");
    assert_eq!(event.payload.payment.entity.amount, 8750);
}

#[test]
fn webhook_single_bit_flip_fails() {
    let client = client();
    let body = br#"{"event":"payment.captured","payload":{"payment":{"entity":{"id":"pay_x","order_id":"order_y","amount":100}}}}"#;
    let signature = sign(WEBHOOK_SECRET, body);

    let mut tampered = body.to_vec();
    // amount 100 -> 900
    let pos = tampered
        .windows(3)
        .position(|w| w == b"100")
        .expect("amount present");
    if let Some(byte) = tampered.get_mut(pos) {
        *byte = b'9';
    }

    assert!(client.verify_webhook_signature(&tampered, &signature).is_err());
}

#[test]
fn webhook_rejects_signature_from_wrong_secret() {
    let client = client();
    let body = br#"{"event":"payment.captured"}"#;
    let signature = sign(KEY_SECRET, body);

    assert!(client.verify_webhook_signature(body, &signature).is_err());
}
