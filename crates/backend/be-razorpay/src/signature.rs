//! HMAC-SHA256 signature helpers for Razorpay checkout and webhooks.
//!
//! Checkout signs `order_id + "|" + payment_id`; webhooks sign the raw
//! request body. Both signatures arrive hex-encoded. Verification decodes
//! the supplied hex and compares in constant time via `Mac::verify_slice`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex signature Razorpay attaches to a successful checkout.
pub fn payment_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    sign(format!("{order_id}|{payment_id}").as_bytes(), secret)
}

/// Verifies a checkout signature.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    verify(format!("{order_id}|{payment_id}").as_bytes(), signature, secret)
}

/// Verifies the `X-Razorpay-Signature` header against the raw webhook body.
pub fn verify_webhook_signature(body: &[u8], signature: &str, secret: &str) -> bool {
    verify(body, signature, secret)
}

fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn verify(payload: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(supplied) = hex::decode(signature) else {
        return false;
    };
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(&supplied).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_signature_round_trips() {
        let sig = payment_signature("order_123", "pay_456", "my_secret_key");
        assert!(verify_payment_signature(
            "order_123",
            "pay_456",
            &sig,
            "my_secret_key"
        ));
    }

    #[test]
    fn tampered_payment_id_fails() {
        let sig = payment_signature("order_123", "pay_456", "my_secret_key");
        assert!(!verify_payment_signature(
            "order_123",
            "pay_457",
            &sig,
            "my_secret_key"
        ));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = payment_signature("order_123", "pay_456", "my_secret_key");
        assert!(!verify_payment_signature(
            "order_123",
            "pay_456",
            &sig,
            "other_key"
        ));
    }

    #[test]
    fn non_hex_signature_fails_cleanly() {
        assert!(!verify_payment_signature(
            "order_123",
            "pay_456",
            "not-hex!",
            "my_secret_key"
        ));
    }

    #[test]
    fn webhook_signature_covers_raw_body() {
        let body = br#"{"event":"payment.captured"}"#;
        let sig = sign(body, "webhook_secret");
        assert!(verify_webhook_signature(body, &sig, "webhook_secret"));
        assert!(!verify_webhook_signature(
            br#"{"event":"payment.failed"}"#,
            &sig,
            "webhook_secret"
        ));
    }
}
