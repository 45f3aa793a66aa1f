//! Razorpay webhook intake.
//!
//! The signature covers the raw request body, so the handler takes the body
//! as a `String` and parses only after verification. Razorpay retries on
//! non-2xx, so every accepted delivery answers `{"received": true}` even
//! when local processing fails; failures are logged for reconciliation.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::error::PaymentError;
use crate::service::AppState;

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    payload: Option<WebhookPayload>,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: Option<PaymentWrapper>,
}

#[derive(Debug, Deserialize)]
struct PaymentWrapper {
    entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    order_id: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /payment/webhook
// ---------------------------------------------------------------------------

pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, PaymentError> {
    match state.razorpay.webhook_secret() {
        Some(secret) => {
            let signature = headers
                .get("x-razorpay-signature")
                .and_then(|v| v.to_str().ok())
                .ok_or(PaymentError::SignatureMismatch)?;

            if !be_razorpay::verify_webhook_signature(body.as_bytes(), signature, secret) {
                return Err(PaymentError::SignatureMismatch);
            }
        }
        None => {
            warn!("webhook secret not configured, accepting delivery unverified");
        }
    }

    let event: WebhookEvent = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "unparseable webhook body");
            return Ok(Json(json!({ "received": true })));
        }
    };

    match event.event.as_str() {
        "payment.captured" => {
            // Activation happens on the client-driven verify path; the
            // capture event is recorded for reconciliation only.
            let payment = event.payload.as_ref().and_then(|p| p.payment.as_ref());
            info!(
                payment_id = payment.map(|p| p.entity.id.as_str()).unwrap_or("?"),
                order_id = payment
                    .and_then(|p| p.entity.order_id.as_deref())
                    .unwrap_or("?"),
                "payment captured"
            );
        }
        "payment.failed" => {
            let order_id = event
                .payload
                .as_ref()
                .and_then(|p| p.payment.as_ref())
                .and_then(|p| p.entity.order_id.as_deref());

            match order_id {
                Some(order_id) => {
                    // The update skips orders already marked paid, so a
                    // failure event arriving after a completed verify cannot
                    // undo the activation.
                    match state
                        .db
                        .mark_order_failed()
                        .provider_order_id(order_id)
                        .call()
                        .await
                    {
                        Ok(true) => info!(%order_id, "order marked failed from webhook"),
                        Ok(false) => info!(%order_id, "failed-payment webhook matched no open order"),
                        Err(e) => error!(error = %e, %order_id, "could not mark order failed"),
                    }
                }
                None => warn!("payment.failed webhook without an order id"),
            }
        }
        other => {
            info!(event_type = %other, "unhandled webhook event");
        }
    }

    Ok(Json(json!({ "received": true })))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::handlers::tests::test_state;

    async fn post_webhook(body: String, signature: Option<String>) -> (StatusCode, String) {
        let state = test_state();
        let app = crate::create_router(state);

        let mut builder = Request::builder()
            .method("POST")
            .uri("/payment/webhook")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header("x-razorpay-signature", sig);
        }

        let response = app
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn webhook_rejects_missing_signature() {
        let (status, _) = post_webhook("{}".to_string(), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_rejects_bad_signature() {
        let (status, _) = post_webhook("{}".to_string(), Some("deadbeef".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_accepts_captured_event() {
        let body = serde_json::json!({
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": { "id": "pay_123", "order_id": "order_456" }
                }
            }
        })
        .to_string();

        let sig = test_sign(&body);
        let (status, response) = post_webhook(body, Some(sig)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.contains("\"received\":true"));
    }

    #[tokio::test]
    async fn webhook_acknowledges_unknown_events() {
        let body = serde_json::json!({ "event": "refund.created" }).to_string();
        let sig = test_sign(&body);
        let (status, response) = post_webhook(body, Some(sig)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.contains("\"received\":true"));
    }

    fn test_sign(body: &str) -> String {
        use hmac::{Hmac, Mac};
        let mut mac =
            Hmac::<sha2::Sha256>::new_from_slice(b"test_webhook_secret").unwrap();
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
