use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::RazorpayConfig;
use crate::error::RazorpayError;

/// Thin client over Razorpay's Orders API.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    config: RazorpayConfig,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    /// Amount in the smallest currency unit (paise for INR).
    amount: u64,
    currency: String,
    receipt: String,
    notes: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: String,
    description: String,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(RazorpayError::Http)?;
        Ok(Self { client, config })
    }

    /// Public key id, returned to clients so they can open checkout.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    pub fn key_secret(&self) -> &str {
        self.config.key_secret.expose_secret()
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.config
            .webhook_secret
            .as_ref()
            .map(|s| s.expose_secret())
    }

    /// Creates an order with the provider. One attempt, no retries: the
    /// caller surfaces failures to the client, which simply retries checkout.
    pub async fn create_order(
        &self,
        amount_minor: u64,
        receipt: String,
        notes: serde_json::Value,
    ) -> Result<RazorpayOrder, RazorpayError> {
        let request = CreateOrderRequest {
            amount: amount_minor,
            currency: self.config.currency.clone(),
            receipt,
            notes,
        };

        let url = format!("{}/orders", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let order: RazorpayOrder = serde_json::from_str(&body)?;
            tracing::info!(
                order_id = %order.id,
                amount = order.amount,
                currency = %order.currency,
                "Razorpay order created"
            );
            return Ok(order);
        }

        let error = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| ApiErrorDetail {
                code: "UNKNOWN".to_string(),
                description: body,
            });
        tracing::error!(
            http_status = %status,
            code = %error.code,
            description = %error.description,
            "Razorpay order creation failed"
        );
        Err(RazorpayError::Api {
            code: error.code,
            description: error.description,
        })
    }
}
