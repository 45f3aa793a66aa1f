use secrecy::SecretString;

use crate::error::RazorpayError;

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: SecretString,
    /// Webhook signature secret. When unset, webhook signatures are not
    /// verified (development mode).
    pub webhook_secret: Option<SecretString>,
    pub api_base_url: String,
    pub currency: String,
}

impl RazorpayConfig {
    pub fn from_env() -> Result<Self, RazorpayError> {
        let key_id = std::env::var("RAZORPAY_KEY_ID").map_err(|_| {
            RazorpayError::Config("RAZORPAY_KEY_ID environment variable must be set".into())
        })?;

        let key_secret = std::env::var("RAZORPAY_KEY_SECRET").map_err(|_| {
            RazorpayError::Config("RAZORPAY_KEY_SECRET environment variable must be set".into())
        })?;

        let webhook_secret = std::env::var("RAZORPAY_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        if webhook_secret.is_none() {
            tracing::warn!("RAZORPAY_WEBHOOK_SECRET not set, webhook signatures will be trusted");
        }

        let api_base_url = std::env::var("RAZORPAY_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());

        Ok(Self {
            key_id,
            key_secret: SecretString::from(key_secret),
            webhook_secret,
            api_base_url,
            currency: "INR".to_string(),
        })
    }
}
