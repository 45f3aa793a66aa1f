//! Payment-confirmation email over the Brevo transactional API.
//!
//! Callers treat sends as fire-and-forget: failures are logged, never
//! surfaced to the purchase flow.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email is not configured (BREVO_API_KEY unset)")]
    NotConfigured,

    #[error("Email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Brevo rejected the message: {status} {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: Option<SecretString>,
    pub api_base_url: String,
    pub sender_email: String,
    pub sender_name: String,
}

impl EmailConfig {
    /// Missing API key disables sending rather than failing startup.
    pub fn from_env() -> Self {
        let api_key = std::env::var("BREVO_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        if api_key.is_none() {
            tracing::warn!("BREVO_API_KEY not set, confirmation emails disabled");
        }

        Self {
            api_key,
            api_base_url: std::env::var("BREVO_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.brevo.com/v3".to_string()),
            sender_email: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@schoolstack.in".to_string()),
            sender_name: std::env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "SchoolStack".to_string()),
        }
    }
}

/// Everything the confirmation template needs, already formatted upstream.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub payment_id: String,
    pub amount: i64,
    pub currency: String,
    pub portals: Vec<String>,
    pub billing_cycle: String,
    pub end_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct EmailService {
    client: reqwest::Client,
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn send_payment_confirmation(
        &self,
        to_email: &str,
        to_name: &str,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), EmailError> {
        let Some(api_key) = &self.config.api_key else {
            return Err(EmailError::NotConfigured);
        };

        let body = json!({
            "sender": {
                "email": self.config.sender_email,
                "name": self.config.sender_name,
            },
            "to": [{ "email": to_email, "name": to_name }],
            "subject": "Payment Confirmation - SchoolStack",
            "htmlContent": build_confirmation_html(to_name, confirmation),
        });

        let url = format!("{}/smtp/email", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .header("api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        tracing::info!(payment_id = %confirmation.payment_id, "confirmation email sent");
        Ok(())
    }
}

fn build_confirmation_html(name: &str, confirmation: &PaymentConfirmation) -> String {
    let portals = confirmation.portals.join(", ");
    format!(
        "<h2>Payment Successful</h2>\
         <p>Hi {name},</p>\
         <p>Your payment of {currency} {amount} was received.</p>\
         <ul>\
         <li>Payment ID: {payment_id}</li>\
         <li>Portals: {portals}</li>\
         <li>Billing cycle: {cycle}</li>\
         <li>Active until: {end_date}</li>\
         </ul>\
         <p>Thank you for choosing SchoolStack.</p>",
        name = name,
        currency = confirmation.currency,
        amount = confirmation.amount,
        payment_id = confirmation.payment_id,
        portals = portals,
        cycle = confirmation.billing_cycle,
        end_date = confirmation.end_date.format("%d %b %Y"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmation() -> PaymentConfirmation {
        PaymentConfirmation {
            payment_id: "pay_abc".to_string(),
            amount: 2880,
            currency: "INR".to_string(),
            portals: vec!["admin".to_string(), "teacher".to_string()],
            billing_cycle: "monthly".to_string(),
            end_date: "2026-09-23T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn confirmation_html_carries_the_receipt_fields() {
        let html = build_confirmation_html("Priya", &confirmation());
        assert!(html.contains("Hi Priya"));
        assert!(html.contains("INR 2880"));
        assert!(html.contains("pay_abc"));
        assert!(html.contains("admin, teacher"));
        assert!(html.contains("23 Sep 2026"));
    }

    #[test]
    fn unconfigured_service_reports_not_configured() {
        let config = EmailConfig {
            api_key: None,
            api_base_url: "https://api.brevo.com/v3".to_string(),
            sender_email: "noreply@schoolstack.in".to_string(),
            sender_name: "SchoolStack".to_string(),
        };
        let service = EmailService::new(config).unwrap();
        assert!(!service.is_configured());
    }
}
