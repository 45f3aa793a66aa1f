#[derive(Debug, thiserror::Error)]
pub enum RazorpayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Razorpay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Razorpay API error {code}: {description}")]
    Api { code: String, description: String },

    #[error("Failed to decode Razorpay response: {0}")]
    Decode(#[from] serde_json::Error),
}
