use std::sync::Arc;

use be_auth_core::JwtConfig;
use be_email_service::{EmailConfig, EmailService};
use be_pricing::SharedCatalog;
use be_razorpay::{RazorpayClient, RazorpayConfig};
use be_remote_db::DatabaseManager;

pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub catalog: SharedCatalog,
    pub razorpay: RazorpayClient,
    pub email: EmailService,
    pub jwt_config: Arc<JwtConfig>,
}

impl AppState {
    pub fn from_env(
        db: Arc<DatabaseManager>,
        catalog: SharedCatalog,
    ) -> Result<Self, crate::error::PaymentError> {
        let razorpay = RazorpayClient::new(RazorpayConfig::from_env()?)
            .map_err(|e| crate::error::PaymentError::Config(e.to_string()))?;
        let email = EmailService::new(EmailConfig::from_env())
            .map_err(|e| crate::error::PaymentError::Config(e.to_string()))?;
        let jwt_config = Arc::new(JwtConfig::default());

        Ok(Self {
            db,
            catalog,
            razorpay,
            email,
            jwt_config,
        })
    }
}
