use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use be_remote_db::DbError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid payment signature")]
    SignatureMismatch,

    #[error("Order already processed")]
    AlreadyProcessed,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payment gateway error")]
    Gateway(#[from] be_razorpay::RazorpayError),

    #[error(transparent)]
    Db(DbError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DbError> for PaymentError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(_) => Self::AlreadyProcessed,
            other => Self::Db(other),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PaymentError::Validation(_)
            | PaymentError::MissingField(_)
            | PaymentError::SignatureMismatch
            | PaymentError::AlreadyProcessed => (StatusCode::BAD_REQUEST, self.to_string()),
            PaymentError::OrderNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            PaymentError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            PaymentError::Gateway(_) => (
                StatusCode::BAD_GATEWAY,
                "Payment gateway error".to_string(),
            ),
            PaymentError::Db(_) | PaymentError::Config(_) | PaymentError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        tracing::error!(%status, error = %self, "Payment service error");

        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}
