use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl From<be_pricing::CatalogError> for PricingError {
    fn from(err: be_pricing::CatalogError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PricingError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PricingError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        tracing::error!(%status, error = %self, "Pricing service error");

        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}
