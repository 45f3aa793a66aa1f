use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use be_remote_db::DbError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("No active subscription found")]
    NoActiveSubscription,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SubscriptionError::NoActiveSubscription => (StatusCode::NOT_FOUND, self.to_string()),
            SubscriptionError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            SubscriptionError::Db(_) | SubscriptionError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        tracing::error!(%status, error = %self, "Subscription service error");

        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}
