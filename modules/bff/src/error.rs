use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Why a session-details view could not be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("Invalid session ID format")]
    InvalidId,

    #[error("session not found")]
    NotFound,

    /// A dependency failed in a way that cannot be degraded
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl AggregateError {
    pub fn status(&self) -> StatusCode {
        match self {
            AggregateError::InvalidId => StatusCode::BAD_REQUEST,
            AggregateError::NotFound => StatusCode::NOT_FOUND,
            AggregateError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AggregateError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
