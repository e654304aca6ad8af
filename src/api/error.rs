use crate::api::models::ErrorResponse;
use crate::api::validation::ValidationError;
use crate::storage::StorageError;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

const INTERNAL_MESSAGE: &str = "Internal server error.";
const CONNECTION_MESSAGE: &str = "Database connection error.";

/// Every way a request can fail. Each variant maps to one status code and
/// a client-facing message; storage details are logged, never returned.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("API key required in header \"X-API-Key\".")]
    AuthRequired,

    #[error("Invalid or inactive API key.")]
    AuthInvalid,

    #[error("Auth check failed.")]
    AuthUnavailable(#[source] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("ID must be a positive integer.")]
    InvalidId,

    #[error("Malformed JSON: {0}")]
    MalformedBody(String),

    #[error("Review not found.")]
    NotFound,

    #[error("Endpoint not found. Use /api/reviews or /api/reviews/{{id}}")]
    EndpointNotFound,

    #[error("Method not allowed.")]
    MethodNotAllowed,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Internal server error.")]
    Internal,
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(StorageError::Query(err))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthRequired | AppError::AuthInvalid => StatusCode::UNAUTHORIZED,
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::InvalidId
            | AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::EndpointNotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::AuthUnavailable(_) | AppError::Storage(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::AuthUnavailable(StorageError::Connect(_))
            | AppError::Storage(StorageError::Connect(_)) => CONNECTION_MESSAGE.to_string(),
            AppError::Storage(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::AuthUnavailable(source) | AppError::Storage(source) => {
                error!(error = %source, "Storage failure");
            }
            _ => {}
        }

        let mut response = (
            status,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response();

        if matches!(self, AppError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_details_are_not_exposed() {
        let err = AppError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error.");

        let err = AppError::Storage(StorageError::Connect(rusqlite::Error::InvalidQuery));
        assert_eq!(err.message(), "Database connection error.");

        let err = AppError::AuthUnavailable(StorageError::Poisoned);
        assert_eq!(err.message(), "Auth check failed.");
    }

    #[test]
    fn validation_messages_pass_through() {
        let err = AppError::from(ValidationError::RatingRange);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Rating must be integer 1..5.");
    }

    #[test]
    fn method_not_allowed_lists_allowed_methods() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], ALLOWED_METHODS);
    }
}
