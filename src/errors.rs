use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::odata::ODataError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Object not found")]
    NotFound,

    #[error("Invalid data received: {0}")]
    Validation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] ODataError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Blocking task was cancelled")]
    Blocking(#[from] BlockingError),

    #[error("Failed to shape response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_)
            | ApiError::InvalidQuery(_)
            | ApiError::Repository(RepositoryError::Constraint(_)) => StatusCode::BAD_REQUEST,
            ApiError::Repository(_) | ApiError::Blocking(_) | ApiError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            // internals stay in the log
            return HttpResponse::build(status).json(json!({"message": "Internal Server Error"}));
        }
        HttpResponse::build(status).json(json!({"message": self.to_string()}))
    }
}
