use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::llm::ModelInvocationError;

pub const VALIDATION_MESSAGE: &str = "Missing 'text' or 'targetLang' in request body.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{}", VALIDATION_MESSAGE)]
    Validation,
    #[error("model invocation failed: {0}")]
    Internal(#[from] ModelInvocationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation => (StatusCode::BAD_REQUEST, VALIDATION_MESSAGE),
            ApiError::Internal(e) => {
                // Detail stays in the operator log
                error!("Translation pipeline error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
