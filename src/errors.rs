use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("The edit session has expired. Reopen the product editor.")]
    SessionExpired,

    #[error("Invalid input: {0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::SessionExpired => (
                StatusCode::NOT_FOUND,
                "The edit session has expired. Reopen the product editor.".to_string(),
            ),
            AppError::UnprocessableEntity(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::Upstream(message) => (StatusCode::BAD_GATEWAY, message),
            AppError::InternalServerError(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::error!("Multipart processing error: {:?}", err);
        AppError::UnprocessableEntity(format!("Could not process the form data: {}", err))
    }
}

/// Reduces a transport-level failure to one human-readable message. The
/// message lands in a view-state error slot, never in a log-only path.
pub fn transport_error(err: reqwest::Error) -> AppError {
    tracing::error!("Upstream transport error: {:?}", err);
    AppError::Upstream(err.to_string())
}

/// Reduces a non-2xx upstream response to one message, preferring the JSON
/// `{"message": ...}` body the catalog returns for business errors.
pub async fn upstream_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|message| message.as_str())
            .map(|message| message.to_string()),
        Err(_) => None,
    };
    let message =
        message.unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
    tracing::warn!("Upstream error ({}): {}", status, message);
    AppError::Upstream(message)
}
