use crate::services::lookup::LookupError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Application error: {:?}", self.0);
        error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = match &self {
            LookupError::MissingParameter | LookupError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            LookupError::NotFound => StatusCode::NOT_FOUND,
            LookupError::Collaborator(e) => {
                tracing::error!("Slug lookup failed: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_body(status, &self.to_string())
    }
}

pub fn error_body(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "error": status.canonical_reason().unwrap_or("Error"),
        "message": message,
    });
    (status, Json(body)).into_response()
}
