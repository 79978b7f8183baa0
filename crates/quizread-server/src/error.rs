use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quizread_engine::EngineError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 404 Not Found errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 404 through
/// the `anyhow::Error` chain without touching the `EngineError` enum.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Domain `{error}` outcomes never
/// land here; they travel back as ordinary 200 responses. AppError covers
/// pipeline faults and unknown routes.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(n) = self.0.downcast_ref::<NotFoundError>() {
            let body = serde_json::json!({ "error": n.0.clone() });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<EngineError>() {
            match e {
                EngineError::RequestNotFound(_) | EngineError::UnknownRoute(_) => {
                    StatusCode::NOT_FOUND
                }
                EngineError::UnknownOperation { .. } => StatusCode::NOT_FOUND,
                EngineError::Unresolved { .. }
                | EngineError::MissingBinding(_)
                | EngineError::DoubleResponse(_)
                | EngineError::UnhandledRoute(_)
                | EngineError::QueryInput { .. }
                | EngineError::NoResponse(_)
                | EngineError::CompletionOverflow(_)
                | EngineError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
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
