use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Errors surfaced at the handler boundary.
///
/// The original taxonomy distinguishes soft upstream failures (the whole
/// request is abandoned, nothing partial is left upstream) from integration
/// faults (an upstream answered with a payload the bridge cannot interpret).
/// Neither carries upstream detail to the browser; detail goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// An upstream call failed; the request cannot proceed.
    #[error("upstream call failed: {0}")]
    Upstream(#[from] crate::error::Error),

    /// An upstream answered successfully but with an uninterpretable body.
    #[error("integration fault in {operation}: {detail}")]
    Integration {
        operation: &'static str,
        detail: String,
    },

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            Self::Upstream(ref source) => {
                tracing::error!(error = %source, "aborting request after upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({"error": "upstream request failed"})),
                )
                    .into_response()
            }
            Self::Integration { operation, ref detail } => {
                tracing::error!(operation, detail = %detail, "integration fault");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "internal error"})),
                )
                    .into_response()
            }
            Self::Config(ref msg) => {
                tracing::error!(error = %msg, "configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "internal error"})),
                )
                    .into_response()
            }
        }
    }
}
