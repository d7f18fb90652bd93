//! Application error type mapping to HTTP status codes.
//!
//! Every error body is `{ "error": "<message>" }`. Configuration errors add
//! `"kind": "configuration"` so callers can tell them from provider failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use launchpad_types::deploy::{DeployError, FailureKind};
use launchpad_types::llm::LlmError;

#[derive(Debug)]
pub enum AppError {
    /// Malformed request body or directive.
    Validation(String),
    /// A required service is not configured.
    Config(String),
    /// The generation provider failed.
    Llm(LlmError),
    /// Submission, polling or status read failed.
    Deploy(DeployError),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e)
    }
}

impl From<DeployError> for AppError {
    fn from(e: DeployError) -> Self {
        if e.is_configuration() {
            AppError::Config(e.to_string())
        } else {
            AppError::Deploy(e)
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Llm(LlmError::AuthenticationFailed) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Deploy(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Config(msg) => msg.clone(),
            AppError::Llm(e) => e.to_string(),
            AppError::Deploy(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %message, "request failed");
        }
        let body = match self {
            AppError::Config(_) => json!({ "error": message, "kind": FailureKind::Configuration }),
            _ => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_by_kind() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Llm(LlmError::RateLimited).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Llm(LlmError::AuthenticationFailed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Deploy(DeployError::MissingCredential("VERCEL_TOKEN".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn provider_message_passes_through() {
        let err = AppError::Deploy(DeployError::Provider {
            status: 500,
            message: "quota exceeded".into(),
        });
        assert_eq!(err.message(), "quota exceeded");
    }

    #[test]
    fn missing_credential_becomes_config_error() {
        let err = AppError::from(DeployError::MissingCredential("VERCEL_TOKEN".into()));
        assert!(matches!(err, AppError::Config(ref msg) if msg == "VERCEL_TOKEN is not configured"));

        let err = AppError::from(DeployError::BuildFailed { id: "dpl_1".into() });
        assert!(matches!(err, AppError::Deploy(_)));
    }
}
