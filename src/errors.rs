use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing credential: set WATSONX_API_KEY")]
    MissingCredential,

    #[error("missing endpoint: set WATSONX_URL")]
    MissingBaseUrl,

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("{0}")]
    Generation(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Text shown in place of an answer. Generation failures keep the
    /// `Generation error:` prefix users see in the UI.
    pub fn display_message(&self) -> String {
        match self {
            AppError::MissingCredential => {
                "No API key configured. Set WATSONX_API_KEY and restart to get advice.".to_string()
            }
            AppError::MissingBaseUrl => {
                "No watsonx.ai endpoint configured. Set WATSONX_URL and restart to get advice."
                    .to_string()
            }
            AppError::TokenExchange(e) => format!("Could not obtain an access token: {}", e),
            AppError::Generation(e) => format!("Generation error: {}", e),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            AppError::MissingCredential => (
                StatusCode::SERVICE_UNAVAILABLE,
                "configuration_error",
                "missing_credential",
            ),
            AppError::MissingBaseUrl => (
                StatusCode::SERVICE_UNAVAILABLE,
                "configuration_error",
                "missing_base_url",
            ),
            AppError::TokenExchange(_) => (
                StatusCode::BAD_GATEWAY,
                "authentication_error",
                "token_exchange_failed",
            ),
            AppError::Generation(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "generation_failed",
            ),
            AppError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "invalid_request",
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                )
            }
        };

        let msg = match &self {
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.display_message(),
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_keeps_display_prefix() {
        let err = AppError::Generation("operation timed out".into());
        assert_eq!(err.display_message(), "Generation error: operation timed out");
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        let resp = AppError::InvalidRequest("unknown persona".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let err = AppError::Internal(anyhow::anyhow!("secret detail"));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
