use serde::Serialize;
use thiserror::Error;

/// Unified API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("too many requests, retry after {retry_after_secs}s")]
    TooManyRequests { retry_after_secs: u64 },

    /// The upstream provider failed. `message` is what callers see, `details`
    /// carries the provider status or parse failure.
    #[error("upstream error: {message} ({details})")]
    Upstream { message: String, details: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::TooManyRequests { .. } => "too_many_requests",
            Self::Upstream { .. } => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::TooManyRequests { .. } => 429,
            Self::Upstream { .. } => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Internal(m) => m.clone(),
            Self::TooManyRequests { .. } => "Too many requests.".to_string(),
            Self::Upstream { message, .. } => message.clone(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Upstream { details, .. } => Some(serde_json::Value::String(details.clone())),
            Self::TooManyRequests { retry_after_secs } => {
                Some(serde_json::json!({ "retry_after_seconds": retry_after_secs }))
            }
            _ => None,
        }
    }
}

/// JSON failure envelope: `{ "success": false, "error": "…", "code": "…", "details": … }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(e: &ApiError) -> Self {
        Self {
            success: false,
            error: e.message(),
            code: e.code().to_string(),
            details: e.details(),
        }
    }
}
