//! HTTP-facing error type
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl
//! below is the single place where errors become status codes and JSON.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or unverifiable bearer token
    #[error("{0}")]
    Authentication(String),

    /// Verified identity does not match the targeted identity
    #[error("Unauthorized")]
    Authorization,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The DNS provider answered but reported `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<String>,
    },

    #[error("Internal server error")]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    /// Upstream failure with a fixed message and the cause as details.
    pub fn upstream(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Upstream {
            message: message.into(),
            details: Some(cause.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            Self::Upstream { details, .. } => details.clone(),
            Self::Unexpected(err) => {
                // Cause stays in the logs, the client only sees the generic message.
                error!("Unhandled error: {:#}", err);
                None
            }
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections are reported as `ApiError::Validation`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
