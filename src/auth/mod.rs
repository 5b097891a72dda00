//! Identity verification gate
//!
//! Bearer tokens are exchanged with the identity provider on every
//! request; the resolved [`VerifiedIdentity`] is stored in request
//! extensions for the user handlers.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::error::ApiError;

pub mod clerk;

pub use clerk::ClerkVerifier;

/// Identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedIdentity {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider rejected the token ({0})")]
    Rejected(StatusCode),

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// True when `verified` may read or modify the profile of `target_id`.
pub fn can_act_on(verified: &VerifiedIdentity, target_id: &str) -> bool {
    verified.id == target_id
}

pub fn authorize(verified: &VerifiedIdentity, target_id: &str) -> Result<(), ApiError> {
    if can_act_on(verified, target_id) {
        Ok(())
    } else {
        warn!(
            "Identity {} attempted to access profile {}",
            verified.id, target_id
        );
        Err(ApiError::Authorization)
    }
}

/// Middleware rejecting requests without a verifiable bearer token.
pub async fn require_identity(
    State(verifier): State<Arc<dyn IdentityVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Authentication("No token provided".to_string()))?;

    let identity = verifier.verify(&token).await.map_err(|e| {
        warn!("Token verification error: {}", e);
        match e {
            IdentityError::Rejected(_) => ApiError::Authentication("Invalid token".to_string()),
            IdentityError::Transport(_) => {
                ApiError::Authentication("Token verification failed".to_string())
            }
        }
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
