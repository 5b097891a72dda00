//! Clerk token verification
//!
//! Exchanges a session token for the current user via `GET /v1/me`.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{IdentityError, IdentityVerifier, VerifiedIdentity};
use crate::config::Config;

pub struct ClerkVerifier {
    http_client: Client,
    api_base: String,
}

impl ClerkVerifier {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_base_url(config.clerk_base())
    }

    pub fn with_base_url(api_base: &str) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for ClerkVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let url = format!("{}/v1/me", self.api_base);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected(status));
        }

        let identity: VerifiedIdentity = response.json().await?;
        debug!("Verified Clerk identity {}", identity.id);
        Ok(identity)
    }
}
