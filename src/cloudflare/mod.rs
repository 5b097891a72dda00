//! DNS provider seam
//!
//! Handlers and the template batch talk to the provider through
//! [`DnsProvider`]; [`CloudflareClient`] is the v4 REST implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::ApiError;

pub mod client;

pub use client::CloudflareClient;

/// Body for creating a DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecordRequest {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Subset of a zone's details used by the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name_servers: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer; `message` is the provider's first error when present.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// 2xx answer with `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Failed to parse Cloudflare response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No result in Cloudflare response")]
    MissingResult,
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Upstream {
            message: err.to_string(),
            details: None,
        }
    }
}

/// Operations the relay forwards to the DNS provider.
///
/// Every call takes the caller's API key; nothing is cached between calls.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    async fn list_zones(&self, api_key: &str) -> Result<Vec<Value>, ProviderError>;

    async fn list_dns_records(&self, api_key: &str, zone_id: &str)
        -> Result<Vec<Value>, ProviderError>;

    async fn create_zone(&self, api_key: &str, name: &str) -> Result<Value, ProviderError>;

    async fn delete_zone(&self, api_key: &str, zone_id: &str) -> Result<(), ProviderError>;

    async fn zone_details(&self, api_key: &str, zone_id: &str)
        -> Result<ZoneDetails, ProviderError>;

    async fn create_dns_record(
        &self,
        api_key: &str,
        zone_id: &str,
        record: &DnsRecordRequest,
    ) -> Result<Value, ProviderError>;

    async fn delete_dns_record(
        &self,
        api_key: &str,
        zone_id: &str,
        record_id: &str,
    ) -> Result<(), ProviderError>;
}
