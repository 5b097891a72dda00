//! Cloudflare API Client
//!
//! Thin wrapper over the v4 REST API. Each method issues exactly one
//! request authenticated with the caller's API token and hands back the
//! `result` payload untouched.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{DnsProvider, DnsRecordRequest, ProviderError, ZoneDetails};
use crate::config::Config;

#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareError>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CloudflareError {
    message: String,
}

impl<T> CloudflareResponse<T> {
    fn first_error(&self) -> Option<String> {
        self.errors.first().map(|e| e.message.clone())
    }
}

#[derive(Debug, Serialize)]
struct CreateZoneBody<'a> {
    name: &'a str,
    jump_start: bool,
}

/// Cloudflare v4 client
pub struct CloudflareClient {
    http_client: Client,
    api_base: String,
}

impl CloudflareClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_base_url(config.cloudflare_base())
    }

    pub fn with_base_url(api_base: &str) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("dns-manager-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Sends one request and unwraps the Cloudflare envelope.
    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        api_key: &str,
        body: Option<&B>,
    ) -> Result<CloudflareResponse<T>, ProviderError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.api_base, path);
        debug!("Cloudflare {} {}", method, url);

        let mut request = self.http_client.request(method, &url).bearer_auth(api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<CloudflareResponse<Value>>(&text)
                .ok()
                .and_then(|r| r.first_error())
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            return Err(ProviderError::Status { status, message });
        }

        let envelope: CloudflareResponse<T> = serde_json::from_str(&text)?;
        if !envelope.success {
            return Err(ProviderError::Rejected(
                envelope
                    .first_error()
                    .unwrap_or_else(|| "Cloudflare reported failure".to_string()),
            ));
        }

        Ok(envelope)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
    ) -> Result<CloudflareResponse<T>, ProviderError> {
        self.execute(Method::GET, path, api_key, None::<&()>).await
    }
}

fn zone_path(zone_id: &str) -> String {
    format!("/zones/{}", urlencoding::encode(zone_id))
}

#[async_trait]
impl DnsProvider for CloudflareClient {
    async fn list_zones(&self, api_key: &str) -> Result<Vec<Value>, ProviderError> {
        let response = self.get::<Vec<Value>>("/zones", api_key).await?;
        Ok(response.result.unwrap_or_default())
    }

    async fn list_dns_records(
        &self,
        api_key: &str,
        zone_id: &str,
    ) -> Result<Vec<Value>, ProviderError> {
        let path = format!("{}/dns_records", zone_path(zone_id));
        let response = self.get::<Vec<Value>>(&path, api_key).await?;
        Ok(response.result.unwrap_or_default())
    }

    async fn create_zone(&self, api_key: &str, name: &str) -> Result<Value, ProviderError> {
        let body = CreateZoneBody {
            name,
            jump_start: true,
        };
        let response = self
            .execute::<Value, _>(Method::POST, "/zones", api_key, Some(&body))
            .await?;
        response.result.ok_or(ProviderError::MissingResult)
    }

    async fn delete_zone(&self, api_key: &str, zone_id: &str) -> Result<(), ProviderError> {
        self.execute::<Value, ()>(Method::DELETE, &zone_path(zone_id), api_key, None)
            .await?;
        Ok(())
    }

    async fn zone_details(
        &self,
        api_key: &str,
        zone_id: &str,
    ) -> Result<ZoneDetails, ProviderError> {
        let response = self.get::<ZoneDetails>(&zone_path(zone_id), api_key).await?;
        response.result.ok_or(ProviderError::MissingResult)
    }

    async fn create_dns_record(
        &self,
        api_key: &str,
        zone_id: &str,
        record: &DnsRecordRequest,
    ) -> Result<Value, ProviderError> {
        let path = format!("{}/dns_records", zone_path(zone_id));
        let response = self
            .execute::<Value, _>(Method::POST, &path, api_key, Some(record))
            .await?;
        response.result.ok_or(ProviderError::MissingResult)
    }

    async fn delete_dns_record(
        &self,
        api_key: &str,
        zone_id: &str,
        record_id: &str,
    ) -> Result<(), ProviderError> {
        let path = format!(
            "{}/dns_records/{}",
            zone_path(zone_id),
            urlencoding::encode(record_id)
        );
        self.execute::<Value, ()>(Method::DELETE, &path, api_key, None)
            .await?;
        Ok(())
    }
}
