//! DNS relay endpoints
//!
//! Each endpoint forwards to the DNS provider with the caller-supplied API
//! key. Batch endpoints report per-item outcomes instead of failing.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::AppState;
use crate::cloudflare::{DnsRecordRequest, ProviderError};
use crate::error::{ApiError, AppJson};
use crate::template::{add_zones, apply_records, split_domains, RecordTemplate, TemplateError};

const VERIFICATION_COMMENT: &str = "Google site verification";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRequest {
    pub api_key: String,
    pub zone_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddZoneRequest {
    pub api_key: String,
    /// Comma-separated domain list
    pub domains: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDnsRequest {
    pub api_key: String,
    pub zone_id: String,
    /// Falls back to the zone's own name when absent
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordRequest {
    pub api_key: String,
    pub zone_id: String,
    pub record_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub api_key: String,
    pub zone_id: String,
    pub domain: String,
    pub txt_value: String,
}

pub async fn fetch_zones(
    State(state): State<AppState>,
    AppJson(req): AppJson<ApiKeyRequest>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let zones = state.dns.list_zones(&req.api_key).await?;
    Ok(Json(zones))
}

pub async fn fetch_dns_records(
    State(state): State<AppState>,
    AppJson(req): AppJson<ZoneRequest>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let records = state.dns.list_dns_records(&req.api_key, &req.zone_id).await?;
    Ok(Json(records))
}

pub async fn add_zone(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddZoneRequest>,
) -> Result<Json<Value>, ApiError> {
    let domains = split_domains(&req.domains);
    if domains.is_empty() {
        return Err(ApiError::Validation("domains must list at least one domain".to_string()));
    }

    info!("Adding {} zone(s)", domains.len());
    let outcomes = add_zones(state.dns.as_ref(), &req.api_key, &domains).await;
    let log: Vec<String> = outcomes.iter().map(ToString::to_string).collect();

    Ok(Json(json!({
        "message": "Zone operation completed",
        "log": log
    })))
}

pub async fn delete_zone(
    State(state): State<AppState>,
    AppJson(req): AppJson<ZoneRequest>,
) -> Result<Json<Value>, ApiError> {
    match state.dns.delete_zone(&req.api_key, &req.zone_id).await {
        Ok(()) => {
            info!("Deleted zone {}", req.zone_id);
            Ok(Json(json!({ "message": "Zone deleted successfully" })))
        }
        Err(ProviderError::Rejected(message)) => {
            warn!("Cloudflare refused to delete zone {}: {}", req.zone_id, message);
            Err(ApiError::Rejected("Failed to delete zone".to_string()))
        }
        Err(e) => Err(ApiError::upstream("Error deleting zone", e)),
    }
}

pub async fn add_google_workspace_dns(
    State(state): State<AppState>,
    AppJson(req): AppJson<WorkspaceDnsRequest>,
) -> Result<Json<Value>, ApiError> {
    let template = RecordTemplate::load(&state.template_path)
        .await
        .map_err(|e| match e {
            TemplateError::NotFound(path) => {
                warn!("DNS template file not found: {}", path.display());
                ApiError::Validation("DNS template file not found".to_string())
            }
            other => ApiError::upstream("Internal server error", other),
        })?;

    let requested = req
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let domain = match requested {
        Some(domain) => domain.to_string(),
        None => {
            state
                .dns
                .zone_details(&req.api_key, &req.zone_id)
                .await
                .map_err(|e| ApiError::upstream("Internal server error", e))?
                .name
        }
    };

    info!(
        "Applying {} template records to zone {} ({})",
        template.len(),
        req.zone_id,
        domain
    );
    let records = template.render(&domain);
    let outcomes = apply_records(state.dns.as_ref(), &req.api_key, &req.zone_id, &records).await;
    let results: Vec<String> = outcomes.iter().map(ToString::to_string).collect();

    Ok(Json(json!({
        "success": true,
        "results": results,
        "domain": domain
    })))
}

pub async fn delete_dns_record(
    State(state): State<AppState>,
    AppJson(req): AppJson<DeleteRecordRequest>,
) -> Result<Json<Value>, ApiError> {
    match state
        .dns
        .delete_dns_record(&req.api_key, &req.zone_id, &req.record_id)
        .await
    {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": "DNS record deleted successfully"
        }))),
        Err(ProviderError::Rejected(message)) => {
            warn!("Cloudflare refused to delete record {}: {}", req.record_id, message);
            Err(ApiError::Rejected("Failed to delete DNS record".to_string()))
        }
        Err(e) => Err(ApiError::upstream("Error deleting DNS record", e)),
    }
}

pub async fn fetch_nameservers(
    State(state): State<AppState>,
    AppJson(req): AppJson<ZoneRequest>,
) -> Result<Json<Value>, ApiError> {
    let zone = state.dns.zone_details(&req.api_key, &req.zone_id).await?;

    Ok(Json(json!({
        "success": true,
        "nameservers": zone.name_servers
    })))
}

pub async fn add_google_verification(
    State(state): State<AppState>,
    AppJson(req): AppJson<VerificationRequest>,
) -> Result<Json<Value>, ApiError> {
    let record = DnsRecordRequest {
        record_type: "TXT".to_string(),
        name: req.domain,
        content: req.txt_value,
        ttl: 1,
        proxied: false,
        priority: None,
        comment: Some(VERIFICATION_COMMENT.to_string()),
    };

    let created = state
        .dns
        .create_dns_record(&req.api_key, &req.zone_id, &record)
        .await
        .map_err(|e| ApiError::upstream("Failed to add verification record", e))?;

    Ok(Json(json!({
        "success": true,
        "message": "Google verification TXT record added successfully",
        "record": created
    })))
}
