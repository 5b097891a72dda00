//! Sequential batch operations against the DNS provider
//!
//! Items are sent one at a time in input order. A failure is recorded
//! for that item and the loop moves on; nothing is retried.

use std::fmt;
use tracing::{info, warn};

use crate::cloudflare::{DnsProvider, DnsRecordRequest};

/// Result of creating one templated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Added { record_type: String, name: String },
    Failed { record_type: String, message: String },
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { record_type, name } => {
                write!(f, "✅ Added {} record: {}", record_type, name)
            }
            Self::Failed {
                record_type,
                message,
            } => write!(f, "❌ Failed to add {} record: {}", record_type, message),
        }
    }
}

/// Result of creating one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneOutcome {
    Added { domain: String },
    Failed { domain: String, message: String },
}

impl ZoneOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

impl fmt::Display for ZoneOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { domain } => write!(f, "✅ Zone added successfully: {}", domain),
            Self::Failed { domain, message } => {
                write!(f, "❌ Failed to add zone: {} - {}", domain, message)
            }
        }
    }
}

/// Creates each record in `zone_id`, one call at a time.
pub async fn apply_records(
    provider: &dyn DnsProvider,
    api_key: &str,
    zone_id: &str,
    records: &[DnsRecordRequest],
) -> Vec<RecordOutcome> {
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
        let outcome = match provider.create_dns_record(api_key, zone_id, record).await {
            Ok(_) => {
                info!("Added {} record {} in zone {}", record.record_type, record.name, zone_id);
                RecordOutcome::Added {
                    record_type: record.record_type.clone(),
                    name: record.name.clone(),
                }
            }
            Err(e) => {
                warn!(
                    "Failed to add {} record {} in zone {}: {}",
                    record.record_type, record.name, zone_id, e
                );
                RecordOutcome::Failed {
                    record_type: record.record_type.clone(),
                    message: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// Splits a comma-separated domain list, dropping empty entries.
pub fn split_domains(domains: &str) -> Vec<&str> {
    domains
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect()
}

/// Creates a zone per domain, one call at a time.
pub async fn add_zones(
    provider: &dyn DnsProvider,
    api_key: &str,
    domains: &[&str],
) -> Vec<ZoneOutcome> {
    let mut outcomes = Vec::with_capacity(domains.len());

    for domain in domains {
        let outcome = match provider.create_zone(api_key, domain).await {
            Ok(_) => {
                info!("Zone added: {}", domain);
                ZoneOutcome::Added {
                    domain: domain.to_string(),
                }
            }
            Err(e) => {
                warn!("Failed to add zone {}: {}", domain, e);
                ZoneOutcome::Failed {
                    domain: domain.to_string(),
                    message: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}
