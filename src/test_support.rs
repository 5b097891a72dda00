//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::auth::{IdentityError, IdentityVerifier, VerifiedIdentity};
use crate::cloudflare::{DnsProvider, DnsRecordRequest, ProviderError, ZoneDetails};
use crate::users::{StoreError, UpsertUser, User, UserStore};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// In-memory DNS provider with scripted failures.
pub struct FakeProvider {
    zone_name: String,
    failing_records: Vec<String>,
    failing_zones: Vec<String>,
    reject_deletes: bool,
    created: Mutex<Vec<DnsRecordRequest>>,
    zone_lookups: AtomicUsize,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            zone_name: "example.com".to_string(),
            failing_records: Vec::new(),
            failing_zones: Vec::new(),
            reject_deletes: false,
            created: Mutex::new(Vec::new()),
            zone_lookups: AtomicUsize::new(0),
        }
    }
}

impl FakeProvider {
    pub fn failing_record(mut self, name: &str) -> Self {
        self.failing_records.push(name.to_string());
        self
    }

    pub fn failing_zone(mut self, domain: &str) -> Self {
        self.failing_zones.push(domain.to_string());
        self
    }

    pub fn rejecting_deletes(mut self) -> Self {
        self.reject_deletes = true;
        self
    }

    pub fn created_records(&self) -> Vec<DnsRecordRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn created_record_names(&self) -> Vec<String> {
        self.created_records().into_iter().map(|r| r.name).collect()
    }

    pub fn zone_lookups(&self) -> usize {
        self.zone_lookups.load(Ordering::SeqCst)
    }

    fn check_delete(&self, id: &str) -> Result<(), ProviderError> {
        if self.reject_deletes {
            return Err(ProviderError::Rejected("resource locked".to_string()));
        }
        if id == "unreachable" {
            return Err(ProviderError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Request failed with status code 500".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for FakeProvider {
    async fn list_zones(&self, _api_key: &str) -> Result<Vec<Value>, ProviderError> {
        Ok(vec![json!({ "id": "z1", "name": self.zone_name })])
    }

    async fn list_dns_records(
        &self,
        _api_key: &str,
        zone_id: &str,
    ) -> Result<Vec<Value>, ProviderError> {
        Ok(vec![json!({ "id": "r1", "type": "A", "zone_id": zone_id })])
    }

    async fn create_zone(&self, _api_key: &str, name: &str) -> Result<Value, ProviderError> {
        if self.failing_zones.iter().any(|z| z == name) {
            return Err(ProviderError::Status {
                status: StatusCode::BAD_REQUEST,
                message: "Zone already exists.".to_string(),
            });
        }
        Ok(json!({ "id": format!("zone-{name}"), "name": name }))
    }

    async fn delete_zone(&self, _api_key: &str, zone_id: &str) -> Result<(), ProviderError> {
        self.check_delete(zone_id)
    }

    async fn zone_details(
        &self,
        _api_key: &str,
        zone_id: &str,
    ) -> Result<ZoneDetails, ProviderError> {
        self.zone_lookups.fetch_add(1, Ordering::SeqCst);
        if zone_id == "unreachable" {
            return Err(ProviderError::Status {
                status: StatusCode::NOT_FOUND,
                message: "Invalid zone identifier".to_string(),
            });
        }
        Ok(ZoneDetails {
            id: zone_id.to_string(),
            name: self.zone_name.clone(),
            status: Some("active".to_string()),
            name_servers: vec![
                "ada.ns.cloudflare.com".to_string(),
                "bob.ns.cloudflare.com".to_string(),
            ],
        })
    }

    async fn create_dns_record(
        &self,
        _api_key: &str,
        zone_id: &str,
        record: &DnsRecordRequest,
    ) -> Result<Value, ProviderError> {
        self.created.lock().unwrap().push(record.clone());
        if self.failing_records.iter().any(|n| *n == record.name) {
            return Err(ProviderError::Status {
                status: StatusCode::BAD_REQUEST,
                message: "Record already exists.".to_string(),
            });
        }
        Ok(json!({
            "id": format!("rec-{}", record.name),
            "zone_id": zone_id,
            "type": record.record_type,
            "name": record.name,
            "content": record.content,
            "comment": record.comment,
        }))
    }

    async fn delete_dns_record(
        &self,
        _api_key: &str,
        _zone_id: &str,
        record_id: &str,
    ) -> Result<(), ProviderError> {
        self.check_delete(record_id)
    }
}

/// Verifier backed by a fixed token → identity table.
#[derive(Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, String>,
}

impl StaticVerifier {
    pub fn with_token(mut self, token: &str, identity_id: &str) -> Self {
        self.tokens.insert(token.to_string(), identity_id.to_string());
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.tokens
            .get(token)
            .map(|id| VerifiedIdentity {
                id: id.clone(),
                first_name: None,
                last_name: None,
            })
            .ok_or(IdentityError::Rejected(StatusCode::UNAUTHORIZED))
    }
}

/// Profile store keeping users in a map and counting every call.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
    calls: AtomicUsize,
}

impl MemoryUserStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert(&self, user: UpsertUser) -> Result<User, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        user.validate()?;

        let now = Utc::now();
        let mut users = self.users.lock().unwrap();
        let next_id = format!("rec-{}", users.len() + 1);
        let stored = users
            .entry(user.clerk_user_id.clone())
            .or_insert_with(|| User {
                id: next_id,
                clerk_user_id: user.clerk_user_id.clone(),
                email: user.email.clone(),
                first_name: None,
                last_name: None,
                created_at: now,
                updated_at: now,
            });

        stored.email = user.email.clone();
        if let Some(first_name) = user.first_name() {
            stored.first_name = Some(first_name.to_string());
        }
        if let Some(last_name) = user.last_name() {
            stored.last_name = Some(last_name.to_string());
        }
        stored.updated_at = now;

        Ok(stored.clone())
    }

    async fn find(&self, clerk_user_id: &str) -> Result<User, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .get(clerk_user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, clerk_user_id: &str) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .remove(clerk_user_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
