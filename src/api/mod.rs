//! HTTP API
//!
//! `/api/users*` sits behind the identity gate; the DNS relay endpoints
//! take the caller's Cloudflare API key in the request body instead.

use anyhow::Context;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{require_identity, IdentityVerifier};
use crate::cloudflare::DnsProvider;
use crate::users::UserStore;

pub mod dns;
pub mod users;


#[derive(Clone)]
pub struct AppState {
    pub dns: Arc<dyn DnsProvider>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub users: Arc<dyn UserStore>,
    pub template_path: Arc<PathBuf>,
}

/// Routes without transport layers.
pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users", post(users::upsert_user))
        .route(
            "/users/:clerk_user_id",
            get(users::get_user).delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.identity.clone(),
            require_identity,
        ));

    let dns_routes = Router::new()
        .route("/fetch-zones", post(dns::fetch_zones))
        .route("/fetch-dns-records", post(dns::fetch_dns_records))
        .route("/add-zone", post(dns::add_zone))
        .route("/delete-zone", post(dns::delete_zone))
        .route("/add-google-workspace-dns", post(dns::add_google_workspace_dns))
        .route("/delete-dns-record", post(dns::delete_dns_record))
        .route("/fetch-nameservers", post(dns::fetch_nameservers))
        .route("/add-google-verification", post(dns::add_google_verification));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", user_routes.merge(dns_routes))
        .with_state(state)
}

/// Full application: routes plus CORS and request tracing.
pub fn app(state: AppState, frontend_url: &str) -> anyhow::Result<Router> {
    Ok(router(state)
        .layer(cors_layer(frontend_url)?)
        .layer(TraceLayer::new_for_http()))
}

pub fn cors_layer(frontend_url: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))
        .with_context(|| format!("Invalid frontend origin: {}", frontend_url))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dns-manager-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
