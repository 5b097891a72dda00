//! DNS manager API
//!
//! Relays DNS management calls to Cloudflare using the caller's own API
//! key, applies the bundled Google Workspace record template, and keeps
//! Clerk-verified user profiles in SurrealDB.

pub mod api;
pub mod auth;
pub mod cloudflare;
pub mod config;
pub mod error;
pub mod template;
pub mod users;

#[cfg(test)]
mod test_support;

pub use api::AppState;
pub use auth::ClerkVerifier;
pub use cloudflare::CloudflareClient;
pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use users::SurrealUserStore;
