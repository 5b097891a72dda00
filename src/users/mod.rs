//! User profiles
//!
//! One profile per Clerk identity. Profiles are only ever touched after
//! the caller's identity has been verified and matched against the
//! target id (see [`crate::auth::authorize`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::ApiError;

pub mod surreal;

pub use surreal::SurrealUserStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Internal record id
    pub id: String,
    pub clerk_user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create-or-update request for a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertUser {
    pub clerk_user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpsertUser {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.clerk_user_id.trim().is_empty() || self.email.trim().is_empty() {
            return Err(StoreError::MissingFields);
        }
        Ok(())
    }

    /// Names are only written when a non-empty value was supplied.
    pub fn first_name(&self) -> Option<&str> {
        non_empty(self.first_name.as_deref())
    }

    pub fn last_name(&self) -> Option<&str> {
        non_empty(self.last_name.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("clerkUserId and email are required")]
    MissingFields,

    #[error("User not found")]
    NotFound,

    #[error("database returned no record for {0}")]
    MissingRecord(String),

    #[error("database error: {0}")]
    Database(#[from] surrealdb::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingFields => ApiError::Validation(err.to_string()),
            StoreError::NotFound => ApiError::NotFound(err.to_string()),
            other => ApiError::Unexpected(other.into()),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the profile, or updates email and supplied names on an existing one.
    async fn upsert(&self, user: UpsertUser) -> Result<User, StoreError>;

    async fn find(&self, clerk_user_id: &str) -> Result<User, StoreError>;

    async fn delete(&self, clerk_user_id: &str) -> Result<(), StoreError>;
}
