//! SurrealDB-backed profile store
//!
//! Profiles live in the `user` table keyed by the Clerk user id. A UNIQUE
//! index on `clerk_user_id` backs the same one-profile-per-identity rule.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::sql::Thing;
use surrealdb::Surreal;
use tracing::{debug, info};

use super::{StoreError, UpsertUser, User, UserStore};
use crate::config::Config;

/// Email always wins; names only when supplied; `created_at` set once.
const UPSERT_USER: &str = "\
UPDATE type::thing('user', $clerk_user_id) SET
    clerk_user_id = $clerk_user_id,
    email = $email,
    first_name = $first_name ?? first_name,
    last_name = $last_name ?? last_name,
    created_at = created_at ?? $now,
    updated_at = $now
RETURN AFTER";

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: Thing,
    clerk_user_id: String,
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn key(&self) -> String {
        self.id.id.to_raw()
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.key(),
            clerk_user_id: record.clerk_user_id,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

pub struct SurrealUserStore {
    db: Surreal<Any>,
}

impl SurrealUserStore {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let db = any::connect(config.database_url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", config.database_url))?;

        if let (Some(username), Some(password)) = (&config.database_user, &config.database_pass) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .context("Failed to sign in to SurrealDB")?;
        }

        db.use_ns(config.database_namespace.as_str())
            .use_db(config.database_name.as_str())
            .await
            .context("Failed to select SurrealDB namespace/database")?;

        db.query("DEFINE INDEX user_clerk_user_id ON TABLE user COLUMNS clerk_user_id UNIQUE")
            .await
            .and_then(|response| response.check())
            .context("Failed to define user index")?;

        debug!(
            "Using SurrealDB namespace {} database {}",
            config.database_namespace, config.database_name
        );
        Ok(Self { db })
    }

    async fn find_record(&self, clerk_user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut response = self
            .db
            .query("SELECT * FROM user WHERE clerk_user_id = $clerk_user_id LIMIT 1")
            .bind(("clerk_user_id", clerk_user_id.to_string()))
            .await?;

        let records: Vec<UserRecord> = response.take(0)?;
        Ok(records.into_iter().next())
    }
}

#[async_trait]
impl UserStore for SurrealUserStore {
    async fn upsert(&self, user: UpsertUser) -> Result<User, StoreError> {
        user.validate()?;

        // Single statement on the identity-keyed record: creates or merges.
        let mut response = self
            .db
            .query(UPSERT_USER)
            .bind(("clerk_user_id", user.clerk_user_id.clone()))
            .bind(("email", user.email.clone()))
            .bind(("first_name", user.first_name().map(str::to_string)))
            .bind(("last_name", user.last_name().map(str::to_string)))
            .bind(("now", Utc::now()))
            .await?;

        let records: Vec<UserRecord> = response.take(0)?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::MissingRecord(user.clerk_user_id.clone()))?;

        debug!("Upserted profile for {}", user.clerk_user_id);
        Ok(User::from(record))
    }

    async fn find(&self, clerk_user_id: &str) -> Result<User, StoreError> {
        self.find_record(clerk_user_id)
            .await?
            .map(User::from)
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, clerk_user_id: &str) -> Result<(), StoreError> {
        let mut response = self
            .db
            .query("DELETE user WHERE clerk_user_id = $clerk_user_id RETURN BEFORE")
            .bind(("clerk_user_id", clerk_user_id.to_string()))
            .await?;

        let deleted: Vec<UserRecord> = response.take(0)?;
        if deleted.is_empty() {
            return Err(StoreError::NotFound);
        }

        info!("Deleted profile for {}", clerk_user_id);
        Ok(())
    }
}
