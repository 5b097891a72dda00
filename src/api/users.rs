//! User profile endpoints
//!
//! Mounted behind [`crate::auth::require_identity`]. The verified identity
//! must equal the profile being touched.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::auth::{authorize, VerifiedIdentity};
use crate::error::{ApiError, AppJson};
use crate::users::{UpsertUser, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserRequest {
    #[serde(default)]
    pub clerk_user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl From<UpsertUserRequest> for UpsertUser {
    fn from(req: UpsertUserRequest) -> Self {
        Self {
            clerk_user_id: req.clerk_user_id.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Profile as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub clerk_user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            clerk_user_id: user.clerk_user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

pub async fn upsert_user(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    AppJson(req): AppJson<UpsertUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let upsert = UpsertUser::from(req);
    upsert.validate()?;
    authorize(&identity, &upsert.clerk_user_id)?;

    let user = state.users.upsert(upsert).await?;

    Ok(Json(json!({
        "success": true,
        "user": UserView::from(user)
    })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Path(clerk_user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(&identity, &clerk_user_id)?;

    let user = state.users.find(&clerk_user_id).await?;

    Ok(Json(json!({
        "success": true,
        "user": UserView::from(user)
    })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Path(clerk_user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(&identity, &clerk_user_id)?;

    state.users.delete(&clerk_user_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully"
    })))
}
