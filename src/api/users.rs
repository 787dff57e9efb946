//! Profile API: personal data and avatar updates.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{self, UserProfileUpdate, UserResponse};
use crate::AppState;

use super::auth::CurrentUser;
use super::error::{is_unique_violation, ApiError};
use super::validation::{
    validate_city, validate_phone, validate_postal_office, validate_profile_name,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub postal_office: i64,
}

/// Update the authenticated user's profile data
///
/// PATCH /api/users/me
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_profile_name(&req.first_name, "firstName").map_err(ApiError::validation)?;
    validate_profile_name(&req.last_name, "lastName").map_err(ApiError::validation)?;
    validate_phone(&req.phone).map_err(ApiError::validation)?;
    validate_city(&req.city).map_err(ApiError::validation)?;
    validate_postal_office(req.postal_office).map_err(ApiError::validation)?;

    let update = UserProfileUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        phone: req.phone,
        city: req.city,
        postal_office: req.postal_office,
    };

    let updated = db::update_user_profile(&state.db, &user.id, &update)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Phone in use")
            } else {
                ApiError::from(e)
            }
        })?;

    Ok(Json(UserResponse::from(updated)))
}

/// Replace the authenticated user's avatar. The previous object is deleted
/// only after the replacement upload succeeded.
///
/// PATCH /api/users/me/avatar
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Object storage is not configured"))?;

    let mut upload: Option<(Vec<u8>, Option<String>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("avatar") {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            upload = Some((bytes.to_vec(), content_type));
            break;
        }
    }

    let Some((bytes, content_type)) = upload else {
        return Err(ApiError::bad_request("No file"));
    };
    if bytes.is_empty() {
        return Err(ApiError::bad_request("No file"));
    }

    let stored = storage
        .store(bytes, content_type.as_deref())
        .await
        .map_err(|e| ApiError::internal(format!("Avatar upload failed: {}", e)))?;

    // Drop the old object only after the new one is in place
    if !user.avatar_id.is_empty() {
        if let Err(e) = storage.delete(&user.avatar_id).await {
            warn!(user_id = %user.id, error = %e, "Failed to delete previous avatar");
        }
    }

    let updated = db::update_user_avatar(&state.db, &user.id, &stored.url, &stored.key).await?;

    info!(user_id = %updated.id, "Avatar updated");

    Ok(Json(json!({ "url": updated.avatar })))
}
