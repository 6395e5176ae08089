// handlers/public/users.rs - /api/users profile handlers

use axum::extract::{Path, State};
use tracing::info;

use crate::database::models::{Profile, ProfileNameUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

/// GET /api/users - List all user profiles
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Profile>> {
    info!("GET /api/users - listing user profiles");
    let profiles = state.store.list_profiles().await?;
    Ok(ApiResponse::success(profiles))
}

/// GET /api/users/:id - Get a single user profile
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Profile> {
    info!("GET /api/users/{} - fetching user profile", id);
    state
        .store
        .get_profile(&id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("User profile with ID {} not found", id)))
}

/// PUT /api/users/:id/name - Replace the display name of a profile
pub async fn update_name(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ProfileNameUpdate>,
) -> ApiResult<Profile> {
    let name = payload.validated_name()?;
    info!("PUT /api/users/{}/name - renaming to {:?}", id, name);

    let profile = state
        .store
        .update_profile_name(&id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User with ID {} not found for name update", id)))?;

    Ok(ApiResponse::success(profile).with_message(format!("Name of user with ID {} updated successfully", id)))
}
