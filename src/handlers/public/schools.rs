// handlers/public/schools.rs - /api/schools handlers

use axum::extract::{Path, State};
use tracing::info;

use crate::database::models::{School, SchoolPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

/// GET /api/schools - List every school
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<School>> {
    info!("GET /api/schools - listing schools");
    let schools = state.store.list_schools().await?;
    Ok(ApiResponse::success(schools))
}

/// GET /api/schools/:id - Get a single school by ID
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<School> {
    info!("GET /api/schools/{} - fetching school", id);
    state
        .store
        .get_school(&id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("School with ID {} not found", id)))
}

/// POST /api/schools - Create a school
///
/// Requires `name`, `address`, `phone` and `school_email`; `location` is
/// optional and `active` defaults to true.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SchoolPayload>,
) -> ApiResult<School> {
    let new_school = payload.into_new_school()?;
    info!("POST /api/schools - creating school {:?}", new_school.name);

    let school = state.store.insert_school(new_school).await?;
    Ok(ApiResponse::created(school))
}

/// PUT /api/schools/:id - Update the supplied fields of a school
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<SchoolPayload>,
) -> ApiResult<School> {
    let changes = payload.into_changes()?;
    info!("PUT /api/schools/{} - updating school", id);

    let school = state
        .store
        .update_school(&id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("School with ID {} not found for update", id)))?;

    Ok(ApiResponse::success(school).with_message(format!("School with ID {} updated successfully", id)))
}

/// DELETE /api/schools/:id - Delete a school, echoing the removed record
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<School> {
    info!("DELETE /api/schools/{} - deleting school", id);

    let school = state
        .store
        .delete_school(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("School with ID {} not found for deletion", id)))?;

    Ok(ApiResponse::success(school).with_message(format!("School with ID {} deleted successfully", id)))
}
