// handlers/elevated/users.rs - /api/admin/users handlers
//
// Account administration goes to the identity provider, never to the store.

use axum::{
    extract::{Path, State},
    Extension,
};
use tracing::info;

use crate::auth::IdentityUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/admin/users - List identity provider accounts
pub async fn list(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
) -> ApiResult<Vec<IdentityUser>> {
    info!("GET /api/admin/users - listing accounts for {}", admin.id);
    let users = state.identity.list_users().await?;
    Ok(ApiResponse::success(users))
}

/// DELETE /api/admin/users/:id - Delete an identity provider account
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    info!("DELETE /api/admin/users/{} - requested by {}", id, admin.id);
    state.identity.delete_user(&id).await?;
    Ok(ApiResponse::no_content())
}
