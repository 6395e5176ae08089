use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{IdentityError, IdentityUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Identity resolved by the admin guard, available to handlers as an extension
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl From<IdentityUser> for AuthUser {
    fn from(user: IdentityUser) -> Self {
        let role = user.effective_role().map(str::to_string);
        Self {
            id: user.id,
            email: user.email,
            role,
        }
    }
}

/// Guard for `/api/admin/*`: verifies the bearer token with the identity
/// provider, then checks the admin role unless that check is disabled.
/// Rejections happen before the handler runs, so no store call is made.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|msg| {
        tracing::warn!("Admin request rejected: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    let user = state.identity.verify_token(&token).await.map_err(|e| match e {
        IdentityError::InvalidToken(msg) => {
            tracing::warn!("Authentication error: {}", msg);
            ApiError::unauthorized("Invalid or expired token")
        }
        other => {
            tracing::error!("Error during token verification: {}", other);
            ApiError::unauthorized("Authentication failed")
        }
    })?;

    let auth_user = AuthUser::from(user);

    let security = &state.config.security;
    if security.require_admin_role && auth_user.role.as_deref() != Some(security.admin_role.as_str()) {
        tracing::warn!(
            "User {} with role {:?} denied admin access",
            auth_user.id,
            auth_user.role
        );
        return Err(ApiError::forbidden("Admin role required"));
    }

    tracing::debug!("Admin access granted to {}", auth_user.id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("No token provided")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    // Scheme names are case-insensitive
    let token = match auth_str.trim_start().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        Some(_) => return Err("Authorization header must use Bearer token format"),
        None if auth_str.trim().eq_ignore_ascii_case("bearer") => "",
        None => return Err("Authorization header must use Bearer token format"),
    };

    if token.is_empty() {
        return Err("No token provided");
    }
    Ok(token.to_string())
}
