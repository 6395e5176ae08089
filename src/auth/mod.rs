//! Identity provider seam: token verification and account administration.

pub mod gotrue;
pub mod jwt;

pub use gotrue::GoTrueClient;
pub use jwt::{Claims, JwtVerifier};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    /// Non-success answer from the provider, message kept verbatim
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected identity provider response: {0}")]
    Decode(String),
}

/// An account as the identity provider describes it. Fields not read
/// locally are kept in `extra` and passed through to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityUser {
    /// Application role: `app_metadata.role`, else the provider-level role
    pub fn effective_role(&self) -> Option<&str> {
        self.app_metadata
            .get("role")
            .and_then(Value::as_str)
            .or(self.role.as_deref())
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to the account it was issued for
    async fn verify_token(&self, token: &str) -> Result<IdentityUser, IdentityError>;

    async fn list_users(&self) -> Result<Vec<IdentityUser>, IdentityError>;

    async fn delete_user(&self, id: &str) -> Result<(), IdentityError>;
}
