use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{IdentityError, IdentityProvider, IdentityUser, JwtVerifier};
use crate::config::IdentityConfig;

/// HTTP client for a GoTrue-compatible identity API (`/auth/v1/*`)
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    service_role_key: String,
    local: Option<JwtVerifier>,
}

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<IdentityUser>,
}

impl GoTrueClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            base,
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
            local: config.jwt_secret.as_deref().map(JwtVerifier::new),
        })
    }

    /// Whether bearer tokens are checked in-process instead of remotely
    pub fn verifies_locally(&self) -> bool {
        self.local.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.base
            .join(path)
            .map_err(|e| IdentityError::Decode(format!("invalid endpoint {}: {}", path, e)))
    }

    fn user_endpoint(&self, id: &str) -> Result<Url, IdentityError> {
        let mut url = self.endpoint("auth/v1/admin/users")?;
        url.path_segments_mut()
            .map_err(|_| IdentityError::Decode("identity URL cannot be a base".to_string()))?
            .push(id);
        Ok(url)
    }

    async fn remote_user(&self, token: &str) -> Result<IdentityUser, IdentityError> {
        let response = self
            .http
            .get(self.endpoint("auth/v1/user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => decode_json(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                let message = error_message(response).await;
                Err(IdentityError::InvalidToken(message))
            }
            _ => Err(provider_error(response).await),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn verify_token(&self, token: &str) -> Result<IdentityUser, IdentityError> {
        match &self.local {
            Some(verifier) => verifier.verify(token),
            None => self.remote_user(token).await,
        }
    }

    async fn list_users(&self) -> Result<Vec<IdentityUser>, IdentityError> {
        let response = self
            .http
            .get(self.endpoint("auth/v1/admin/users")?)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let list: UserList = decode_json(response).await?;
        debug!("Identity provider returned {} users", list.users.len());
        Ok(list.users)
    }

    async fn delete_user(&self, id: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .delete(self.user_endpoint(id)?)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityError::UserNotFound(id.to_string())),
            _ => Err(provider_error(response).await),
        }
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, IdentityError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| IdentityError::Decode(e.to_string()))
}

async fn provider_error(response: Response) -> IdentityError {
    let status = response.status().as_u16();
    let message = error_message(response).await;
    warn!(status, "Identity provider error: {}", message);
    IdentityError::Provider { status, message }
}

/// Pull the human-readable message out of an error body. The provider
/// uses several shapes depending on the endpoint.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<Value>(&body) {
        Ok(json) => message_from_body(&json).unwrap_or_else(|| status.to_string()),
        Err(_) if !body.trim().is_empty() => body,
        Err(_) => status.to_string(),
    }
}

fn message_from_body(body: &Value) -> Option<String> {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
