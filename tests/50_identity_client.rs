use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tinta_fresca_api::auth::{GoTrueClient, IdentityError, IdentityProvider};
use tinta_fresca_api::config::IdentityConfig;
use tokio::net::TcpListener;
use url::Url;

const ANON_KEY: &str = "anon-key";
const SERVICE_KEY: &str = "service-role-key";
const USER_TOKEN: &str = "user-access-token";
const JWT_SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

#[derive(Clone, Default)]
struct FakeProvider {
    users: Arc<Mutex<Vec<Value>>>,
    outage: Arc<Mutex<bool>>,
}

fn has_key(headers: &HeaderMap, key: &str) -> bool {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    apikey == Some(key) && bearer == Some(format!("Bearer {}", key).as_str())
}

async fn current_user(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());

    if apikey != Some(ANON_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "No API key found in request" })));
    }
    if bearer != Some(format!("Bearer {}", USER_TOKEN).as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 401, "msg": "invalid JWT: unable to parse or verify signature" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "u-admin",
            "aud": "authenticated",
            "role": "authenticated",
            "email": "directora@tintafresca.mx",
            "app_metadata": { "provider": "email", "role": "admin" },
            "user_metadata": {}
        })),
    )
}

async fn list_users(State(fake): State<FakeProvider>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if *fake.outage.lock().unwrap() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "code": 500, "msg": "Database error finding users" })),
        );
    }
    if !has_key(&headers, SERVICE_KEY) {
        return (StatusCode::FORBIDDEN, Json(json!({ "msg": "User not allowed" })));
    }
    let users = fake.users.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "aud": "authenticated", "users": users })))
}

async fn delete_user(
    State(fake): State<FakeProvider>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !has_key(&headers, SERVICE_KEY) {
        return (StatusCode::FORBIDDEN, Json(json!({ "msg": "User not allowed" })));
    }
    let mut users = fake.users.lock().unwrap();
    match users.iter().position(|u| u["id"] == id.as_str()) {
        Some(index) => {
            users.remove(index);
            (StatusCode::OK, Json(json!({})))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "code": 404, "msg": "User not found" }))),
    }
}

async fn spawn_provider() -> Result<(FakeProvider, Url)> {
    let fake = FakeProvider::default();
    fake.users.lock().unwrap().extend([
        json!({ "id": "u-admin", "email": "directora@tintafresca.mx", "app_metadata": { "role": "admin" } }),
        json!({ "id": "u-staff", "email": "ruiz@tintafresca.mx", "phone": "" }),
    ]);

    let router = Router::new()
        .route("/auth/v1/user", get(current_user))
        .route("/auth/v1/admin/users", get(list_users))
        .route("/auth/v1/admin/users/:id", delete(delete_user))
        .with_state(fake.clone());

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let url = Url::parse(&format!("http://127.0.0.1:{}", port))?;
    Ok((fake, url))
}

fn config(url: Url, jwt_secret: Option<&str>) -> IdentityConfig {
    IdentityConfig {
        url,
        anon_key: ANON_KEY.to_string(),
        service_role_key: SERVICE_KEY.to_string(),
        jwt_secret: jwt_secret.map(str::to_string),
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn remote_verification_resolves_the_account() -> Result<()> {
    let (_fake, url) = spawn_provider().await?;
    let client = GoTrueClient::new(&config(url, None))?;
    assert!(!client.verifies_locally());

    let user = client.verify_token(USER_TOKEN).await?;
    assert_eq!(user.id, "u-admin");
    assert_eq!(user.email.as_deref(), Some("directora@tintafresca.mx"));
    assert_eq!(user.effective_role(), Some("admin"));
    assert!(user.extra.contains_key("user_metadata"));
    Ok(())
}

#[tokio::test]
async fn rejected_token_is_invalid() -> Result<()> {
    let (_fake, url) = spawn_provider().await?;
    let client = GoTrueClient::new(&config(url, None))?;

    match client.verify_token("stale-token").await {
        Err(IdentityError::InvalidToken(msg)) => assert!(msg.contains("invalid JWT"), "{}", msg),
        other => panic!("expected InvalidToken, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn lists_and_deletes_accounts_with_service_key() -> Result<()> {
    let (fake, url) = spawn_provider().await?;
    let client = GoTrueClient::new(&config(url, None))?;

    let users = client.list_users().await?;
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].id, "u-staff");
    assert_eq!(users[1].extra.get("phone"), Some(&json!("")));

    client.delete_user("u-staff").await?;
    assert_eq!(fake.users.lock().unwrap().len(), 1);

    match client.delete_user("u-staff").await {
        Err(IdentityError::UserNotFound(id)) => assert_eq!(id, "u-staff"),
        other => panic!("expected UserNotFound, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn provider_failure_keeps_its_message() -> Result<()> {
    let (fake, url) = spawn_provider().await?;
    *fake.outage.lock().unwrap() = true;
    let client = GoTrueClient::new(&config(url, None))?;

    match client.list_users().await {
        Err(IdentityError::Provider { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Database error finding users");
        }
        other => panic!("expected Provider error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() -> Result<()> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let url = Url::parse(&format!("http://127.0.0.1:{}", port))?;
    let client = GoTrueClient::new(&config(url, None))?;

    assert!(matches!(
        client.list_users().await,
        Err(IdentityError::Transport(_))
    ));
    Ok(())
}

#[tokio::test]
async fn local_verification_skips_the_network() -> Result<()> {
    // Nothing listens here; a remote call would fail as Transport
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let url = Url::parse(&format!("http://127.0.0.1:{}", port))?;
    let client = GoTrueClient::new(&config(url, Some(JWT_SECRET)))?;
    assert!(client.verifies_locally());

    let claims = json!({
        "sub": "u-admin",
        "aud": "authenticated",
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        "email": "directora@tintafresca.mx",
        "role": "authenticated",
        "app_metadata": { "role": "admin" }
    });
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )?;

    let user = client.verify_token(&token).await?;
    assert_eq!(user.id, "u-admin");
    assert_eq!(user.effective_role(), Some("admin"));

    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"another-secret-that-is-long-enough-too"),
    )?;
    assert!(matches!(
        client.verify_token(&forged).await,
        Err(IdentityError::InvalidToken(_))
    ));
    Ok(())
}
