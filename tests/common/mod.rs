#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use tinta_fresca_api::config::AppConfig;
use tinta_fresca_api::testing::{identity_user, test_config, test_state, MemoryStore, StaticIdentity};
use tokio::net::TcpListener;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const STAFF_TOKEN: &str = "staff-token";

pub const ADMIN_ID: &str = "0d9f6a8e-1c1e-4d6b-9f39-5a7a3c2e8b01";
pub const STAFF_ID: &str = "7b3e2c1a-9d4f-4e0b-8a6c-2f1d0e9c7b55";

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<StaticIdentity>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Store seeded with two profiles, identity with an admin and a staff member
pub fn fixtures() -> (MemoryStore, StaticIdentity) {
    let store = MemoryStore::new()
        .with_profile(ADMIN_ID, "Directora General")
        .with_profile(STAFF_ID, "Maestro Ruiz");
    let identity = StaticIdentity::new()
        .with_user(ADMIN_TOKEN, identity_user(ADMIN_ID, "directora@tintafresca.mx", Some("admin")))
        .with_user(STAFF_TOKEN, identity_user(STAFF_ID, "ruiz@tintafresca.mx", None));
    (store, identity)
}

pub async fn spawn_server() -> Result<TestServer> {
    let (store, identity) = fixtures();
    spawn_server_with(test_config(), store, identity).await
}

/// Serve the real router on a free local port, backed by the given doubles
pub async fn spawn_server_with(
    config: AppConfig,
    store: MemoryStore,
    identity: StaticIdentity,
) -> Result<TestServer> {
    let store = Arc::new(store);
    let identity = Arc::new(identity);
    let state = test_state(config, store.clone(), identity.clone());

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let router = tinta_fresca_api::app(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        identity,
        client: reqwest::Client::new(),
    })
}
