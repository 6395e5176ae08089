//! Runs against a real Postgres when TEST_DATABASE_URL is set; otherwise
//! the test returns early.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tinta_fresca_api::database::models::{SchoolChanges, SchoolPayload};
use tinta_fresca_api::database::{DatabaseManager, PgStore, Store};
use uuid::Uuid;

async fn connect() -> Result<Option<(PgStore, PgPool)>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return Ok(None);
    };

    let pool = PgPool::connect(&url).await.context("failed to connect")?;
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS escuelas (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            phone TEXT NOT NULL,
            school_email TEXT NOT NULL,
            location TEXT,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS "Usuarios" (
            id UUID PRIMARY KEY,
            name TEXT,
            email TEXT
        )"#,
    )
    .execute(&pool)
    .await?;

    let store = PgStore::new(DatabaseManager::from_pool(pool.clone()));
    Ok(Some((store, pool)))
}

#[tokio::test]
async fn school_and_profile_lifecycle() -> Result<()> {
    let Some((store, pool)) = connect().await? else {
        return Ok(());
    };
    store.health_check().await?;

    let tag = Uuid::new_v4().to_string();
    let payload: SchoolPayload = serde_json::from_value(serde_json::json!({
        "name": format!("Escuela {}", tag),
        "address": "Av. Reforma 100",
        "phone": "555-0100",
        "school_email": "contacto@escuela.mx"
    }))?;

    let created = store.insert_school(payload.into_new_school()?).await?;
    assert_eq!(created.active, Some(true));
    assert!(created.location.is_none());
    assert!(created.extra.contains_key("created_at"));

    let fetched = store.get_school(&created.id).await?.context("school missing")?;
    assert_eq!(fetched.name, created.name);
    assert!(store
        .list_schools()
        .await?
        .iter()
        .any(|s| s.id == created.id));

    let changes = SchoolChanges {
        phone: Some("555-0199".into()),
        active: Some(false),
        ..Default::default()
    };
    let updated = store
        .update_school(&created.id, changes)
        .await?
        .context("update found nothing")?;
    assert_eq!(updated.phone.as_deref(), Some("555-0199"));
    assert_eq!(updated.active, Some(false));
    assert_eq!(updated.address.as_deref(), Some("Av. Reforma 100"));

    let deleted = store
        .delete_school(&created.id)
        .await?
        .context("delete found nothing")?;
    assert_eq!(deleted.id, created.id);
    assert!(store.get_school(&created.id).await?.is_none());
    assert!(store.delete_school(&created.id).await?.is_none());

    // Ids the key type cannot hold match nothing
    assert!(store.get_school("not-a-number").await?.is_none());
    assert!(store.delete_school("99999999999999999999").await?.is_none());
    let changes = SchoolChanges {
        name: Some("x".into()),
        ..Default::default()
    };
    assert!(store.update_school("1.5", changes).await?.is_none());
    assert!(store.get_profile("not-a-uuid").await?.is_none());
    assert!(store.update_profile_name("not-a-uuid", "x").await?.is_none());

    let profile_id = Uuid::new_v4();
    sqlx::query(r#"INSERT INTO "Usuarios" (id, name, email) VALUES ($1, $2, $3)"#)
        .bind(profile_id)
        .bind("Ana")
        .bind("ana@tintafresca.mx")
        .execute(&pool)
        .await?;

    let id = profile_id.to_string();
    let renamed = store
        .update_profile_name(&id, "Ana López")
        .await?
        .context("profile missing")?;
    assert_eq!(renamed.name.as_deref(), Some("Ana López"));
    assert_eq!(renamed.extra.get("email"), Some(&serde_json::json!("ana@tintafresca.mx")));

    let profile = store.get_profile(&id).await?.context("profile missing")?;
    assert_eq!(profile.name.as_deref(), Some("Ana López"));
    assert!(store.update_profile_name(&Uuid::new_v4().to_string(), "x").await?.is_none());

    sqlx::query(r#"DELETE FROM "Usuarios" WHERE id = $1"#)
        .bind(profile_id)
        .execute(&pool)
        .await?;
    Ok(())
}
