use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::{postgres::PgRow, Row};
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewSchool, Profile, School, SchoolChanges};
use crate::database::query_builder::{self as sql, PROFILES_TABLE, SCHOOLS_TABLE};
use crate::database::store::Store;

/// `Store` backed by the Postgres database of the hosted backend
#[derive(Clone)]
pub struct PgStore {
    db: DatabaseManager,
}

impl PgStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

fn decode<T: DeserializeOwned>(row: &PgRow) -> Result<T, DatabaseError> {
    let value: Value = row.try_get("row")?;
    serde_json::from_value(value).map_err(|e| DatabaseError::Decode(e.to_string()))
}

fn decode_optional<T: DeserializeOwned>(row: Option<PgRow>) -> Result<Option<T>, DatabaseError> {
    row.as_ref().map(decode::<T>).transpose()
}

/// Lookups by key. An id the key type cannot represent (`abc` for a
/// bigint, a malformed UUID) matches no row.
fn keyed(result: Result<Option<PgRow>, sqlx::Error>) -> Result<Option<PgRow>, DatabaseError> {
    match result {
        Err(e) if is_invalid_key(&e) => {
            debug!("Id does not fit the key type: {}", e);
            Ok(None)
        }
        other => Ok(other?),
    }
}

/// invalid_text_representation or numeric_value_out_of_range
fn is_invalid_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("22P02") | Some("22003")),
        _ => false,
    }
}

fn decode_all<T: DeserializeOwned>(rows: Vec<PgRow>) -> Result<Vec<T>, DatabaseError> {
    rows.iter().map(decode::<T>).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn list_schools(&self) -> Result<Vec<School>, DatabaseError> {
        let rows = sqlx::query(&sql::select_all(SCHOOLS_TABLE))
            .fetch_all(self.db.pool())
            .await?;
        debug!("Fetched {} schools", rows.len());
        decode_all(rows)
    }

    async fn get_school(&self, id: &str) -> Result<Option<School>, DatabaseError> {
        let row = keyed(
            sqlx::query(&sql::select_by_id(SCHOOLS_TABLE))
                .bind(id)
                .fetch_optional(self.db.pool())
                .await,
        )?;
        decode_optional(row)
    }

    async fn insert_school(&self, school: NewSchool) -> Result<School, DatabaseError> {
        let mut qb = sql::insert_school(school);
        let row = qb.build().fetch_one(self.db.pool()).await?;
        decode(&row)
    }

    async fn update_school(
        &self,
        id: &str,
        changes: SchoolChanges,
    ) -> Result<Option<School>, DatabaseError> {
        let mut qb = sql::update_school(id, changes);
        let row = keyed(qb.build().fetch_optional(self.db.pool()).await)?;
        decode_optional(row)
    }

    async fn delete_school(&self, id: &str) -> Result<Option<School>, DatabaseError> {
        let row = keyed(
            sqlx::query(&sql::delete_by_id(SCHOOLS_TABLE))
                .bind(id)
                .fetch_optional(self.db.pool())
                .await,
        )?;
        decode_optional(row)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        let rows = sqlx::query(&sql::select_all(PROFILES_TABLE))
            .fetch_all(self.db.pool())
            .await?;
        debug!("Fetched {} user profiles", rows.len());
        decode_all(rows)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, DatabaseError> {
        let row = keyed(
            sqlx::query(&sql::select_by_id(PROFILES_TABLE))
                .bind(id)
                .fetch_optional(self.db.pool())
                .await,
        )?;
        decode_optional(row)
    }

    async fn update_profile_name(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Option<Profile>, DatabaseError> {
        let row = keyed(
            sqlx::query(&sql::update_profile_name())
                .bind(name)
                .bind(id)
                .fetch_optional(self.db.pool())
                .await,
        )?;
        decode_optional(row)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }
}
