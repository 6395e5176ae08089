use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewSchool, Profile, School, SchoolChanges};

/// The store operations the handlers forward to. Each call is exactly one
/// store round trip; `Ok(None)` is the not-found sentinel.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_schools(&self) -> Result<Vec<School>, DatabaseError>;

    async fn get_school(&self, id: &str) -> Result<Option<School>, DatabaseError>;

    async fn insert_school(&self, school: NewSchool) -> Result<School, DatabaseError>;

    async fn update_school(
        &self,
        id: &str,
        changes: SchoolChanges,
    ) -> Result<Option<School>, DatabaseError>;

    async fn delete_school(&self, id: &str) -> Result<Option<School>, DatabaseError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError>;

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, DatabaseError>;

    async fn update_profile_name(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Option<Profile>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
