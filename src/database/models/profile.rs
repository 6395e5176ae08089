use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{id_from_any, non_blank, RecordError};

/// A row of the `Usuarios` profile table. Only `id` and `name` are modeled;
/// identity-owned columns pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `PUT /api/users/:id/name`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileNameUpdate {
    pub name: Option<String>,
}

impl ProfileNameUpdate {
    /// The trimmed name to store
    pub fn validated_name(&self) -> Result<String, RecordError> {
        non_blank(&self.name)
            .map(str::to_string)
            .ok_or(RecordError::BlankField("name"))
    }
}
