use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{id_from_any, non_blank, present, RecordError};

/// A row of the `escuelas` table as returned by the store. The store owns
/// column constraints, so every non-key column may come back null and
/// `location` may hold any JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub school_email: Option<String>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub active: Option<bool>,
    /// Store-owned columns this service does not model (timestamps etc.)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for both create and update. `null` is treated as absent,
/// except for `location` where an explicit `null` clears the column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub school_email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
    pub active: Option<bool>,
}

/// Validated insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub school_email: String,
    pub location: Option<String>,
    pub active: bool,
}

/// Validated partial update; only `Some` fields are written.
/// `location: Some(None)` writes NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchoolChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub school_email: Option<String>,
    pub location: Option<Option<String>>,
    pub active: Option<bool>,
}

impl SchoolPayload {
    pub fn into_new_school(self) -> Result<NewSchool, RecordError> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("address", &self.address),
            ("phone", &self.phone),
            ("school_email", &self.school_email),
        ] {
            if non_blank(value).is_none() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(RecordError::MissingRequiredFields(missing));
        }

        Ok(NewSchool {
            name: trimmed(self.name),
            address: trimmed(self.address),
            phone: trimmed(self.phone),
            school_email: trimmed(self.school_email),
            location: self.location.flatten(),
            active: self.active.unwrap_or(true),
        })
    }

    pub fn into_changes(self) -> Result<SchoolChanges, RecordError> {
        let changes = SchoolChanges {
            name: required_if_present("name", self.name)?,
            address: required_if_present("address", self.address)?,
            phone: required_if_present("phone", self.phone)?,
            school_email: required_if_present("school_email", self.school_email)?,
            location: self.location,
            active: self.active,
        };

        if changes.is_empty() {
            return Err(RecordError::NoChanges);
        }
        Ok(changes)
    }
}

impl SchoolChanges {
    /// True when no field carries a value. Clearing `location` alone does
    /// not count as a change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.school_email.is_none()
            && self.location.as_ref().map_or(true, Option::is_none)
            && self.active.is_none()
    }

    /// Apply onto an existing record, for stores that update in memory
    pub fn apply_to(&self, school: &mut School) {
        if let Some(v) = &self.name {
            school.name = Some(v.clone());
        }
        if let Some(v) = &self.address {
            school.address = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            school.phone = Some(v.clone());
        }
        if let Some(v) = &self.school_email {
            school.school_email = Some(v.clone());
        }
        if let Some(v) = &self.location {
            school.location = v.clone().map(Value::String);
        }
        if let Some(v) = self.active {
            school.active = Some(v);
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn required_if_present(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, RecordError> {
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Err(RecordError::BlankField(field)),
        Some(s) => Ok(Some(s.trim().to_string())),
    }
}
