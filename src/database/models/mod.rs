pub mod profile;
pub mod school;

pub use profile::{Profile, ProfileNameUpdate};
pub use school::{NewSchool, School, SchoolChanges, SchoolPayload};

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Payload problems detected before any store call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<&'static str>),

    #[error("Field '{0}' must be a non-empty string")]
    BlankField(&'static str),

    #[error("No fields provided to update")]
    NoChanges,
}

/// Store keys may be integers or UUIDs; both are carried as opaque strings.
pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("unsupported id value: {}", other))),
    }
}

/// Marks a field as present, so `null` decodes to `Some(None)` while an
/// absent key stays `None` through `#[serde(default)]`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Trimmed value of an optional string, or None when absent or blank
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
