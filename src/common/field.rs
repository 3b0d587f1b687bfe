use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A document field decoded without failing the surrounding document.
///
/// A value of the wrong JSON type is kept as [`Field::Malformed`] so the
/// validator can report it and still score every other field. Use with
/// `#[serde(default)]` so an absent key becomes [`Field::Absent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Present(T),
    Malformed(Value),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// JSON type name of a malformed value, for diagnostics.
    pub fn malformed_kind(&self) -> Option<&'static str> {
        match self {
            Field::Malformed(value) => Some(json_kind(value)),
            _ => None,
        }
    }
}

impl Field<String> {
    /// Trimmed string value, treating blank strings as absent.
    pub fn text(&self) -> Option<&str> {
        self.as_present()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(Field::Absent);
        }
        Ok(match T::deserialize(&value) {
            Ok(decoded) => Field::Present(decoded),
            Err(_) => Field::Malformed(value),
        })
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
