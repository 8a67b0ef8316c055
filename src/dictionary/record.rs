//! AbbreviationRecord and storage-boundary normalization
//!
//! Persisted values come in two shapes: a `{ meaning, description }` object,
//! or a bare string (legacy, meaning only). Both are folded into one record
//! type here so nothing downstream branches on shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MAX_ABBREVIATION_LEN;

/// Meaning and description of one abbreviation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationRecord {
    pub meaning: String,
    #[serde(default)]
    pub description: String,
}

impl AbbreviationRecord {
    pub fn new(meaning: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            meaning: meaning.into(),
            description: description.into(),
        }
    }

    /// Normalize a persisted value.
    ///
    /// Returns `None` for values that are neither a string nor an object
    /// with a string `meaning`. A missing or non-string description is empty.
    pub fn from_stored(value: &Value) -> Option<Self> {
        match value {
            Value::String(meaning) => Some(Self::new(meaning.as_str(), "")),
            Value::Object(map) => {
                let meaning = map.get("meaning")?.as_str()?;
                let description = map
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                Some(Self::new(meaning, description))
            }
            _ => None,
        }
    }
}

/// True if `key` can be used as a dictionary key: 1..=20 characters, not blank
pub fn is_valid_key(key: &str) -> bool {
    let len = key.chars().count();
    len >= 1 && len <= MAX_ABBREVIATION_LEN && !key.trim().is_empty()
}
