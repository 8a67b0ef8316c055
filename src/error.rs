//! Error types shared by the dictionary, storage and DOM layers

use std::fmt;
use wasm_bindgen::JsValue;

use crate::config::{MAX_ABBREVIATION_LEN, MAX_MEANING_LEN};

pub type Result<T> = std::result::Result<T, AbbrError>;

/// Reasons a user-supplied entry is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingAbbreviation,
    MissingMeaning,
    AbbreviationTooLong { len: usize },
    MeaningTooLong { len: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingAbbreviation => write!(f, "Please enter an abbreviation"),
            ValidationError::MissingMeaning => write!(f, "Please enter the full meaning"),
            ValidationError::AbbreviationTooLong { len } => write!(
                f,
                "Abbreviation must be {} characters or less (got {})",
                MAX_ABBREVIATION_LEN, len
            ),
            ValidationError::MeaningTooLong { len } => write!(
                f,
                "Full meaning must be {} characters or less (got {})",
                MAX_MEANING_LEN, len
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AbbrError {
    /// Storage backend unavailable or rejected the request
    Storage(String),
    /// Value could not be converted to or from its JS/JSON shape
    Serialization(String),
    Validation(ValidationError),
    Duplicate(String),
    NotFound(String),
    /// Malformed CSV input; `line` is 1-based
    Csv { line: usize, message: String },
    /// A DOM call threw
    Dom(String),
    /// The match pattern could not be compiled
    Pattern(String),
}

impl fmt::Display for AbbrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbbrError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AbbrError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            AbbrError::Validation(err) => write!(f, "{}", err),
            AbbrError::Duplicate(key) => write!(f, "Abbreviation \"{}\" already exists", key),
            AbbrError::NotFound(key) => write!(f, "Abbreviation \"{}\" not found", key),
            AbbrError::Csv { line, message } => write!(f, "CSV line {}: {}", line, message),
            AbbrError::Dom(msg) => write!(f, "DOM error: {}", msg),
            AbbrError::Pattern(msg) => write!(f, "Pattern error: {}", msg),
        }
    }
}

impl std::error::Error for AbbrError {}

impl From<ValidationError> for AbbrError {
    fn from(err: ValidationError) -> Self {
        AbbrError::Validation(err)
    }
}

impl From<regex::Error> for AbbrError {
    fn from(err: regex::Error) -> Self {
        AbbrError::Pattern(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for AbbrError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        AbbrError::Serialization(err.to_string())
    }
}

impl From<JsValue> for AbbrError {
    fn from(value: JsValue) -> Self {
        AbbrError::Dom(describe_js(&value))
    }
}

impl From<AbbrError> for JsValue {
    fn from(err: AbbrError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text for a thrown JS value
pub fn describe_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let err: AbbrError = ValidationError::AbbreviationTooLong { len: 25 }.into();
        assert_eq!(
            err.to_string(),
            "Abbreviation must be 20 characters or less (got 25)"
        );
        assert_eq!(
            AbbrError::Csv { line: 3, message: "unterminated quote".into() }.to_string(),
            "CSV line 3: unterminated quote"
        );
    }
}
