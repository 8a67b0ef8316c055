//! Dictionary: abbreviation key → meaning/description
//!
//! Keys are case-sensitive and unique; iteration is sorted by key. The
//! annotation pipeline only ever reads a dictionary, the popup page edits
//! it through [`Dictionary::add`], [`Dictionary::remove`] and CSV import.

pub mod csv;
pub mod record;

pub use record::{is_valid_key, AbbreviationRecord};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::{MAX_ABBREVIATION_LEN, MAX_MEANING_LEN};
use crate::error::{AbbrError, Result, ValidationError};

// =============================================================================
// Types
// =============================================================================

/// Flattened view of one entry, as handed to the popup page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub abbreviation: String,
    pub meaning: String,
    pub description: String,
}

/// What to do when an imported key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ImportMode {
    /// Imported rows replace existing records
    #[default]
    Merge,
    /// Existing records are kept, imported duplicates are counted as skipped
    SkipExisting,
}

/// A CSV row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIssue {
    pub line: usize,
    pub message: String,
}

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<ImportIssue>,
}

impl ImportReport {
    /// Rows that ended up changing the dictionary
    pub fn changed(&self) -> usize {
        self.added + self.updated
    }
}

/// The user's abbreviation dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: BTreeMap<String, AbbreviationRecord>,
}

// =============================================================================
// Validation
// =============================================================================

/// Check lengths and presence of an already-trimmed abbreviation and meaning
pub fn validate(abbreviation: &str, meaning: &str) -> std::result::Result<(), ValidationError> {
    if abbreviation.is_empty() {
        return Err(ValidationError::MissingAbbreviation);
    }
    if meaning.is_empty() {
        return Err(ValidationError::MissingMeaning);
    }
    let len = abbreviation.chars().count();
    if len > MAX_ABBREVIATION_LEN {
        return Err(ValidationError::AbbreviationTooLong { len });
    }
    let len = meaning.chars().count();
    if len > MAX_MEANING_LEN {
        return Err(ValidationError::MeaningTooLong { len });
    }
    Ok(())
}

// =============================================================================
// Dictionary
// =============================================================================

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persisted value, skipping entries that cannot be used.
    ///
    /// Anything other than a JSON object yields an empty dictionary.
    pub fn from_stored(value: &Value) -> Self {
        let mut dictionary = Self::new();
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return dictionary,
            other => {
                console_warn!("[Dictionary] Stored value is not an object: {}", other);
                return dictionary;
            }
        };

        for (key, raw) in map {
            if !is_valid_key(key) {
                console_warn!("[Dictionary] Skipping invalid key {:?}", key);
                continue;
            }
            match AbbreviationRecord::from_stored(raw) {
                Some(record) => {
                    dictionary.entries.insert(key.clone(), record);
                }
                None => console_warn!("[Dictionary] Skipping malformed entry for {:?}", key),
            }
        }
        dictionary
    }

    /// Value written back to storage (always the object shape)
    pub fn to_stored(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Object(Default::default()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AbbreviationRecord> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbbreviationRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert without validation or normalization; replaces any existing record
    pub fn insert(&mut self, key: impl Into<String>, record: AbbreviationRecord) {
        self.entries.insert(key.into(), record);
    }

    /// All entries sorted by key
    pub fn entries(&self) -> Vec<DictionaryEntry> {
        self.iter().map(|(k, r)| to_entry(k, r)).collect()
    }

    /// Add an entry typed by the user.
    ///
    /// Fields are trimmed and the abbreviation upper-cased. Returns the key
    /// the record was stored under.
    pub fn add(&mut self, abbreviation: &str, meaning: &str, description: &str) -> Result<String> {
        let key = abbreviation.trim().to_uppercase();
        let meaning = meaning.trim();
        validate(&key, meaning)?;

        if self.entries.contains_key(&key) {
            return Err(AbbrError::Duplicate(key));
        }
        self.entries
            .insert(key.clone(), AbbreviationRecord::new(meaning, description.trim()));
        Ok(key)
    }

    /// Remove an entry by exact key
    pub fn remove(&mut self, key: &str) -> Result<AbbreviationRecord> {
        self.entries
            .remove(key)
            .ok_or_else(|| AbbrError::NotFound(key.to_string()))
    }

    /// Case-insensitive substring filter over key, meaning and description.
    /// An empty (or blank) query returns every entry.
    pub fn search(&self, query: &str) -> Vec<DictionaryEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries();
        }
        self.iter()
            .filter(|(key, record)| {
                key.to_lowercase().contains(&needle)
                    || record.meaning.to_lowercase().contains(&needle)
                    || record.description.to_lowercase().contains(&needle)
            })
            .map(|(k, r)| to_entry(k, r))
            .collect()
    }

    /// Import `abbreviation,meaning,description` rows.
    ///
    /// Structural CSV errors fail the whole import; invalid rows are reported
    /// in the returned [`ImportReport`] and skipped.
    pub fn import_csv(&mut self, text: &str, mode: ImportMode) -> Result<ImportReport> {
        let rows = csv::parse(text)?;
        let mut report = ImportReport::default();

        // blank lines are already gone, so this is the first non-blank row
        let data = match rows.split_first() {
            Some((first, rest)) if first.is_header() => rest,
            _ => &rows[..],
        };

        for row in data {
            let field = |i: usize| row.fields.get(i).map(|f| f.trim()).unwrap_or("");
            let (key, meaning, description) = (field(0), field(1), field(2));

            if let Err(err) = validate(key, meaning) {
                report.errors.push(ImportIssue {
                    line: row.line,
                    message: err.to_string(),
                });
                continue;
            }

            let record = AbbreviationRecord::new(meaning, description);
            match self.entries.get(key) {
                None => {
                    self.entries.insert(key.to_string(), record);
                    report.added += 1;
                }
                Some(existing) if mode == ImportMode::SkipExisting || *existing == record => {
                    report.skipped += 1;
                }
                Some(_) => {
                    self.entries.insert(key.to_string(), record);
                    report.updated += 1;
                }
            }
        }

        Ok(report)
    }

    /// Export as CSV, header first, rows sorted by key
    pub fn to_csv(&self) -> String {
        csv::write(
            self.iter()
                .map(|(k, r)| (k, r.meaning.as_str(), r.description.as_str())),
        )
    }
}

fn to_entry(key: &str, record: &AbbreviationRecord) -> DictionaryEntry {
    DictionaryEntry {
        abbreviation: key.to_string(),
        meaning: record.meaning.clone(),
        description: record.description.clone(),
    }
}

impl FromIterator<(String, AbbreviationRecord)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (String, AbbreviationRecord)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
