//! AbbreviationMatcher - whole-word, case-sensitive abbreviation detection
//!
//! All dictionary keys are compiled into a single regex alternation.
//!
//! # Matching rules
//! - Keys are escaped, so `C++` or `A.B` match literally
//! - Word-boundary anchors are placed on each side of a key that starts or
//!   ends with a word character ("API" never matches inside "RAPID")
//! - Keys are ordered longest first, ties broken lexicographically, so the
//!   alternation prefers "AB CD" over "AB" at the same position
//! - Matching is left-to-right and non-overlapping

use regex::Regex;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::dictionary::Dictionary;
use crate::error::Result;

// ==================== TYPE DEFINITIONS ====================

/// One abbreviation occurrence; offsets are byte offsets into the scanned text
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AbbreviationMatch {
    pub start: usize,
    pub end: usize,
    pub key: String,
}

/// Statistics about the compiled matcher
#[derive(Serialize, Deserialize)]
pub struct MatcherStats {
    pub key_count: usize,
    pub pattern_len: usize,
}

// ==================== MAIN IMPLEMENTATION ====================

/// Compiled matcher over a dictionary's keys
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AbbreviationMatcher {
    /// None when the dictionary is empty
    pattern: Option<Regex>,
    key_count: usize,
}

impl Default for AbbreviationMatcher {
    fn default() -> Self {
        Self {
            pattern: None,
            key_count: 0,
        }
    }
}

impl AbbreviationMatcher {
    /// Compile a matcher for every key of `dictionary`
    pub fn new(dictionary: &Dictionary) -> Result<Self> {
        Self::from_keys(dictionary.keys())
    }

    /// Like [`new`](Self::new), but a dictionary whose pattern cannot be
    /// compiled (e.g. over the regex size limit) yields a matcher that never
    /// matches. The error is logged.
    pub fn new_or_empty(dictionary: &Dictionary) -> Self {
        Self::new(dictionary).unwrap_or_else(|e| {
            console_error!(
                "[Matcher] Could not compile {} key(s), annotating nothing: {}",
                dictionary.len(),
                e
            );
            Self::default()
        })
    }

    /// Compile a matcher from raw keys; empty keys are ignored
    pub fn from_keys<'a, I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys = ordered_keys(keys);
        if keys.is_empty() {
            return Ok(Self::default());
        }

        let alternation: Vec<String> = keys.iter().map(|k| anchored(k)).collect();
        let pattern = Regex::new(&format!("(?:{})", alternation.join("|")))?;

        Ok(Self {
            pattern: Some(pattern),
            key_count: keys.len(),
        })
    }

    /// True if no key can ever match
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Source of the compiled pattern, if any
    pub fn pattern_source(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// All non-overlapping occurrences, left to right
    pub fn find_matches(&self, text: &str) -> Vec<AbbreviationMatch> {
        let Some(pattern) = self.pattern.as_ref() else {
            return Vec::new();
        };
        pattern
            .find_iter(text)
            .map(|m| AbbreviationMatch {
                start: m.start(),
                end: m.end(),
                // literal, case-sensitive keys: the matched text is the key
                key: m.as_str().to_string(),
            })
            .collect()
    }
}

#[wasm_bindgen]
impl AbbreviationMatcher {
    /// Build from a stored dictionary value (either record shape accepted)
    #[wasm_bindgen(constructor)]
    pub fn js_new(dictionary: JsValue) -> std::result::Result<AbbreviationMatcher, JsValue> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(dictionary)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse dictionary: {}", e)))?;
        Ok(Self::new(&Dictionary::from_stored(&value))?)
    }

    /// Scan text, returning `[{ start, end, key }]`
    #[wasm_bindgen(js_name = scan)]
    pub fn js_scan(&self, text: &str) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.find_matches(text))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Quick check if text contains any abbreviation
    #[wasm_bindgen(js_name = containsAny)]
    pub fn contains_any(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|p| p.is_match(text))
            .unwrap_or(false)
    }

    /// Get statistics about the matcher
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> JsValue {
        let stats = MatcherStats {
            key_count: self.key_count,
            pattern_len: self.pattern_source().map(str::len).unwrap_or(0),
        };
        serde_wasm_bindgen::to_value(&stats).unwrap_or(JsValue::NULL)
    }
}

// ==================== PATTERN CONSTRUCTION ====================

/// Deduplicated non-empty keys, longest (in chars) first, then lexicographic
pub fn ordered_keys<'a, I>(keys: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keys: Vec<&str> = keys.into_iter().filter(|k| !k.is_empty()).collect();
    keys.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    keys.dedup();
    keys
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escaped key with `\b` on each side that begins/ends with a word character
fn anchored(key: &str) -> String {
    let lead = key.chars().next().map(is_word_char).unwrap_or(false);
    let trail = key.chars().last().map(is_word_char).unwrap_or(false);
    format!(
        "{}{}{}",
        if lead { r"\b" } else { "" },
        regex::escape(key),
        if trail { r"\b" } else { "" }
    )
}
