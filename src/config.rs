//! Configuration types and defaults for the annotation pipeline
//!
//! Every field has a default, so JS callers may pass a partial object
//! (or nothing at all) to `startAnnotating`.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Storage key the dictionary lives under in `chrome.storage.local`
pub const DEFAULT_STORAGE_KEY: &str = "abr-ez";

/// Maximum abbreviation length, in characters
pub const MAX_ABBREVIATION_LEN: usize = 20;

/// Maximum meaning length, in characters
pub const MAX_MEANING_LEN: usize = 100;

// =============================================================================
// Main Configuration
// =============================================================================

/// Annotator configuration: class names, skip rules and popup geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotatorConfig {
    /// Key of the persisted dictionary value. Default: "abr-ez"
    pub storage_key: String,
    /// Class put on every annotation span. Default: "abbreviation"
    pub span_class: String,
    /// Class put on the popup container. Default: "abbreviation-popup"
    pub popup_class: String,
    /// Attribute carrying the abbreviation key on a span. Default: "data-key"
    pub key_attribute: String,
    /// Upper-case tag names whose subtrees are never scanned
    pub skip_tags: Vec<String>,
    /// Gap between anchor and popup, in px. Default: 5
    pub popup_offset: f64,
    /// Minimum distance from the left/right viewport edge, in px. Default: 10
    pub viewport_margin: f64,
    /// Background applied to a span while hovered. Default: "#f0f8ff"
    pub hover_background: String,
    /// Inline style of annotation spans
    pub span_style: String,
    /// Inline style of the popup container
    pub popup_style: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            span_class: "abbreviation".to_string(),
            popup_class: "abbreviation-popup".to_string(),
            key_attribute: "data-key".to_string(),
            skip_tags: ["SCRIPT", "STYLE", "NOSCRIPT", "TEXTAREA"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            popup_offset: 5.0,
            viewport_margin: 10.0,
            hover_background: "#f0f8ff".to_string(),
            span_style: "border-bottom: 2px dotted #007acc; cursor: pointer; position: relative;"
                .to_string(),
            popup_style: "position: absolute; background: #fff; border: 1px solid #ccc; \
                border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,0.15); padding: 12px; \
                z-index: 10000; max-width: 300px; font-family: Arial, sans-serif; \
                font-size: 14px; line-height: 1.4;"
                .to_string(),
        }
    }
}

impl AnnotatorConfig {
    /// Parse a config from a JS value; `undefined`/`null` yields the defaults
    pub fn from_js(value: JsValue) -> Result<Self, JsValue> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&format!("Invalid annotator config: {}", e)))
    }

    /// True if `tag` (any case) names an element whose subtree is skipped
    pub fn is_skipped_tag(&self, tag: &str) -> bool {
        self.skip_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
