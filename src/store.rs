//! Dictionary persistence
//!
//! The whole dictionary is stored as one value under one key and is always
//! read and replaced wholesale, never patched key by key.

use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::config::DEFAULT_STORAGE_KEY;
use crate::dictionary::Dictionary;
use crate::error::{describe_js, AbbrError, Result};

/// Whole-value dictionary storage
#[allow(async_fn_in_trait)]
pub trait DictionaryStore {
    /// Read and normalize the persisted dictionary; a missing value is empty
    async fn load(&self) -> Result<Dictionary>;

    /// Replace the persisted dictionary
    async fn save(&self, dictionary: &Dictionary) -> Result<()>;
}

/// Load the dictionary, falling back to an empty one if the store fails
pub async fn load_or_empty<S: DictionaryStore>(store: &S) -> Dictionary {
    match store.load().await {
        Ok(dictionary) => dictionary,
        Err(e) => {
            console_error!("[Store] Failed to load abbreviations: {}", e);
            Dictionary::new()
        }
    }
}

// =============================================================================
// chrome.storage.local
// =============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn storage_local_get(keys: &JsValue) -> std::result::Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn storage_local_set(items: &JsValue) -> std::result::Result<js_sys::Promise, JsValue>;
}

fn storage_error(value: JsValue) -> AbbrError {
    AbbrError::Storage(describe_js(&value))
}

/// Extension-local storage (`chrome.storage.local`)
#[derive(Debug, Clone)]
pub struct ChromeStorage {
    key: String,
}

impl Default for ChromeStorage {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_KEY)
    }
}

impl ChromeStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl DictionaryStore for ChromeStorage {
    async fn load(&self) -> Result<Dictionary> {
        let key = JsValue::from_str(&self.key);
        let keys = js_sys::Array::of1(&key);

        let promise = storage_local_get(&keys).map_err(storage_error)?;
        let result = JsFuture::from(promise).await.map_err(storage_error)?;
        let raw = js_sys::Reflect::get(&result, &key).map_err(storage_error)?;

        if raw.is_undefined() || raw.is_null() {
            return Ok(Dictionary::new());
        }
        let value: Value = serde_wasm_bindgen::from_value(raw)?;
        Ok(Dictionary::from_stored(&value))
    }

    async fn save(&self, dictionary: &Dictionary) -> Result<()> {
        // Plain objects, not JS Maps, so other extension pages can read it
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = dictionary.serialize(&serializer)?;

        let items = js_sys::Object::new();
        js_sys::Reflect::set(&items, &JsValue::from_str(&self.key), &value)
            .map_err(storage_error)?;

        let promise = storage_local_set(&items).map_err(storage_error)?;
        JsFuture::from(promise).await.map_err(storage_error)?;
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// In-process store holding the raw persisted value
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: RefCell<Value>,
    saves: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a raw persisted value, in any shape storage may hold
    pub fn with_value(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
            saves: RefCell::new(0),
        }
    }

    /// Current raw persisted value
    pub fn raw(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl DictionaryStore for MemoryStore {
    async fn load(&self) -> Result<Dictionary> {
        Ok(Dictionary::from_stored(&self.value.borrow()))
    }

    async fn save(&self, dictionary: &Dictionary) -> Result<()> {
        *self.value.borrow_mut() = dictionary.to_stored();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
