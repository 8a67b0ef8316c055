//! DictionaryEditor: the popup page's view of the dictionary
//!
//! Every mutation is applied to a copy, the copy is persisted, and only then
//! does it replace the in-memory dictionary. A failed save leaves both the
//! store and the editor unchanged.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::dictionary::{Dictionary, DictionaryEntry, ImportMode, ImportReport};
use crate::error::Result;
use crate::store::{ChromeStorage, DictionaryStore};

/// Dictionary editing on top of any [`DictionaryStore`]
pub struct Editor<S> {
    store: S,
    dictionary: RefCell<Dictionary>,
}

impl<S: DictionaryStore> Editor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dictionary: RefCell::new(Dictionary::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Re-read the dictionary from the store; returns the entry count
    pub async fn load(&self) -> Result<usize> {
        let dictionary = self.store.load().await?;
        let len = dictionary.len();
        *self.dictionary.borrow_mut() = dictionary;
        Ok(len)
    }

    async fn commit(&self, next: Dictionary) -> Result<()> {
        self.store.save(&next).await?;
        *self.dictionary.borrow_mut() = next;
        Ok(())
    }

    /// Add and persist an entry; returns the normalized key
    pub async fn add(&self, abbreviation: &str, meaning: &str, description: &str) -> Result<String> {
        let mut next = self.dictionary.borrow().clone();
        let key = next.add(abbreviation, meaning, description)?;
        self.commit(next).await?;
        Ok(key)
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let mut next = self.dictionary.borrow().clone();
        next.remove(key)?;
        self.commit(next).await
    }

    /// Import CSV rows; the store is only written when something changed
    pub async fn import_csv(&self, text: &str, mode: ImportMode) -> Result<ImportReport> {
        let mut next = self.dictionary.borrow().clone();
        let report = next.import_csv(text, mode)?;
        if report.changed() > 0 {
            self.commit(next).await?;
        }
        Ok(report)
    }

    pub fn search(&self, query: &str) -> Vec<DictionaryEntry> {
        self.dictionary.borrow().search(query)
    }

    pub fn entries(&self) -> Vec<DictionaryEntry> {
        self.dictionary.borrow().entries()
    }

    pub fn export_csv(&self) -> String {
        self.dictionary.borrow().to_csv()
    }

    pub fn len(&self) -> usize {
        self.dictionary.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.borrow().is_empty()
    }
}

// =============================================================================
// WASM bindings
// =============================================================================

/// Dictionary editor backed by `chrome.storage.local`
#[wasm_bindgen]
pub struct DictionaryEditor {
    inner: Rc<Editor<ChromeStorage>>,
}

#[wasm_bindgen]
impl DictionaryEditor {
    /// `storageKey` defaults to the key the content script reads
    #[wasm_bindgen(constructor)]
    pub fn new(storage_key: Option<String>) -> DictionaryEditor {
        let store = storage_key.map(ChromeStorage::new).unwrap_or_default();
        DictionaryEditor {
            inner: Rc::new(Editor::new(store)),
        }
    }

    /// Resolves to the number of entries loaded
    pub fn load(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let len = inner.load().await?;
            Ok(JsValue::from(len as u32))
        })
    }

    /// Resolves to the stored (upper-cased) key; rejects with the
    /// validation or duplicate message
    pub fn add(&self, abbreviation: String, meaning: String, description: Option<String>) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let description = description.unwrap_or_default();
            let key = inner.add(&abbreviation, &meaning, &description).await?;
            Ok(JsValue::from_str(&key))
        })
    }

    pub fn remove(&self, key: String) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.remove(&key).await?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to `{ added, updated, skipped, errors: [{ line, message }] }`
    #[wasm_bindgen(js_name = importCsv)]
    pub fn import_csv(&self, text: String, skip_existing: Option<bool>) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let mode = if skip_existing.unwrap_or(false) {
            ImportMode::SkipExisting
        } else {
            ImportMode::Merge
        };
        future_to_promise(async move {
            let report = inner.import_csv(&text, mode).await?;
            console_log!(
                "[Editor] CSV import: {} added, {} updated, {} skipped, {} error(s)",
                report.added,
                report.updated,
                report.skipped,
                report.errors.len()
            );
            serde_wasm_bindgen::to_value(&report)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
        })
    }

    #[wasm_bindgen(js_name = exportCsv)]
    pub fn export_csv(&self) -> String {
        self.inner.export_csv()
    }

    /// `[{ abbreviation, meaning, description }]` sorted by abbreviation
    pub fn search(&self, query: &str) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.search(query))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn entries(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.entries())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.len()
    }
}
