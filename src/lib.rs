//! AbbrCore: Abbreviation Scanner + Tooltip Annotator
//!
//! A Rust/WASM core for the abbreviation browser extension. The content
//! script finds user-defined abbreviations in page text, wraps each one in
//! an annotation span and shows a popup with its meaning on click.
//!
//! # Architecture
//!
//! ## Annotation Pipeline
//! - `scanner/matcher.rs` - AbbreviationMatcher: one escaped regex alternation over all keys
//! - `scanner/walk.rs` - Pre-order text node walk, skipping scripts, spans and popups
//! - `annotator/` - Fragment segmentation + DocumentFragment rewriting
//! - `popup/` - Placement math and the single live popup
//! - `watcher.rs` - MutationWatcher: annotates inserted content
//! - `session.rs` - AnnotationSession: owns all of the above for one page
//!
//! ## Dictionary
//! - `dictionary/` - Records, validation, search, CSV import/export
//! - `store.rs` - Whole-value persistence in `chrome.storage.local`
//! - `editor.rs` - DictionaryEditor for the extension's popup page
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { startAnnotating, DictionaryEditor } from 'abbrcore';
//!
//! await init();
//!
//! // Content script
//! const session = await startAnnotating({ popupOffset: 6 });
//! console.log(session.annotatedCount());
//!
//! // Popup page
//! const editor = new DictionaryEditor();
//! await editor.load();
//! await editor.add('api', 'Application Programming Interface', '');
//! console.log(editor.exportCsv());
//! ```

#[macro_use]
pub mod log;

pub mod annotator;
pub mod config;
pub mod dictionary;
pub mod editor;
pub mod error;
pub mod popup;
pub mod scanner;
pub mod session;
pub mod store;
pub mod watcher;

#[cfg(test)]
mod testing;

// Public exports
pub use config::AnnotatorConfig;
pub use dictionary::{AbbreviationRecord, Dictionary, DictionaryEntry, ImportMode, ImportReport};
pub use editor::{DictionaryEditor, Editor};
pub use error::{AbbrError, Result, ValidationError};
pub use scanner::*;
pub use session::{start_annotating, AnnotationSession};
pub use store::{ChromeStorage, DictionaryStore, MemoryStore};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("abbrcore v{}", env!("CARGO_PKG_VERSION"))
}
