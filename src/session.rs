//! AnnotationSession: one annotated page
//!
//! The session owns everything the content script needs at runtime: the
//! dictionary, the compiled matcher, the popup controller, the shared span
//! listeners and the mutation watcher. Nothing lives in globals.
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { startAnnotating } from 'abbrcore';
//!
//! await init();
//! const session = await startAnnotating();           // default config
//! console.log(session.annotatedCount());
//!
//! session.reload({ API: { meaning: 'Application Programming Interface' } });
//! session.stop();
//! ```

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AddEventListenerOptions, Document, Node, Window};

use crate::annotator::{run_pass, DomAnnotator, SpanListeners};
use crate::config::AnnotatorConfig;
use crate::dictionary::Dictionary;
use crate::error::{AbbrError, Result};
use crate::popup::PopupController;
use crate::scanner::AbbreviationMatcher;
use crate::store::{load_or_empty, ChromeStorage};
use crate::watcher::MutationWatcher;

/// Counters for the passes run by a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub keys: usize,
    pub passes: usize,
    pub annotated: usize,
    pub last_pass_us: u64,
}

// =============================================================================
// SessionContext
// =============================================================================

/// State shared between the session handle and the watcher callback
struct SessionContext {
    document: Document,
    config: Rc<AnnotatorConfig>,
    dictionary: RefCell<Rc<Dictionary>>,
    matcher: RefCell<AbbreviationMatcher>,
    annotator: DomAnnotator,
    popup: Rc<RefCell<PopupController>>,
    annotated: Cell<usize>,
    stats: RefCell<SessionStats>,
}

impl SessionContext {
    fn new(
        window: Window,
        document: Document,
        config: Rc<AnnotatorConfig>,
        dictionary: Dictionary,
    ) -> Self {
        let matcher = AbbreviationMatcher::new_or_empty(&dictionary);
        let dictionary = Rc::new(dictionary);

        let popup = PopupController::new(
            window,
            document.clone(),
            Rc::clone(&dictionary),
            Rc::clone(&config),
        );
        let listeners = SpanListeners::new(Rc::downgrade(&popup), Rc::clone(&config));
        let annotator = DomAnnotator::new(document.clone(), Rc::clone(&config), listeners);

        let stats = SessionStats {
            keys: matcher.key_count(),
            ..Default::default()
        };

        Self {
            document,
            config,
            dictionary: RefCell::new(dictionary),
            matcher: RefCell::new(matcher),
            annotator,
            popup,
            annotated: Cell::new(0),
            stats: RefCell::new(stats),
        }
    }

    /// Scan and annotate the subtree at `root`
    fn annotate(&self, root: &Node) -> usize {
        let start = instant::Instant::now();
        let created = run_pass(root, &self.matcher.borrow(), &self.config, &self.annotator);
        self.annotated.set(self.annotated.get() + created);

        let mut stats = self.stats.borrow_mut();
        stats.passes += 1;
        stats.annotated = self.annotated.get();
        stats.last_pass_us = start.elapsed().as_micros() as u64;
        created
    }

    fn body(&self) -> Result<Node> {
        self.document
            .body()
            .map(Node::from)
            .ok_or_else(|| AbbrError::Dom("document has no body".into()))
    }

    /// Swap in a new dictionary for every later pass and popup lookup
    fn replace_dictionary(&self, dictionary: Dictionary) {
        let matcher = AbbreviationMatcher::new_or_empty(&dictionary);
        let dictionary = Rc::new(dictionary);

        self.stats.borrow_mut().keys = matcher.key_count();
        *self.matcher.borrow_mut() = matcher;
        *self.dictionary.borrow_mut() = Rc::clone(&dictionary);

        match self.popup.try_borrow_mut() {
            Ok(mut popup) => popup.set_dictionary(dictionary),
            Err(_) => console_warn!("[Session] Popup busy, dictionary not updated"),
        }
    }
}

// =============================================================================
// AnnotationSession
// =============================================================================

#[wasm_bindgen]
pub struct AnnotationSession {
    context: Rc<SessionContext>,
    watcher: Option<MutationWatcher>,
}

impl AnnotationSession {
    fn start(
        window: Window,
        document: Document,
        config: AnnotatorConfig,
        dictionary: Dictionary,
    ) -> Result<Self> {
        let context = Rc::new(SessionContext::new(window, document, Rc::new(config), dictionary));
        let body = context.body()?;

        let start = instant::Instant::now();
        let created = context.annotate(&body);
        console_log!(
            "[Session] Initial pass: {} span(s), {} key(s), {}us",
            created,
            context.matcher.borrow().key_count(),
            start.elapsed().as_micros()
        );

        let watched = Rc::clone(&context);
        let watcher = MutationWatcher::install(&body, move |node| watched.annotate(node))?;

        Ok(Self {
            context,
            watcher: Some(watcher),
        })
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn dictionary(&self) -> Rc<Dictionary> {
        Rc::clone(&self.context.dictionary.borrow())
    }
}

#[wasm_bindgen]
impl AnnotationSession {
    /// Spans created so far, across the initial pass, insertions and reloads
    #[wasm_bindgen(js_name = annotatedCount)]
    pub fn annotated_count(&self) -> usize {
        self.context.annotated.get()
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&*self.context.stats.borrow()).unwrap_or(JsValue::NULL)
    }

    /// Replace the dictionary wholesale and annotate the page for the new
    /// keys. Existing spans are left in place. Returns the spans created.
    pub fn reload(&self, dictionary: JsValue) -> std::result::Result<usize, JsValue> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(dictionary)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse dictionary: {}", e)))?;
        self.context.replace_dictionary(Dictionary::from_stored(&value));

        if self.watcher.is_none() {
            return Ok(0);
        }
        let body = self.context.body()?;
        Ok(self.context.annotate(&body))
    }

    /// Tear down: stop observing, close the popup, unhook span listeners.
    /// Spans stay in the page. Calling it twice is harmless.
    pub fn stop(&mut self) {
        let Some(watcher) = self.watcher.take() else {
            return;
        };
        drop(watcher);

        if let Ok(mut popup) = self.context.popup.try_borrow_mut() {
            popup.dismiss();
        }
        self.context.annotator.detach_all();
        console_log!("[Session] Stopped after {} span(s)", self.context.annotated.get());
    }
}

// `free()` from JS without `stop()` must not leave spans pointing at dropped closures
impl Drop for AnnotationSession {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Resolve once the document has finished parsing
async fn dom_ready(document: &Document) -> Result<()> {
    if document.ready_state() != "loading" {
        return Ok(());
    }

    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        if let Err(e) = document.add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            &resolve,
            &options,
        ) {
            console_error!("[Session] Could not wait for DOMContentLoaded: {:?}", e);
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    JsFuture::from(promise).await?;
    Ok(())
}

/// Content-script entry point: load the dictionary, annotate the page and
/// keep annotating inserted content until `stop()` is called
#[wasm_bindgen(js_name = startAnnotating)]
pub async fn start_annotating(config: JsValue) -> std::result::Result<AnnotationSession, JsValue> {
    let config = AnnotatorConfig::from_js(config)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    dom_ready(&document).await?;

    let store = ChromeStorage::new(config.storage_key.clone());
    let dictionary = load_or_empty(&store).await;
    console_log!(
        "[Session] Loaded {} abbreviation(s) from \"{}\"",
        dictionary.len(),
        store.key()
    );

    Ok(AnnotationSession::start(window, document, config, dictionary)?)
}
