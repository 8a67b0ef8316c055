//! DomAnnotator: writes fragments into the live DOM
//!
//! Text nodes are swapped for a `DocumentFragment` built from text nodes and
//! span elements; page text never goes through `innerHTML`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Node};

use crate::annotator::{Fragment, FragmentWriter};
use crate::config::AnnotatorConfig;
use crate::error::{AbbrError, Result};
use crate::popup::PopupController;

const EVENTS: [&str; 3] = ["click", "mouseenter", "mouseleave"];

// =============================================================================
// SpanListeners
// =============================================================================

/// Click and hover handlers shared by every annotation span of a session
pub struct SpanListeners {
    click: Closure<dyn FnMut(Event)>,
    enter: Closure<dyn FnMut(Event)>,
    leave: Closure<dyn FnMut(Event)>,
}

fn event_span(event: &Event) -> Option<HtmlElement> {
    event.current_target()?.dyn_into::<HtmlElement>().ok()
}

impl SpanListeners {
    pub fn new(popup: Weak<RefCell<PopupController>>, config: Rc<AnnotatorConfig>) -> Self {
        let key_attribute = config.key_attribute.clone();
        let click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            // keeps the document-level dismiss handler from seeing this click
            event.stop_propagation();

            let Some(span) = event_span(&event) else {
                return;
            };
            let Some(key) = span.get_attribute(&key_attribute) else {
                return;
            };
            let Some(popup) = popup.upgrade() else {
                return;
            };
            let Ok(mut popup) = popup.try_borrow_mut() else {
                return;
            };
            if let Err(e) = popup.show(&key, &span) {
                console_error!("[Annotator] Failed to show popup for {}: {}", key, e);
            }
        });

        let hover = config.hover_background.clone();
        let enter = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(span) = event_span(&event) {
                let _ = span.style().set_property("background-color", &hover);
            }
        });

        let leave = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(span) = event_span(&event) {
                let _ = span.style().set_property("background-color", "transparent");
            }
        });

        Self { click, enter, leave }
    }

    fn callbacks(&self) -> [&js_sys::Function; 3] {
        [
            self.click.as_ref().unchecked_ref(),
            self.enter.as_ref().unchecked_ref(),
            self.leave.as_ref().unchecked_ref(),
        ]
    }

    pub fn attach(&self, span: &Element) -> Result<()> {
        for (event, callback) in EVENTS.iter().zip(self.callbacks()) {
            span.add_event_listener_with_callback(event, callback)?;
        }
        Ok(())
    }

    pub fn detach(&self, span: &Element) {
        for (event, callback) in EVENTS.iter().zip(self.callbacks()) {
            let _ = span.remove_event_listener_with_callback(event, callback);
        }
    }
}

// =============================================================================
// DomAnnotator
// =============================================================================

pub struct DomAnnotator {
    document: Document,
    config: Rc<AnnotatorConfig>,
    listeners: SpanListeners,
}

impl DomAnnotator {
    pub fn new(document: Document, config: Rc<AnnotatorConfig>, listeners: SpanListeners) -> Self {
        Self {
            document,
            config,
            listeners,
        }
    }

    fn create_span(&self, key: &str) -> Result<Node> {
        let span = self
            .document
            .create_element("span")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| AbbrError::Dom("span is not an HtmlElement".into()))?;

        span.set_class_name(&self.config.span_class);
        span.set_attribute(&self.config.key_attribute, key)?;
        span.style().set_css_text(&self.config.span_style);
        span.set_text_content(Some(key));
        self.listeners.attach(&span)?;

        Ok(span.into())
    }

    /// Remove the session's listeners from every span still in the document
    pub fn detach_all(&self) {
        let selector = format!(".{}", self.config.span_class);
        let Ok(spans) = self.document.query_selector_all(&selector) else {
            return;
        };
        for i in 0..spans.length() {
            if let Some(span) = spans.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                self.listeners.detach(&span);
            }
        }
    }
}

impl FragmentWriter<Node> for DomAnnotator {
    fn replace(&self, node: &Node, fragments: &[Fragment]) -> Result<usize> {
        let parent = node
            .parent_node()
            .ok_or_else(|| AbbrError::Dom("text node has no parent".into()))?;

        let fragment = self.document.create_document_fragment();
        let mut spans = 0;
        for piece in fragments {
            match piece {
                Fragment::Text(text) => {
                    fragment.append_child(&self.document.create_text_node(text))?;
                }
                Fragment::Abbreviation(key) => {
                    let span = self.create_span(key)?;
                    fragment.append_child(&span)?;
                    spans += 1;
                }
            }
        }

        parent.replace_child(&fragment, node)?;
        Ok(spans)
    }
}
