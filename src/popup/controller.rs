//! PopupController: the single live abbreviation tooltip
//!
//! # Lifetime rules
//! - At most one popup exists; `show` always dismisses the previous one first
//! - The document-level outside-click listener is registered per popup and
//!   unregistered by a [`ListenerGuard`] when the popup is dropped
//! - The closures themselves live as long as the controller, so a handler
//!   can dismiss the popup without dropping the closure that is running

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Node, Window};

use crate::config::AnnotatorConfig;
use crate::dictionary::{AbbreviationRecord, Dictionary};
use crate::error::{AbbrError, Result};
use crate::popup::{place, Rect, Size, Viewport};

const CLOSE_GLYPH: &str = "\u{00d7}";
const CONTENT_STYLE: &str = "position: relative; padding-right: 20px;";
const HEADER_STYLE: &str = "font-weight: bold; margin-bottom: 8px; color: #333;";
const DESCRIPTION_STYLE: &str = "color: #666; margin-bottom: 8px; font-weight: normal;";
const CLOSE_STYLE: &str = "position: absolute; top: -4px; right: -4px; cursor: pointer; \
    font-size: 18px; color: #999; width: 20px; height: 20px; display: flex; \
    align-items: center; justify-content: center;";

// =============================================================================
// ListenerGuard
// =============================================================================

/// An event listener registration that is removed when the guard drops
pub struct ListenerGuard {
    target: EventTarget,
    event: &'static str,
    callback: js_sys::Function,
}

impl ListenerGuard {
    pub fn register(
        target: &EventTarget,
        event: &'static str,
        callback: &js_sys::Function,
    ) -> Result<Self> {
        target.add_event_listener_with_callback(event, callback)?;
        Ok(Self {
            target: target.clone(),
            event,
            callback: callback.clone(),
        })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, &self.callback);
    }
}

// =============================================================================
// PopupInstance
// =============================================================================

/// The popup currently in the document
struct PopupInstance {
    key: String,
    element: HtmlElement,
    listeners: Vec<ListenerGuard>,
}

impl Drop for PopupInstance {
    fn drop(&mut self) {
        self.listeners.clear();
        self.element.remove();
    }
}

// =============================================================================
// PopupController
// =============================================================================

pub struct PopupController {
    window: Window,
    document: Document,
    dictionary: Rc<Dictionary>,
    config: Rc<AnnotatorConfig>,
    current: Option<PopupInstance>,
    outside_click: Closure<dyn FnMut(Event)>,
    close_click: Closure<dyn FnMut(Event)>,
}

impl PopupController {
    pub fn new(
        window: Window,
        document: Document,
        dictionary: Rc<Dictionary>,
        config: Rc<AnnotatorConfig>,
    ) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|weak: &Weak<RefCell<Self>>| {
            let outside = weak.clone();
            let outside_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                with_controller(&outside, |c| c.handle_outside_click(&event));
            });

            let close = weak.clone();
            let close_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                event.stop_propagation();
                with_controller(&close, PopupController::dismiss);
            });

            RefCell::new(Self {
                window,
                document,
                dictionary,
                config,
                current: None,
                outside_click,
                close_click,
            })
        })
    }

    /// Swap the dictionary used for lookups; the open popup is left as is
    pub fn set_dictionary(&mut self, dictionary: Rc<Dictionary>) {
        self.dictionary = dictionary;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Key of the open popup, if any
    pub fn current_key(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.key.as_str())
    }

    /// Show the popup for `key` next to `anchor`, replacing any open popup
    pub fn show(&mut self, key: &str, anchor: &Element) -> Result<()> {
        self.dismiss();

        let Some(record) = self.dictionary.get(key).cloned() else {
            console_warn!("[Popup] No dictionary entry for {:?}", key);
            return Ok(());
        };

        let body = self
            .document
            .body()
            .ok_or_else(|| AbbrError::Dom("document has no body".into()))?;
        let (element, close_button) = self.build(key, &record)?;
        body.append_child(&element)?;

        self.current = Some(PopupInstance {
            key: key.to_string(),
            element,
            listeners: Vec::new(),
        });

        // a half-positioned popup is never left behind
        if let Err(e) = self.position_and_listen(anchor, &close_button) {
            self.dismiss();
            return Err(e);
        }
        Ok(())
    }

    /// Position the open popup next to `anchor` and register its listeners
    fn position_and_listen(&mut self, anchor: &Element, close_button: &HtmlElement) -> Result<()> {
        let Some(popup) = self.current.as_mut() else {
            return Ok(());
        };

        let anchor_rect = Rect::from(anchor.get_bounding_client_rect());
        let popup_rect = popup.element.get_bounding_client_rect();
        let size = Size {
            width: popup_rect.width(),
            height: popup_rect.height(),
        };
        let viewport = viewport(&self.window)?;
        let placement = place(&anchor_rect, size, &viewport, &self.config);
        let (left, top) = placement.page_position(&viewport);

        let style = popup.element.style();
        style.set_property("left", &format!("{}px", left))?;
        style.set_property("top", &format!("{}px", top))?;

        popup.listeners.push(ListenerGuard::register(
            close_button.as_ref(),
            "click",
            self.close_click.as_ref().unchecked_ref(),
        )?);
        popup.listeners.push(ListenerGuard::register(
            self.document.as_ref(),
            "click",
            self.outside_click.as_ref().unchecked_ref(),
        )?);

        Ok(())
    }

    /// Remove the open popup and its listeners; no-op when nothing is open
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    fn handle_outside_click(&mut self, event: &Event) {
        let Some(popup) = self.current.as_ref() else {
            return;
        };
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        if !popup.element.contains(target.as_ref()) {
            self.dismiss();
        }
    }

    fn element(&self, tag: &str, class: &str, style: &str) -> Result<HtmlElement> {
        let element = self
            .document
            .create_element(tag)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| AbbrError::Dom(format!("<{}> is not an HtmlElement", tag)))?;
        element.set_class_name(class);
        element.style().set_css_text(style);
        Ok(element)
    }

    /// Popup markup: header (key + meaning), description, close control
    fn build(&self, key: &str, record: &AbbreviationRecord) -> Result<(HtmlElement, HtmlElement)> {
        let popup = self.element("div", &self.config.popup_class, &self.config.popup_style)?;
        let content = self.element("div", "popup-content", CONTENT_STYLE)?;
        let header = self.element("div", "popup-header", HEADER_STYLE)?;

        let strong = self.document.create_element("strong")?;
        strong.set_text_content(Some(key));
        header.append_child(&strong)?;
        header.append_child(&self.document.create_text_node(&format!(" - {}", record.meaning)))?;
        content.append_child(&header)?;

        if !record.description.is_empty() {
            let description = self.element("div", "popup-description", DESCRIPTION_STYLE)?;
            description.set_text_content(Some(&record.description));
            content.append_child(&description)?;
        }

        let close = self.element("div", "popup-close", CLOSE_STYLE)?;
        close.set_text_content(Some(CLOSE_GLYPH));
        close.set_attribute("role", "button")?;
        close.set_attribute("aria-label", "Close")?;
        content.append_child(&close)?;

        popup.append_child(&content)?;
        Ok((popup, close))
    }
}

/// Run `f` on the controller unless it is gone or already borrowed
fn with_controller(weak: &Weak<RefCell<PopupController>>, f: impl FnOnce(&mut PopupController)) {
    if let Some(controller) = weak.upgrade() {
        if let Ok(mut controller) = controller.try_borrow_mut() {
            f(&mut controller);
        }
    }
}

fn viewport(window: &Window) -> Result<Viewport> {
    let number = |value: JsValue| value.as_f64().unwrap_or(0.0);
    Ok(Viewport {
        width: number(window.inner_width()?),
        height: number(window.inner_height()?),
        scroll_x: window.scroll_x()?,
        scroll_y: window.scroll_y()?,
    })
}
