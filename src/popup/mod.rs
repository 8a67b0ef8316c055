//! Popup: tooltip placement and the live popup controller
//!
//! Placement is a pure function of the anchor rectangle, the popup size and
//! the viewport, kept apart from the DOM so it can be tested natively.

pub mod controller;

pub use controller::{ListenerGuard, PopupController};

use serde::{Deserialize, Serialize};

use crate::config::AnnotatorConfig;

/// Rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

impl From<web_sys::DomRect> for Rect {
    fn from(rect: web_sys::DomRect) -> Self {
        Self {
            left: rect.left(),
            top: rect.top(),
            right: rect.right(),
            bottom: rect.bottom(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Visible area and current scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Where the popup goes, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    /// True when the popup sits above the anchor
    pub flipped: bool,
}

impl Placement {
    /// Position for an absolutely positioned element under `<body>`
    pub fn page_position(&self, viewport: &Viewport) -> (f64, f64) {
        (self.left + viewport.scroll_x, self.top + viewport.scroll_y)
    }
}

/// Place a popup next to `anchor`.
///
/// Below the anchor by default; above it when the popup would run past the
/// bottom of the viewport. Horizontally the popup starts at the anchor's left
/// edge and is kept within `[margin, viewport.width - popup.width - margin]`;
/// when the viewport is too narrow for that range it is pinned to `margin`.
pub fn place(anchor: &Rect, popup: Size, viewport: &Viewport, config: &AnnotatorConfig) -> Placement {
    let offset = config.popup_offset;
    let margin = config.viewport_margin;

    let below = anchor.bottom + offset;
    let (top, flipped) = if below + popup.height > viewport.height {
        (anchor.top - popup.height - offset, true)
    } else {
        (below, false)
    };

    let max_left = viewport.width - popup.width - margin;
    // negated so NaN widths also land on the margin
    let left = if !(max_left >= margin) {
        margin
    } else {
        anchor.left.clamp(margin, max_left)
    };

    Placement { left, top, flipped }
}
