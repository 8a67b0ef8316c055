//! Tree walk: find text nodes containing abbreviations
//!
//! The walk is generic over [`ScanNode`] so the same traversal runs against
//! the live DOM and against in-memory trees in tests. Scanning never mutates
//! the tree; rewriting is the annotator's job.

use crate::config::AnnotatorConfig;
use crate::scanner::matcher::{AbbreviationMatch, AbbreviationMatcher};

/// Coarse node classification used by the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
    /// Document or fragment: walked through without checks
    Container,
    /// Comments, processing instructions, doctypes
    Other,
}

/// Minimal read-only view of a tree node
pub trait ScanNode: Clone {
    fn kind(&self) -> NodeKind;

    /// Text content of a text node
    fn text_value(&self) -> Option<String>;

    /// Tag name of an element
    fn tag(&self) -> Option<String>;

    /// True if this element's class list contains `class`
    fn has_class(&self, class: &str) -> bool;

    /// Snapshot of the child list, in document order
    fn child_list(&self) -> Vec<Self>;

    /// Parent, if it is an element
    fn enclosing_element(&self) -> Option<Self>;

    /// True while the node is still part of a tree it can be replaced in
    fn is_attached(&self) -> bool;
}

/// A text node with the abbreviations found in it
#[derive(Debug, Clone)]
pub struct ScanHit<N> {
    pub node: N,
    pub text: String,
    pub matches: Vec<AbbreviationMatch>,
}

/// True if `element`'s subtree must never be scanned: a skipped tag, an
/// annotation span, or a popup container
pub fn is_excluded<N: ScanNode>(element: &N, config: &AnnotatorConfig) -> bool {
    if element.kind() != NodeKind::Element {
        return false;
    }
    if element.tag().map(|t| config.is_skipped_tag(&t)).unwrap_or(false) {
        return true;
    }
    element.has_class(&config.span_class) || element.has_class(&config.popup_class)
}

/// True if any ancestor element of `node` is excluded
pub fn has_excluded_ancestor<N: ScanNode>(node: &N, config: &AnnotatorConfig) -> bool {
    let mut current = node.enclosing_element();
    while let Some(element) = current {
        if is_excluded(&element, config) {
            return true;
        }
        current = element.enclosing_element();
    }
    false
}

/// Pre-order, depth-first walk from `root` collecting every text node with
/// at least one abbreviation.
///
/// Roots inside an excluded subtree (e.g. a node inserted into a popup)
/// produce nothing.
pub fn scan<N: ScanNode>(
    root: &N,
    matcher: &AbbreviationMatcher,
    config: &AnnotatorConfig,
) -> Vec<ScanHit<N>> {
    let mut hits = Vec::new();
    if matcher.is_empty() || has_excluded_ancestor(root, config) {
        return hits;
    }

    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        match node.kind() {
            NodeKind::Text => {
                let Some(text) = node.text_value() else {
                    continue;
                };
                let matches = matcher.find_matches(&text);
                if !matches.is_empty() {
                    hits.push(ScanHit { node, text, matches });
                }
            }
            NodeKind::Element | NodeKind::Container => {
                if is_excluded(&node, config) {
                    continue;
                }
                // reversed so the first child is popped first
                stack.extend(node.child_list().into_iter().rev());
            }
            NodeKind::Other => {}
        }
    }

    hits
}
