//! Annotator: rewrite scanned text nodes into annotation spans
//!
//! Split in two halves:
//! - [`segment`] turns a text and its matches into fragments (pure)
//! - a [`FragmentWriter`] swaps a text node for those fragments
//!   (`DomAnnotator` in the browser, an in-memory writer in tests)

pub mod dom;

pub use dom::{DomAnnotator, SpanListeners};

use serde::{Deserialize, Serialize};

use crate::config::AnnotatorConfig;
use crate::error::Result;
use crate::scanner::{scan, AbbreviationMatch, AbbreviationMatcher, ScanHit, ScanNode};

/// A piece of a rewritten text node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    /// Unmatched text, preserved verbatim
    Text(String),
    /// A matched abbreviation key, rendered as an annotation span
    Abbreviation(String),
}

/// Replaces one text node with a run of fragments
pub trait FragmentWriter<N> {
    /// Returns the number of annotation spans created
    fn replace(&self, node: &N, fragments: &[Fragment]) -> Result<usize>;
}

/// Split `text` around `matches` (ascending, non-overlapping byte ranges).
///
/// Concatenating the fragments gives back `text`; empty text runs are
/// dropped. Ranges that are out of order or not on char boundaries are
/// ignored rather than panicking.
pub fn segment(text: &str, matches: &[AbbreviationMatch]) -> Vec<Fragment> {
    let mut fragments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;

    for m in matches {
        if m.start < cursor || m.end <= m.start {
            continue;
        }
        let (Some(before), Some(matched)) = (text.get(cursor..m.start), text.get(m.start..m.end))
        else {
            continue;
        };
        if !before.is_empty() {
            fragments.push(Fragment::Text(before.to_string()));
        }
        fragments.push(Fragment::Abbreviation(matched.to_string()));
        cursor = m.end;
    }

    if let Some(rest) = text.get(cursor..) {
        if !rest.is_empty() {
            fragments.push(Fragment::Text(rest.to_string()));
        }
    }
    fragments
}

/// Apply scan hits through `writer`.
///
/// Hits whose node was detached since the scan are skipped silently; a
/// failure on one node is logged and does not stop the others.
pub fn annotate<N, W>(writer: &W, hits: Vec<ScanHit<N>>) -> usize
where
    N: ScanNode,
    W: FragmentWriter<N>,
{
    let mut created = 0;
    for hit in hits {
        if !hit.node.is_attached() {
            continue;
        }
        let fragments = segment(&hit.text, &hit.matches);
        match writer.replace(&hit.node, &fragments) {
            Ok(count) => created += count,
            Err(e) => console_warn!("[Annotator] Skipping text node: {}", e),
        }
    }
    created
}

/// Scan `root` and annotate everything found; returns spans created
pub fn run_pass<N, W>(
    root: &N,
    matcher: &AbbreviationMatcher,
    config: &AnnotatorConfig,
    writer: &W,
) -> usize
where
    N: ScanNode,
    W: FragmentWriter<N>,
{
    let hits = scan(root, matcher, config);
    if hits.is_empty() {
        return 0;
    }
    annotate(writer, hits)
}
