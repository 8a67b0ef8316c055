//! In-memory node tree for exercising the walk and annotator without a browser

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::annotator::{Fragment, FragmentWriter};
use crate::config::AnnotatorConfig;
use crate::dictionary::{AbbreviationRecord, Dictionary};
use crate::error::{AbbrError, Result};
use crate::scanner::{NodeKind, ScanNode};

#[derive(Debug, Clone)]
pub enum FakeKind {
    Text(String),
    Element { tag: String, classes: Vec<String> },
    Comment,
}

#[derive(Debug)]
struct FakeData {
    kind: FakeKind,
    attributes: Vec<(String, String)>,
    parent: Weak<RefCell<FakeData>>,
    children: Vec<FakeNode>,
}

#[derive(Debug, Clone)]
pub struct FakeNode(Rc<RefCell<FakeData>>);

impl FakeNode {
    fn from_kind(kind: FakeKind) -> Self {
        FakeNode(Rc::new(RefCell::new(FakeData {
            kind,
            attributes: Vec::new(),
            parent: Weak::new(),
            children: Vec::new(),
        })))
    }

    pub fn text(text: &str) -> Self {
        Self::from_kind(FakeKind::Text(text.to_string()))
    }

    pub fn comment() -> Self {
        Self::from_kind(FakeKind::Comment)
    }

    pub fn element(tag: &str, classes: &[&str], children: Vec<FakeNode>) -> Self {
        let node = Self::from_kind(FakeKind::Element {
            tag: tag.to_uppercase(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        });
        for child in children {
            node.append(child);
        }
        node
    }

    pub fn append(&self, child: FakeNode) {
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child);
    }

    pub fn children(&self) -> Vec<FakeNode> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<FakeNode> {
        self.0.borrow().parent.upgrade().map(FakeNode)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .push((name.to_string(), value.to_string()));
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn same_node(&self, other: &FakeNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Remove from the parent's child list
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|c| !c.same_node(self));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    /// Swap this node for `replacements` in its parent
    pub fn replace_with(&self, replacements: Vec<FakeNode>) -> Result<()> {
        let parent = self
            .parent()
            .ok_or_else(|| AbbrError::Dom("node has no parent".into()))?;
        let index = parent
            .0
            .borrow()
            .children
            .iter()
            .position(|c| c.same_node(self))
            .ok_or_else(|| AbbrError::Dom("node not found in parent".into()))?;

        for r in &replacements {
            r.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        }
        let _replaced: Vec<FakeNode> = parent
            .0
            .borrow_mut()
            .children
            .splice(index..=index, replacements)
            .collect();
        self.0.borrow_mut().parent = Weak::new();
        Ok(())
    }

    /// Markup-like rendering for assertions
    pub fn render(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            FakeKind::Text(t) => t.clone(),
            FakeKind::Comment => "<!---->".to_string(),
            FakeKind::Element { tag, classes } => {
                let tag = tag.to_lowercase();
                let mut out = format!("<{}", tag);
                if !classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", classes.join(" ")));
                }
                for (name, value) in &data.attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, value));
                }
                out.push('>');
                for child in &data.children {
                    out.push_str(&child.render());
                }
                out.push_str(&format!("</{}>", tag));
                out
            }
        }
    }
}

impl ScanNode for FakeNode {
    fn kind(&self) -> NodeKind {
        match self.0.borrow().kind {
            FakeKind::Text(_) => NodeKind::Text,
            FakeKind::Element { .. } => NodeKind::Element,
            FakeKind::Comment => NodeKind::Other,
        }
    }

    fn text_value(&self) -> Option<String> {
        match &self.0.borrow().kind {
            FakeKind::Text(t) => Some(t.clone()),
            _ => None,
        }
    }

    fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            FakeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        match &self.0.borrow().kind {
            FakeKind::Element { classes, .. } => classes.iter().any(|c| c == class),
            _ => false,
        }
    }

    fn child_list(&self) -> Vec<Self> {
        self.children()
    }

    fn enclosing_element(&self) -> Option<Self> {
        self.parent().filter(|p| p.kind() == NodeKind::Element)
    }

    fn is_attached(&self) -> bool {
        self.parent().is_some()
    }
}

/// Writes fragments into a fake tree the way `DomAnnotator` writes into the DOM
pub struct FakeWriter {
    pub config: AnnotatorConfig,
}

impl Default for FakeWriter {
    fn default() -> Self {
        Self {
            config: AnnotatorConfig::default(),
        }
    }
}

impl FragmentWriter<FakeNode> for FakeWriter {
    fn replace(&self, node: &FakeNode, fragments: &[Fragment]) -> Result<usize> {
        let mut spans = 0;
        let nodes: Vec<FakeNode> = fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => FakeNode::text(text),
                Fragment::Abbreviation(key) => {
                    spans += 1;
                    let span = FakeNode::element(
                        "span",
                        &[self.config.span_class.as_str()],
                        vec![FakeNode::text(key)],
                    );
                    span.set_attribute(&self.config.key_attribute, key);
                    span
                }
            })
            .collect();
        node.replace_with(nodes)?;
        Ok(spans)
    }
}

/// Dictionary with one entry per `(key, meaning)`
pub fn dictionary(entries: &[(&str, &str)]) -> Dictionary {
    entries
        .iter()
        .map(|(k, m)| (k.to_string(), AbbreviationRecord::new(*m, "")))
        .collect()
}
