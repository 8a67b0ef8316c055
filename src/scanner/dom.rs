//! ScanNode for live DOM nodes

use wasm_bindgen::JsCast;
use web_sys::{Element, Node};

use crate::scanner::walk::{NodeKind, ScanNode};

impl ScanNode for Node {
    fn kind(&self) -> NodeKind {
        match self.node_type() {
            Node::TEXT_NODE => NodeKind::Text,
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::DOCUMENT_NODE | Node::DOCUMENT_FRAGMENT_NODE => NodeKind::Container,
            _ => NodeKind::Other,
        }
    }

    fn text_value(&self) -> Option<String> {
        self.text_content()
    }

    fn tag(&self) -> Option<String> {
        self.dyn_ref::<Element>().map(Element::tag_name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.dyn_ref::<Element>()
            .map(|e| e.class_list().contains(class))
            .unwrap_or(false)
    }

    fn child_list(&self) -> Vec<Self> {
        let children = self.child_nodes();
        (0..children.length())
            .filter_map(|i| children.get(i))
            .collect()
    }

    fn enclosing_element(&self) -> Option<Self> {
        self.parent_element().map(Node::from)
    }

    fn is_attached(&self) -> bool {
        self.is_connected() && self.parent_node().is_some()
    }
}
