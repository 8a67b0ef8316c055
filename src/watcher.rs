//! MutationWatcher: annotate content inserted after the initial pass
//!
//! Only `childList` changes in the subtree are observed. Each added node is
//! handed to the insert handler on its own, so earlier annotations are never
//! rescanned.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node};

use crate::error::Result;
use crate::scanner::{NodeKind, ScanNode};

/// True for added nodes worth scanning: still attached, text or element
pub fn should_process<N: ScanNode>(node: &N) -> bool {
    matches!(node.kind(), NodeKind::Text | NodeKind::Element) && node.is_attached()
}

pub struct MutationWatcher {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl MutationWatcher {
    /// Observe `root` and call `on_insert` for every qualifying added node,
    /// in delivery order. `on_insert` returns the number of spans it created.
    pub fn install<F>(root: &Node, on_insert: F) -> Result<Self>
    where
        F: Fn(&Node) -> usize + 'static,
    {
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |records: js_sys::Array, observer: MutationObserver| {
                let mut created = 0;
                for record in records.iter() {
                    let Ok(record) = record.dyn_into::<MutationRecord>() else {
                        continue;
                    };
                    let added = record.added_nodes();
                    for i in 0..added.length() {
                        if let Some(node) = added.get(i).filter(should_process::<Node>) {
                            created += on_insert(&node);
                        }
                    }
                }
                // our own span insertions
                observer.take_records();

                if created > 0 {
                    console_log!("[Watcher] Annotated {} inserted abbreviation(s)", created);
                }
            },
        );

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(root, &options)?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    /// Stop observing; pending records are dropped
    pub fn disconnect(&self) {
        self.observer.take_records();
        self.observer.disconnect();
    }
}

impl Drop for MutationWatcher {
    fn drop(&mut self) {
        self.disconnect();
    }
}
