//! In-memory host document and recording runtime.
//!
//! Used by `plan` to dry-run a mount, and by tests.

use tessera_core::{CellShape, ModuleDefinition};

use crate::error::RuntimeError;
use crate::host::HostDocument;
use crate::runtime::{Observer, ReactiveRuntime};

/// Handle to an element of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    data_cell: Option<String>,
    label: String,
}

/// A minimal element tree rooted at a body element.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    appended: usize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data_cell: None,
                label: "body".to_string(),
            }],
            appended: 0,
        }
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    /// Create an element under `parent`, or detached when `parent` is `None`.
    pub fn create_element(&mut self, parent: Option<ElementId>, label: &str) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            data_cell: None,
            label: label.to_string(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Create a `data-cell="name"` element under the body.
    pub fn create_cell_target(&mut self, name: &str) -> ElementId {
        let id = self.create_element(Some(self.body()), &format!("[data-cell=\"{name}\"]"));
        self.nodes[id.0].data_cell = Some(name.to_string());
        id
    }

    pub fn children(&self, parent: ElementId) -> &[ElementId] {
        self.nodes
            .get(parent.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn label(&self, element: ElementId) -> &str {
        self.nodes
            .get(element.0)
            .map(|node| node.label.as_str())
            .unwrap_or("?")
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDocument for MemoryDocument {
    type Element = ElementId;

    fn is_connected(&self, element: &ElementId) -> bool {
        let mut current = Some(*element);
        while let Some(id) = current {
            if id == self.body() {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|node| node.parent);
        }
        false
    }

    fn find_cell_target(&self, name: &str) -> Option<ElementId> {
        (0..self.nodes.len()).map(ElementId).find(|&id| {
            self.nodes[id.0].data_cell.as_deref() == Some(name) && self.is_connected(&id)
        })
    }

    fn append_child(&mut self, parent: &ElementId) -> ElementId {
        self.appended += 1;
        let label = format!("appended #{}", self.appended);
        self.create_element(Some(*parent), &label)
    }
}

/// One observer request made by a [`RecordingRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverCall<E> {
    pub name: Option<String>,
    pub observer: Observer<E>,
}

/// A runtime that defines nothing and records the observer requests it
/// would make, in the order a generated `define.js` makes them.
#[derive(Debug)]
pub struct RecordingRuntime<E> {
    calls: Vec<ObserverCall<E>>,
    disposals: usize,
    failure: Option<String>,
}

impl<E> RecordingRuntime<E> {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            disposals: 0,
            failure: None,
        }
    }

    /// A runtime whose `instantiate` fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> &[ObserverCall<E>] {
        &self.calls
    }

    /// How many times `dispose` ran.
    pub fn disposals(&self) -> usize {
        self.disposals
    }
}

impl<E> Default for RecordingRuntime<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> ReactiveRuntime<E> for RecordingRuntime<E> {
    fn instantiate(
        &mut self,
        module: &ModuleDefinition,
        observer: &mut dyn FnMut(Option<&str>) -> Observer<E>,
    ) -> Result<(), RuntimeError> {
        if let Some(message) = &self.failure {
            return Err(RuntimeError::new(message.clone()));
        }

        for cell in &module.cells {
            let names: Vec<Option<&str>> = match cell.shape {
                CellShape::Anonymous => vec![None],
                // The hidden variable of a multi-output cell is never observed.
                CellShape::Single | CellShape::ViewPair | CellShape::Multiple => {
                    cell.outputs.iter().map(|name| Some(name.as_str())).collect()
                }
            };
            for name in names {
                let chosen = observer(name);
                self.calls.push(ObserverCall {
                    name: name.map(str::to_string),
                    observer: chosen,
                });
            }
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposals += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity() {
        let mut document = MemoryDocument::new();
        let section = document.create_element(Some(document.body()), "section");
        let nested = document.create_element(Some(section), "div");
        let detached = document.create_element(None, "div");
        let inside_detached = document.create_element(Some(detached), "span");

        assert!(document.is_connected(&nested));
        assert!(!document.is_connected(&detached));
        assert!(!document.is_connected(&inside_detached));
    }

    #[test]
    fn test_find_cell_target_skips_detached() {
        let mut document = MemoryDocument::new();
        let detached = document.create_element(None, "div");
        let hidden = document.create_element(Some(detached), "div");
        document.nodes[hidden.0].data_cell = Some("x".to_string());
        assert_eq!(document.find_cell_target("x"), None);

        let visible = document.create_cell_target("x");
        assert_eq!(document.find_cell_target("x"), Some(visible));
    }

    #[test]
    fn test_append_child_order() {
        let mut document = MemoryDocument::new();
        let container = document.create_element(Some(document.body()), "container");
        let first = document.append_child(&container);
        let second = document.append_child(&container);
        assert_eq!(document.children(container), &[first, second]);
        assert_eq!(document.label(second), "appended #2");
    }
}
