//! The page side of a mount.

use std::fmt::Debug;

/// Access to the host page's document.
pub trait HostDocument {
    /// Handle to a page element.
    type Element: Clone + PartialEq + Debug;

    /// Whether `element` is attached to the document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    /// The first attached element carrying `data-cell="name"`.
    fn find_cell_target(&self, name: &str) -> Option<Self::Element>;

    /// Create an empty element as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Element) -> Self::Element;
}
