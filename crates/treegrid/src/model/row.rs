//! Tree-row wrappers.
//!
//! A [`TreeRowWrapper`] is one node of the forest a
//! [`TreeListDataSource`](super::TreeListDataSource) manages: the wrapped
//! model value plus its depth, its place in the forest and its expansion
//! state. Wrappers live in the data source's slot map and are addressed by
//! [`RowId`].

use std::fmt;

use slotmap::new_key_type;
use treegrid_core::{Property, Signal};

new_key_type! {
    /// Identifies a row within one data source.
    pub struct RowId;
}

/// The observable flags of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowProperty {
    IsExpanded,
    HasExpandAffordance,
}

/// A model value with expansion state.
pub struct TreeRowWrapper<M> {
    model: M,
    depth: usize,
    parent: Option<RowId>,
    children: Vec<RowId>,
    materialized: bool,
    is_expanded: Property<bool>,
    has_expand_affordance: Property<bool>,
    property_changed: Signal<RowProperty>,
}

impl<M> TreeRowWrapper<M> {
    pub(crate) fn new(model: M, depth: usize, parent: Option<RowId>) -> Self {
        Self {
            model,
            depth,
            parent,
            children: Vec::new(),
            materialized: false,
            is_expanded: Property::new(false),
            has_expand_affordance: Property::new(true),
            property_changed: Signal::new(),
        }
    }

    /// The wrapped model value.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Nesting level; roots are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<RowId> {
        self.parent
    }

    /// Child rows. Empty until the row has been materialized.
    pub fn children(&self) -> &[RowId] {
        &self.children
    }

    /// Whether the children have been computed.
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded.get()
    }

    /// Whether the UI should offer an expand toggle.
    ///
    /// `true` until the row is materialized with no children.
    pub fn has_expand_affordance(&self) -> bool {
        self.has_expand_affordance.get()
    }

    /// Emitted when `is_expanded` or `has_expand_affordance` changes.
    pub fn property_changed(&self) -> &Signal<RowProperty> {
        &self.property_changed
    }

    pub(crate) fn set_children(&mut self, children: Vec<RowId>) {
        self.children = children;
        self.materialized = true;
    }

    /// Returns `true` and notifies subscribers if the flag changed.
    pub(crate) fn set_expanded(&self, expanded: bool) -> bool {
        let changed = self.is_expanded.set(expanded);
        if changed {
            self.property_changed.emit(RowProperty::IsExpanded);
        }
        changed
    }

    /// Sets the flag before anyone can observe the row.
    pub(crate) fn init_expanded(&self, expanded: bool) {
        self.is_expanded.set_silent(expanded);
    }

    /// Returns `true` and notifies subscribers if the flag changed.
    pub(crate) fn set_has_expand_affordance(&self, affordance: bool) -> bool {
        let changed = self.has_expand_affordance.set(affordance);
        if changed {
            self.property_changed.emit(RowProperty::HasExpandAffordance);
        }
        changed
    }
}

impl<M: fmt::Debug> fmt::Debug for TreeRowWrapper<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeRowWrapper")
            .field("model", &self.model)
            .field("depth", &self.depth)
            .field("children", &self.children.len())
            .field("materialized", &self.materialized)
            .field("is_expanded", &self.is_expanded())
            .field("has_expand_affordance", &self.has_expand_affordance())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_new_row_is_collapsed_with_affordance() {
        let row = TreeRowWrapper::new("a", 0, None);
        assert!(!row.is_expanded());
        assert!(row.has_expand_affordance());
        assert!(!row.is_materialized());
        assert!(row.children().is_empty());
    }

    #[test]
    fn test_flag_changes_notify_once() {
        let row = TreeRowWrapper::new("a", 1, None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        row.property_changed().connect(move |p| seen_clone.lock().push(*p));

        assert!(row.set_expanded(true));
        assert!(!row.set_expanded(true));
        assert!(row.set_has_expand_affordance(false));
        row.init_expanded(false);

        assert_eq!(
            *seen.lock(),
            vec![RowProperty::IsExpanded, RowProperty::HasExpandAffordance]
        );
        assert!(!row.is_expanded());
    }
}
