//! The flattening engine.
//!
//! [`TreeListDataSource`] presents a forest of [`TreeRowWrapper`]s as one
//! flat, ordered list of visible rows: every root, followed by the visible
//! descendants of each expanded row in depth-first pre-order.
//!
//! Children are computed lazily. A row's children selector runs the first
//! time the row is expanded and never again; collapsing a row removes its
//! descendants from the flat list but keeps the computed child rows, so the
//! next expansion splices the very same rows back in.
//!
//! The flat list is only ever changed by local insertions and removals at
//! the expanded or collapsed row. Each change is reported through
//! [`FlatListSignals`].
//!
//! # Example
//!
//! ```
//! use treegrid::model::TreeListDataSource;
//!
//! let mut source = TreeListDataSource::builder(|name: &String| match name.as_str() {
//!     "R" => Some(vec!["A".to_string(), "B".to_string()]),
//!     _ => None,
//! })
//! .roots(["R".to_string()])
//! .build();
//!
//! assert_eq!(source.len(), 1);
//!
//! let root = source.roots()[0];
//! source.expand(root);
//! let names: Vec<&String> = source.iter_visible().map(|(_, row)| row.model()).collect();
//! assert_eq!(names, ["R", "A", "B"]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use slotmap::SlotMap;
use static_assertions::assert_impl_all;
use tracing::{debug, trace};
use treegrid_core::Signal;
use treegrid_core::logging::{PerfSpan, targets};

use super::row::{RowId, RowProperty, TreeRowWrapper};

/// Computes the children of a model value. `None` means "no children".
pub type ChildrenSelector<M> = Arc<dyn Fn(&M) -> Option<Vec<M>> + Send + Sync>;

type SortFn<M> = Arc<dyn Fn(&M, &M) -> Ordering + Send + Sync>;

/// A root row description, optionally pre-expanded with known children.
///
/// Children given here are used as-is; the selector is not consulted for a
/// seeded row.
#[derive(Debug, Clone)]
pub struct RowSeed<M> {
    model: M,
    expanded: bool,
    children: Option<Vec<RowSeed<M>>>,
}

impl<M> RowSeed<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            expanded: false,
            children: None,
        }
    }

    /// Start the row expanded.
    pub fn expanded(mut self) -> Self {
        self.expanded = true;
        self
    }

    /// Supply the row's children up front.
    pub fn with_children(mut self, children: impl IntoIterator<Item = RowSeed<M>>) -> Self {
        self.children = Some(children.into_iter().collect());
        self
    }
}

/// A row flag change, as reported by [`FlatListSignals::row_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowChange {
    pub row: RowId,
    pub property: RowProperty,
    /// Position in the flat list, or `None` if the row is hidden.
    pub position: Option<usize>,
}

/// Change notifications for the flat list.
///
/// Ranges are inclusive `(first, last)` positions.
#[derive(Default)]
pub struct FlatListSignals {
    /// Rows were spliced in. Positions refer to the list after insertion.
    pub rows_inserted: Signal<(usize, usize)>,
    /// Rows were removed. Positions refer to the list before removal.
    pub rows_removed: Signal<(usize, usize)>,
    pub row_changed: Signal<RowChange>,
}

impl fmt::Debug for FlatListSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatListSignals")
            .field("rows_inserted", &self.rows_inserted)
            .field("rows_removed", &self.rows_removed)
            .field("row_changed", &self.row_changed)
            .finish()
    }
}

/// Builder for [`TreeListDataSource`].
pub struct TreeListDataSourceBuilder<M> {
    selector: ChildrenSelector<M>,
    sort: Option<SortFn<M>>,
    seeds: Vec<RowSeed<M>>,
}

impl<M> TreeListDataSourceBuilder<M> {
    /// Order every materialized child list by `key`. The sort is stable.
    pub fn sort_by_key<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&M) -> K + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(move |a: &M, b: &M| key(a).cmp(&key(b))));
        self
    }

    /// Add collapsed roots.
    pub fn roots(mut self, roots: impl IntoIterator<Item = M>) -> Self {
        self.seeds.extend(roots.into_iter().map(RowSeed::new));
        self
    }

    /// Add roots with preset state.
    pub fn seeds(mut self, seeds: impl IntoIterator<Item = RowSeed<M>>) -> Self {
        self.seeds.extend(seeds);
        self
    }

    pub fn build(self) -> TreeListDataSource<M> {
        let _perf = PerfSpan::new("data_source.build");
        let mut source = TreeListDataSource {
            rows: SlotMap::with_key(),
            roots: Vec::with_capacity(self.seeds.len()),
            flat: Vec::new(),
            selector: self.selector,
            sort: self.sort,
            signals: FlatListSignals::default(),
        };

        for seed in self.seeds {
            let id = source.insert_seed(seed, 0, None);
            source.roots.push(id);
        }

        let mut flat = Vec::with_capacity(source.roots.len());
        for &root in &source.roots {
            source.collect_visible(root, &mut flat);
        }
        source.flat = flat;

        debug!(
            target: targets::FLATTEN,
            roots = source.roots.len(),
            visible = source.flat.len(),
            "built data source"
        );
        source
    }
}

/// A forest of expandable rows exposed as a flat list.
pub struct TreeListDataSource<M> {
    rows: SlotMap<RowId, TreeRowWrapper<M>>,
    roots: Vec<RowId>,
    flat: Vec<RowId>,
    selector: ChildrenSelector<M>,
    sort: Option<SortFn<M>>,
    signals: FlatListSignals,
}

assert_impl_all!(TreeListDataSource<String>: Send, Sync);

impl<M> TreeListDataSource<M> {
    /// Start building a data source around a children selector.
    pub fn builder<F>(selector: F) -> TreeListDataSourceBuilder<M>
    where
        F: Fn(&M) -> Option<Vec<M>> + Send + Sync + 'static,
    {
        TreeListDataSourceBuilder {
            selector: Arc::new(selector),
            sort: None,
            seeds: Vec::new(),
        }
    }

    /// A data source with collapsed roots and no sorting.
    pub fn new<F>(roots: impl IntoIterator<Item = M>, selector: F) -> Self
    where
        F: Fn(&M) -> Option<Vec<M>> + Send + Sync + 'static,
    {
        Self::builder(selector).roots(roots).build()
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// The visible rows in display order.
    pub fn flat_list(&self) -> &[RowId] {
        &self.flat
    }

    pub fn iter_visible(&self) -> impl Iterator<Item = (RowId, &TreeRowWrapper<M>)> + '_ {
        self.flat.iter().map(move |&id| (id, &self.rows[id]))
    }

    pub fn row(&self, id: RowId) -> Option<&TreeRowWrapper<M>> {
        self.rows.get(id)
    }

    pub fn model(&self, id: RowId) -> Option<&M> {
        self.rows.get(id).map(TreeRowWrapper::model)
    }

    /// The row shown at `position` in the flat list.
    pub fn row_at(&self, position: usize) -> Option<RowId> {
        self.flat.get(position).copied()
    }

    pub fn roots(&self) -> &[RowId] {
        &self.roots
    }

    /// Position of a visible row in the flat list.
    pub fn position_of(&self, id: RowId) -> Option<usize> {
        self.flat.iter().position(|&row| row == id)
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Number of rows created so far, visible or not.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn signals(&self) -> &FlatListSignals {
        &self.signals
    }

    /// Render the visible rows, one per line, indented by depth.
    ///
    /// Expandable rows are marked `+` (collapsed) or `-` (expanded).
    pub fn format_visible<F>(&self, label: F) -> String
    where
        F: Fn(&M) -> String,
    {
        let mut out = String::new();
        for (_, row) in self.iter_visible() {
            let marker = if !row.has_expand_affordance() {
                ' '
            } else if row.is_expanded() {
                '-'
            } else {
                '+'
            };
            out.push_str(&"  ".repeat(row.depth()));
            out.push(marker);
            out.push(' ');
            out.push_str(&label(row.model()));
            out.push('\n');
        }
        out
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Expand a row.
    ///
    /// Materializes the row's children on first expansion. If the row is
    /// visible, its visible descendants are spliced in right after it.
    /// Returns `false` if the row was already expanded or is unknown.
    pub fn expand(&mut self, id: RowId) -> bool {
        match self.rows.get(id) {
            Some(row) if !row.is_expanded() => {}
            _ => return false,
        }

        self.materialize(id);
        self.rows[id].set_expanded(true);

        let position = self.position_of(id);
        if let Some(position) = position {
            let mut block = Vec::new();
            for &child in self.rows[id].children() {
                self.collect_visible(child, &mut block);
            }
            if !block.is_empty() {
                let first = position + 1;
                let last = first + block.len() - 1;
                self.flat.splice(first..first, block);
                debug!(target: targets::FLATTEN, first, last, "rows inserted");
                self.signals.rows_inserted.emit((first, last));
            }
        }

        self.signals.row_changed.emit(RowChange {
            row: id,
            property: RowProperty::IsExpanded,
            position,
        });
        true
    }

    /// Collapse a row.
    ///
    /// Removes its descendants from the flat list and collapses every
    /// expanded descendant. Materialized children are kept. Returns `false`
    /// if the row was not expanded or is unknown.
    pub fn collapse(&mut self, id: RowId) -> bool {
        match self.rows.get(id) {
            Some(row) if row.is_expanded() => {}
            _ => return false,
        }

        self.rows[id].set_expanded(false);

        let position = self.position_of(id);
        if let Some(position) = position {
            let depth = self.rows[id].depth();
            let first = position + 1;
            let mut end = first;
            while end < self.flat.len() && self.rows[self.flat[end]].depth() > depth {
                end += 1;
            }
            if end > first {
                self.flat.drain(first..end);
                debug!(target: targets::FLATTEN, first, last = end - 1, "rows removed");
                self.signals.rows_removed.emit((first, end - 1));
            }
        }

        self.signals.row_changed.emit(RowChange {
            row: id,
            property: RowProperty::IsExpanded,
            position,
        });
        self.collapse_descendants(id);
        true
    }

    /// Flip a row's expansion. Returns the new state.
    pub fn toggle(&mut self, id: RowId) -> bool {
        let Some(row) = self.rows.get(id) else {
            return false;
        };
        if row.is_expanded() {
            self.collapse(id);
            false
        } else {
            self.expand(id)
        }
    }

    /// Expand or collapse. Returns `true` if the state changed.
    pub fn set_expanded(&mut self, id: RowId, expanded: bool) -> bool {
        if expanded {
            self.expand(id)
        } else {
            self.collapse(id)
        }
    }

    /// Expand every ancestor of a row so that it becomes visible.
    ///
    /// Returns the row's position afterwards.
    pub fn expand_to(&mut self, id: RowId) -> Option<usize> {
        let mut ancestors = Vec::new();
        let mut current = self.rows.get(id)?.parent();
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.rows[parent].parent();
        }
        for &ancestor in ancestors.iter().rev() {
            self.expand(ancestor);
        }
        self.position_of(id)
    }

    /// Collapse every root, leaving only the roots visible.
    pub fn collapse_all(&mut self) {
        let roots = self.roots.clone();
        for root in roots {
            if !self.collapse(root) {
                self.collapse_descendants(root);
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn insert_seed(&mut self, seed: RowSeed<M>, depth: usize, parent: Option<RowId>) -> RowId {
        let RowSeed {
            model,
            expanded,
            children,
        } = seed;
        let id = self.rows.insert(TreeRowWrapper::new(model, depth, parent));
        self.rows[id].init_expanded(expanded);

        match children {
            Some(children) => {
                let mut ids = Vec::with_capacity(children.len());
                for child in children {
                    ids.push(self.insert_seed(child, depth + 1, Some(id)));
                }
                let empty = ids.is_empty();
                let row = &mut self.rows[id];
                row.set_children(ids);
                if empty {
                    row.set_has_expand_affordance(false);
                }
            }
            None if expanded => self.materialize(id),
            None => {}
        }
        id
    }

    /// Compute a row's children, once.
    fn materialize(&mut self, id: RowId) {
        if self.rows[id].is_materialized() {
            return;
        }

        let mut models = (self.selector)(self.rows[id].model()).unwrap_or_default();
        if let Some(sort) = &self.sort {
            models.sort_by(|a, b| sort(a, b));
        }

        let depth = self.rows[id].depth() + 1;
        let mut children = Vec::with_capacity(models.len());
        for model in models {
            children.push(self.rows.insert(TreeRowWrapper::new(model, depth, Some(id))));
        }
        let count = children.len();
        self.rows[id].set_children(children);
        trace!(target: targets::FLATTEN, depth, count, "materialized children");

        if count == 0 && self.rows[id].set_has_expand_affordance(false) {
            self.signals.row_changed.emit(RowChange {
                row: id,
                property: RowProperty::HasExpandAffordance,
                position: self.position_of(id),
            });
        }
    }

    /// Push `id` and its visible descendants in pre-order.
    fn collect_visible(&self, id: RowId, out: &mut Vec<RowId>) {
        out.push(id);
        let row = &self.rows[id];
        if row.is_expanded() {
            for &child in row.children() {
                self.collect_visible(child, out);
            }
        }
    }

    /// Clear the expansion flag of every materialized descendant.
    fn collapse_descendants(&mut self, id: RowId) {
        let mut stack = self.rows[id].children().to_vec();
        while let Some(child) = stack.pop() {
            let row = &self.rows[child];
            stack.extend_from_slice(row.children());
            if row.set_expanded(false) {
                self.signals.row_changed.emit(RowChange {
                    row: child,
                    property: RowProperty::IsExpanded,
                    position: None,
                });
            }
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for TreeListDataSource<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeListDataSource")
            .field("roots", &self.roots.len())
            .field("rows", &self.rows.len())
            .field("visible", &self.flat.len())
            .field("sorted", &self.sort.is_some())
            .finish()
    }
}
