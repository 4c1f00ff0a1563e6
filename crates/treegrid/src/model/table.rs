//! Column projection.
//!
//! A [`ColumnProjector`] turns a typed object graph into [`TableRow`]s: one
//! row per object, each with the same fixed set of [`Column`]s, nested by a
//! children selector. Unlike the walker it never fans out over every member;
//! the columns are exactly the [`ColumnSpec`]s it was given.
//!
//! Binding a spec to an object that lacks the named member is a
//! configuration error and is returned from [`ColumnProjector::project`].
//! Everything else degrades: a failing read shows `<unreadable>` and an
//! object reached twice becomes a childless row flagged with
//! [`TableRow::is_loop`].
//!
//! # Example
//!
//! ```
//! use treegrid::model::{ColumnSpec, ListRef, Value, project};
//!
//! let data = ListRef::new([Value::Int(1), Value::Int(2)]);
//! let rows = project(
//!     &Value::from(data),
//!     |_| None,
//!     vec![ColumnSpec::for_closure("Double", |v| Ok(Value::Int(v.as_i64().unwrap_or(0) * 2)))],
//! )
//! .unwrap();
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].columns()[0].value(), Value::Int(4));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use treegrid_core::Signal;
use treegrid_core::logging::{DebugTree, PerfSpan, targets};

use super::accessor::{Accessor, Getter, Setter};
use super::data_source::TreeListDataSource;
use super::error::{Error, ReflectError, Result};
use super::reflect::{MemberDescriptor, MemberKind};
use super::value::{Identity, ObjectRef, Value};

/// Children selector for projection. `None` and an empty list both mean
/// "no children".
pub type ValueChildren = Arc<dyn Fn(&Value) -> Option<Vec<Value>> + Send + Sync>;

/// Custom accessor factory for a [`ColumnSpec`].
pub type AccessorFactory = Arc<dyn Fn(&Value) -> Result<Accessor> + Send + Sync>;

#[derive(Clone)]
enum ColumnSource {
    Member { name: String, kind: MemberKind },
    Closure { getter: Getter, setter: Option<Setter> },
    Factory(AccessorFactory),
}

/// A column header plus how to build the column's accessor for a row object.
#[derive(Clone)]
pub struct ColumnSpec {
    header: String,
    source: ColumnSource,
}

impl ColumnSpec {
    /// A column bound to the property named like the header.
    pub fn for_property(header: impl Into<String>) -> Self {
        let header = header.into();
        Self::for_property_named(header.clone(), header)
    }

    /// A column bound to a named property.
    pub fn for_property_named(header: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            source: ColumnSource::Member {
                name: property.into(),
                kind: MemberKind::Property,
            },
        }
    }

    /// A column bound to the field named like the header.
    pub fn for_field(header: impl Into<String>) -> Self {
        let header = header.into();
        Self::for_field_named(header.clone(), header)
    }

    /// A column bound to a named field.
    pub fn for_field_named(header: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            source: ColumnSource::Member {
                name: field.into(),
                kind: MemberKind::Field,
            },
        }
    }

    /// A read-only column computed from the row object.
    pub fn for_closure<G>(header: impl Into<String>, getter: G) -> Self
    where
        G: Fn(&Value) -> std::result::Result<Value, ReflectError> + Send + Sync + 'static,
    {
        Self {
            header: header.into(),
            source: ColumnSource::Closure {
                getter: Arc::new(getter),
                setter: None,
            },
        }
    }

    /// A writable computed column. The setter receives the row object and
    /// the raw, uncoerced value.
    pub fn for_closure_rw<G, S>(header: impl Into<String>, getter: G, setter: S) -> Self
    where
        G: Fn(&Value) -> std::result::Result<Value, ReflectError> + Send + Sync + 'static,
        S: Fn(&Value, Value) -> std::result::Result<(), ReflectError> + Send + Sync + 'static,
    {
        Self {
            header: header.into(),
            source: ColumnSource::Closure {
                getter: Arc::new(getter),
                setter: Some(Arc::new(setter)),
            },
        }
    }

    /// A column with a custom accessor factory.
    pub fn new<F>(header: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Value) -> Result<Accessor> + Send + Sync + 'static,
    {
        Self {
            header: header.into(),
            source: ColumnSource::Factory(Arc::new(factory)),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ColumnSource::Member { name, kind } => format!("{} {}", kind, name),
            ColumnSource::Closure { setter, .. } if setter.is_some() => "closure (rw)".to_string(),
            ColumnSource::Closure { .. } => "closure".to_string(),
            ColumnSource::Factory(_) => "factory".to_string(),
        };
        f.debug_struct("ColumnSpec")
            .field("header", &self.header)
            .field("source", &source)
            .finish()
    }
}

/// One cell of a [`TableRow`].
pub struct Column {
    header: String,
    accessor: Accessor,
    value_changed: Signal<Value>,
}

impl Column {
    pub fn new(header: impl Into<String>, accessor: Accessor) -> Self {
        Self {
            header: header.into(),
            accessor,
            value_changed: Signal::new(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn value(&self) -> Value {
        self.accessor.get()
    }

    pub fn can_write(&self) -> bool {
        self.accessor.can_write()
    }

    /// Write the cell if it is writable.
    ///
    /// Emits [`value_changed`](Self::value_changed) with the stored value
    /// and returns `true` when the write went through.
    pub fn set_value(&self, value: impl Into<Value>) -> bool {
        if !self.accessor.can_write() {
            return false;
        }
        let stored = self.accessor.set(value.into());
        if stored {
            self.value_changed.emit(self.accessor.get());
        }
        stored
    }

    /// Signal emitted after a successful [`set_value`](Self::set_value).
    pub fn value_changed(&self) -> &Signal<Value> {
        &self.value_changed
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .finish()
    }
}

/// One projected object.
#[derive(Debug)]
pub struct TableRow {
    entity_name: String,
    /// The row object. Keeps selector-built objects alive for the columns.
    object: Value,
    columns: Vec<Column>,
    children: Vec<Arc<TableRow>>,
    is_loop: bool,
}

impl TableRow {
    /// The row object's type name, or `<null>`.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// The object this row was projected from.
    pub fn object(&self) -> &Value {
        &self.object
    }

    /// Columns in spec order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The first column with this header.
    pub fn column(&self, header: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.header == header)
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    pub fn children(&self) -> &[Arc<TableRow>] {
        &self.children
    }

    /// Whether this row's object was already projected higher up.
    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    /// Use projected rows as the roots of a flattening data source.
    pub fn into_data_source(rows: Vec<TableRow>) -> TreeListDataSource<Arc<TableRow>> {
        TreeListDataSource::builder(|row: &Arc<TableRow>| Some(row.children.clone()))
            .roots(rows.into_iter().map(Arc::new))
            .build()
    }
}

impl DebugTree for TableRow {
    fn label(&self) -> String {
        self.entity_name.clone()
    }

    fn details(&self) -> Option<String> {
        let cells: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}={}", c.header, c.value()))
            .collect();
        let mut details = cells.join(", ");
        if self.is_loop {
            details.push_str(", loop");
        }
        Some(details)
    }

    fn debug_children(&self) -> Vec<&Self> {
        self.children.iter().map(|c| c.as_ref()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemberKey {
    type_name: &'static str,
    member: String,
    kind: MemberKind,
}

/// Projects objects into [`TableRow`]s.
///
/// Member lookups are cached per `(type, member, kind)` for the lifetime of
/// the projector.
pub struct ColumnProjector {
    specs: Vec<ColumnSpec>,
    children: Option<ValueChildren>,
    members: RwLock<HashMap<MemberKey, Option<MemberDescriptor>>>,
}

impl ColumnProjector {
    /// A projector with no children selector: every row is a leaf.
    pub fn new(specs: Vec<ColumnSpec>) -> Self {
        Self {
            specs,
            children: None,
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Set the children selector.
    pub fn with_children<F>(mut self, selector: F) -> Self
    where
        F: Fn(&Value) -> Option<Vec<Value>> + Send + Sync + 'static,
    {
        self.children = Some(Arc::new(selector));
        self
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    /// Number of cached member lookups.
    pub fn cached_members(&self) -> usize {
        self.members.read().len()
    }

    /// Project `root`: one row per element of a list, one row per entry
    /// value of a map, otherwise a single row.
    ///
    /// # Errors
    ///
    /// [`Error::NoColumns`] without specs, [`Error::NullOwner`] when a
    /// member or closure column meets a null object, and
    /// [`Error::MemberNotFound`] when a member column names a member the
    /// object does not have.
    pub fn project(&self, root: &Value) -> Result<Vec<TableRow>> {
        if self.specs.is_empty() {
            return Err(Error::NoColumns);
        }
        let _span = PerfSpan::new("project");

        let mut visited = HashSet::new();
        let objects = match root {
            Value::List(list) => list.items(),
            Value::Map(map) => map.entries().into_iter().map(|(_, value)| value).collect(),
            other => vec![other.clone()],
        };
        let rows = objects
            .iter()
            .map(|object| self.build_row(object, &mut visited))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            target: targets::PROJECTION,
            roots = rows.len(),
            columns = self.specs.len(),
            "projected rows"
        );
        Ok(rows)
    }

    fn build_row(&self, object: &Value, visited: &mut HashSet<Identity>) -> Result<TableRow> {
        let entity_name = if object.is_null() {
            "<null>".to_string()
        } else {
            object.type_name()
        };

        let mut columns = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            columns.push(Column::new(spec.header.clone(), self.create_accessor(spec, object)?));
        }

        let mut row = TableRow {
            entity_name,
            object: object.clone(),
            columns,
            children: Vec::new(),
            is_loop: false,
        };

        if let Some(identity) = object.identity() {
            if !visited.insert(identity) {
                tracing::trace!(target: targets::PROJECTION, entity = %row.entity_name, "loop row");
                row.is_loop = true;
                return Ok(row);
            }
        }

        if let Some(selector) = &self.children {
            if !object.is_null() {
                for child in selector(object).unwrap_or_default() {
                    row.children.push(Arc::new(self.build_row(&child, visited)?));
                }
            }
        }
        Ok(row)
    }

    fn create_accessor(&self, spec: &ColumnSpec, owner: &Value) -> Result<Accessor> {
        match &spec.source {
            ColumnSource::Member { name, kind } => {
                if owner.is_null() {
                    return Err(Error::null_owner(&spec.header));
                }
                let Value::Object(object) = owner else {
                    return Err(Error::member_not_found(name, *kind, owner.type_name()));
                };
                let member = self
                    .resolve_member(object, name, *kind)
                    .ok_or_else(|| Error::member_not_found(name, *kind, object.type_name()))?;
                Ok(Accessor::member(object, member))
            }
            ColumnSource::Closure { getter, setter } => {
                if owner.is_null() {
                    return Err(Error::null_owner(&spec.header));
                }
                Ok(Accessor::closure(owner, getter.clone(), setter.clone()))
            }
            ColumnSource::Factory(factory) => factory(owner),
        }
    }

    fn resolve_member(
        &self,
        object: &ObjectRef,
        name: &str,
        kind: MemberKind,
    ) -> Option<MemberDescriptor> {
        let key = MemberKey {
            type_name: object.type_name(),
            member: name.to_string(),
            kind,
        };
        if let Some(cached) = self.members.read().get(&key) {
            return *cached;
        }
        let resolved = object.member(name, kind);
        self.members.write().insert(key, resolved);
        resolved
    }
}

impl fmt::Debug for ColumnProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnProjector")
            .field("specs", &self.specs)
            .field("has_children", &self.children.is_some())
            .field("cached_members", &self.cached_members())
            .finish()
    }
}

/// Project `root` with a children selector and column specs.
pub fn project<F>(root: &Value, children: F, specs: Vec<ColumnSpec>) -> Result<Vec<TableRow>>
where
    F: Fn(&Value) -> Option<Vec<Value>> + Send + Sync + 'static,
{
    ColumnProjector::new(specs).with_children(children).project(root)
}
