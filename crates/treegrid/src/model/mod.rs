//! Tree-to-flat-list projection.
//!
//! This module turns arbitrary object graphs into the flat, ordered row list
//! that an expandable tree grid renders. It has three layers:
//!
//! - **Accessors** bind to one readable (and maybe writable) slot of an
//!   object: a property, a public field, a list element, a map entry, or a
//!   getter/setter closure pair. Reads that fail degrade to a [`Sentinel`]
//!   value; writes coerce the incoming value to the slot's declared type and
//!   silently do nothing when that is impossible.
//! - **Builders** walk a [`Value`] graph. [`ObjectWalker`] produces a
//!   generic [`GenericNode`] tree with one child per member, entry or
//!   element. [`ColumnProjector`] produces [`TableRow`]s with a fixed set of
//!   caller-chosen columns. Both detect cycles by object identity.
//! - **Flattening**: [`TreeListDataSource`] wraps any tree of models in
//!   [`TreeRowWrapper`]s and keeps the visible rows as one flat list,
//!   computing children lazily on first expansion and splicing descendant
//!   blocks in and out on expand and collapse.
//!
//! # Core Types
//!
//! - `Value`: Dynamic value with shared list, map and object containers
//! - `Reflect`: The capability a record type implements to be walked,
//!   usually through `#[derive(Reflect)]`
//! - `Accessor`: One bound slot, with `get`, `set` and `can_write`
//! - `GenericNode`: Node of a walked object graph
//! - `TableRow` / `Column`: Projected rows with positional columns
//! - `TreeListDataSource`: The flattening engine
//!
//! # Example
//!
//! ```
//! use treegrid::model::{ListRef, Value, parse_object};
//!
//! let scores = ListRef::new([Value::Int(90), Value::Int(75), Value::Int(88)]);
//! let node = parse_object(&Value::from(scores));
//!
//! assert_eq!(node.children().len(), 3);
//! assert_eq!(node.children()[1].name(), "[1]");
//! assert_eq!(node.children()[1].value(), Value::Int(75));
//!
//! let mut source = node.into_data_source();
//! let root = source.roots()[0];
//! source.expand(root);
//! assert_eq!(source.len(), 4);
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │    Value    │────>│ ObjectWalker │────>│    GenericNode     │──┐
//! │  (Reflect)  │     └──────────────┘     └────────────────────┘  │
//! │             │     ┌──────────────┐     ┌────────────────────┐  │
//! │             │────>│ColumnProjector────>│ TableRow / Column  │──┤
//! └─────────────┘     └──────────────┘     └────────────────────┘  │
//!        ^                                                         v
//!        │              ┌──────────┐            ┌────────────────────────┐
//!        └──────────────│ Accessor │            │   TreeListDataSource   │
//!                       └──────────┘            │ (TreeRowWrapper, flat) │
//!                                               └────────────────────────┘
//! ```
//!
//! Nodes and rows read and write through accessors. The data source owns
//! the expansion state and reports every change through its signals.

mod accessor;
mod coerce;
mod data_source;
mod error;
mod reflect;
mod row;
mod table;
mod value;
mod walker;

pub use accessor::{Accessor, Getter, Setter};
pub use coerce::{coerce, format_duration, parse_datetime, parse_duration};
pub use data_source::{
    ChildrenSelector, FlatListSignals, RowChange, RowSeed, TreeListDataSource,
    TreeListDataSourceBuilder,
};
pub use error::{Error, ReflectError, Result};
pub use reflect::{MemberDescriptor, MemberKind, Reflect, ReflectValue, TypeDesc};
pub use row::{RowId, RowProperty, TreeRowWrapper};
pub use table::{
    AccessorFactory, Column, ColumnProjector, ColumnSpec, TableRow, ValueChildren, project,
};
pub use value::{
    EnumDescriptor, EnumValue, Identity, KeyValuePair, ListRef, MapKey, MapRef, ObjectRef,
    Sentinel, Value, ValueKind, WeakListRef, WeakMapRef, WeakObjectRef, WeakValue,
};
pub use walker::{GenericNode, ObjectWalker, WalkerOptions, parse_object};

/// Derive [`Reflect`](trait@Reflect) for a struct with named fields.
pub use treegrid_macros::Reflect;
