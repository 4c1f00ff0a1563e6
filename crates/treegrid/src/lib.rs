//! Treegrid - Project object graphs into expandable tree grids.
//!
//! This is the main crate. It re-exports the core systems from
//! `treegrid-core` and provides the projection engine in [`model`].
//!
//! # Example
//!
//! ```
//! use treegrid::model::{ColumnSpec, TableRow, Value, project};
//!
//! let rows = project(
//!     &Value::from("hello"),
//!     |_| None,
//!     vec![ColumnSpec::for_closure("Length", |v| {
//!         Ok(Value::from(v.display_text().chars().count() as i64))
//!     })],
//! )
//! .unwrap();
//!
//! let source = TableRow::into_data_source(rows);
//! assert_eq!(source.len(), 1);
//! ```

pub use treegrid_core::*;

pub mod model;
