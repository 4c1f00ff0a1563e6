//! Core systems for Treegrid.
//!
//! This crate provides the foundational pieces the tree projection engine is
//! built on:
//!
//! - **Signal/Slot System**: Synchronous change notification
//! - **Property System**: Change-detecting values
//! - **Logging**: `tracing` targets, performance spans and tree debug output
//!
//! # Signal/Slot Example
//!
//! ```
//! use treegrid_core::Signal;
//!
//! // Report the inclusive range of rows added to a list
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let conn_id = rows_inserted.connect(|&(first, last)| {
//!     println!("rows {}..={} inserted", first, last);
//! });
//!
//! rows_inserted.emit((3, 5));
//! rows_inserted.disconnect(conn_id);
//! ```
//!
//! # Property Example
//!
//! ```
//! use treegrid_core::{Property, Signal};
//!
//! struct Counter {
//!     value: Property<i32>,
//!     value_changed: Signal<i32>,
//! }
//!
//! impl Counter {
//!     fn increment(&self) {
//!         let new_value = self.value.get() + 1;
//!         if self.value.set(new_value) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//!
//! let counter = Counter { value: Property::new(0), value_changed: Signal::new() };
//! counter.increment();
//! assert_eq!(counter.value.get(), 1);
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use logging::{DebugTree, PerfSpan, TreeDebug, TreeFormatOptions, TreeStyle};
pub use property::Property;
pub use signal::{ConnectionId, Signal};
