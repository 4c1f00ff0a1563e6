//! Logging and debugging facilities for Treegrid.
//!
//! This module provides:
//! - Target names for filtering the `tracing` output of each subsystem
//! - Debug visualization for anything shaped like a tree ([`DebugTree`])
//! - Performance tracing hooks for profiling ([`PerfSpan`])
//!
//! # Tracing Integration
//!
//! Treegrid uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("treegrid::flatten=debug")
//!         .init();
//! }
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use treegrid_core::logging::{DebugTree, TreeDebug, TreeFormatOptions};
//!
//! struct Dir {
//!     name: &'static str,
//!     entries: Vec<Dir>,
//! }
//!
//! impl DebugTree for Dir {
//!     fn label(&self) -> String {
//!         self.name.to_string()
//!     }
//!
//!     fn debug_children(&self) -> Vec<&Self> {
//!         self.entries.iter().collect()
//!     }
//! }
//!
//! let root = Dir {
//!     name: "src",
//!     entries: vec![Dir { name: "lib.rs", entries: vec![] }],
//! };
//! let text = TreeDebug::with_options(TreeFormatOptions::ascii()).format(&root);
//! assert_eq!(text, "src\n`-- lib.rs\n");
//! ```

use std::fmt::{self, Write as FmtWrite};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "treegrid_core::signal";
    /// Accessor reads and writes.
    pub const ACCESSOR: &str = "treegrid::accessor";
    /// Object-graph walker.
    pub const WALKER: &str = "treegrid::walker";
    /// Column projection.
    pub const PROJECTION: &str = "treegrid::projection";
    /// Flat-list maintenance (expand, collapse, splice).
    pub const FLATTEN: &str = "treegrid::flatten";
    /// Performance spans created by [`PerfSpan`](super::PerfSpan).
    pub const PERF: &str = "treegrid::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Plain indentation, no connectors.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to append [`DebugTree::details`] after each label.
    pub show_details: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_details: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Labels only, ASCII connectors.
    pub fn ascii() -> Self {
        Self {
            style: TreeStyle::Ascii,
            show_details: false,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            style: TreeStyle::Compact,
            show_details: false,
            ..Default::default()
        }
    }

    /// Limit traversal depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// A node that can be rendered by [`TreeDebug`].
pub trait DebugTree {
    /// The text shown for this node.
    fn label(&self) -> String;

    /// Extra text shown in parentheses when details are enabled.
    fn details(&self) -> Option<String> {
        None
    }

    /// Child nodes, in display order.
    fn debug_children(&self) -> Vec<&Self>;
}

/// Debug utility for rendering trees as indented text.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a tree starting at `root`.
    pub fn format<T: DebugTree + ?Sized>(&self, root: &T) -> String {
        let mut output = String::new();
        let mut open = Vec::new();
        // Writing into a String cannot fail.
        let _ = self.format_into(root, &mut open, true, &mut output);
        output
    }

    /// Format several sibling roots, one after another.
    pub fn format_forest<'a, T, I>(&self, roots: I) -> String
    where
        T: DebugTree + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut output = String::new();
        for root in roots {
            let mut open = Vec::new();
            let _ = self.format_into(root, &mut open, true, &mut output);
        }
        output
    }

    /// `open[i]` records whether the ancestor at depth `i + 1` still has
    /// siblings below it, which decides whether a branch line is drawn.
    fn format_into<T: DebugTree + ?Sized>(
        &self,
        node: &T,
        open: &mut Vec<bool>,
        is_last: bool,
        output: &mut String,
    ) -> fmt::Result {
        let depth = open.len();
        if let Some(max) = self.options.max_depth {
            if depth > max {
                return Ok(());
            }
        }

        output.push_str(&self.build_prefix(open, is_last));
        output.push_str(&node.label());
        if self.options.show_details {
            if let Some(details) = node.details() {
                write!(output, " ({})", details)?;
            }
        }
        output.push('\n');

        let children = node.debug_children();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            open.push(i + 1 < count);
            self.format_into(child, open, i + 1 == count, output)?;
            open.pop();
        }
        Ok(())
    }

    fn build_prefix(&self, open: &[bool], is_last: bool) -> String {
        let Some((_, ancestors)) = open.split_last() else {
            return String::new();
        };

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "|--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "", ""),
        };

        let mut prefix = String::new();
        for &has_more in ancestors {
            if has_more && !branch.is_empty() {
                prefix.push_str(branch);
                prefix.push_str(&" ".repeat(self.options.indent_size + 1));
            } else {
                prefix.push_str(&" ".repeat(self.options.indent_size + 2));
            }
        }

        match self.options.style {
            TreeStyle::Compact => prefix.push_str(&" ".repeat(self.options.indent_size)),
            _ => {
                prefix.push_str(if is_last { corner } else { tee });
                prefix.push(' ');
            }
        }
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
