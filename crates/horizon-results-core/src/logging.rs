//! Logging and debugging facilities for Horizon Results.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Debug visualization of sectioned content
//! - Performance tracing hooks for profiling reconciliation
//!
//! # Tracing Integration
//!
//! Horizon Results uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! # Debug Visualization
//!
//! Use [`ContentTreeDebug`] to render sections and their objects:
//!
//! ```
//! use horizon_results_core::logging::ContentTreeDebug;
//!
//! let content = vec![
//!     ("Fruit".to_string(), vec!["apple".to_string(), "pear".to_string()]),
//!     ("Veg".to_string(), vec!["leek".to_string()]),
//! ];
//! let output = ContentTreeDebug::new().format(&content);
//! assert!(output.contains("apple"));
//! ```

use std::fmt::Write as FmtWrite;

/// Span names used throughout Horizon Results for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Full reconciliation of one change batch.
    pub const RECONCILE: &str = "horizon_results::reconcile";
    /// Diff computation for a single pair of sequences.
    pub const DIFF: &str = "horizon_results::diff";
    /// Delivery of change callbacks.
    pub const DISPATCH: &str = "horizon_results::dispatch";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_results_core::signal";
    /// Results controller target.
    pub const CONTROLLER: &str = "horizon_results::controller";
    /// Diff engine target.
    pub const DIFF: &str = "horizon_results::diff";
    /// Section bookkeeping target.
    pub const SECTION: &str = "horizon_results::section";
    /// Timing spans opened by [`PerfSpan`](super::PerfSpan).
    pub const PERF: &str = "horizon_results::perf";
}

/// Style options for content tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line-per-section representation.
    Compact,
}

/// Configuration for content tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to prefix objects with their item index.
    pub show_indices: bool,
    /// Whether to show the object count next to each section.
    pub show_counts: bool,
    /// Maximum number of objects listed per section (None for unlimited).
    pub max_objects: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_indices: true,
            show_counts: true,
            max_objects: None,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_indices: false,
            show_counts: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing sectioned content.
///
/// Sections and objects are passed in as pre-rendered labels so that the
/// visualizer does not need to know the element types.
#[derive(Debug, Clone, Default)]
pub struct ContentTreeDebug {
    options: TreeFormatOptions,
}

impl ContentTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format sections (label, object labels) into a tree.
    pub fn format(&self, sections: &[(String, Vec<String>)]) -> String {
        let mut output = String::new();
        let total: usize = sections.iter().map(|(_, objects)| objects.len()).sum();
        writeln!(
            output,
            "Content ({} sections, {} objects):",
            sections.len(),
            total
        )
        .expect("write to String");

        if sections.is_empty() {
            writeln!(output, "  (empty)").expect("write to String");
            return output;
        }

        for (section, (label, objects)) in sections.iter().enumerate() {
            if self.options.show_counts {
                writeln!(output, "[{section}] {label} ({})", objects.len())
                    .expect("write to String");
            } else {
                writeln!(output, "[{section}] {label}").expect("write to String");
            }

            if self.options.style == TreeStyle::Compact {
                let shown = self.visible(objects);
                writeln!(output, "  - {}", shown.join(", ")).expect("write to String");
                continue;
            }

            let shown = self.visible(objects);
            let truncated = shown.len() < objects.len();
            for (item, object) in shown.iter().enumerate() {
                let is_last = item + 1 == shown.len() && !truncated;
                output.push_str(self.connector(is_last));
                if self.options.show_indices {
                    write!(output, "{item}: ").expect("write to String");
                }
                output.push_str(object);
                output.push('\n');
            }
            if truncated {
                output.push_str(self.connector(true));
                writeln!(output, "... {} more", objects.len() - shown.len())
                    .expect("write to String");
            }
        }

        output
    }

    fn visible<'a>(&self, objects: &'a [String]) -> Vec<&'a str> {
        let limit = self.options.max_objects.unwrap_or(usize::MAX);
        objects.iter().take(limit).map(String::as_str).collect()
    }

    fn connector(&self, is_last: bool) -> &'static str {
        match (self.options.style, is_last) {
            (TreeStyle::Ascii, false) => "  +-- ",
            (TreeStyle::Ascii, true) => "  `-- ",
            (TreeStyle::Unicode, false) => "  \u{251c}\u{2500}\u{2500} ",
            (TreeStyle::Unicode, true) => "  \u{2514}\u{2500}\u{2500} ",
            (TreeStyle::Compact, _) => "  - ",
        }
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
