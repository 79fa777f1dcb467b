#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! # Env Var Contract
//!
//! - `VIEWTREE_FULL_LAYOUT=1` - bypass the idempotent-layout short-circuit
//! - `VIEWTREE_FIRST_LINE_INDENT=<px>` - leading flow inset for row 0 of new flow views
//! - `VIEWTREE_TAB_WIDTH=<cells>` - tab advance used by the bundled monospace metrics
//!
//! # Invariants
//!
//! - Unset or unparsable values fall back to the defaults (fail-open).
//! - Negative indents and a zero tab width are rejected the same way.

use crate::geometry::Insets;
use std::env;

/// Env var forcing every `layout` call to recompute.
pub const ENV_FULL_LAYOUT: &str = "VIEWTREE_FULL_LAYOUT";
/// Env var for the default first-line indent of flow views.
pub const ENV_FIRST_LINE_INDENT: &str = "VIEWTREE_FIRST_LINE_INDENT";
/// Env var for the tab width (in cells) of the monospace metrics.
pub const ENV_TAB_WIDTH: &str = "VIEWTREE_TAB_WIDTH";

/// Default tab width in cells.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Configuration shared by a view tree and the views it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Recompute on every `layout` call, even when spans are unchanged.
    pub force_full_layout: bool,
    /// Leading inset along the flow axis applied to the first row of a flow.
    pub first_line_indent: i32,
    /// Insets given to every row a flow view creates.
    pub row_insets: Insets,
    /// Tab advance in cells for the monospace metrics.
    pub tab_width_cells: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            force_full_layout: false,
            first_line_indent: 0,
            row_insets: Insets::ZERO,
            tab_width_cells: DEFAULT_TAB_WIDTH,
        }
    }
}

impl LayoutConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map-backed closure.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let force_full_layout = lookup(ENV_FULL_LAYOUT)
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(defaults.force_full_layout);

        let first_line_indent = lookup(ENV_FIRST_LINE_INDENT)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(defaults.first_line_indent);

        let tab_width_cells = lookup(ENV_TAB_WIDTH)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.tab_width_cells);

        Self {
            force_full_layout,
            first_line_indent,
            row_insets: defaults.row_insets,
            tab_width_cells,
        }
    }

    /// Set the force-full-layout flag.
    #[must_use]
    pub fn force_full_layout(mut self, force: bool) -> Self {
        self.force_full_layout = force;
        self
    }

    /// Set the first-line indent.
    #[must_use]
    pub fn first_line_indent(mut self, indent: i32) -> Self {
        self.first_line_indent = indent.max(0);
        self
    }

    /// Set the row insets.
    #[must_use]
    pub fn row_insets(mut self, insets: Insets) -> Self {
        self.row_insets = insets;
        self
    }

    /// Set the tab width in cells (zero is ignored).
    #[must_use]
    pub fn tab_width_cells(mut self, cells: usize) -> Self {
        if cells > 0 {
            self.tab_width_cells = cells;
        }
        self
    }
}
