#![forbid(unsafe_code)]

//! Text measurement collaborator.

use unicode_width::UnicodeWidthChar;
use viewtree_core::LayoutConfig;
use viewtree_core::config::DEFAULT_TAB_WIDTH;
use viewtree_doc::Attributes;

/// Measures runs of text for glyph views.
///
/// The engine never shapes text itself; everything it knows about widths
/// and line heights comes through this trait.
pub trait TextMetrics {
    /// Horizontal advance of `text`.
    fn advance(&self, text: &str, attributes: Option<&Attributes>) -> i32;

    /// Height of one line.
    fn line_height(&self, attributes: Option<&Attributes>) -> i32;

    /// Distance from the top of the line to the baseline.
    fn ascent(&self, attributes: Option<&Attributes>) -> i32;
}

/// Fixed-cell metrics: every column of [`unicode-width`] is `cell_width`
/// pixels wide, tabs advance to the next multiple of `tab_width_cells`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMetrics {
    pub cell_width: i32,
    pub line_height: i32,
    pub ascent: i32,
    pub tab_width_cells: usize,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8,
            line_height: 16,
            ascent: 12,
            tab_width_cells: DEFAULT_TAB_WIDTH,
        }
    }
}

impl MonospaceMetrics {
    /// Metrics with the given cell size and the default tab width.
    #[must_use]
    pub const fn new(cell_width: i32, line_height: i32, ascent: i32) -> Self {
        Self {
            cell_width,
            line_height,
            ascent,
            tab_width_cells: DEFAULT_TAB_WIDTH,
        }
    }

    /// Default cell size with the tab width from `config`.
    #[must_use]
    pub const fn from_config(config: &LayoutConfig) -> Self {
        let metrics = Self {
            cell_width: 8,
            line_height: 16,
            ascent: 12,
            tab_width_cells: DEFAULT_TAB_WIDTH,
        };
        metrics.with_tab_width(config.tab_width_cells)
    }

    #[must_use]
    pub const fn with_tab_width(mut self, cells: usize) -> Self {
        if cells > 0 {
            self.tab_width_cells = cells;
        }
        self
    }

    /// Width of `text` in cells.
    #[must_use]
    pub fn columns(&self, text: &str) -> usize {
        text.chars().fold(0usize, |col, ch| match ch {
            '\t' => (col / self.tab_width_cells + 1) * self.tab_width_cells,
            '\n' | '\r' => col,
            _ => col + ch.width().unwrap_or(0),
        })
    }
}

impl TextMetrics for MonospaceMetrics {
    fn advance(&self, text: &str, _attributes: Option<&Attributes>) -> i32 {
        let columns = i32::try_from(self.columns(text)).unwrap_or(i32::MAX);
        columns.saturating_mul(self.cell_width)
    }

    fn line_height(&self, _attributes: Option<&Attributes>) -> i32 {
        self.line_height
    }

    fn ascent(&self, _attributes: Option<&Attributes>) -> i32 {
        self.ascent
    }
}
