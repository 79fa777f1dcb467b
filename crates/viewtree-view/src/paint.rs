#![forbid(unsafe_code)]

//! Painting through a sink.
//!
//! The engine does not draw. Glyphs emit [`PaintOp`]s into a [`PaintSink`];
//! composites recurse into the children whose allocation meets the sink's
//! clip. Layout pools are never painted.

use crate::id::ViewId;
use crate::node::ViewType;
use crate::tree::ViewTree;
use viewtree_core::{LayoutError, Rect, Result};
use viewtree_doc::Document;

/// One drawing request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaintOp {
    /// Text of `[start, end)` drawn in `rect`.
    Text {
        rect: Rect,
        start: usize,
        end: usize,
        text: String,
    },
}

/// Receives paint operations.
pub trait PaintSink {
    /// Area that needs painting; children outside it are skipped.
    fn clip(&self) -> Rect;

    fn paint(&mut self, op: PaintOp);
}

/// A [`PaintSink`] that records operations in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayList {
    clip: Rect,
    ops: Vec<PaintOp>,
}

impl DisplayList {
    #[must_use]
    pub fn new(clip: Rect) -> Self {
        Self {
            clip,
            ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<PaintOp> {
        self.ops
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Painted strings, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().map(|op| match op {
            PaintOp::Text { text, .. } => text.as_str(),
        })
    }
}

impl PaintSink for DisplayList {
    fn clip(&self) -> Rect {
        self.clip
    }

    fn paint(&mut self, op: PaintOp) {
        self.ops.push(op);
    }
}

impl<D: Document> ViewTree<D> {
    /// Paint `view` into `sink` at `alloc`, laying it out first if stale.
    pub fn paint(&mut self, view: ViewId, sink: &mut dyn PaintSink, alloc: Rect) -> Result<()> {
        match self.view_type(view)? {
            ViewType::Pool => Ok(()),
            ViewType::Glyph => {
                let (start, end, text) = self.glyph_body(view)?;
                sink.paint(PaintOp::Text {
                    rect: alloc,
                    start,
                    end,
                    text,
                });
                Ok(())
            }
            ViewType::Box | ViewType::Row | ViewType::Flow => {
                if !self.is_allocation_valid(view)? {
                    self.layout(view, alloc.width, alloc.height)?;
                }
                let clip = sink.clip();
                let children = self.children(view)?.to_vec();
                for (index, child) in children.into_iter().enumerate() {
                    let rect = self
                        .child_allocation(view, index, Some(alloc))?
                        .ok_or(LayoutError::NullAllocation { operation: "paint" })?;
                    if rect.intersects(&clip) {
                        self.paint(child, sink, rect)?;
                    }
                }
                Ok(())
            }
        }
    }
}
