#![forbid(unsafe_code)]

//! Mapping between document offsets and positions.
//!
//! `model_to_view` turns an offset into a zero-width caret rectangle;
//! `view_to_model` turns a point into the nearest offset. Both lay out the
//! view first when its allocation is stale.

use crate::id::ViewId;
use crate::node::ViewType;
use crate::tree::ViewTree;
use viewtree_core::{Axis, Bias, Direction, LayoutError, Rect, Result};
use viewtree_doc::Document;

/// Point-versus-rectangle predicates for walking children along an axis.
pub trait HitTest {
    /// The point lies before `rect` along the walk.
    fn is_before(&self, x: i32, y: i32, rect: &Rect) -> bool;

    /// The point lies at or past the trailing edge of `rect`.
    fn is_after(&self, x: i32, y: i32, rect: &Rect) -> bool;
}

/// Compares along one axis only; the other coordinate is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisHitTest(pub Axis);

impl HitTest for AxisHitTest {
    fn is_before(&self, x: i32, y: i32, rect: &Rect) -> bool {
        match self.0 {
            Axis::X => x < rect.x,
            Axis::Y => y < rect.y,
        }
    }

    fn is_after(&self, x: i32, y: i32, rect: &Rect) -> bool {
        match self.0 {
            Axis::X => x >= rect.right(),
            Axis::Y => y >= rect.bottom(),
        }
    }
}

impl<D: Document> ViewTree<D> {
    fn ensure_layout(&mut self, view: ViewId, alloc: Rect) -> Result<()> {
        if !self.is_allocation_valid(view)? {
            self.layout(view, alloc.width, alloc.height)?;
        }
        Ok(())
    }

    /// Child of `view` under `(x, y)`, with its allocation.
    ///
    /// The walk starts at the previous hit and moves one way until the
    /// point is inside a child or the walk runs off either end, so points
    /// outside `alloc` resolve to the nearest edge child. `None` only when
    /// `view` has no children.
    pub fn view_at_point(
        &mut self,
        view: ViewId,
        x: i32,
        y: i32,
        alloc: Rect,
    ) -> Result<Option<(usize, Rect)>> {
        let count = self.view_count(view)?;
        if count == 0 {
            return Ok(None);
        }
        self.ensure_layout(view, alloc)?;
        let hit = AxisHitTest(self.major_axis(view)?);
        let mut index = self
            .node(view)?
            .box_state()
            .map_or(0, |state| state.last_hit)
            .min(count - 1);
        // -1 walking back, 1 walking forward, 0 not yet moved.
        let mut step = 0i8;
        let rect = loop {
            let rect = self
                .child_allocation(view, index, Some(alloc))?
                .ok_or(LayoutError::NullAllocation {
                    operation: "view_at_point",
                })?;
            if hit.is_before(x, y, &rect) {
                if index == 0 || step > 0 {
                    break rect;
                }
                step = -1;
                index -= 1;
            } else if hit.is_after(x, y, &rect) {
                if index + 1 == count || step < 0 {
                    break rect;
                }
                step = 1;
                index += 1;
            } else {
                break rect;
            }
        };
        if let Some(state) = self.node_mut(view)?.box_state_mut() {
            state.last_hit = index;
        }
        Ok(Some((index, rect)))
    }

    /// Caret rectangle for `pos` inside `alloc`.
    ///
    /// With `Backward` bias the character before `pos` decides which child
    /// answers; `None` bias behaves like `Forward`. Fails with
    /// `NullAllocation` when `alloc` is absent and `BadLocation` when no
    /// child represents `pos`.
    pub fn model_to_view(
        &mut self,
        view: ViewId,
        pos: usize,
        alloc: Option<Rect>,
        bias: Option<Bias>,
    ) -> Result<Rect> {
        let alloc = alloc.ok_or(LayoutError::NullAllocation {
            operation: "model_to_view",
        })?;
        let bias = bias.unwrap_or_default();
        match self.view_type(view)? {
            ViewType::Glyph => return self.glyph_model_to_view(view, pos, alloc),
            ViewType::Pool => return Err(LayoutError::BadLocation { offset: pos }),
            ViewType::Box | ViewType::Row | ViewType::Flow => {}
        }
        self.ensure_layout(view, alloc)?;

        let start = self.start_offset(view)?;
        let probe = match bias {
            Bias::Forward => pos,
            Bias::Backward => pos.saturating_sub(1),
        };
        if bias == Bias::Backward && (pos == 0 || probe < start) {
            return Err(LayoutError::BadLocation { offset: pos });
        }
        let Some(mut index) = self.view_index_at_position(view, probe)? else {
            return Err(LayoutError::BadLocation { offset: pos });
        };
        let count = self.view_count(view)?;
        let child = self.child(view, index)?;
        let (child_start, child_end) = self.range(child)?;
        if probe < child_start || probe >= child_end {
            return Err(LayoutError::BadLocation { offset: pos });
        }

        loop {
            let child = self.child(view, index)?;
            let child_alloc = self.child_allocation(view, index, Some(alloc))?;
            match self.model_to_view(child, pos, child_alloc, Some(bias)) {
                Err(LayoutError::BadLocation { .. })
                    if self.end_offset(child)? == pos && index + 1 < count =>
                {
                    index += 1;
                }
                result => return result,
            }
        }
    }

    /// Offset nearest to `(x, y)` inside `alloc`, with the bias that
    /// places the caret on the side of the point.
    ///
    /// Points before the first child snap to the first visual position,
    /// points after the last child to the last one.
    pub fn view_to_model(
        &mut self,
        view: ViewId,
        x: i32,
        y: i32,
        alloc: Option<Rect>,
    ) -> Result<(usize, Bias)> {
        let alloc = alloc.ok_or(LayoutError::NullAllocation {
            operation: "view_to_model",
        })?;
        let node = self.node(view)?;
        let insets = node.insets;
        match node.view_type() {
            ViewType::Glyph => return self.glyph_view_to_model(view, x, alloc),
            ViewType::Pool => {
                return Err(LayoutError::BadLocation {
                    offset: self.start_offset(view)?,
                });
            }
            ViewType::Box | ViewType::Row | ViewType::Flow => {}
        }
        self.ensure_layout(view, alloc)?;
        let (start, end) = self.range(view)?;
        if self.view_count(view)? == 0 {
            return Ok((start, Bias::Forward));
        }

        let inside = alloc.inner(insets);
        let hit = AxisHitTest(self.major_axis(view)?);
        if hit.is_before(x, y, &inside) {
            let first = self.step(view, None, Bias::Forward, Some(alloc), Direction::East)?;
            return Ok(first.unwrap_or((start, Bias::Forward)));
        }
        if hit.is_after(x, y, &inside) {
            let last = self.step(view, None, Bias::Forward, Some(alloc), Direction::West)?;
            return Ok(last.unwrap_or((end.saturating_sub(1).max(start), Bias::Forward)));
        }
        match self.view_at_point(view, x, y, alloc)? {
            Some((index, rect)) => {
                let child = self.child(view, index)?;
                self.view_to_model(child, x, y, Some(rect))
            }
            None => Ok((start, Bias::Forward)),
        }
    }
}
