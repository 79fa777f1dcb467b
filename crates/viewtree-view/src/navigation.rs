#![forbid(unsafe_code)]

//! Caret movement.
//!
//! East and West walk leaves in order, asking each child for its next
//! position and moving to the neighbour when a child runs out. At the end
//! of a horizontal composite whose child reports right-to-left text, the
//! same child is retried once with the bias flipped before moving on.
//! A right-to-left child shares its right edge with the child after it;
//! only the latter reports that position, so the caret's x moves the same
//! way on every step.
//!
//! North and South move between the children of vertical composites
//! (rows of a flow, paragraphs of a box), keeping the caret's x.

use crate::id::ViewId;
use crate::node::ViewType;
use crate::tree::ViewTree;
use viewtree_core::{Axis, Bias, Direction, LayoutError, Rect, Result};
use viewtree_doc::Document;

/// Next caret position, with the bias to use there.
pub type VisualPosition = (usize, Bias);

impl<D: Document> ViewTree<D> {
    /// Next caret position from `pos` moving in `direction`.
    ///
    /// `pos == None` approaches from outside: East and South start at the
    /// first position, West and North at the last. `Ok(None)` means there
    /// is no position further in that direction. A `pos` more than one
    /// step outside the view's range fails with `OffsetOutOfRange`.
    ///
    /// East and West accept a missing `alloc`; North and South need it to
    /// keep the caret's x and fail with `NullAllocation` without one.
    pub fn next_visual_position_from(
        &mut self,
        view: ViewId,
        pos: Option<usize>,
        bias: Bias,
        alloc: Option<Rect>,
        direction: Direction,
    ) -> Result<Option<VisualPosition>> {
        if let Some(offset) = pos {
            let (start, end) = self.range(view)?;
            if offset > end || offset.saturating_add(1) < start {
                return Err(LayoutError::OffsetOutOfRange { offset, start, end });
            }
        }
        let next = self.step(view, pos, bias, alloc, direction)?;
        viewtree_core::trace!(
            view = view.get(),
            from = pos.map_or(-1, |p| p as i64),
            to = next.map_or(-1, |(p, _)| p as i64),
            "next visual position"
        );
        Ok(next)
    }

    /// [`next_visual_position_from`](Self::next_visual_position_from) with
    /// a raw direction code.
    pub fn next_visual_position_from_raw(
        &mut self,
        view: ViewId,
        pos: Option<usize>,
        bias: Bias,
        alloc: Option<Rect>,
        raw_direction: i32,
    ) -> Result<Option<VisualPosition>> {
        let direction = Direction::from_raw(raw_direction)?;
        self.next_visual_position_from(view, pos, bias, alloc, direction)
    }

    pub(crate) fn step(
        &mut self,
        view: ViewId,
        pos: Option<usize>,
        bias: Bias,
        alloc: Option<Rect>,
        direction: Direction,
    ) -> Result<Option<VisualPosition>> {
        match self.view_type(view)? {
            ViewType::Glyph => self.glyph_step(view, pos, bias, direction),
            ViewType::Pool => Ok(None),
            ViewType::Box | ViewType::Row | ViewType::Flow => {
                if direction.is_horizontal() {
                    self.step_east_west(view, pos, bias, alloc, direction)
                } else {
                    self.step_north_south(view, pos, bias, alloc, direction)
                }
            }
        }
    }

    /// Child holding `pos`, looking at the character before it for
    /// `Backward` bias.
    fn child_index_for(&self, view: ViewId, pos: usize, bias: Bias) -> Result<Option<usize>> {
        let probe = match bias {
            Bias::Backward if pos > 0 => pos - 1,
            _ => pos,
        };
        self.view_index_at_position(view, probe)
    }

    fn step_east_west(
        &mut self,
        view: ViewId,
        pos: Option<usize>,
        bias: Bias,
        alloc: Option<Rect>,
        direction: Direction,
    ) -> Result<Option<VisualPosition>> {
        let count = self.view_count(view)?;
        if count == 0 {
            return Ok(None);
        }
        let mut index = match pos {
            None if direction == Direction::West => count - 1,
            None => 0,
            Some(p) => self.child_index_for(view, p, bias)?.unwrap_or(0),
        };
        let mut from = pos;
        let mut bias = bias;
        let mut flipped = false;
        // Starting on the right edge of a right-to-left child is starting on
        // the left edge of the next one, so East skips that edge.
        let mut skip_entry = false;
        if direction == Direction::East
            && let Some(p) = pos
            && index + 1 < count
            && self.is_trailing_rtl_edge(self.child(view, index)?, p)?
        {
            index += 1;
            from = None;
            skip_entry = true;
        }

        loop {
            let child = self.child(view, index)?;
            let child_alloc = match alloc {
                Some(rect) => self.child_allocation(view, index, Some(rect))?,
                None => None,
            };
            if let Some(found) = self.step(child, from, bias, child_alloc, direction)? {
                // The right edge of a right-to-left child is reported by
                // the child after it.
                let shared = index + 1 < count && self.is_trailing_rtl_edge(child, found.0)?;
                if !shared && !skip_entry {
                    return Ok(Some(found));
                }
                skip_entry = false;
                (from, bias) = (Some(found.0), found.1);
                continue;
            }
            if !flipped
                && let Some(p) = from
                && self.flip_east_and_west_at_ends(view, p, bias)?
            {
                flipped = true;
                bias = bias.flipped();
                continue;
            }
            let next = match direction {
                Direction::West => index.checked_sub(1),
                _ => Some(index + 1).filter(|i| *i < count),
            };
            let Some(next) = next else {
                return Ok(None);
            };
            index = next;
            from = None;
            flipped = false;
        }
    }

    fn step_north_south(
        &mut self,
        view: ViewId,
        pos: Option<usize>,
        bias: Bias,
        alloc: Option<Rect>,
        direction: Direction,
    ) -> Result<Option<VisualPosition>> {
        let count = self.view_count(view)?;
        if count == 0 {
            return Ok(None);
        }

        if self.major_axis(view)? == Axis::X {
            // A single line: the child under the caret decides.
            let index = match pos {
                None if direction == Direction::North => count - 1,
                None => 0,
                Some(p) => self.child_index_for(view, p, bias)?.unwrap_or(0),
            };
            let child = self.child(view, index)?;
            let child_alloc = match alloc {
                Some(rect) => self.child_allocation(view, index, Some(rect))?,
                None => None,
            };
            return self.step(child, pos, bias, child_alloc, direction);
        }

        let alloc = alloc.ok_or(LayoutError::NullAllocation {
            operation: "next_visual_position_from",
        })?;
        if !self.is_allocation_valid(view)? {
            self.layout(view, alloc.width, alloc.height)?;
        }
        let Some(p) = pos else {
            let (start, end) = self.range(view)?;
            let offset = match direction {
                Direction::North => end.saturating_sub(1).max(start),
                _ => start,
            };
            return Ok(Some((offset, Bias::Forward)));
        };

        let index = self.child_index_for(view, p, bias)?.unwrap_or(0);
        let child = self.child(view, index)?;
        let child_alloc = self.child_allocation(view, index, Some(alloc))?;
        if let Some(found) = self.step(child, pos, bias, child_alloc, direction)? {
            return Ok(Some(found));
        }

        let neighbour = match direction {
            Direction::North => index.checked_sub(1),
            _ => Some(index + 1).filter(|i| *i < count),
        };
        let Some(neighbour) = neighbour else {
            return Ok(None);
        };
        let caret = self.model_to_view(view, p, Some(alloc), Some(bias))?;
        let target = self
            .child_allocation(view, neighbour, Some(alloc))?
            .ok_or(LayoutError::NullAllocation {
                operation: "next_visual_position_from",
            })?;
        let y = match direction {
            Direction::North => target.bottom().saturating_sub(1),
            _ => target.y,
        };
        let child = self.child(view, neighbour)?;
        self.view_to_model(child, caret.x, y, Some(target)).map(Some)
    }

    /// Whether East and West swap at the edge of the child holding `pos`.
    ///
    /// Only horizontal composites answer; vertical ones always say no.
    pub fn flip_east_and_west_at_ends(&self, view: ViewId, pos: usize, bias: Bias) -> Result<bool> {
        match self.view_type(view)? {
            ViewType::Glyph => self.is_rtl(view),
            ViewType::Pool => Ok(false),
            ViewType::Box | ViewType::Row | ViewType::Flow => {
                if self.major_axis(view)? != Axis::X {
                    return Ok(false);
                }
                let Some(index) = self.child_index_for(view, pos, bias)? else {
                    return Ok(false);
                };
                let child = self.child(view, index)?;
                self.flip_east_and_west_at_ends(child, pos, bias)
            }
        }
    }
}
