#![forbid(unsafe_code)]

//! Flow views: rows rebuilt on demand from a layout pool.
//!
//! A flow owns a pool holding one view per child element. The pool is
//! never painted. When the flow's width changes, or something invalidates
//! its flow-axis allocation, the [`FlowStrategy`] discards every row and
//! fills fresh ones left to right, breaking pool views that straddle the
//! right edge.
//!
//! Strategies see the tree only through [`FlowHost`], so custom strategies
//! can be written without access to the arena.

use crate::factory::ViewFactory;
use crate::id::ViewId;
use crate::node::{AxisSet, BoxState, LayoutNode, ViewKind};
use crate::tree::ViewTree;
use viewtree_core::{Axis, Rect, Result};
use viewtree_doc::{Document, DocumentEvent};
use viewtree_layout::INFINITE;

/// Operations a [`FlowStrategy`] may perform on the tree.
pub trait FlowHost {
    /// `[start, end)` covered by the flow.
    fn flow_range(&self, flow: ViewId) -> Result<(usize, usize)>;

    /// Destroy every row; pool children return to the pool.
    fn remove_rows(&mut self, flow: ViewId) -> Result<()>;

    /// Append an empty row and return it.
    fn create_row(&mut self, flow: ViewId) -> Result<ViewId>;

    fn row_count(&self, flow: ViewId) -> Result<usize>;

    /// Span available for the contents of row `row`, [`INFINITE`] before
    /// the flow has been given a width.
    fn flow_span(&self, flow: ViewId, row: usize) -> Result<i32>;

    /// Leading edge of the contents of row `row`.
    fn flow_start(&self, flow: ViewId, row: usize) -> Result<i32>;

    /// The pool view starting at `offset`, or a fragment of the one that
    /// covers it. `None` when the pool does not cover `offset`.
    fn view_at_offset(&mut self, flow: ViewId, offset: usize) -> Result<Option<ViewId>>;

    fn preferred_span(&mut self, view: ViewId, axis: Axis) -> Result<i32>;

    /// Break `view` at `offset` so the piece fits in `span`. With `force`,
    /// at least one grapheme is returned even if it overflows. `None` when
    /// nothing usable fits.
    fn break_at(
        &mut self,
        view: ViewId,
        offset: usize,
        span: i32,
        force: bool,
    ) -> Result<Option<ViewId>>;

    fn view_end(&self, view: ViewId) -> Result<usize>;

    /// Append `views` to `row`.
    fn place(&mut self, row: ViewId, views: &[ViewId]) -> Result<()>;

    /// Drop a view that was created but never placed. Pool views are left
    /// alone.
    fn discard(&mut self, view: ViewId) -> Result<()>;

    fn invalidate_layout(&mut self, view: ViewId, axis: Axis) -> Result<()>;

    fn repaint_rect(&mut self, rect: Rect);

    fn notify_preference_changed(&mut self, view: ViewId, width: bool, height: bool)
    -> Result<()>;
}

/// Policy that turns a flow's pool into rows.
pub trait FlowStrategy {
    /// Rebuild the rows of `flow` for its current width.
    fn layout(&self, host: &mut dyn FlowHost, flow: ViewId) -> Result<()>;

    /// React to a document change already applied to the pool. `event` is
    /// `None` for the initial load.
    ///
    /// The default marks the rows stale, then repaints `alloc` when given
    /// and otherwise reports a preference change for both axes.
    fn update(
        &self,
        host: &mut dyn FlowHost,
        flow: ViewId,
        event: Option<&DocumentEvent>,
        alloc: Option<Rect>,
    ) -> Result<()> {
        if event.is_some() {
            host.invalidate_layout(flow, Axis::X)?;
        }
        match alloc {
            Some(rect) => {
                host.repaint_rect(rect);
                Ok(())
            }
            None => host.notify_preference_changed(flow, true, true),
        }
    }
}

/// Greedy line filling: as many whole views as fit, then one broken piece.
///
/// A view that cannot be broken and does not fit moves to the next row,
/// unless the row is empty, in which case it is placed alone and overflows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFlowStrategy;

impl TextFlowStrategy {
    /// Fill `row` starting at `offset` with `first` as its first view.
    /// Returns the offset after the last placed view.
    fn layout_row(
        &self,
        host: &mut dyn FlowHost,
        flow: ViewId,
        row: ViewId,
        row_index: usize,
        offset: usize,
        first: ViewId,
    ) -> Result<usize> {
        let (_, end) = host.flow_range(flow)?;
        let mut remaining = host.flow_span(flow, row_index)?;
        let mut placed = Vec::new();
        let mut pos = offset;
        let mut next = Some(first);

        loop {
            let view = match next.take() {
                Some(view) => view,
                None if pos < end => match host.view_at_offset(flow, pos)? {
                    Some(view) => view,
                    None => break,
                },
                None => break,
            };

            let span = host.preferred_span(view, Axis::X)?;
            if span <= remaining {
                placed.push(view);
                remaining = remaining.saturating_sub(span);
                pos = host.view_end(view)?;
                continue;
            }

            let force = placed.is_empty();
            match host.break_at(view, pos, remaining, force)? {
                Some(piece) => {
                    if piece != view {
                        host.discard(view)?;
                    }
                    pos = host.view_end(piece)?;
                    placed.push(piece);
                }
                None if force => {
                    pos = host.view_end(view)?;
                    placed.push(view);
                }
                None => host.discard(view)?,
            }
            break;
        }

        host.place(row, &placed)?;
        Ok(pos)
    }
}

impl FlowStrategy for TextFlowStrategy {
    fn layout(&self, host: &mut dyn FlowHost, flow: ViewId) -> Result<()> {
        let (start, end) = host.flow_range(flow)?;
        host.remove_rows(flow)?;

        let mut pos = start;
        while pos < end {
            let Some(first) = host.view_at_offset(flow, pos)? else {
                viewtree_core::warn!(flow = flow.get(), offset = pos, "pool does not cover flow range");
                break;
            };
            let row = host.create_row(flow)?;
            let index = host.row_count(flow)?.saturating_sub(1);
            let next = self.layout_row(host, flow, row, index, pos, first)?;
            if next <= pos {
                viewtree_core::warn!(flow = flow.get(), offset = pos, "row made no progress");
                break;
            }
            pos = next;
        }
        Ok(())
    }
}

impl<D: Document> ViewTree<D> {
    /// Create the pool if needed, load it, and let the strategy react.
    pub(crate) fn load_flow(&mut self, flow: ViewId, factory: &dyn ViewFactory) -> Result<()> {
        let node = self.node(flow)?;
        let element = node.element;
        let pool = match node.flow_state().and_then(|f| f.pool) {
            Some(pool) => pool,
            None => {
                let mut pool = LayoutNode::new(element, ViewKind::Pool);
                pool.parent = Some(flow);
                pool.owner = Some(flow);
                let pool = self.insert_node(pool);
                if let Some(state) = self.node_mut(flow)?.flow_state_mut() {
                    state.pool = Some(pool);
                }
                pool
            }
        };
        self.load_children(pool, factory)?;
        self.with_strategy(flow, |strategy, tree| strategy.update(tree, flow, None, None))
    }

    /// Run `f` with the flow's strategy temporarily taken out of the node.
    pub(crate) fn with_strategy<R>(
        &mut self,
        flow: ViewId,
        f: impl FnOnce(&dyn FlowStrategy, &mut Self) -> Result<R>,
    ) -> Result<R> {
        let taken = self
            .node_mut(flow)?
            .flow_state_mut()
            .and_then(|state| state.strategy.take());
        let result = match &taken {
            Some(strategy) => f(strategy.as_ref(), self),
            None => f(&TextFlowStrategy, self),
        };
        if let Some(state) = self
            .nodes
            .get_mut(&flow)
            .and_then(LayoutNode::flow_state_mut)
            && state.strategy.is_none()
        {
            state.strategy = taken;
        }
        result
    }

    /// Lay out a flow inside `width` by `height` (insets already removed).
    pub(crate) fn layout_flow(&mut self, flow: ViewId, width: i32, height: i32) -> Result<()> {
        let force = self.config.force_full_layout;
        let state = self
            .node_mut(flow)?
            .flow_state_mut()
            .ok_or(viewtree_core::LayoutError::UnknownView { id: flow.get() })?;
        if state.layout_span != width {
            state.boxed.allocation_valid.remove(AxisSet::X);
            state.boxed.allocation_valid.remove(AxisSet::Y);
            state.layout_span = width;
        }
        let rebuild = force || !state.boxed.allocation_valid.contains(AxisSet::X);

        if rebuild {
            let before = self.requirements(flow, Axis::Y)?.preferred;
            self.with_strategy(flow, |strategy, tree| strategy.layout(tree, flow))?;
            self.stats.flow_rebuilds += 1;
            // Rows are placed again whatever the strategy did to them.
            self.layout_changed(flow, Axis::X)?;
            self.layout_changed(flow, Axis::Y)?;
            let after = self.requirements(flow, Axis::Y)?.preferred;
            viewtree_core::debug!(
                flow = flow.get(),
                width,
                rows = self.view_count(flow)?,
                "flow rebuilt"
            );
            if before != after
                && let Some(parent) = self.node(flow)?.parent
            {
                self.preference_changed(parent, Some(flow), false, true)?;
            }
        }
        self.layout_box(flow, width, height)
    }

    fn row_insets(&self, flow: ViewId, row: usize) -> Result<viewtree_core::Insets> {
        let id = self.child(flow, row)?;
        self.insets(id)
    }
}

impl<D: Document> FlowHost for ViewTree<D> {
    fn flow_range(&self, flow: ViewId) -> Result<(usize, usize)> {
        let element = self.node(flow)?.element;
        Ok((self.doc.start_offset(element), self.doc.end_offset(element)))
    }

    fn remove_rows(&mut self, flow: ViewId) -> Result<()> {
        let rows = self.view_count(flow)?;
        self.replace_with(flow, 0, rows, &[], None)
    }

    fn create_row(&mut self, flow: ViewId) -> Result<ViewId> {
        let node = self.node(flow)?;
        let element = node.element;
        let first = node.children.is_empty();
        let indent = node.flow_state().map_or(0, |f| f.first_line_indent);
        let mut insets = self.config.row_insets;
        if first {
            insets.left = insets.left.saturating_add(indent);
        }
        let mut row = LayoutNode::new(element, ViewKind::Row(BoxState::new(Axis::X)));
        row.insets = insets;
        let row = self.insert_node(row);
        let len = self.view_count(flow)?;
        self.replace_with(flow, len, 0, &[row], None)?;
        Ok(row)
    }

    fn row_count(&self, flow: ViewId) -> Result<usize> {
        self.view_count(flow)
    }

    fn flow_span(&self, flow: ViewId, row: usize) -> Result<i32> {
        let span = self
            .node(flow)?
            .flow_state()
            .map_or(INFINITE, |f| f.layout_span);
        if span == INFINITE {
            return Ok(INFINITE);
        }
        let insets = self.row_insets(flow, row)?;
        Ok(span.saturating_sub(insets.horizontal_sum()).max(0))
    }

    fn flow_start(&self, flow: ViewId, row: usize) -> Result<i32> {
        Ok(self.row_insets(flow, row)?.left)
    }

    fn view_at_offset(&mut self, flow: ViewId, offset: usize) -> Result<Option<ViewId>> {
        let Some(pool) = self.pool(flow)? else {
            return Ok(None);
        };
        let Some(index) = self.view_index_at_position(pool, offset)? else {
            return Ok(None);
        };
        let view = self.child(pool, index)?;
        let (start, end) = self.range(view)?;
        if offset == start {
            Ok(Some(view))
        } else if start < offset && offset < end && self.node(view)?.kind.is_glyph() {
            self.create_fragment(view, offset, end).map(Some)
        } else {
            Ok(None)
        }
    }

    fn preferred_span(&mut self, view: ViewId, axis: Axis) -> Result<i32> {
        Ok(self.requirements(view, axis)?.preferred)
    }

    fn break_at(
        &mut self,
        view: ViewId,
        offset: usize,
        span: i32,
        force: bool,
    ) -> Result<Option<ViewId>> {
        Self::break_view(self, view, offset, span, force)
    }

    fn view_end(&self, view: ViewId) -> Result<usize> {
        Self::end_offset(self, view)
    }

    fn place(&mut self, row: ViewId, views: &[ViewId]) -> Result<()> {
        let len = self.view_count(row)?;
        self.replace_with(row, len, 0, views, None)
    }

    fn discard(&mut self, view: ViewId) -> Result<()> {
        if self.node(view)?.owner.is_none() {
            self.destroy(view);
        }
        Ok(())
    }

    fn invalidate_layout(&mut self, view: ViewId, axis: Axis) -> Result<()> {
        self.layout_changed(view, axis)
    }

    fn repaint_rect(&mut self, rect: Rect) {
        self.repaint(rect);
    }

    fn notify_preference_changed(
        &mut self,
        view: ViewId,
        width: bool,
        height: bool,
    ) -> Result<()> {
        self.preference_changed(view, None, width, height)
    }
}
