#![forbid(unsafe_code)]

//! Size negotiation and box layout.
//!
//! # Caching
//!
//! Box-like views (boxes, rows, flows) cache one [`SizeRequirements`] per
//! axis and one [`Placement`] per axis. `preference_changed` clears the
//! request and allocation bits for the named axes and walks up to the root.
//! `layout` recomputes only axes whose bit is clear or whose target span
//! changed; when nothing is stale it returns without visiting children.
//!
//! Requirements reported to parents include the view's own insets;
//! placements are computed for the inside span.

use crate::id::ViewId;
use crate::node::{AxisSet, ViewType, slot};
use crate::tree::ViewTree;
use viewtree_core::{Axis, LayoutError, Rect, Result};
use viewtree_doc::Document;
use viewtree_layout::{
    INFINITE, Placement, SizeRequirements, aligned_requirements, aligned_requirements_into,
    baseline_requirements_into, calculate_aligned_positions, calculate_baseline_positions,
    tiled_positions, tiled_requirements_into,
};

/// Upper bound on `layout` passes while children keep changing their
/// preferences during their own layout.
const MAX_LAYOUT_PASSES: usize = 8;

fn add_insets(req: SizeRequirements, inset: i32) -> SizeRequirements {
    let grow = |span: i32| {
        if span == INFINITE {
            INFINITE
        } else {
            span.saturating_add(inset)
        }
    };
    SizeRequirements::new(
        grow(req.minimum),
        grow(req.preferred),
        grow(req.maximum),
        req.alignment,
    )
}

impl<D: Document> ViewTree<D> {
    // ── Requirements ────────────────────────────────────────────────────

    /// Requirements of `view` along `axis`, insets included.
    pub fn requirements(&mut self, view: ViewId, axis: Axis) -> Result<SizeRequirements> {
        let node = self.node(view)?;
        let inset = node.insets.along(axis);
        let raw = match node.view_type() {
            ViewType::Glyph => self.glyph_requirements(view, axis)?,
            ViewType::Pool => self.pool_requirements(view, axis)?,
            ViewType::Box | ViewType::Row | ViewType::Flow => {
                self.cached_requirements(view, axis)?
            }
        };
        Ok(add_insets(raw, inset))
    }

    /// [`requirements`](Self::requirements) for a raw axis code.
    pub fn requirements_raw(&mut self, view: ViewId, raw_axis: i32) -> Result<SizeRequirements> {
        let axis = Axis::from_raw(raw_axis)?;
        self.requirements(view, axis)
    }

    pub fn minimum_span(&mut self, view: ViewId, axis: Axis) -> Result<i32> {
        Ok(self.requirements(view, axis)?.minimum)
    }

    pub fn preferred_span(&mut self, view: ViewId, axis: Axis) -> Result<i32> {
        Ok(self.requirements(view, axis)?.preferred)
    }

    pub fn maximum_span(&mut self, view: ViewId, axis: Axis) -> Result<i32> {
        Ok(self.requirements(view, axis)?.maximum)
    }

    pub fn alignment(&mut self, view: ViewId, axis: Axis) -> Result<f32> {
        Ok(self.requirements(view, axis)?.alignment)
    }

    /// 1 when a composite can be resized along `axis`, 0 otherwise. Glyphs
    /// never ask for extra space.
    pub fn resize_weight(&mut self, view: ViewId, axis: Axis) -> Result<i32> {
        if self.node(view)?.kind.is_glyph() {
            return Ok(0);
        }
        Ok(self.requirements(view, axis)?.resize_weight())
    }

    fn child_requirements(&mut self, view: ViewId, axis: Axis) -> Result<Vec<SizeRequirements>> {
        let children = self.node(view)?.children.clone();
        children
            .into_iter()
            .map(|child| self.requirements(child, axis))
            .collect()
    }

    fn pool_requirements(&mut self, view: ViewId, axis: Axis) -> Result<SizeRequirements> {
        let children = self.child_requirements(view, axis)?;
        Ok(match axis {
            Axis::X => {
                let minimum = children.iter().map(|r| r.minimum).max().unwrap_or(0);
                let preferred = children
                    .iter()
                    .fold(0i32, |sum, r| sum.saturating_add(r.preferred));
                SizeRequirements::new(minimum, preferred.max(minimum), INFINITE, 0.5)
            }
            Axis::Y => aligned_requirements(&children, INFINITE),
        })
    }

    fn cached_requirements(&mut self, view: ViewId, axis: Axis) -> Result<SizeRequirements> {
        let state = self
            .node(view)?
            .box_state()
            .ok_or(LayoutError::UnknownView { id: view.get() })?;
        if state.request_valid.contains(AxisSet::of(axis)) {
            return Ok(state.requests[slot(axis)]);
        }
        let major = state.major;
        let mut request = SizeRequirements::ZERO;
        if axis == major {
            self.calculate_major_axis_requirements(view, axis, &mut request)?;
        } else {
            self.calculate_minor_axis_requirements(view, axis, &mut request)?;
        }
        if let Some(state) = self.node_mut(view)?.box_state_mut() {
            state.requests[slot(axis)] = request;
            state.request_valid.insert(AxisSet::of(axis));
        }
        Ok(request)
    }

    /// Children tiled along `axis`. Rows additionally accept any width.
    pub fn calculate_major_axis_requirements(
        &mut self,
        view: ViewId,
        axis: Axis,
        out: &mut SizeRequirements,
    ) -> Result<()> {
        let children = self.child_requirements(view, axis)?;
        tiled_requirements_into(&children, out);
        if self.view_type(view)? == ViewType::Row {
            out.maximum = INFINITE;
        }
        Ok(())
    }

    /// Children overlapping along `axis`.
    ///
    /// Rows share a baseline. A flow's width comes from its pool rather
    /// than its rows: at least the widest unbreakable piece, ideally
    /// everything on one line.
    pub fn calculate_minor_axis_requirements(
        &mut self,
        view: ViewId,
        axis: Axis,
        out: &mut SizeRequirements,
    ) -> Result<()> {
        match self.view_type(view)? {
            ViewType::Flow => {
                let pool = self.node(view)?.flow_state().and_then(|flow| flow.pool);
                *out = match pool {
                    Some(pool) => {
                        let pool = self.requirements(pool, axis)?;
                        SizeRequirements::new(
                            pool.minimum,
                            pool.preferred.max(pool.minimum),
                            INFINITE,
                            0.5,
                        )
                    }
                    None => SizeRequirements::new(0, 0, INFINITE, 0.5),
                };
            }
            ViewType::Row => {
                let children = self.child_requirements(view, axis)?;
                baseline_requirements_into(&children, out);
            }
            _ => {
                let children = self.child_requirements(view, axis)?;
                aligned_requirements_into(&children, INFINITE, out);
            }
        }
        Ok(())
    }

    /// Combined requirement for the children of `view` sharing a baseline
    /// along `axis`.
    pub fn baseline_requirements(&mut self, view: ViewId, axis: Axis) -> Result<SizeRequirements> {
        let children = self.child_requirements(view, axis)?;
        let mut out = SizeRequirements::ZERO;
        baseline_requirements_into(&children, &mut out);
        Ok(out)
    }

    // ── Validity ────────────────────────────────────────────────────────

    /// Whether the allocation of `view` along `axis` is current. Views
    /// without a cached layout are always valid.
    pub fn is_layout_valid(&self, view: ViewId, axis: Axis) -> Result<bool> {
        Ok(self
            .node(view)?
            .box_state()
            .is_none_or(|state| state.allocation_valid.contains(AxisSet::of(axis))))
    }

    pub(crate) fn is_allocation_valid(&self, view: ViewId) -> Result<bool> {
        Ok(self
            .node(view)?
            .box_state()
            .is_none_or(|state| state.is_allocation_valid()))
    }

    /// Mark the allocation along `axis` stale without touching requests.
    pub fn layout_changed(&mut self, view: ViewId, axis: Axis) -> Result<()> {
        if let Some(state) = self.node_mut(view)?.box_state_mut() {
            state.allocation_valid.remove(AxisSet::of(axis));
        }
        Ok(())
    }

    /// Record that the preferences of `view` (or of its `child`) changed.
    ///
    /// Clears cached requests and allocations for the named axes and
    /// repeats on the parent. Reaching a view without a parent flags the
    /// tree for revalidation.
    pub fn preference_changed(
        &mut self,
        view: ViewId,
        child: Option<ViewId>,
        width: bool,
        height: bool,
    ) -> Result<()> {
        let mut current = view;
        let mut from = child;
        loop {
            let node = self.node_mut(current)?;
            if let Some(state) = node.box_state_mut() {
                state.invalidate(AxisSet::from_flags(width, height));
            }
            let parent = node.parent;
            viewtree_core::trace!(
                view = current.get(),
                child = from.map_or(0, ViewId::get),
                width,
                height,
                "preference changed"
            );
            match parent {
                Some(parent) => {
                    from = Some(current);
                    current = parent;
                }
                None => {
                    self.mark_revalidate();
                    return Ok(());
                }
            }
        }
    }

    // ── Layout ──────────────────────────────────────────────────────────

    /// Give `view` an outer size of `width` by `height` and lay out
    /// everything below it.
    ///
    /// Repeats while layout of descendants invalidates `view` again (a flow
    /// whose row count changed), up to a fixed number of passes.
    pub fn layout(&mut self, view: ViewId, width: i32, height: i32) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("view_layout", view = view.get(), width, height).entered();

        for _ in 0..MAX_LAYOUT_PASSES {
            self.set_size(view, width, height)?;
            if self.is_allocation_valid(view)? {
                return Ok(());
            }
        }
        viewtree_core::warn!(view = view.get(), "layout did not settle");
        Ok(())
    }

    pub(crate) fn set_size(&mut self, view: ViewId, width: i32, height: i32) -> Result<()> {
        let node = self.node(view)?;
        let inside_width = width.saturating_sub(node.insets.horizontal_sum()).max(0);
        let inside_height = height.saturating_sub(node.insets.vertical_sum()).max(0);
        match node.view_type() {
            ViewType::Glyph | ViewType::Pool => Ok(()),
            ViewType::Flow => self.layout_flow(view, inside_width, inside_height),
            ViewType::Box | ViewType::Row => self.layout_box(view, inside_width, inside_height),
        }
    }

    /// Lay out the children of a box-like view inside `width` by `height`.
    pub(crate) fn layout_box(&mut self, view: ViewId, width: i32, height: i32) -> Result<()> {
        let force = self.config.force_full_layout;
        let targets = [width, height];
        let Some(state) = self.node_mut(view)?.box_state_mut() else {
            return Ok(());
        };
        for axis in Axis::ALL {
            if force || state.spans[slot(axis)] != targets[slot(axis)] {
                state.allocation_valid.remove(AxisSet::of(axis));
            }
        }
        let stale = AxisSet::all().difference(state.allocation_valid);
        let major = state.major;
        if stale.is_empty() {
            self.stats.skipped += 1;
            viewtree_core::trace!(view = view.get(), "layout skipped");
            return Ok(());
        }
        self.stats.layouts += 1;

        for axis in Axis::ALL {
            if !stale.contains(AxisSet::of(axis)) {
                continue;
            }
            let target = targets[slot(axis)];
            let placement = if axis == major {
                self.layout_major_axis(view, target)?
            } else {
                self.layout_minor_axis(view, target)?
            };
            if let Some(state) = self.node_mut(view)?.box_state_mut() {
                state.placements[slot(axis)] = placement;
                state.spans[slot(axis)] = target;
                state.allocation_valid.insert(AxisSet::of(axis));
            }
        }

        let children = self.node(view)?.children.clone();
        for (index, child) in children.into_iter().enumerate() {
            let (w, h) = match self.node(view)?.box_state() {
                Some(state) => (
                    state.placements[0].spans.get(index).copied().unwrap_or(0),
                    state.placements[1].spans.get(index).copied().unwrap_or(0),
                ),
                None => (0, 0),
            };
            self.set_size(child, w, h)?;
        }
        Ok(())
    }

    /// Tile the children of `view` along its major axis into `target`.
    pub fn layout_major_axis(&mut self, view: ViewId, target: i32) -> Result<Placement> {
        let major = self.major_axis(view)?;
        let children = self.child_requirements(view, major)?;
        Ok(tiled_positions(target, &children))
    }

    /// Align the children of `view` across its minor axis in `target`.
    /// Rows align on the baseline.
    pub fn layout_minor_axis(&mut self, view: ViewId, target: i32) -> Result<Placement> {
        let minor = self.major_axis(view)?.other();
        if self.view_type(view)? == ViewType::Row {
            return self.baseline_layout(view, target, minor);
        }
        let children = self.child_requirements(view, minor)?;
        let mut placement = Placement::with_capacity(children.len());
        calculate_aligned_positions(target, &children, &mut placement);
        Ok(placement)
    }

    /// Place the children of `view` on a shared baseline along `axis`.
    pub fn baseline_layout(&mut self, view: ViewId, target: i32, axis: Axis) -> Result<Placement> {
        let children = self.child_requirements(view, axis)?;
        let mut total = SizeRequirements::ZERO;
        baseline_requirements_into(&children, &mut total);
        let mut placement = Placement::with_capacity(children.len());
        calculate_baseline_positions(target, total.alignment, &children, &mut placement);
        Ok(placement)
    }

    /// Tiling axis of a composite; X for leaves.
    pub fn major_axis(&self, view: ViewId) -> Result<Axis> {
        Ok(self.node(view)?.box_state().map_or(Axis::X, |s| s.major))
    }

    // ── Allocations ─────────────────────────────────────────────────────

    /// `alloc` minus the insets of `view`.
    pub fn inside_allocation(&self, view: ViewId, alloc: Option<Rect>) -> Result<Option<Rect>> {
        let insets = self.node(view)?.insets;
        Ok(alloc.map(|rect| rect.inner(insets)))
    }

    /// Rectangle of child `index` given the allocation of `view`.
    ///
    /// `None` when `alloc` is absent or the layout is stale.
    pub fn child_allocation(
        &self,
        view: ViewId,
        index: usize,
        alloc: Option<Rect>,
    ) -> Result<Option<Rect>> {
        let node = self.node(view)?;
        let len = node.children.len();
        if index >= len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }
        let Some(alloc) = alloc else {
            return Ok(None);
        };
        let Some(state) = node.box_state() else {
            return Ok(None);
        };
        if !state.is_allocation_valid() {
            return Ok(None);
        }
        let (Some((x, width)), Some((y, height))) =
            (state.placements[0].get(index), state.placements[1].get(index))
        else {
            return Ok(None);
        };
        let inside = alloc.inner(node.insets);
        Ok(Some(Rect::new(
            inside.x.saturating_add(x),
            inside.y.saturating_add(y),
            width,
            height,
        )))
    }
}
