#![forbid(unsafe_code)]

//! The view arena and its structural operations.
//!
//! # Ownership
//!
//! Every view lives in one `BTreeMap` keyed by [`ViewId`]. A view records
//! its display parent and its owner. `replace` on an owner destroys the
//! removed views (recursively); `replace` on a view that merely borrows a
//! child (a row showing a pool child) only hands it back to its owner.
//!
//! # Invariants
//!
//! 1. A child's `parent` equals the view whose child list holds it, except
//!    for pool children not currently placed in a row, whose parent is the
//!    pool.
//! 2. Destroyed ids are gone from every child list.
//! 3. Child lists are in document order.

use crate::factory::{BasicViewFactory, NewView, Shape, ViewFactory};
use crate::flow::TextFlowStrategy;
use crate::id::{ViewId, ViewIdAllocator};
use crate::metrics::TextMetrics;
use crate::node::{AxisSet, BoxState, FlowState, LayoutNode, ViewKind, ViewType};
use std::collections::BTreeMap;
use std::rc::Rc;
use viewtree_core::{Insets, LayoutConfig, LayoutError, Rect, Result};
use viewtree_doc::{Document, DocumentError, ElementId};

/// Counters for layout work, so callers can observe short-circuits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Box layouts that recomputed at least one axis.
    pub layouts: u64,
    /// Box layouts answered from cache.
    pub skipped: u64,
    /// Flow strategy invocations.
    pub flow_rebuilds: u64,
    /// Repaint requests queued.
    pub repaints: u64,
}

/// A tree of views over a document.
///
/// All operations are synchronous and run on the caller's thread. The tree
/// owns the document so edits and notifications can be sequenced by the
/// caller: edit through [`document_mut`](Self::document_mut), then deliver
/// the returned event to the view that should reconcile it.
pub struct ViewTree<D: Document> {
    pub(crate) doc: D,
    pub(crate) metrics: Box<dyn TextMetrics>,
    pub(crate) config: LayoutConfig,
    pub(crate) nodes: BTreeMap<ViewId, LayoutNode>,
    ids: ViewIdAllocator,
    factory: Option<Rc<dyn ViewFactory>>,
    root: Option<ViewId>,
    damage: Vec<Rect>,
    needs_revalidate: bool,
    pub(crate) stats: LayoutStats,
}

impl<D: Document> ViewTree<D> {
    /// Empty tree over `doc`.
    pub fn new(doc: D, metrics: impl TextMetrics + 'static, config: LayoutConfig) -> Self {
        Self {
            doc,
            metrics: Box::new(metrics),
            config,
            nodes: BTreeMap::new(),
            ids: ViewIdAllocator::default(),
            factory: None,
            root: None,
            damage: Vec::new(),
            needs_revalidate: false,
            stats: LayoutStats::default(),
        }
    }

    /// Install the factory used when attaching views loads their children.
    #[must_use]
    pub fn with_factory(mut self, factory: Rc<dyn ViewFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn set_factory(&mut self, factory: Option<Rc<dyn ViewFactory>>) {
        self.factory = factory;
    }

    #[must_use]
    pub fn factory(&self) -> Option<Rc<dyn ViewFactory>> {
        self.factory.clone()
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> LayoutStats {
        self.stats
    }

    /// Root view built by [`build_root`](Self::build_root), if any.
    #[must_use]
    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    /// Create the view for the document root and load the whole hierarchy.
    ///
    /// Uses the installed factory, or [`BasicViewFactory`] when none is set.
    pub fn build_root(&mut self) -> Result<ViewId> {
        let factory: Rc<dyn ViewFactory> = match &self.factory {
            Some(f) => Rc::clone(f),
            None => Rc::new(BasicViewFactory),
        };
        if let Some(old) = self.root.take() {
            self.destroy(old);
        }
        let element = self.doc.default_root();
        let root = self.create_view(element, factory.as_ref());
        self.load_children(root, factory.as_ref())?;
        self.root = Some(root);
        Ok(root)
    }

    /// Drain queued repaint rectangles.
    pub fn take_damage(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.damage)
    }

    /// Whether a preference change reached a view without a parent since the
    /// last call; clears the flag.
    pub fn take_revalidate(&mut self) -> bool {
        std::mem::take(&mut self.needs_revalidate)
    }

    pub(crate) fn repaint(&mut self, rect: Rect) {
        viewtree_core::trace!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, "repaint");
        self.stats.repaints += 1;
        self.damage.push(rect);
    }

    pub(crate) fn mark_revalidate(&mut self) {
        self.needs_revalidate = true;
    }

    // ── Node access ─────────────────────────────────────────────────────

    pub(crate) fn node(&self, view: ViewId) -> Result<&LayoutNode> {
        self.nodes
            .get(&view)
            .ok_or(LayoutError::UnknownView { id: view.get() })
    }

    pub(crate) fn node_mut(&mut self, view: ViewId) -> Result<&mut LayoutNode> {
        self.nodes
            .get_mut(&view)
            .ok_or(LayoutError::UnknownView { id: view.get() })
    }

    pub(crate) fn insert_node(&mut self, node: LayoutNode) -> ViewId {
        let id = self.ids.allocate();
        self.nodes.insert(id, node);
        id
    }

    /// Whether `view` is alive.
    #[must_use]
    pub fn contains(&self, view: ViewId) -> bool {
        self.nodes.contains_key(&view)
    }

    /// Number of live views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn view_type(&self, view: ViewId) -> Result<ViewType> {
        Ok(self.node(view)?.view_type())
    }

    pub fn element(&self, view: ViewId) -> Result<ElementId> {
        Ok(self.node(view)?.element)
    }

    pub fn parent(&self, view: ViewId) -> Result<Option<ViewId>> {
        Ok(self.node(view)?.parent)
    }

    pub fn owner(&self, view: ViewId) -> Result<Option<ViewId>> {
        Ok(self.node(view)?.owner)
    }

    pub fn children(&self, view: ViewId) -> Result<&[ViewId]> {
        Ok(&self.node(view)?.children)
    }

    pub fn view_count(&self, view: ViewId) -> Result<usize> {
        Ok(self.node(view)?.children.len())
    }

    /// Child `index` of `view`.
    pub fn child(&self, view: ViewId, index: usize) -> Result<ViewId> {
        let children = &self.node(view)?.children;
        children
            .get(index)
            .copied()
            .ok_or(LayoutError::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    pub fn insets(&self, view: ViewId) -> Result<Insets> {
        Ok(self.node(view)?.insets)
    }

    /// Replace the insets of `view` and invalidate its layout.
    pub fn set_insets(&mut self, view: ViewId, insets: Insets) -> Result<()> {
        let node = self.node_mut(view)?;
        node.insets = insets;
        if let Some(state) = node.box_state_mut() {
            state.invalidate(AxisSet::all());
        }
        Ok(())
    }

    /// Layout pool of a flow view.
    pub fn pool(&self, flow: ViewId) -> Result<Option<ViewId>> {
        Ok(self.node(flow)?.flow_state().and_then(|f| f.pool))
    }

    // ── Ranges ──────────────────────────────────────────────────────────

    /// First document offset covered by `view`.
    pub fn start_offset(&self, view: ViewId) -> Result<usize> {
        let node = self.node(view)?;
        if let Some((start, _)) = node.range {
            return Ok(start);
        }
        if let (ViewKind::Row(_), Some(first)) = (&node.kind, node.children.first()) {
            return self.start_offset(*first);
        }
        Ok(self.doc.start_offset(node.element))
    }

    /// Offset just past the last one covered by `view`.
    pub fn end_offset(&self, view: ViewId) -> Result<usize> {
        let node = self.node(view)?;
        if let Some((_, end)) = node.range {
            return Ok(end);
        }
        if let (ViewKind::Row(_), Some(last)) = (&node.kind, node.children.last()) {
            return self.end_offset(*last);
        }
        Ok(self.doc.end_offset(node.element))
    }

    pub fn range(&self, view: ViewId) -> Result<(usize, usize)> {
        Ok((self.start_offset(view)?, self.end_offset(view)?))
    }

    /// Text of `[offset, offset + len)`, with document failures reported as
    /// positions the view tree cannot represent.
    pub(crate) fn doc_text(&self, offset: usize, len: usize) -> Result<String> {
        self.doc.text(offset, len).map_err(|err| match err {
            DocumentError::BadLocation { offset, .. } => LayoutError::BadLocation { offset },
            DocumentError::ZeroElementId => LayoutError::BadLocation { offset },
        })
    }

    /// Index of the child containing `offset`, clamped to the first and
    /// last child. `None` only when there are no children.
    pub fn view_index_at_position(&self, view: ViewId, offset: usize) -> Result<Option<usize>> {
        let children = &self.node(view)?.children;
        let n = children.len();
        if n == 0 {
            return Ok(None);
        }
        let (mut lo, mut hi) = (0usize, n);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.end_offset(children[mid])? <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(Some(lo.min(n - 1)))
    }

    /// Bias-aware child lookup.
    ///
    /// `Forward` picks the child starting at a shared boundary, `Backward`
    /// the child ending there. Offsets outside the view answer `None`.
    pub fn view_index(
        &self,
        view: ViewId,
        offset: usize,
        bias: viewtree_core::Bias,
    ) -> Result<Option<usize>> {
        let probe = match bias {
            viewtree_core::Bias::Forward => offset,
            viewtree_core::Bias::Backward => match offset.checked_sub(1) {
                Some(p) => p,
                None => return Ok(None),
            },
        };
        let (start, end) = self.range(view)?;
        if probe >= start && probe < end {
            self.view_index_at_position(view, probe)
        } else {
            Ok(None)
        }
    }

    // ── Creation ────────────────────────────────────────────────────────

    /// Create a detached view for `element` through `factory`.
    pub fn create_view(&mut self, element: ElementId, factory: &dyn ViewFactory) -> ViewId {
        let spec = factory.create(&self.doc, element);
        self.materialize(element, spec)
    }

    pub(crate) fn materialize(&mut self, element: ElementId, spec: NewView) -> ViewId {
        let NewView { shape, insets } = spec;
        let kind = match shape {
            Shape::Glyph => ViewKind::Glyph,
            Shape::Box(major) => ViewKind::Box(BoxState::new(major)),
            Shape::Flow {
                strategy,
                first_line_indent,
            } => ViewKind::Flow(FlowState::new(
                strategy.unwrap_or_else(|| Box::new(TextFlowStrategy)),
                first_line_indent.unwrap_or(self.config.first_line_indent),
            )),
        };
        let mut node = LayoutNode::new(element, kind);
        node.insets = insets;
        let id = self.insert_node(node);
        viewtree_core::trace!(view = id.get(), element = element.get(), "view created");
        id
    }

    // ── Structure ───────────────────────────────────────────────────────

    /// Set the display parent of `view`.
    ///
    /// Attaching a childless composite loads its children with the
    /// installed factory (nothing happens without one). `None` detaches.
    pub fn set_parent(&mut self, view: ViewId, parent: Option<ViewId>) -> Result<()> {
        if let Some(p) = parent {
            self.node(p)?;
        }
        let node = self.node_mut(view)?;
        node.parent = parent;
        let needs_load = parent.is_some() && node.is_composite() && node.children.is_empty();
        if needs_load && let Some(factory) = self.factory.clone() {
            self.load_children(view, factory.as_ref())?;
        }
        Ok(())
    }

    /// Populate `view` from its element's children.
    ///
    /// Boxes get one view per child element. A flow creates its layout pool
    /// and loads that instead; the pool of a leaf element holds a single
    /// glyph for the element itself. Glyphs and rows have nothing to load.
    pub fn load_children(&mut self, view: ViewId, factory: &dyn ViewFactory) -> Result<()> {
        let node = self.node(view)?;
        let element = node.element;
        match node.view_type() {
            ViewType::Glyph | ViewType::Row => Ok(()),
            ViewType::Flow => self.load_flow(view, factory),
            ViewType::Pool if self.doc.is_leaf(element) => {
                let glyph = self.materialize(element, NewView::glyph());
                let len = self.view_count(view)?;
                self.replace_with(view, 0, len, &[glyph], Some(factory))
            }
            ViewType::Box | ViewType::Pool => {
                let count = self.doc.child_count(element);
                let mut views = Vec::with_capacity(count);
                for i in 0..count {
                    if let Some(child) = self.doc.child(element, i) {
                        views.push(self.create_view(child, factory));
                    }
                }
                let len = self.view_count(view)?;
                self.replace_with(view, 0, len, &views, Some(factory))
            }
        }
    }

    /// Replace `remove_count` children at `index` with `views`.
    ///
    /// Removed children this view owns are destroyed; borrowed ones return
    /// to their owner. Inserted views get this view as parent (and owner,
    /// unless already owned) and load their children with the installed
    /// factory. Both axes are invalidated.
    pub fn replace(
        &mut self,
        view: ViewId,
        index: usize,
        remove_count: usize,
        views: &[ViewId],
    ) -> Result<()> {
        let factory = self.factory.clone();
        self.replace_with(view, index, remove_count, views, factory.as_deref())
    }

    /// Append `views` after the last child.
    pub fn append(&mut self, view: ViewId, views: &[ViewId]) -> Result<()> {
        let len = self.view_count(view)?;
        self.replace(view, len, 0, views)
    }

    /// Remove every child.
    pub fn remove_all(&mut self, view: ViewId) -> Result<()> {
        let len = self.view_count(view)?;
        self.replace(view, 0, len, &[])
    }

    pub(crate) fn replace_with(
        &mut self,
        view: ViewId,
        index: usize,
        remove_count: usize,
        views: &[ViewId],
        factory: Option<&dyn ViewFactory>,
    ) -> Result<()> {
        for &v in views {
            self.node(v)?;
        }
        let node = self.node_mut(view)?;
        let len = node.children.len();
        let end = index
            .checked_add(remove_count)
            .filter(|end| *end <= len)
            .ok_or(LayoutError::IndexOutOfRange {
                index: index.saturating_add(remove_count),
                len,
            })?;
        let removed: Vec<ViewId> = node
            .children
            .splice(index..end, views.iter().copied())
            .collect();
        if let Some(state) = node.box_state_mut() {
            state.invalidate(AxisSet::all());
            state.last_hit = 0;
        }
        viewtree_core::debug!(
            view = view.get(),
            index,
            removed = removed.len(),
            added = views.len(),
            "replace children"
        );

        for child in removed {
            self.release(view, child);
        }
        for &child in views {
            let node = self.node_mut(child)?;
            node.parent = Some(view);
            if node.owner.is_none() {
                node.owner = Some(view);
            }
            let needs_load = node.is_composite() && node.children.is_empty();
            if needs_load && let Some(f) = factory {
                self.load_children(child, f)?;
            }
        }
        Ok(())
    }

    /// Give up `child` as seen from `holder`: destroy it when `holder` owns
    /// it, otherwise hand it back to its owner.
    pub(crate) fn release(&mut self, holder: ViewId, child: ViewId) {
        let Some(node) = self.nodes.get_mut(&child) else {
            return;
        };
        if node.owner == Some(holder) || node.owner.is_none() {
            self.destroy(child);
        } else {
            node.parent = node.owner;
        }
    }

    /// Remove `view` and everything it owns from the arena.
    pub(crate) fn destroy(&mut self, view: ViewId) {
        let Some(node) = self.nodes.remove(&view) else {
            return;
        };
        if let Some(parent) = node.parent
            && node.owner != Some(parent)
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|c| *c != view);
            if let Some(state) = p.box_state_mut() {
                state.invalidate(AxisSet::all());
            }
        }
        for child in node.children {
            self.release(view, child);
        }
        if let ViewKind::Flow(flow) = node.kind
            && let Some(pool) = flow.pool
        {
            self.destroy(pool);
        }
        if self.root == Some(view) {
            self.root = None;
        }
        viewtree_core::trace!(view = view.get(), "view destroyed");
    }
}
