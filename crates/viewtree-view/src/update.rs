#![forbid(unsafe_code)]

//! Reconciling the view tree with document edits.
//!
//! A notification enters at some view and is pushed down to the children
//! covering the edited range:
//!
//! 1. If the event records a structural change for this view's element,
//!    the removed child views are replaced by views for the added elements.
//! 2. The event is forwarded to the children overlapping the edit, except
//!    the ones just created.
//! 3. Insertions and removals shift the offsets of every child after the
//!    edit. Flows among them hold row fragments with fixed ranges, so their
//!    rows are marked stale.
//! 4. If children were replaced, preferences are invalidated upward and the
//!    allocation is repainted.
//!
//! A box whose major-axis layout was valid before the edit and is stale
//! after it repaints only from the affected child's previous offset to the
//! end, and skips the whole-view repaint.

use crate::factory::ViewFactory;
use crate::id::ViewId;
use crate::node::{AxisSet, ViewType, slot};
use crate::tree::ViewTree;
use std::ops::Range;
use viewtree_core::{Axis, Rect, Result};
use viewtree_doc::{Document, DocumentEvent, ElementChange, EventKind};

impl<D: Document> ViewTree<D> {
    /// Text was inserted.
    pub fn insert_update(
        &mut self,
        view: ViewId,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        self.update(view, event, alloc, factory)
    }

    /// Text was removed.
    pub fn remove_update(
        &mut self,
        view: ViewId,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        self.update(view, event, alloc, factory)
    }

    /// Attributes changed.
    pub fn changed_update(
        &mut self,
        view: ViewId,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        self.update(view, event, alloc, factory)
    }

    /// Entry point dispatching on the event kind.
    pub fn dispatch_update(
        &mut self,
        view: ViewId,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        match event.kind() {
            EventKind::Insert => self.insert_update(view, event, alloc, factory),
            EventKind::Remove => self.remove_update(view, event, alloc, factory),
            EventKind::Change => self.changed_update(view, event, alloc, factory),
        }
    }

    fn update(
        &mut self,
        view: ViewId,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "view_update",
            view = view.get(),
            kind = ?event.kind(),
            offset = event.offset(),
            length = event.length()
        )
        .entered();

        match self.view_type(view)? {
            ViewType::Glyph => {
                let height = event.kind() == EventKind::Change;
                self.preference_changed(view, None, true, height)
            }
            ViewType::Flow => self.flow_update(view, event, alloc, factory),
            ViewType::Box | ViewType::Row | ViewType::Pool => {
                self.composite_update(view, event, alloc, factory)
            }
        }
    }

    fn flow_update(
        &mut self,
        flow: ViewId,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        if let Some(pool) = self.pool(flow)? {
            self.update(pool, event, None, factory)?;
        }
        let inside = self.inside_allocation(flow, alloc)?;
        self.with_strategy(flow, |strategy, tree| {
            strategy.update(tree, flow, Some(event), inside)
        })
    }

    fn composite_update(
        &mut self,
        view: ViewId,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        let node = self.node(view)?;
        if node.children.is_empty() {
            return Ok(());
        }
        let element = node.element;
        let change = event.change_for(element).cloned();

        // Where the affected child sat along the major axis before the edit.
        let affected = match &change {
            Some(change) => Some(change.index),
            None => self.view_index_at_position(view, event.offset())?,
        };
        let prior = self.node(view)?.box_state().and_then(|state| {
            let axis = AxisSet::of(state.major);
            if !state.allocation_valid.contains(axis) {
                return None;
            }
            let offset = affected.and_then(|i| state.placements[slot(state.major)].offsets.get(i));
            Some((state.major, offset.copied().unwrap_or(0)))
        });

        if let Some(change) = &change {
            self.update_children(view, change, factory)?;
        }
        let added = change
            .as_ref()
            .map(|c| c.index..c.index + c.added.len());
        let last = self.forward_update(view, added, event, alloc, factory)?;
        if matches!(event.kind(), EventKind::Insert | EventKind::Remove)
            && let Some(last) = last
        {
            self.offsets_shifted(view, last + 1)?;
        }

        let mut repainted = false;
        if let (Some((major, offset)), Some(rect)) = (prior, alloc) {
            let still_valid = self
                .node(view)?
                .box_state()
                .is_some_and(|state| state.allocation_valid.contains(AxisSet::of(major)));
            if !still_valid {
                let inside = rect.inner(self.insets(view)?);
                let origin = inside.origin(major).saturating_add(offset);
                let span = inside.span(major).saturating_sub(offset).max(0);
                self.repaint(inside.with_axis(major, origin, span));
                repainted = true;
            }
        }
        self.update_layout(view, change.as_ref(), alloc, repainted)
    }

    /// Replace the child views named by `change` with views for its added
    /// elements.
    fn update_children(
        &mut self,
        view: ViewId,
        change: &ElementChange,
        factory: &dyn ViewFactory,
    ) -> Result<()> {
        let views: Vec<ViewId> = change
            .added
            .iter()
            .map(|element| self.create_view(*element, factory))
            .collect();
        viewtree_core::debug!(
            view = view.get(),
            index = change.index,
            removed = change.removed.len(),
            added = views.len(),
            "update children"
        );
        self.replace_with(view, change.index, change.removed.len(), &views, Some(factory))
    }

    /// Forward `event` to the children overlapping the edit, skipping the
    /// ones in `added`. Returns the index of the last child covered.
    fn forward_update(
        &mut self,
        view: ViewId,
        added: Option<Range<usize>>,
        event: &DocumentEvent,
        alloc: Option<Rect>,
        factory: &dyn ViewFactory,
    ) -> Result<Option<usize>> {
        let count = self.view_count(view)?;
        if count == 0 {
            return Ok(None);
        }
        let pos = event.offset();
        let mut first = self.view_index_at_position(view, pos)?.unwrap_or(0);
        // An edit at a child's start may have changed the one before it.
        if first > 0 && pos > 0 && self.start_offset(self.child(view, first)?)? == pos {
            first -= 1;
        }
        let last = match event.kind() {
            EventKind::Remove => first,
            EventKind::Insert | EventKind::Change => self
                .view_index_at_position(view, event.end())?
                .unwrap_or(count - 1),
        }
        .max(first);

        for index in first..=last {
            if added.as_ref().is_some_and(|range| range.contains(&index)) {
                continue;
            }
            let Ok(child) = self.child(view, index) else {
                break;
            };
            let child_alloc = match alloc {
                Some(rect) => self.child_allocation(view, index, Some(rect))?,
                None => None,
            };
            self.update(child, event, child_alloc, factory)?;
        }
        Ok(Some(last))
    }

    /// Mark the rows of every flow under the children of `view` from index
    /// `from` on stale along X.
    fn offsets_shifted(&mut self, view: ViewId, from: usize) -> Result<()> {
        let children = self
            .node(view)?
            .children
            .get(from..)
            .map(<[ViewId]>::to_vec)
            .unwrap_or_default();
        for child in children {
            match self.view_type(child)? {
                ViewType::Flow => self.layout_changed(child, Axis::X)?,
                ViewType::Box => {
                    self.layout_changed(child, Axis::X)?;
                    self.offsets_shifted(child, 0)?;
                }
                ViewType::Glyph | ViewType::Row | ViewType::Pool => {}
            }
        }
        Ok(())
    }

    fn update_layout(
        &mut self,
        view: ViewId,
        change: Option<&ElementChange>,
        alloc: Option<Rect>,
        repainted: bool,
    ) -> Result<()> {
        if change.is_none() {
            return Ok(());
        }
        self.preference_changed(view, None, true, true)?;
        if !repainted && let Some(rect) = alloc {
            self.repaint(rect);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::BasicViewFactory;
    use crate::metrics::MonospaceMetrics;
    use viewtree_core::LayoutConfig;
    use viewtree_doc::TextDocument;

    fn laid_out(text: &str) -> (ViewTree<TextDocument>, ViewId, Rect) {
        let mut tree = ViewTree::new(
            TextDocument::new(text),
            MonospaceMetrics::default(),
            LayoutConfig::default(),
        );
        let root = tree.build_root().expect("root");
        let alloc = Rect::from_size(200, 200);
        tree.layout(root, alloc.width, alloc.height).expect("layout");
        let _ = tree.take_damage();
        let _ = tree.take_revalidate();
        (tree, root, alloc)
    }

    #[test]
    fn empty_view_ignores_events() {
        let mut tree = ViewTree::new(
            TextDocument::new("ab"),
            MonospaceMetrics::default(),
            LayoutConfig::default(),
        );
        let root = tree.create_view(tree.document().default_root(), &BasicViewFactory);
        let event = tree.document_mut().insert_string(0, "x\n").expect("edit");
        tree.insert_update(root, &event, None, &BasicViewFactory)
            .expect("update");
        assert_eq!(tree.view_count(root), Ok(0));
        assert!(tree.take_damage().is_empty());
    }

    #[test]
    fn content_edit_repaints_flow() {
        let (mut tree, root, alloc) = laid_out("ab\ncd");
        let event = tree.document_mut().insert_string(4, "zz").expect("edit");
        tree.insert_update(root, &event, Some(alloc), &BasicViewFactory)
            .expect("update");
        assert_eq!(tree.view_count(root), Ok(2));
        assert_eq!(tree.take_damage(), vec![Rect::new(0, 16, 200, 16)]);
        let flow = tree.child(root, 1).expect("flow");
        assert!(!tree.is_layout_valid(flow, viewtree_core::Axis::X).expect("valid"));
        tree.layout(root, alloc.width, alloc.height).expect("relayout");
        let pool = tree.pool(flow).expect("pool").expect("loaded");
        let glyph = tree.child(pool, 0).expect("glyph");
        assert_eq!(tree.text(glyph), Ok("czzd".to_owned()));
    }

    #[test]
    fn merge_replaces_paragraph_views() {
        let (mut tree, root, alloc) = laid_out("ab\ncd\nef");
        let old_second = tree.child(root, 1).expect("flow");
        let event = tree.document_mut().remove(2, 1).expect("edit");
        tree.remove_update(root, &event, Some(alloc), &BasicViewFactory)
            .expect("update");
        assert_eq!(tree.view_count(root), Ok(2));
        assert!(!tree.contains(old_second));
        assert!(tree.take_revalidate());
        let damage = tree.take_damage();
        assert_eq!(damage, vec![Rect::new(0, 0, 200, 200)]);
    }
}
