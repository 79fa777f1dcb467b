#![forbid(unsafe_code)]

use crate::Result;
use viewtree_core::{Axis, Bias, Direction, LayoutConfig, Rect};
use viewtree_doc::{DocumentEvent, TextDocument};
use viewtree_view::{
    BasicViewFactory, DisplayList, MonospaceMetrics, TextMetrics, ViewId, ViewTree,
};

/// A laid-out view over a [`TextDocument`].
///
/// Edits go through the view so the tree is reconciled with every change.
/// Geometric queries lay the tree out first when something is stale.
pub struct TextView {
    tree: ViewTree<TextDocument>,
    root: ViewId,
    alloc: Rect,
}

impl TextView {
    /// View over `text` with monospace metrics and the default config.
    pub fn new(text: &str, width: i32, height: i32) -> Result<Self> {
        let config = LayoutConfig::default();
        Self::with_metrics(
            TextDocument::new(text),
            MonospaceMetrics::from_config(&config),
            config,
            Rect::from_size(width, height),
        )
    }

    pub fn with_metrics(
        doc: TextDocument,
        metrics: impl TextMetrics + 'static,
        config: LayoutConfig,
        alloc: Rect,
    ) -> Result<Self> {
        let mut tree = ViewTree::new(doc, metrics, config);
        let root = tree.build_root()?;
        tree.layout(root, alloc.width, alloc.height)?;
        let _ = tree.take_damage();
        let _ = tree.take_revalidate();
        Ok(Self { tree, root, alloc })
    }

    #[must_use]
    pub fn tree(&self) -> &ViewTree<TextDocument> {
        &self.tree
    }

    #[must_use]
    pub fn root(&self) -> ViewId {
        self.root
    }

    #[must_use]
    pub fn allocation(&self) -> Rect {
        self.alloc
    }

    #[must_use]
    pub fn document(&self) -> &TextDocument {
        self.tree.document()
    }

    /// Insert `text` at `offset` and reconcile.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        let event = self.tree.document_mut().insert_string(offset, text)?;
        self.deliver(&event)
    }

    /// Remove `length` characters at `offset` and reconcile.
    pub fn remove(&mut self, offset: usize, length: usize) -> Result<()> {
        let event = self.tree.document_mut().remove(offset, length)?;
        self.deliver(&event)
    }

    fn deliver(&mut self, event: &DocumentEvent) -> Result<()> {
        self.tree.dispatch_update(self.root, event, Some(self.alloc), &BasicViewFactory)?;
        Ok(())
    }

    /// Move to a new allocation. Rows are rebuilt only if the width changed.
    pub fn resize(&mut self, alloc: Rect) -> Result<()> {
        self.alloc = alloc;
        self.refresh()
    }

    // Layout is cached per size, so this is cheap when nothing changed.
    fn refresh(&mut self) -> Result<()> {
        let _ = self.tree.take_revalidate();
        self.tree.layout(self.root, self.alloc.width, self.alloc.height)?;
        Ok(())
    }

    /// Preferred height of the content at the current width.
    pub fn content_height(&mut self) -> Result<i32> {
        self.refresh()?;
        Ok(self.tree.preferred_span(self.root, Axis::Y)?)
    }

    /// Caret rectangle at `offset`.
    pub fn caret(&mut self, offset: usize, bias: Bias) -> Result<Rect> {
        self.refresh()?;
        Ok(self
            .tree
            .model_to_view(self.root, offset, Some(self.alloc), Some(bias))?)
    }

    /// Offset under `(x, y)`.
    pub fn hit(&mut self, x: i32, y: i32) -> Result<(usize, Bias)> {
        self.refresh()?;
        Ok(self.tree.view_to_model(self.root, x, y, Some(self.alloc))?)
    }

    /// Next caret position from `offset` in `direction`, if any.
    pub fn move_caret(
        &mut self,
        offset: usize,
        bias: Bias,
        direction: Direction,
    ) -> Result<Option<(usize, Bias)>> {
        self.refresh()?;
        Ok(self.tree.next_visual_position_from(
            self.root,
            Some(offset),
            bias,
            Some(self.alloc),
            direction,
        )?)
    }

    /// Paint everything inside the allocation.
    pub fn paint(&mut self) -> Result<DisplayList> {
        self.refresh()?;
        let mut list = DisplayList::new(self.alloc);
        self.tree.paint(self.root, &mut list, self.alloc)?;
        Ok(list)
    }

    /// Drain queued repaint rectangles.
    pub fn take_damage(&mut self) -> Vec<Rect> {
        self.tree.take_damage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_are_reconciled_and_painted() {
        let mut view = TextView::new("hello", 80, 100).expect("view");
        view.insert(5, " world").expect("insert");
        assert!(!view.take_damage().is_empty());
        let list = view.paint().expect("paint");
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["hello ", "world"]);
        assert_eq!(view.content_height(), Ok(32));
    }

    #[test]
    fn document_errors_surface() {
        let mut view = TextView::new("ab", 80, 100).expect("view");
        assert!(matches!(
            view.insert(9, "x"),
            Err(crate::Error::Document(_))
        ));
        assert!(matches!(
            view.caret(0, Bias::Backward),
            Err(crate::Error::Layout(_))
        ));
    }

    #[test]
    fn resize_rewraps_and_repaints() {
        let mut view = TextView::new("aa bb cc", 200, 100).expect("view");
        assert_eq!(view.content_height(), Ok(16));
        view.resize(Rect::from_size(24, 100)).expect("resize");
        assert_eq!(view.content_height(), Ok(48));
        assert_eq!(view.caret(3, Bias::Forward).map(|r| r.y), Ok(16));
        assert_eq!(view.hit(0, 40), Ok((6, Bias::Forward)));
    }
}
