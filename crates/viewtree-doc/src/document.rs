#![forbid(unsafe_code)]

//! The read side of a document, as consumed by the layout engine.

use crate::attributes::Attributes;
use crate::element::ElementId;
use crate::error::DocumentError;

/// Hierarchical text document.
///
/// Every element covers a contiguous offset range `[start, end)`; children
/// partition their parent's range in order. Ids the document no longer
/// knows report an empty range at offset 0 and no children.
pub trait Document {
    /// Number of characters, excluding the implicit trailing newline.
    fn length(&self) -> usize;

    /// Root of the element tree.
    fn default_root(&self) -> ElementId;

    fn start_offset(&self, element: ElementId) -> usize;

    fn end_offset(&self, element: ElementId) -> usize;

    fn child_count(&self, element: ElementId) -> usize;

    fn child(&self, element: ElementId, index: usize) -> Option<ElementId>;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Element name, such as `"paragraph"`.
    fn name(&self, element: ElementId) -> &str;

    fn attributes(&self, element: ElementId) -> Option<&Attributes>;

    /// Text of `[offset, offset + length)`.
    fn text(&self, offset: usize, length: usize) -> Result<String, DocumentError>;

    fn is_leaf(&self, element: ElementId) -> bool {
        self.child_count(element) == 0
    }

    /// Index of the child of `element` containing `offset`.
    ///
    /// Offsets before the first child clamp to 0, offsets at or past the last
    /// child's end clamp to the last index. A leaf answers 0.
    fn element_index(&self, element: ElementId, offset: usize) -> usize {
        let count = self.child_count(element);
        if count == 0 {
            return 0;
        }
        let (mut lo, mut hi) = (0usize, count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let end = self
                .child(element, mid)
                .map_or(0, |child| self.end_offset(child));
            if end <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo.min(count - 1)
    }
}
