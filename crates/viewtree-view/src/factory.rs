#![forbid(unsafe_code)]

//! Element-to-view mapping.

use crate::flow::FlowStrategy;
use std::fmt;
use viewtree_core::{Axis, Insets};
use viewtree_doc::{Document, ElementId, PARAGRAPH_NAME, RUN_NAME};

/// Chooses the view shape for a document element.
///
/// Factories are consulted when a composite loads its children and when a
/// structural change adds elements. They describe the view; the tree
/// allocates it.
pub trait ViewFactory {
    fn create(&self, doc: &dyn Document, element: ElementId) -> NewView;
}

pub(crate) enum Shape {
    Glyph,
    Box(Axis),
    Flow {
        strategy: Option<Box<dyn FlowStrategy>>,
        first_line_indent: Option<i32>,
    },
}

/// Description of a view to create.
pub struct NewView {
    pub(crate) shape: Shape,
    pub(crate) insets: Insets,
}

impl NewView {
    /// Leaf over the element's text.
    #[must_use]
    pub fn glyph() -> Self {
        Self {
            shape: Shape::Glyph,
            insets: Insets::ZERO,
        }
    }

    /// Box tiling its children along `major`.
    #[must_use]
    pub fn boxed(major: Axis) -> Self {
        Self {
            shape: Shape::Box(major),
            insets: Insets::ZERO,
        }
    }

    /// Flow wrapping its children into rows with the default text strategy.
    #[must_use]
    pub fn flow() -> Self {
        Self {
            shape: Shape::Flow {
                strategy: None,
                first_line_indent: None,
            },
            insets: Insets::ZERO,
        }
    }

    #[must_use]
    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Replace the flow strategy. Ignored for non-flow views.
    #[must_use]
    pub fn with_strategy(mut self, custom: Box<dyn FlowStrategy>) -> Self {
        if let Shape::Flow { strategy, .. } = &mut self.shape {
            *strategy = Some(custom);
        }
        self
    }

    /// Override the configured first-line indent. Ignored for non-flow views.
    #[must_use]
    pub fn with_first_line_indent(mut self, indent: i32) -> Self {
        if let Shape::Flow {
            first_line_indent, ..
        } = &mut self.shape
        {
            *first_line_indent = Some(indent);
        }
        self
    }
}

impl fmt::Debug for NewView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.shape {
            Shape::Glyph => "glyph".to_owned(),
            Shape::Box(axis) => format!("box({axis})"),
            Shape::Flow { strategy, .. } => {
                if strategy.is_some() {
                    "flow(custom)".to_owned()
                } else {
                    "flow".to_owned()
                }
            }
        };
        f.debug_struct("NewView")
            .field("shape", &shape)
            .field("insets", &self.insets)
            .finish()
    }
}

/// Paragraphs flow, runs and other leaves are glyphs, everything else is a
/// vertical box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicViewFactory;

impl ViewFactory for BasicViewFactory {
    fn create(&self, doc: &dyn Document, element: ElementId) -> NewView {
        match doc.name(element) {
            PARAGRAPH_NAME => NewView::flow(),
            RUN_NAME => NewView::glyph(),
            _ if doc.is_leaf(element) => NewView::glyph(),
            _ => NewView::boxed(Axis::Y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewtree_doc::TextDocument;

    #[test]
    fn basic_factory_shapes() {
        let doc = TextDocument::new("ab");
        let root = doc.default_root();
        let paragraph = doc.paragraphs()[0];
        let run = doc.child(paragraph, 0).expect("run");
        let f = BasicViewFactory;
        assert!(matches!(f.create(&doc, root).shape, Shape::Box(Axis::Y)));
        assert!(matches!(f.create(&doc, paragraph).shape, Shape::Flow { .. }));
        assert!(matches!(f.create(&doc, run).shape, Shape::Glyph));
    }

    #[test]
    fn builders_only_touch_matching_shapes() {
        let v = NewView::glyph().with_first_line_indent(4);
        assert!(matches!(v.shape, Shape::Glyph));
        let v = NewView::flow().with_first_line_indent(4);
        assert!(matches!(
            v.shape,
            Shape::Flow {
                first_line_indent: Some(4),
                ..
            }
        ));
        assert!(format!("{:?}", NewView::boxed(Axis::X)).contains("box(x)"));
    }
}
