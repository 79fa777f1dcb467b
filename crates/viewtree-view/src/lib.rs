#![forbid(unsafe_code)]

//! Box-model view tree over a [`Document`](viewtree_doc::Document).
//!
//! Views live in a [`ViewTree`] arena and are addressed by [`ViewId`]. Each
//! view covers a contiguous range of the document:
//!
//! | Type | Children | Layout |
//! |------|----------|--------|
//! | Box | one view per child element | tiled on the major axis, aligned on the other |
//! | Flow | rows rebuilt from a layout pool | vertical tiling of rows |
//! | Row | pool views or fragments of them | horizontal tiling on a shared baseline |
//! | Glyph | none | measured through [`TextMetrics`] |
//!
//! # Example
//!
//! ```
//! use viewtree_core::{Bias, LayoutConfig, Rect};
//! use viewtree_doc::TextDocument;
//! use viewtree_view::{MonospaceMetrics, ViewTree};
//!
//! let doc = TextDocument::new("hello world");
//! let mut tree = ViewTree::new(doc, MonospaceMetrics::default(), LayoutConfig::default());
//! let root = tree.build_root().unwrap();
//!
//! let alloc = Rect::from_size(48, 100);
//! tree.layout(root, alloc.width, alloc.height).unwrap();
//! let caret = tree.model_to_view(root, 6, Some(alloc), Some(Bias::Forward)).unwrap();
//! assert_eq!((caret.x, caret.y), (0, 16)); // "world" wrapped to the second row
//! ```

pub mod factory;
pub mod flow;
pub mod glyph;
pub mod hit;
pub mod id;
pub mod layout;
pub mod metrics;
pub mod navigation;
pub mod node;
pub mod paint;
pub mod tree;
pub mod update;

pub use factory::{BasicViewFactory, NewView, ViewFactory};
pub use flow::{FlowHost, FlowStrategy, TextFlowStrategy};
pub use hit::{AxisHitTest, HitTest};
pub use id::ViewId;
pub use metrics::{MonospaceMetrics, TextMetrics};
pub use navigation::VisualPosition;
pub use node::{AxisSet, ViewType};
pub use paint::{DisplayList, PaintOp, PaintSink};
pub use tree::{LayoutStats, ViewTree};
