#![forbid(unsafe_code)]

//! viewtree public facade crate.
//!
//! Re-exports the engine crates, a prelude of everyday types, and
//! [`TextView`], which owns a tree over a [`TextDocument`] together with its
//! allocation so hosts do not have to thread both through every call.

use std::fmt;

mod text_view;

pub use text_view::TextView;

// --- Core re-exports -------------------------------------------------------

pub use viewtree_core::{Axis, Bias, Direction, Insets, LayoutConfig, LayoutError, Rect};

// --- Layout re-exports -----------------------------------------------------

pub use viewtree_layout::{INFINITE, Placement, SizeRequirements};

// --- Document re-exports ---------------------------------------------------

pub use viewtree_doc::{
    Attributes, Document, DocumentError, DocumentEvent, ElementId, EventKind, TextDocument,
};

// --- View re-exports -------------------------------------------------------

pub use viewtree_view::{
    BasicViewFactory, DisplayList, FlowStrategy, MonospaceMetrics, NewView, PaintOp, PaintSink,
    TextMetrics, ViewFactory, ViewId, ViewTree, ViewType,
};

// --- Errors ---------------------------------------------------------------

/// Error from either the view tree or the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Layout(LayoutError),
    Document(DocumentError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Document(err) => Some(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

/// Standard result type for facade APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Axis, BasicViewFactory, Bias, Direction, Error, LayoutConfig, LayoutError, Rect, Result,
        SizeRequirements, TextDocument, TextView, ViewTree,
    };

    pub use crate::{core, doc, layout, view};
}

pub use viewtree_core as core;
pub use viewtree_doc as doc;
pub use viewtree_layout as layout;
pub use viewtree_view as view;
