#![forbid(unsafe_code)]

//! Document model consumed by the viewtree layout engine.
//!
//! The engine reads documents only through the [`Document`] trait and learns
//! about edits through [`DocumentEvent`]s. [`TextDocument`] is an in-memory
//! implementation with a root, paragraphs, and attributed runs.

pub mod attributes;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod text;

pub use attributes::{AttributeValue, Attributes};
pub use document::Document;
pub use element::{ElementId, PARAGRAPH_NAME, ROOT_NAME, RUN_NAME};
pub use error::DocumentError;
pub use event::{DocumentEvent, ElementChange, EventKind};
pub use text::{TextDocument, TextDocumentBuilder};
