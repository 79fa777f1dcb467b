#![forbid(unsafe_code)]

//! Element identity.

use crate::error::DocumentError;
use std::fmt;

/// Name of the single root element.
pub const ROOT_NAME: &str = "root";
/// Name of paragraph elements (children of the root).
pub const PARAGRAPH_NAME: &str = "paragraph";
/// Name of run elements (leaves, children of paragraphs).
pub const RUN_NAME: &str = "run";

/// Stable identifier for a document element.
///
/// Ids are never reused within one document: an element replaced by an edit
/// keeps its old id only in the change event that removed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Lowest valid element id.
    pub const MIN: Self = Self(1);

    /// Create an element id, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, DocumentError> {
        if raw == 0 {
            return Err(DocumentError::ZeroElementId);
        }
        Ok(Self(raw))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}
