#![forbid(unsafe_code)]

//! Change notifications delivered to the view tree after an edit.

use crate::element::ElementId;

/// What kind of edit produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Insert,
    Remove,
    Change,
}

/// Structural change to one element's child list.
///
/// `removed` children used to occupy `index..index + removed.len()`;
/// `added` now occupy `index..index + added.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementChange {
    pub element: ElementId,
    pub index: usize,
    pub removed: Vec<ElementId>,
    pub added: Vec<ElementId>,
}

/// A document edit as seen by listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEvent {
    kind: EventKind,
    offset: usize,
    length: usize,
    changes: Vec<ElementChange>,
}

impl DocumentEvent {
    #[must_use]
    pub fn new(kind: EventKind, offset: usize, length: usize, changes: Vec<ElementChange>) -> Self {
        Self {
            kind,
            offset,
            length,
            changes,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Start of the edited range.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the edited range.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// End of the edited range (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Structural change recorded for `element`, if any.
    #[must_use]
    pub fn change_for(&self, element: ElementId) -> Option<&ElementChange> {
        self.changes.iter().find(|c| c.element == element)
    }

    /// All structural changes carried by this event.
    #[must_use]
    pub fn changes(&self) -> &[ElementChange] {
        &self.changes
    }
}
