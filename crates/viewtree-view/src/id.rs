#![forbid(unsafe_code)]

//! View identity.

use std::fmt;

/// Stable identifier for a view in a [`ViewTree`](crate::ViewTree) arena.
///
/// Ids are allocated monotonically and never reused, so a stale id is
/// detected instead of silently aliasing a newer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

impl ViewId {
    /// Lowest valid view id.
    pub const MIN: Self = Self(1);

    /// Wrap a raw value, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Deterministic allocator for [`ViewId`]s.
#[derive(Debug, Clone)]
pub(crate) struct ViewIdAllocator {
    next: ViewId,
}

impl Default for ViewIdAllocator {
    fn default() -> Self {
        Self { next: ViewId::MIN }
    }
}

impl ViewIdAllocator {
    /// Allocate the next id and advance.
    pub(crate) fn allocate(&mut self) -> ViewId {
        let current = self.next;
        self.next = ViewId(current.0.saturating_add(1));
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(ViewId::new(0), None);
        assert_eq!(ViewId::new(7).map(ViewId::get), Some(7));
    }

    #[test]
    fn allocator_is_monotonic() {
        let mut alloc = ViewIdAllocator::default();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(a, ViewId::MIN);
        assert!(b > a);
    }
}
