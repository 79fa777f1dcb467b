#![forbid(unsafe_code)]

//! Error taxonomy for layout, hit testing, and reconciliation.

use std::fmt;

/// Failures surfaced synchronously by view-tree operations.
///
/// Every failure is local to the call that raised it; the tree is left in a
/// well-defined (possibly invalidated) state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Axis code is neither X nor Y.
    InvalidAxis { raw: i32 },
    /// Direction code is not one of the four cardinal constants.
    InvalidDirection { raw: i32 },
    /// Child index beyond the current child count.
    IndexOutOfRange { index: usize, len: usize },
    /// Starting offset more than one step outside `[start, end]`.
    OffsetOutOfRange {
        offset: usize,
        start: usize,
        end: usize,
    },
    /// A required allocation was absent.
    NullAllocation { operation: &'static str },
    /// The offset is not represented by any view.
    BadLocation { offset: usize },
    /// A view id that no longer exists in the tree.
    UnknownView { id: u64 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAxis { raw } => write!(f, "invalid axis {raw}"),
            Self::InvalidDirection { raw } => write!(f, "invalid direction {raw}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "child index {index} out of range (len {len})")
            }
            Self::OffsetOutOfRange { offset, start, end } => write!(
                f,
                "offset {offset} out of navigable range [{start}, {end}]"
            ),
            Self::NullAllocation { operation } => {
                write!(f, "{operation}: required allocation is absent")
            }
            Self::BadLocation { offset } => {
                write!(f, "position {offset} not represented by view")
            }
            Self::UnknownView { id } => write!(f, "view {id} does not exist"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Standard result type for view-tree APIs.
pub type Result<T> = std::result::Result<T, LayoutError>;
