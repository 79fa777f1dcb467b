#![forbid(unsafe_code)]

use std::fmt;

/// Failures raised by document edits and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The range `[offset, offset + length)` is outside the document.
    BadLocation { offset: usize, length: usize },
    /// Element ids are non-zero.
    ZeroElementId,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLocation { offset, length } => {
                write!(f, "invalid document range: offset {offset}, length {length}")
            }
            Self::ZeroElementId => f.write_str("element id must be non-zero"),
        }
    }
}

impl std::error::Error for DocumentError {}
