#![forbid(unsafe_code)]

//! Core: geometry, axes and bias, the error taxonomy, configuration, and
//! logging shared by the viewtree crates.

pub mod axis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;

pub use axis::{Axis, Bias, Direction};
pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use geometry::{Insets, Rect};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
