#![forbid(unsafe_code)]

//! Core: geometry primitives, the shared error type, and logging shims.

pub mod error;
pub mod geometry;
pub mod logging;

pub use error::{Error, Result};
pub use geometry::{Anchor, AttrValue, Bounded, Dim, Point, Rect, RectAttr, Size};

// Re-export tracing macros at crate root so dependents write `tessel_core::debug!`.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn};
