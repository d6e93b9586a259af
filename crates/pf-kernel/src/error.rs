//! Geometry kernel errors.

use thiserror::Error;

use crate::kernel::GeometryHandle;

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Errors reported by a geometry kernel backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Handle was never issued by this kernel.
    #[error("Unknown geometry handle {0}")]
    UnknownHandle(GeometryHandle),

    /// Polygon with fewer than three vertices or non-finite coordinates.
    #[error("Degenerate polygon on layer {layer}: {reason}")]
    DegeneratePolygon { layer: String, reason: &'static str },

    /// Backend failure (serialization, poisoned store, ...).
    #[error("Kernel backend error: {message}")]
    Backend { message: String },
}
