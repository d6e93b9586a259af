//! pf-kernel: geometry kernel contract and an in-memory backend.
//!
//! The layout core never stores polygons itself. Every shape lives behind a
//! [`GeometryHandle`] issued by a [`GeometryKernel`]; components only hold the
//! handle. [`MemoryKernel`] is the reference backend used by the CLI and the
//! test-suite; production deployments plug in a real boolean/GDS kernel.

pub mod error;
pub mod kernel;
pub mod memory;

// Re-exports
pub use error::{KernelError, KernelResult};
pub use kernel::{GeometryHandle, GeometryKernel, Layer};
pub use memory::MemoryKernel;
