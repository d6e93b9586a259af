//! pf-core: stable foundation for photonflow.
//!
//! Contains:
//! - geometry (nalgebra points/vectors, placement transforms, bounding boxes)
//! - numeric (Real + tolerances + grid + fixed-precision rounding)
//! - ids (content fingerprints used as cache keys and name suffixes)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PfError, PfResult};
pub use geometry::*;
pub use ids::Fingerprint;
pub use numeric::*;
