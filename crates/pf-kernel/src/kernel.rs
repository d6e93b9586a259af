//! Geometry kernel trait and shared value types.

use core::fmt;

use pf_core::{BBox, Point, Transform};
use serde::{Deserialize, Serialize};

use crate::error::KernelResult;

/// Opaque handle to a shape owned by a geometry kernel.
///
/// Handles are process-local and have no stable serialized form; they must
/// never be used as generator parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub(crate) u64);

impl GeometryHandle {
    /// Wrap a backend-specific id. Only kernel backends should mint handles.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for GeometryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeometryHandle({})", self.0)
    }
}

impl fmt::Display for GeometryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// GDS layer/datatype pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Layer {
    pub layer: u16,
    pub datatype: u16,
}

impl Layer {
    /// Waveguide core.
    pub const WG: Layer = Layer::new(1, 0);
    /// Top metal for pads.
    pub const M3: Layer = Layer::new(49, 0);
    /// Padding/keep-out.
    pub const PADDING: Layer = Layer::new(67, 0);

    pub const fn new(layer: u16, datatype: u16) -> Self {
        Self { layer, datatype }
    }
}

impl Default for Layer {
    fn default() -> Self {
        Layer::WG
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer, self.datatype)
    }
}

/// Trait for geometry kernels.
///
/// Implementations must be thread-safe (Send + Sync): distinct components are
/// built concurrently and all of them allocate shapes through one kernel.
pub trait GeometryKernel: Send + Sync {
    /// Kernel name (for debugging/logging).
    fn name(&self) -> &str;

    /// Store a closed polygon on `layer`.
    fn allocate_polygon(&self, points: &[Point], layer: Layer) -> KernelResult<GeometryHandle>;

    /// Place an existing shape under a transform.
    fn instantiate(&self, target: GeometryHandle, transform: &Transform)
    -> KernelResult<GeometryHandle>;

    /// Aggregate several shapes into one handle (a component's full geometry).
    ///
    /// An empty slice yields an empty shape.
    fn compose(&self, parts: &[GeometryHandle]) -> KernelResult<GeometryHandle>;

    /// Bounding box of a shape; `None` for empty geometry.
    fn bounding_box(&self, handle: GeometryHandle) -> KernelResult<Option<BBox>>;

    /// Serialize a shape for persistence.
    fn serialize(&self, handle: GeometryHandle) -> KernelResult<Vec<u8>>;
}
