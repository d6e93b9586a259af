//! Periodic external interface array.

use pf_core::{Point, Real, Vector, direction, normalize_angle, pt};
use pf_graph::SignalKind;
use pf_kernel::Layer;
use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// One-dimensional array of equally spaced slots.
///
/// Slot `k` sits at `origin + k * pitch * axis`, where `axis` points along
/// `orientation - 90`. Every slot faces `orientation`, toward the component;
/// routes therefore travel along `orientation + 180`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArraySpec {
    pub origin: Point,
    pub pitch: Real,
    pub count: usize,
    pub orientation: Real,
    /// Waveguide width the slots expect.
    pub mode_width: Real,
    pub kind: SignalKind,
    pub layer: Layer,
}

impl Default for ArraySpec {
    /// Eight fibres at 127 um below the component.
    fn default() -> Self {
        Self::new(pt(0.0, 0.0), 127.0, 8, 90.0)
    }
}

impl ArraySpec {
    pub fn new(origin: Point, pitch: Real, count: usize, orientation: Real) -> Self {
        Self {
            origin,
            pitch,
            count,
            orientation: normalize_angle(orientation),
            mode_width: 0.5,
            kind: SignalKind::Optical,
            layer: Layer::WG,
        }
    }

    pub fn with_mode_width(mut self, width: Real) -> Self {
        self.mode_width = width;
        self
    }

    pub fn with_kind(mut self, kind: SignalKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Direction routes travel in, degrees.
    pub fn travel(&self) -> Real {
        normalize_angle(self.orientation + 180.0)
    }

    /// Unit vector from slot `k` to slot `k + 1`.
    pub fn axis(&self) -> Vector {
        direction(self.orientation - 90.0)
    }

    pub fn slot(&self, k: usize) -> Point {
        self.origin + self.axis() * (k as Real * self.pitch)
    }

    pub fn slots(&self) -> Vec<Point> {
        (0..self.count).map(|k| self.slot(k)).collect()
    }

    /// Array frame coordinates of `p`: distance along the travel direction
    /// (negative before the array line) and position along the axis.
    pub fn to_local(&self, p: &Point) -> (Real, Real) {
        let rel = p - self.origin;
        (rel.dot(&direction(self.travel())), rel.dot(&self.axis()))
    }

    pub fn to_global(&self, s: Real, t: Real) -> Point {
        self.origin + direction(self.travel()) * s + self.axis() * t
    }

    pub fn validate(&self) -> RouteResult<()> {
        let invalid = |reason: String| Err(RouteError::InvalidArray { reason });
        if self.count == 0 {
            return invalid("count must be >= 1".to_string());
        }
        if !(self.pitch.is_finite() && self.pitch > 0.0) {
            return invalid(format!("pitch must be > 0, got {}", self.pitch));
        }
        if !(self.mode_width.is_finite() && self.mode_width > 0.0) {
            return invalid(format!("mode_width must be > 0, got {}", self.mode_width));
        }
        if !(self.origin.x.is_finite() && self.origin.y.is_finite() && self.orientation.is_finite())
        {
            return invalid("origin and orientation must be finite".to_string());
        }
        Ok(())
    }
}
