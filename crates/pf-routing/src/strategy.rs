//! Routing strategy and tuning knobs.

use core::fmt;
use core::str::FromStr;

use pf_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// How lateral jogs are scheduled between the component and the array.
///
/// Always chosen by the caller; the router never switches strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStrategy {
    /// Every route jogs in one shared band.
    #[default]
    Direct,
    /// Even ordinals jog in a near band, odd ordinals in a far band.
    Staggered,
    /// Each jogging route gets its own band, fanned out from the outside in.
    Looped,
}

impl RoutingStrategy {
    /// Numeric routing type: 0 direct, 1 staggered, 2 looped.
    pub fn from_type(value: u8) -> Option<Self> {
        match value {
            0 => Some(RoutingStrategy::Direct),
            1 => Some(RoutingStrategy::Staggered),
            2 => Some(RoutingStrategy::Looped),
            _ => None,
        }
    }

    pub fn type_id(self) -> u8 {
        match self {
            RoutingStrategy::Direct => 0,
            RoutingStrategy::Staggered => 1,
            RoutingStrategy::Looped => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoutingStrategy::Direct => "direct",
            RoutingStrategy::Staggered => "staggered",
            RoutingStrategy::Looped => "looped",
        }
    }
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingStrategy {
    type Err = String;

    /// Accepts the name or the numeric type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(n) = s.parse::<u8>() {
            return RoutingStrategy::from_type(n).ok_or_else(|| format!("unknown routing type {n}"));
        }
        match s.as_str() {
            "direct" => Ok(RoutingStrategy::Direct),
            "staggered" => Ok(RoutingStrategy::Staggered),
            "looped" => Ok(RoutingStrategy::Looped),
            other => Err(format!("unknown routing strategy '{other}'")),
        }
    }
}

/// Geometry limits shared by every route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Radius every bend is drawn with.
    pub bend_radius: Real,
    pub min_bend_radius: Real,
    /// Minimum edge-to-edge gap between routes.
    pub separation: Real,
    /// Length of the width transition to the array mode width.
    pub taper_length: Real,
    /// Straight run before the first jog band.
    pub lead_length: Real,
    /// Straight segments per bend, for geometry and clearance checks.
    pub arc_segments: usize,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            bend_radius: 10.0,
            min_bend_radius: 5.0,
            separation: 2.0,
            taper_length: 10.0,
            lead_length: 10.0,
            arc_segments: 16,
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> RouteResult<()> {
        let invalid = |reason: String| Err(RouteError::InvalidConfig { reason });
        if !(self.bend_radius.is_finite() && self.bend_radius > 0.0) {
            return invalid(format!("bend_radius must be > 0, got {}", self.bend_radius));
        }
        if !(self.min_bend_radius.is_finite() && self.min_bend_radius >= 0.0) {
            return invalid(format!("min_bend_radius must be >= 0, got {}", self.min_bend_radius));
        }
        if !(self.separation.is_finite() && self.separation >= 0.0) {
            return invalid(format!("separation must be >= 0, got {}", self.separation));
        }
        if !(self.taper_length.is_finite() && self.taper_length > 0.0) {
            return invalid(format!("taper_length must be > 0, got {}", self.taper_length));
        }
        if !(self.lead_length.is_finite() && self.lead_length >= 0.0) {
            return invalid(format!("lead_length must be >= 0, got {}", self.lead_length));
        }
        if self.arc_segments == 0 {
            return invalid("arc_segments must be >= 1".to_string());
        }
        Ok(())
    }
}
