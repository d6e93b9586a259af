//! Routing errors.

use pf_cache::CacheError;
use pf_components::ComponentError;
use pf_graph::ModelError;
use pf_kernel::KernelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    /// More ports than array slots.
    #[error("Array has {slots} slots but {ports} ports need routing")]
    ArrayTooSmall { ports: usize, slots: usize },

    /// A jog cannot be drawn with a legal bend radius.
    ///
    /// `radius` is the radius available to the route.
    #[error(
        "Route from port '{port}' to slot {slot} fits bends of radius at most {radius} (minimum {min_radius})"
    )]
    BendRadiusViolation {
        port: String,
        slot: usize,
        radius: f64,
        min_radius: f64,
    },

    /// Two routes come closer than their widths plus the separation margin.
    #[error("Routes from '{port}' and '{other}' are {clearance} apart, need {required}")]
    RouteCollision {
        port: String,
        other: String,
        clearance: f64,
        required: f64,
    },

    /// The port does not face the array or sits past it.
    #[error("Port '{port}' cannot be routed: {reason}")]
    UnroutablePort { port: String, reason: String },

    #[error("Invalid array: {reason}")]
    InvalidArray { reason: String },

    #[error("Invalid routing config: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

pub type RouteResult<T> = Result<T, RouteError>;
