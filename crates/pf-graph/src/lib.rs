//! pf-graph: component/reference model for photonflow.
//!
//! Provides:
//! - Ports and ordered port sets with the canonical clockwise ordering
//! - Sealed, shareable components and placed references
//! - `ComponentBuilder`, the only mutable stage of a component, with
//!   insertion-time cycle detection
//! - Hierarchy helpers (dependency order, netlist extraction)
//!
//! # Example
//!
//! ```
//! use pf_core::pt;
//! use pf_graph::{ComponentBuilder, Port};
//! use pf_kernel::{Layer, MemoryKernel};
//!
//! let kernel = MemoryKernel::new();
//! let mut builder = ComponentBuilder::new("wg");
//! builder.add_polygon(vec![pt(0.0, -0.25), pt(10.0, -0.25), pt(10.0, 0.25), pt(0.0, 0.25)], Layer::WG);
//! builder.add_port(Port::new("o1", pt(0.0, 0.0), 180.0, 0.5)).unwrap();
//! builder.add_port(Port::new("o2", pt(10.0, 0.0), 0.0, 0.5)).unwrap();
//! let wg = builder.build(&kernel).unwrap();
//!
//! assert_eq!(wg.get_ports().len(), 2);
//! ```

pub mod builder;
pub mod component;
pub mod error;
pub mod hierarchy;
pub mod port;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::ComponentBuilder;
pub use component::{Component, Reference, Settings};
pub use error::{ModelError, ModelResult};
pub use hierarchy::{Netlist, NetlistInstance, Placement, dependency_order, netlist};
pub use port::{Port, PortSet, Side, SignalKind};
