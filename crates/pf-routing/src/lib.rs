//! pf-routing: connect component ports to a periodic external array.
//!
//! - `array`: `ArraySpec`, the slot geometry
//! - `strategy`: `RoutingStrategy` (direct, staggered, looped) and `RouteConfig`
//! - `plan`: slot assignment and jog scheduling (`plan_routes`)
//! - `route`: `Route`/`PathElement` and realization as a component
//! - `collision`: pairwise clearance checks
//! - `router`: `route_to_array`, the cached combinator
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pf_components::Session;
//! use pf_core::pt;
//! use pf_graph::{ComponentBuilder, Port};
//! use pf_routing::{ArraySpec, RouteConfig, RoutingStrategy, route_to_array};
//!
//! let session = Session::in_memory();
//! let mut b = ComponentBuilder::new("emitter");
//! b.add_port(Port::new("o1", pt(0.0, 0.0), 0.0, 0.5)).unwrap();
//! let emitter = Arc::new(b.build(session.kernel()).unwrap());
//!
//! // one slot 100 um east of the port, facing back at it
//! let array = ArraySpec::new(pt(100.0, 0.0), 127.0, 1, 180.0);
//! let routed = route_to_array(
//!     &session,
//!     &emitter,
//!     &array,
//!     RoutingStrategy::Direct,
//!     &RouteConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(routed.port("slot0").unwrap().center, pt(100.0, 0.0));
//! assert!(routed.port("o1").is_none());
//! ```

pub mod array;
pub mod collision;
pub mod error;
pub mod plan;
pub mod route;
pub mod router;
pub mod strategy;

pub use array::ArraySpec;
pub use collision::{check_clearance, polyline_distance};
pub use error::{RouteError, RouteResult};
pub use plan::{jog_extent, max_fitting_radius, plan_routes};
pub use route::{PathElement, Route, Turn};
pub use router::route_to_array;
pub use strategy::{RouteConfig, RoutingStrategy};
