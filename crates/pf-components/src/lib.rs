//! pf-components: parametric generators and the build session.
//!
//! Provides:
//! - The `Generator` trait and resolved `Params`
//! - A standard library: straight, taper, bend_circular, compass, pad, mmi
//! - `Session`, the explicit state object (kernel, cache, library) every
//!   build and combinator runs against
//!
//! Generators are pure functions of their parameters. The session
//! fingerprints each invocation, builds it at most once and shares the
//! sealed component.
//!
//! # Example
//!
//! ```
//! use pf_cache::Args;
//! use pf_components::Session;
//!
//! let session = Session::in_memory();
//! let wg = session
//!     .build("straight", Args::new().with("length", 20.0))
//!     .unwrap();
//! let again = session
//!     .build("straight", Args::new().with("length", 20.0))
//!     .unwrap();
//!
//! assert!(std::sync::Arc::ptr_eq(&wg, &again));
//! assert_eq!(wg.get_ports()[1].center.x, 20.0);
//! ```

pub mod common;
pub mod error;
pub mod generators;
pub mod library;
pub mod session;
pub mod traits;

// Re-exports
pub use error::{ComponentError, ComponentResult};
pub use library::Library;
pub use session::Session;
pub use traits::{FnGenerator, Generator, Params};
