//! pf-compose: combinators deriving new components from existing ones.
//!
//! - `container`: wrap a source component, inheriting its ports, settings and
//!   provenance (`containerize`, `container`)
//! - `transforms`: built-in containers (`add_padding`, `rotate`, `mirror`,
//!   `move_by`)
//! - `extend`: attach a sub-component to selected ports (`extend_ports`)
//!
//! Every combinator output is cached through the session like a generator
//! output, so repeating a call returns the same component.

pub mod container;
pub mod error;
pub mod extend;
pub mod transforms;

pub use container::{ContainerFn, ContainerOverrides, container, containerize};
pub use error::{ComposeError, ComposeResult};
pub use extend::{PortSelect, SubFactory, extend_ports};
pub use transforms::{add_padding, mirror, move_by, rotate};
