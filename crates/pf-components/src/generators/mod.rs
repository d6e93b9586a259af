//! Standard generator library.

pub mod bend;
pub mod compass;
pub mod mmi;
pub mod straight;
pub mod taper;

pub use bend::BendCircular;
pub use compass::{Compass, Pad};
pub use mmi::Mmi;
pub use straight::Straight;
pub use taper::Taper;
