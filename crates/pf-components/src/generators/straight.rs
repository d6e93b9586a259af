//! Straight waveguide.

use pf_cache::Args;
use pf_core::pt;
use pf_graph::{ComponentBuilder, Port};
use serde_json::json;

use crate::common::rect;
use crate::error::ComponentResult;
use crate::session::Session;
use crate::traits::{Generator, Params};

/// Straight section from `o1` at the origin (facing west) to `o2` at
/// `(length, 0)` (facing east).
#[derive(Debug, Default, Clone, Copy)]
pub struct Straight;

impl Generator for Straight {
    fn id(&self) -> &str {
        "straight"
    }

    fn defaults(&self) -> Args {
        Args::new()
            .with("length", 10.0)
            .with("width", 0.5)
            .with("layer", vec![1, 0])
    }

    fn generate(&self, _session: &Session, params: &Params) -> ComponentResult<ComponentBuilder> {
        let length = params.f64("length")?;
        if length < 0.0 {
            return Err(params.invalid("length", "must be >= 0"));
        }
        let width = params.positive("width")?;
        let layer = params.layer("layer")?;

        let mut b = ComponentBuilder::new(params.name());
        if length > 0.0 {
            b.add_polygon(rect(0.0, -width / 2.0, length, width / 2.0), layer);
        }
        b.add_port(Port::new("o1", pt(0.0, 0.0), 180.0, width).with_layer(layer))?;
        b.add_port(Port::new("o2", pt(length, 0.0), 0.0, width).with_layer(layer))?;
        b.set_setting("path_length", json!(length));
        Ok(b)
    }
}
