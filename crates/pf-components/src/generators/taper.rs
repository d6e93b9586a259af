//! Linear taper.

use pf_cache::{Arg, Args};
use pf_core::pt;
use pf_graph::{ComponentBuilder, Port};
use serde_json::json;

use crate::common::taper_polygon;
use crate::error::ComponentResult;
use crate::session::Session;
use crate::traits::{Generator, Params};

/// Linear width transition from `width1` at `o1` to `width2` at `o2`.
/// `width2` defaults to `width1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Taper;

impl Generator for Taper {
    fn id(&self) -> &str {
        "taper"
    }

    fn defaults(&self) -> Args {
        Args::new()
            .with("length", 10.0)
            .with("width1", 0.5)
            .with("width2", Arg::Null)
            .with("layer", vec![1, 0])
    }

    fn generate(&self, _session: &Session, params: &Params) -> ComponentResult<ComponentBuilder> {
        let length = params.positive("length")?;
        let w1 = params.positive("width1")?;
        let w2 = params.f64_or("width2", w1)?;
        if w2 <= 0.0 {
            return Err(params.invalid("width2", "must be > 0"));
        }
        let layer = params.layer("layer")?;

        let mut b = ComponentBuilder::new(params.name());
        b.add_polygon(taper_polygon(length, w1, w2), layer);
        b.add_port(Port::new("o1", pt(0.0, 0.0), 180.0, w1).with_layer(layer))?;
        b.add_port(Port::new("o2", pt(length, 0.0), 0.0, w2).with_layer(layer))?;
        b.set_setting("path_length", json!(length));
        Ok(b)
    }
}
