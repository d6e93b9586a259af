//! Circular bend.

use pf_cache::Args;
use pf_core::pt;
use pf_graph::{ComponentBuilder, Port};
use serde_json::json;

use crate::common::{arc_point, arc_polygon};
use crate::error::ComponentResult;
use crate::session::Session;
use crate::traits::{Generator, Params};

/// Left-turning circular arc.
///
/// `o1` sits at the origin facing west; `o2` ends the arc facing `angle`.
/// Right turns are a mirrored reference of this component.
#[derive(Debug, Default, Clone, Copy)]
pub struct BendCircular;

impl Generator for BendCircular {
    fn id(&self) -> &str {
        "bend_circular"
    }

    fn defaults(&self) -> Args {
        Args::new()
            .with("radius", 10.0)
            .with("angle", 90.0)
            .with("width", 0.5)
            .with("npoints", 16)
            .with("layer", vec![1, 0])
    }

    fn generate(&self, _session: &Session, params: &Params) -> ComponentResult<ComponentBuilder> {
        let radius = params.positive("radius")?;
        let angle = params.positive("angle")?;
        if angle > 180.0 {
            return Err(params.invalid("angle", "must be in (0, 180]"));
        }
        let width = params.positive("width")?;
        if width >= 2.0 * radius {
            return Err(params.invalid("width", "must be smaller than the bend diameter"));
        }
        let npoints = params.usize("npoints")?.max(2);
        let layer = params.layer("layer")?;

        let mut b = ComponentBuilder::new(params.name());
        b.add_polygon(arc_polygon(radius, angle, width, npoints), layer);
        b.add_port(Port::new("o1", pt(0.0, 0.0), 180.0, width).with_layer(layer))?;
        b.add_port(Port::new("o2", arc_point(radius, angle), angle, width).with_layer(layer))?;
        b.set_setting("path_length", json!(radius * angle.to_radians()));
        Ok(b)
    }
}
