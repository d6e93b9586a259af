//! N x M multimode interferometer.

use pf_cache::Args;
use pf_core::{Transform, pt};
use pf_graph::{ComponentBuilder, ModelError};

use crate::common::{centered_offsets, rect};
use crate::error::ComponentResult;
use crate::session::Session;
use crate::traits::{Generator, Params};

/// Rectangular multimode section with `inputs` tapered access waveguides on
/// the west side and `outputs` on the east side.
///
/// Ports are numbered clockwise from the lower-left: west ports bottom to
/// top, then east ports top to bottom (a 1x2 has `o1` in, `o2` upper out,
/// `o3` lower out).
#[derive(Debug, Default, Clone, Copy)]
pub struct Mmi;

impl Generator for Mmi {
    fn id(&self) -> &str {
        "mmi"
    }

    fn defaults(&self) -> Args {
        Args::new()
            .with("inputs", 1)
            .with("outputs", 2)
            .with("width", 0.5)
            .with("width_taper", 1.0)
            .with("length_taper", 10.0)
            .with("length_mmi", 5.5)
            .with("width_mmi", 2.5)
            .with("gap_mmi", 0.25)
            .with("layer", vec![1, 0])
    }

    fn generate(&self, session: &Session, params: &Params) -> ComponentResult<ComponentBuilder> {
        let inputs = params.usize("inputs")?;
        let outputs = params.usize("outputs")?;
        if inputs == 0 {
            return Err(params.invalid("inputs", "must be >= 1"));
        }
        if outputs == 0 {
            return Err(params.invalid("outputs", "must be >= 1"));
        }
        let width = params.positive("width")?;
        let width_taper = params.positive("width_taper")?;
        let length_taper = params.positive("length_taper")?;
        let length_mmi = params.positive("length_mmi")?;
        let width_mmi = params.positive("width_mmi")?;
        let gap = params.f64("gap_mmi")?;
        if gap < 0.0 {
            return Err(params.invalid("gap_mmi", "must be >= 0"));
        }
        let layer = params.layer("layer")?;

        let pitch = width_taper + gap;
        let needed = (inputs.max(outputs) as f64 - 1.0) * pitch + width_taper;
        if needed > width_mmi {
            return Err(params.invalid(
                "width_mmi",
                format!("{width_mmi} cannot fit access waveguides spanning {needed}"),
            ));
        }

        let taper = session.build(
            "taper",
            Args::new()
                .with("length", length_taper)
                .with("width1", width)
                .with("width2", width_taper)
                .with("layer", vec![layer.layer, layer.datatype]),
        )?;
        let wide = taper.require_port("o2")?.clone();

        let mut b = ComponentBuilder::new(params.name());
        b.add_polygon(
            rect(0.0, -width_mmi / 2.0, length_mmi, width_mmi / 2.0),
            layer,
        );

        let mut index = 1;
        let west = centered_offsets(inputs, pitch);
        let mut east = centered_offsets(outputs, pitch);
        east.reverse();
        for (x, facing, offsets) in [(0.0, 180.0, west), (length_mmi, 0.0, east)] {
            for y in offsets {
                let t = Transform::connect(&wide.center, wide.orientation, &pt(x, y), facing, false);
                let r = b.add_ref(taper.clone(), t)?;
                let port = b.references()[r]
                    .port("o1")
                    .ok_or_else(|| ModelError::UnknownPort {
                        component: taper.name().to_string(),
                        port: "o1".to_string(),
                    })?;
                b.add_port(port.renamed(format!("o{index}")))?;
                index += 1;
            }
        }
        Ok(b)
    }
}
