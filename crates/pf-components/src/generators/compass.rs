//! Rectangles with one port per side.

use pf_cache::Args;
use pf_core::pt;
use pf_graph::{ComponentBuilder, Port, SignalKind};
use pf_kernel::Layer;

use crate::common::centered_rect;
use crate::error::ComponentResult;
use crate::session::Session;
use crate::traits::{Generator, Params};

fn compass_builder(
    id: &str,
    w: f64,
    h: f64,
    layer: Layer,
    kind: SignalKind,
) -> ComponentResult<ComponentBuilder> {
    let mut b = ComponentBuilder::new(id);
    b.add_polygon(centered_rect(w, h), layer);
    let ports = [
        ("e1", pt(-w / 2.0, 0.0), 180.0, h),
        ("e2", pt(0.0, h / 2.0), 90.0, w),
        ("e3", pt(w / 2.0, 0.0), 0.0, h),
        ("e4", pt(0.0, -h / 2.0), 270.0, w),
    ];
    for (name, center, orientation, width) in ports {
        b.add_port(
            Port::new(name, center, orientation, width)
                .with_kind(kind)
                .with_layer(layer),
        )?;
    }
    Ok(b)
}

fn size(params: &Params) -> ComponentResult<(f64, f64)> {
    let (w, h) = params.pair("size")?;
    if !(w > 0.0 && h > 0.0) {
        return Err(params.invalid("size", "both sides must be > 0"));
    }
    Ok((w, h))
}

/// Centred rectangle with ports `e1` (west), `e2` (north), `e3` (east) and
/// `e4` (south).
#[derive(Debug, Default, Clone, Copy)]
pub struct Compass;

impl Generator for Compass {
    fn id(&self) -> &str {
        "compass"
    }

    fn defaults(&self) -> Args {
        Args::new()
            .with("size", vec![4.0, 2.0])
            .with("layer", vec![1, 0])
            .with("port_type", "placement")
    }

    fn generate(&self, _session: &Session, params: &Params) -> ComponentResult<ComponentBuilder> {
        let (w, h) = size(params)?;
        let kind = params
            .str("port_type")?
            .parse::<SignalKind>()
            .map_err(|e| params.invalid("port_type", e))?;
        compass_builder(params.name(), w, h, params.layer("layer")?, kind)
    }
}

/// Electrical pad: a compass on the top metal layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pad;

impl Generator for Pad {
    fn id(&self) -> &str {
        "pad"
    }

    fn defaults(&self) -> Args {
        Args::new()
            .with("size", vec![100.0, 100.0])
            .with("layer", vec![49, 0])
    }

    fn generate(&self, _session: &Session, params: &Params) -> ComponentResult<ComponentBuilder> {
        let (w, h) = size(params)?;
        compass_builder(
            params.name(),
            w,
            h,
            params.layer("layer")?,
            SignalKind::Electrical,
        )
    }
}
