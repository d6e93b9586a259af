//! Built-in containers.
//!
//! Each function returns a [`ContainerFn`]; run it through
//! [`containerize`](crate::containerize) or [`container`](crate::container).

use std::sync::Arc;

use pf_cache::{Arg, Args};
use pf_components::Params;
use pf_components::common::rect;
use pf_core::{Transform, Vector};
use pf_graph::{Component, ComponentBuilder};
use pf_kernel::Layer;

use crate::container::ContainerFn;
use crate::error::ComposeResult;

fn layer_of(arg: &Arg) -> Option<Layer> {
    match arg {
        Arg::Str(s) => s
            .split_once('/')
            .and_then(|(l, d)| Some(Layer::new(l.trim().parse().ok()?, d.trim().parse().ok()?))),
        Arg::List(items) => match items.as_slice() {
            [l, d] => Some(Layer::new(
                u16::try_from(l.as_i64()?).ok()?,
                u16::try_from(d.as_i64()?).ok()?,
            )),
            _ => None,
        },
        _ => None,
    }
}

/// Wrap `source` in a single reference placed by `t`; ports follow the
/// transform.
fn placed(name: &str, source: &Arc<Component>, t: Transform) -> ComposeResult<ComponentBuilder> {
    let mut b = ComponentBuilder::new(name);
    b.add_ref(Arc::clone(source), t)?;
    b.replace_ports(source.ports().transformed(&t));
    Ok(b)
}

/// Keep-out rectangle around the source's bounding box.
///
/// `default` is the margin on every side; `top`, `bottom`, `left` and
/// `right` override it per side. One rectangle is drawn on each entry of
/// `layers`. Ports are inherited unchanged.
pub fn add_padding() -> ContainerFn {
    let defaults = Args::new()
        .with("default", 50.0)
        .with("top", Arg::Null)
        .with("bottom", Arg::Null)
        .with("left", Arg::Null)
        .with("right", Arg::Null)
        .with("layers", Arg::List(vec![Arg::from(vec![67, 0])]));
    ContainerFn::new(
        "add_padding",
        defaults,
        |session, source: &Arc<Component>, params: &Params| {
            let d = params.f64("default")?;
            let top = params.f64_or("top", d)?;
            let bottom = params.f64_or("bottom", d)?;
            let left = params.f64_or("left", d)?;
            let right = params.f64_or("right", d)?;
            let layers = params
                .get("layers")
                .and_then(Arg::as_list)
                .ok_or_else(|| params.invalid("layers", "expected a list of layers"))?
                .iter()
                .map(|a| {
                    layer_of(a).ok_or_else(|| {
                        params.invalid("layers", "expected [layer, datatype] or \"layer/datatype\"")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut b = ComponentBuilder::new(params.name());
            b.add_ref(Arc::clone(source), Transform::identity())?;
            if let Some(bbox) = source.bbox(session.kernel())? {
                let (x0, y0) = (bbox.min.x - left, bbox.min.y - bottom);
                let (x1, y1) = (bbox.max.x + right, bbox.max.y + top);
                if x1 <= x0 || y1 <= y0 {
                    return Err(params.invalid("default", "padding leaves an empty box").into());
                }
                for layer in layers {
                    b.add_polygon(rect(x0, y0, x1, y1), layer);
                }
            }
            Ok(b)
        },
    )
}

/// Rotate the source counter-clockwise by `angle` degrees about the origin.
pub fn rotate() -> ContainerFn {
    ContainerFn::new(
        "rotate",
        Args::new().with("angle", 90.0),
        |_session, source: &Arc<Component>, params: &Params| {
            let angle = params.f64("angle")?;
            placed(params.name(), source, Transform::rotate(angle))
        },
    )
}

/// Mirror the source. `axis = "y"` flips left/right (x -> -x), `axis = "x"`
/// flips up/down (y -> -y).
pub fn mirror() -> ContainerFn {
    ContainerFn::new(
        "mirror",
        Args::new().with("axis", "y"),
        |_session, source: &Arc<Component>, params: &Params| {
            let t = match params.str("axis")? {
                "x" => Transform::mirror_x(),
                // mirror across x then half a turn is a flip across y
                "y" => Transform {
                    rotation: 180.0,
                    ..Transform::mirror_x()
                },
                other => {
                    return Err(params
                        .invalid("axis", format!("expected \"x\" or \"y\", got \"{other}\""))
                        .into());
                }
            };
            placed(params.name(), source, t)
        },
    )
}

/// Translate the source by `(dx, dy)`.
pub fn move_by() -> ContainerFn {
    ContainerFn::new(
        "move",
        Args::new().with("dx", 0.0).with("dy", 0.0),
        |_session, source: &Arc<Component>, params: &Params| {
            let t = Transform {
                translation: Vector::new(params.f64("dx")?, params.f64("dy")?),
                ..Transform::identity()
            };
            placed(params.name(), source, t)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerOverrides, containerize};
    use pf_components::Session;
    use pf_core::pt;

    fn run(s: &Session, c: &ContainerFn, source: &Arc<Component>, args: Args) -> Arc<Component> {
        containerize(s, Some(source), c, args, &ContainerOverrides::default()).unwrap()
    }

    #[test]
    fn rotate_quarter_turn_moves_ports() {
        let s = Session::in_memory();
        let wg = s.build("straight", Args::new()).unwrap();
        let r = run(&s, &rotate(), &wg, Args::new());
        let o2 = r.port("o2").unwrap();
        assert_eq!(o2.center, pt(0.0, 10.0));
        assert_eq!(o2.orientation, 90.0);
        assert_eq!(r.get_settings()["angle"], serde_json::json!(90.0));
    }

    #[test]
    fn mirror_y_flips_left_right() {
        let s = Session::in_memory();
        let wg = s.build("straight", Args::new()).unwrap();
        let m = run(&s, &mirror(), &wg, Args::new());
        let o2 = m.port("o2").unwrap();
        assert!((o2.center - pt(-10.0, 0.0)).norm() < 1e-9);
        assert_eq!(o2.orientation, 180.0);

        let bad = containerize(
            &s,
            Some(&wg),
            &mirror(),
            Args::new().with("axis", "z"),
            &ContainerOverrides::default(),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn move_by_translates() {
        let s = Session::in_memory();
        let wg = s.build("straight", Args::new()).unwrap();
        let moved = run(&s, &move_by(), &wg, Args::new().with("dx", 5.0).with("dy", -2.0));
        assert_eq!(moved.port("o1").unwrap().center, pt(5.0, -2.0));
    }

    #[test]
    fn padding_grows_bbox_and_keeps_ports() {
        let s = Session::in_memory();
        let wg = s.build("straight", Args::new()).unwrap();
        let padded = run(&s, &add_padding(), &wg, Args::new().with("default", 5.0).with("top", 1.0));
        let bbox = padded.bbox(s.kernel()).unwrap().unwrap();
        assert_eq!(bbox.min, pt(-5.0, -5.25));
        assert_eq!(bbox.max, pt(15.0, 1.25));
        assert_eq!(padded.ports(), wg.ports());
    }
}
