//! Planned routes and their realization as components.

use std::sync::Arc;

use pf_cache::{Arg, Args, CacheError, fingerprint};
use pf_components::Session;
use pf_core::{Point, Real, Transform, direction, normalize_angle, pt};
use pf_graph::{Component, ComponentBuilder, Port};
use pf_kernel::Layer;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::RouteResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Turn {
    Left,
    Right,
}

impl Turn {
    pub fn opposite(self) -> Turn {
        match self {
            Turn::Left => Turn::Right,
            Turn::Right => Turn::Left,
        }
    }
}

/// One piece of a route, in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PathElement {
    Straight {
        length: Real,
    },
    /// Circular arc; `angle` in degrees, always positive.
    Bend {
        radius: Real,
        angle: Real,
        turn: Turn,
    },
    Taper {
        width_start: Real,
        width_end: Real,
        length: Real,
    },
}

impl PathElement {
    /// Centreline length.
    pub fn length(&self) -> Real {
        match self {
            PathElement::Straight { length } | PathElement::Taper { length, .. } => *length,
            PathElement::Bend { radius, angle, .. } => radius * angle.to_radians(),
        }
    }

    /// Advance `(position, heading)` over this element, pushing `segments`
    /// samples per bend (one sample for straight pieces) onto `out`.
    fn walk(&self, at: &mut (Point, Real), segments: usize, out: &mut Vec<Point>) {
        let (p, heading) = *at;
        match *self {
            PathElement::Straight { length } | PathElement::Taper { length, .. } => {
                let end = p + direction(heading) * length;
                out.push(end);
                *at = (end, heading);
            }
            PathElement::Bend {
                radius,
                angle,
                turn,
            } => {
                let sign = match turn {
                    Turn::Left => 1.0,
                    Turn::Right => -1.0,
                };
                let center = p + direction(heading + sign * 90.0) * radius;
                // angle of the start point as seen from the centre
                let a0 = heading - sign * 90.0;
                let n = segments.max(1);
                for i in 1..=n {
                    let a = a0 + sign * angle * i as Real / n as Real;
                    out.push(center + direction(a) * radius);
                }
                let end = center + direction(a0 + sign * angle) * radius;
                *at = (end, normalize_angle(heading + sign * angle));
            }
        }
    }
}

/// Path from one source port to one array slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub port: String,
    pub slot: usize,
    /// Source port centre.
    pub start: Point,
    /// Initial travel direction, degrees.
    pub heading: Real,
    /// Width at the source port.
    pub width: Real,
    pub layer: Layer,
    /// Jog band, `None` when the route runs straight.
    pub band: Option<usize>,
    pub elements: Vec<PathElement>,
}

impl Route {
    pub fn length(&self) -> Real {
        self.elements.iter().map(PathElement::length).sum()
    }

    /// Width after the last taper.
    pub fn end_width(&self) -> Real {
        self.elements
            .iter()
            .rev()
            .find_map(|e| match e {
                PathElement::Taper { width_end, .. } => Some(*width_end),
                _ => None,
            })
            .unwrap_or(self.width)
    }

    /// Widest point of the route.
    pub fn max_width(&self) -> Real {
        self.width.max(self.end_width())
    }

    /// Final position and heading.
    pub fn end(&self) -> (Point, Real) {
        let mut at = (self.start, self.heading);
        let mut sink = Vec::new();
        for e in &self.elements {
            e.walk(&mut at, 1, &mut sink);
        }
        at
    }

    /// Centreline polyline, bends sampled with `segments` pieces each.
    pub fn centerline(&self, segments: usize) -> Vec<Point> {
        let mut at = (self.start, self.heading);
        let mut points = vec![self.start];
        for e in &self.elements {
            e.walk(&mut at, segments, &mut points);
        }
        points
    }

    /// Smallest bend radius used, if the route bends at all.
    pub fn min_radius(&self) -> Option<Real> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                PathElement::Bend { radius, .. } => Some(*radius),
                _ => None,
            })
            .reduce(Real::min)
    }

    /// Where the realized route component goes in the parent.
    pub fn placement(&self) -> Transform {
        Transform::connect(&pt(0.0, 0.0), 180.0, &self.start, self.heading, false)
    }

    /// Build this route as a component in its own frame: `o1` at the origin
    /// facing west, elements chained along +x, `o2` at the far end.
    ///
    /// Routes of identical shape share one cached component.
    pub fn realize(&self, session: &Session, arc_segments: usize) -> RouteResult<Arc<Component>> {
        let layer = vec![self.layer.layer, self.layer.datatype];
        let elements = self
            .elements
            .iter()
            .map(|e| serde_json::to_value(e).map(Arg::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(CacheError::from)?;
        let key = Args::new()
            .with("width", self.width)
            .with("layer", layer.clone())
            .with("npoints", arc_segments)
            .with("elements", Arg::List(elements));
        let fp = fingerprint("route", &key)?;
        let name = format!("route_{}", fp.short());

        session.cached(fp, &name, || {
            let mut b = ComponentBuilder::new(name.as_str());
            b.add_port(Port::new("o1", pt(0.0, 0.0), 180.0, self.width).with_layer(self.layer))?;

            let mut at = (pt(0.0, 0.0), 0.0);
            let mut width = self.width;
            for e in &self.elements {
                let (generator, args, mirror) = match *e {
                    PathElement::Straight { length } => (
                        "straight",
                        Args::new().with("length", length).with("width", width),
                        false,
                    ),
                    PathElement::Bend {
                        radius,
                        angle,
                        turn,
                    } => (
                        "bend_circular",
                        Args::new()
                            .with("radius", radius)
                            .with("angle", angle)
                            .with("width", width)
                            .with("npoints", arc_segments),
                        turn == Turn::Right,
                    ),
                    PathElement::Taper {
                        width_start,
                        width_end,
                        length,
                    } => {
                        width = width_end;
                        (
                            "taper",
                            Args::new()
                                .with("length", length)
                                .with("width1", width_start)
                                .with("width2", width_end),
                            false,
                        )
                    }
                };
                let piece = session.build(generator, args.with("layer", layer.clone()))?;
                let input = piece.require_port("o1")?;
                let t = Transform::connect(&input.center, input.orientation, &at.0, at.1, mirror);
                let output = piece.require_port("o2")?.transformed(&t);
                b.add_ref(piece, t)?;
                at = (output.center, output.orientation);
            }

            b.add_port(Port::new("o2", at.0, at.1, width).with_layer(self.layer))?;
            b.set_setting("elements", serde_json::to_value(&self.elements).map_err(CacheError::from)?);
            b.set_setting("length", json!(self.length()));
            Ok(b)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).norm() < 1e-9
    }

    fn route(elements: Vec<PathElement>) -> Route {
        Route {
            port: "o1".to_string(),
            slot: 0,
            start: pt(0.0, 0.0),
            heading: 0.0,
            width: 0.5,
            layer: Layer::WG,
            band: None,
            elements,
        }
    }

    #[test]
    fn quarter_bends_walk_exactly() {
        let r = route(vec![
            PathElement::Bend {
                radius: 10.0,
                angle: 90.0,
                turn: Turn::Left,
            },
            PathElement::Straight { length: 5.0 },
            PathElement::Bend {
                radius: 10.0,
                angle: 90.0,
                turn: Turn::Right,
            },
        ]);
        let (end, heading) = r.end();
        assert!(close(end, pt(20.0, 25.0)));
        assert_eq!(heading, 0.0);
        assert!((r.length() - (5.0 + 10.0 * std::f64::consts::PI)).abs() < 1e-12);
        assert_eq!(r.centerline(4).len(), 1 + 4 + 1 + 4);
        assert_eq!(r.min_radius(), Some(10.0));
    }

    #[test]
    fn realized_route_matches_plan() {
        let s = Session::in_memory();
        let r = Route {
            start: pt(3.0, 4.0),
            heading: 90.0,
            ..route(vec![
                PathElement::Taper {
                    width_start: 0.5,
                    width_end: 1.0,
                    length: 10.0,
                },
                PathElement::Bend {
                    radius: 10.0,
                    angle: 30.0,
                    turn: Turn::Right,
                },
                PathElement::Bend {
                    radius: 10.0,
                    angle: 30.0,
                    turn: Turn::Left,
                },
            ])
        };
        let c = r.realize(&s, 8).unwrap();
        let t = r.placement();
        let o1 = c.port("o1").unwrap().transformed(&t);
        let o2 = c.port("o2").unwrap().transformed(&t);
        let (end, heading) = r.end();
        assert!(close(o1.center, r.start));
        assert_eq!(o1.orientation, 270.0);
        assert!((o2.center - end).norm() < 1e-9);
        assert_eq!(o2.orientation, heading);
        assert_eq!(o2.width, 1.0);
        assert_eq!(c.references().len(), 3);
    }
}
