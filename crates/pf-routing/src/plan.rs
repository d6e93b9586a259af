//! Route planning: slot assignment, jog bands and per-route paths.
//!
//! Planning works in the array frame. `s` runs along the travel direction
//! and is zero on the array line; `t` runs along the array axis, so slot `k`
//! sits at `(0, k * pitch)`. Every route runs straight in `s`, except for
//! one lateral jog taken inside its band.

use pf_core::{Real, Tolerances, angle_difference, nearly_equal};
use pf_graph::{Component, Port};
use tracing::debug;

use crate::array::ArraySpec;
use crate::error::{RouteError, RouteResult};
use crate::route::{PathElement, Route, Turn};
use crate::strategy::{RouteConfig, RoutingStrategy};

/// Offsets below this are treated as already aligned.
const ALIGNED: Real = 1e-9;

/// Extent along the travel direction of a jog of lateral size `d` using
/// bends of `radius`: an S-bend up to `2 * radius`, two quarter turns and a
/// straight beyond.
pub fn jog_extent(d: Real, radius: Real) -> Real {
    let d = d.abs();
    if d <= 2.0 * radius {
        2.0 * (radius * d - d * d / 4.0).max(0.0).sqrt()
    } else {
        2.0 * radius
    }
}

/// Largest bend radius whose jog of size `d` fits in `available`.
pub fn max_fitting_radius(d: Real, available: Real) -> Real {
    let d = d.abs();
    if available <= 0.0 {
        0.0
    } else if available <= d {
        available / 2.0
    } else {
        (available * available + d * d) / (4.0 * d)
    }
}

fn jog_elements(d: Real, radius: Real) -> Vec<PathElement> {
    let first = if d > 0.0 { Turn::Left } else { Turn::Right };
    let size = d.abs();
    if size <= 2.0 * radius {
        let angle = (1.0 - size / (2.0 * radius)).clamp(-1.0, 1.0).acos().to_degrees();
        vec![
            PathElement::Bend {
                radius,
                angle,
                turn: first,
            },
            PathElement::Bend {
                radius,
                angle,
                turn: first.opposite(),
            },
        ]
    } else {
        vec![
            PathElement::Bend {
                radius,
                angle: 90.0,
                turn: first,
            },
            PathElement::Straight {
                length: size - 2.0 * radius,
            },
            PathElement::Bend {
                radius,
                angle: 90.0,
                turn: first.opposite(),
            },
        ]
    }
}

/// Per-port facts the band scheduler needs.
#[derive(Debug, Clone)]
struct Leg {
    port: String,
    /// Position along the travel direction, negative.
    s: Real,
    /// Position along the array axis.
    t: Real,
    width: Real,
    taper: Real,
    /// Lateral offset to the assigned slot.
    d: Real,
    extent: Real,
}

impl Leg {
    fn jogs(&self) -> bool {
        self.d.abs() > ALIGNED
    }
}

/// Band index for every leg that jogs.
fn assign_bands(legs: &[Leg], strategy: RoutingStrategy) -> Vec<Option<usize>> {
    match strategy {
        RoutingStrategy::Direct => legs.iter().map(|l| l.jogs().then_some(0)).collect(),
        RoutingStrategy::Staggered => legs
            .iter()
            .enumerate()
            .map(|(i, l)| l.jogs().then_some(i % 2))
            .collect(),
        RoutingStrategy::Looped => {
            let mut bands = vec![None; legs.len()];
            // outermost first: +t movers from the top down, -t movers from
            // the bottom up
            let mut up: Vec<usize> = (0..legs.len()).filter(|&i| legs[i].d > ALIGNED).collect();
            let mut down: Vec<usize> = (0..legs.len()).filter(|&i| legs[i].d < -ALIGNED).collect();
            up.sort_by(|&a, &b| legs[b].t.total_cmp(&legs[a].t).then(a.cmp(&b)));
            down.sort_by(|&a, &b| legs[a].t.total_cmp(&legs[b].t).then(a.cmp(&b)));
            for group in [up, down] {
                for (band, i) in group.into_iter().enumerate() {
                    bands[i] = Some(band);
                }
            }
            bands
        }
    }
}

/// Plan one route per port of `component`.
///
/// Ports are taken in canonical clockwise order, then stably sorted along
/// the array axis; the `i`th port in that order lands on slot `i`. Port
/// insertion order never changes the result.
///
/// Nothing is built; see [`route_to_array`](crate::route_to_array) for the
/// component form.
pub fn plan_routes(
    component: &Component,
    array: &ArraySpec,
    strategy: RoutingStrategy,
    config: &RouteConfig,
) -> RouteResult<Vec<Route>> {
    array.validate()?;
    config.validate()?;

    let mut ports: Vec<Port> = component.ports().sorted_clockwise().iter().cloned().collect();
    ports.sort_by(|a, b| {
        let (_, ta) = array.to_local(&a.center);
        let (_, tb) = array.to_local(&b.center);
        ta.total_cmp(&tb)
    });
    if ports.len() > array.count {
        return Err(RouteError::ArrayTooSmall {
            ports: ports.len(),
            slots: array.count,
        });
    }

    let travel = array.travel();
    let radius = config.bend_radius;
    let mut legs = Vec::with_capacity(ports.len());
    for (slot, p) in ports.iter().enumerate() {
        if angle_difference(p.orientation, travel) > 1e-6 {
            return Err(RouteError::UnroutablePort {
                port: p.name.clone(),
                reason: format!("faces {} but routes leave towards {travel}", p.orientation),
            });
        }
        let (s, t) = array.to_local(&p.center);
        if s >= 0.0 {
            return Err(RouteError::UnroutablePort {
                port: p.name.clone(),
                reason: format!("sits {s} past the array line"),
            });
        }
        let taper = if !nearly_equal(p.width, array.mode_width, Tolerances::default()) {
            config.taper_length
        } else {
            0.0
        };
        let d = slot as Real * array.pitch - t;
        legs.push(Leg {
            port: p.name.clone(),
            s,
            t,
            width: p.width,
            taper,
            d,
            extent: if d.abs() > ALIGNED { jog_extent(d, radius) } else { 0.0 },
        });
    }

    // first band starts past the deepest port, taper included
    let band_start = legs
        .iter()
        .map(|l| l.s + l.taper)
        .fold(Real::NEG_INFINITY, Real::max)
        + config.lead_length;

    for (slot, leg) in legs.iter().enumerate().filter(|(_, l)| l.jogs()) {
        if radius < config.min_bend_radius {
            return Err(RouteError::BendRadiusViolation {
                port: leg.port.clone(),
                slot,
                radius,
                min_radius: config.min_bend_radius,
            });
        }
        if band_start + leg.extent > 0.0 {
            return Err(RouteError::BendRadiusViolation {
                port: leg.port.clone(),
                slot,
                radius: max_fitting_radius(leg.d, -band_start),
                min_radius: config.min_bend_radius,
            });
        }
    }

    let bands = assign_bands(&legs, strategy);
    let band_count = bands.iter().flatten().max().map_or(0, |b| b + 1);
    let mut starts: Vec<Option<Real>> = vec![None; band_count];
    let mut cursor = band_start;
    // deepest leg of the last band laid down, for collision reports
    let mut previous: Option<usize> = None;
    for (band, start) in starts.iter_mut().enumerate() {
        let deepest = (0..legs.len())
            .filter(|&i| bands[i] == Some(band))
            .max_by(|&a, &b| legs[a].extent.total_cmp(&legs[b].extent).then(b.cmp(&a)));
        let Some(deepest) = deepest else {
            continue;
        };
        let depth = legs[deepest].extent;
        if cursor + depth > 0.0 {
            let other = previous.unwrap_or(deepest);
            return Err(RouteError::RouteCollision {
                port: legs[deepest].port.clone(),
                other: legs[other].port.clone(),
                clearance: -cursor,
                required: depth,
            });
        }
        *start = Some(cursor);
        cursor += depth + config.separation;
        previous = Some(deepest);
    }
    debug!(strategy = %strategy, routes = legs.len(), bands = band_count, "planned jog bands");

    let routes = legs
        .into_iter()
        .zip(bands)
        .enumerate()
        .map(|(slot, (leg, band))| {
            let mut elements = Vec::new();
            if leg.taper > 0.0 {
                elements.push(PathElement::Taper {
                    width_start: leg.width,
                    width_end: array.mode_width,
                    length: leg.taper,
                });
            }
            let mut s = leg.s + leg.taper;
            if let Some(jog_at) = band.and_then(|b| starts[b]) {
                push_straight(&mut elements, jog_at - s);
                elements.extend(jog_elements(leg.d, radius));
                s = jog_at + leg.extent;
            }
            push_straight(&mut elements, -s);
            Route {
                port: leg.port,
                slot,
                start: array.to_global(leg.s, leg.t),
                heading: travel,
                width: leg.width,
                layer: array.layer,
                band,
                elements,
            }
        })
        .collect();
    Ok(routes)
}

fn push_straight(elements: &mut Vec<PathElement>, length: Real) {
    if length > ALIGNED {
        elements.push(PathElement::Straight { length });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jog_extent_is_continuous_at_two_radii() {
        let r = 10.0;
        assert!((jog_extent(20.0, r) - 20.0).abs() < 1e-12);
        assert_eq!(jog_extent(25.0, r), 20.0);
        assert_eq!(jog_extent(4.0, r), 12.0);
        assert_eq!(jog_extent(-4.0, r), 12.0);
    }

    #[test]
    fn fitting_radius_inverts_extent() {
        for d in [1.0, 4.0, 15.0, 40.0] {
            for available in [3.0, 12.0, 30.0] {
                let r = max_fitting_radius(d, available);
                if available > d {
                    assert!((jog_extent(d, r) - available).abs() < 1e-9);
                } else {
                    assert!(jog_extent(d, r) <= available + 1e-9);
                }
            }
        }
    }

    #[test]
    fn s_bend_lands_on_offset() {
        for d in [-7.5, -0.1, 3.0, 19.0, 35.0] {
            let elements = jog_elements(d, 10.0);
            let r = Route {
                port: "o1".to_string(),
                slot: 0,
                start: pf_core::pt(0.0, 0.0),
                heading: 0.0,
                width: 0.5,
                layer: pf_kernel::Layer::WG,
                band: Some(0),
                elements,
            };
            let (end, heading) = r.end();
            assert!((end.y - d).abs() < 1e-9, "offset {d} ended at {}", end.y);
            assert!((end.x - jog_extent(d, 10.0)).abs() < 1e-9);
            assert!(angle_difference(heading, 0.0) < 1e-9);
        }
    }
}
