//! Pairwise clearance between planned routes.

use pf_core::{Point, Real};
use rayon::prelude::*;

use crate::error::{RouteError, RouteResult};
use crate::route::Route;

fn point_segment_distance(p: &Point, a: &Point, b: &Point) -> Real {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

fn cross(o: &Point, a: &Point, b: &Point) -> Real {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn segments_cross(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn segment_distance(a: &Point, b: &Point, c: &Point, d: &Point) -> Real {
    if segments_cross(a, b, c, d) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

/// Smallest distance between two polylines.
pub fn polyline_distance(a: &[Point], b: &[Point]) -> Real {
    let mut best = Real::INFINITY;
    for sa in a.windows(2) {
        for sb in b.windows(2) {
            best = best.min(segment_distance(&sa[0], &sa[1], &sb[0], &sb[1]));
        }
    }
    best
}

/// Centreline distance each pair of routes must keep.
pub fn required_clearance(a: &Route, b: &Route, separation: Real) -> Real {
    (a.max_width() + b.max_width()) / 2.0 + separation
}

/// Fail on the first pair (in ordinal order) whose centrelines come closer
/// than [`required_clearance`].
pub fn check_clearance(routes: &[Route], separation: Real, segments: usize) -> RouteResult<()> {
    let lines: Vec<Vec<Point>> = routes.par_iter().map(|r| r.centerline(segments)).collect();
    let pairs: Vec<(usize, usize)> = (0..routes.len())
        .flat_map(|i| (i + 1..routes.len()).map(move |j| (i, j)))
        .collect();
    let violation = pairs
        .par_iter()
        .filter_map(|&(i, j)| {
            let clearance = polyline_distance(&lines[i], &lines[j]);
            let required = required_clearance(&routes[i], &routes[j], separation);
            (clearance < required - 1e-9).then_some((i, j, clearance, required))
        })
        // first in ordinal order regardless of scheduling
        .min_by_key(|&(i, j, ..)| (i, j));
    match violation {
        Some((i, j, clearance, required)) => Err(RouteError::RouteCollision {
            port: routes[i].port.clone(),
            other: routes[j].port.clone(),
            clearance,
            required,
        }),
        None => Ok(()),
    }
}
