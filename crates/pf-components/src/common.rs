//! Shared geometry helpers for generators.

use pf_core::{Point, Real, Vector, direction, pt};

/// Axis-aligned rectangle as a counter-clockwise polygon.
pub fn rect(x0: Real, y0: Real, x1: Real, y1: Real) -> Vec<Point> {
    vec![pt(x0, y0), pt(x1, y0), pt(x1, y1), pt(x0, y1)]
}

/// Rectangle of size `w` x `h` centred on the origin.
pub fn centered_rect(w: Real, h: Real) -> Vec<Point> {
    rect(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
}

/// Straight taper from width `w1` at `x = 0` to `w2` at `x = length`,
/// centred on the x axis.
pub fn taper_polygon(length: Real, w1: Real, w2: Real) -> Vec<Point> {
    vec![
        pt(0.0, -w1 / 2.0),
        pt(length, -w2 / 2.0),
        pt(length, w2 / 2.0),
        pt(0.0, w1 / 2.0),
    ]
}

/// Point on a left-turning arc that starts at the origin heading +x.
///
/// The arc centre is `(0, radius)`; `angle` is the swept angle in degrees.
/// Quarter turns land exactly on grid.
pub fn arc_point(radius: Real, angle: Real) -> Point {
    let v: Vector = direction(angle - 90.0) * radius;
    pt(v.x, radius + v.y)
}

/// Waveguide polygon following the left-turning arc of `radius` swept by
/// `angle` degrees, sampled with `segments` straight pieces.
pub fn arc_polygon(radius: Real, angle: Real, width: Real, segments: usize) -> Vec<Point> {
    let segments = segments.max(1);
    let outer = radius + width / 2.0;
    let inner = radius - width / 2.0;
    let sample = |r: Real, a: Real| {
        let v: Vector = direction(a - 90.0) * r;
        pt(v.x, radius + v.y)
    };
    let mut points = Vec::with_capacity(2 * (segments + 1));
    for i in 0..=segments {
        let a = angle * i as Real / segments as Real;
        points.push(sample(inner, a));
    }
    for i in (0..=segments).rev() {
        let a = angle * i as Real / segments as Real;
        points.push(sample(outer, a));
    }
    points
}

/// Evenly spaced offsets centred on zero, ascending.
pub fn centered_offsets(count: usize, pitch: Real) -> Vec<Real> {
    let mid = (count as Real - 1.0) / 2.0;
    (0..count).map(|i| (i as Real - mid) * pitch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_arc_is_exact() {
        assert_eq!(arc_point(10.0, 90.0), pt(10.0, 10.0));
        assert_eq!(arc_point(10.0, 180.0), pt(0.0, 20.0));
        assert_eq!(arc_point(10.0, 0.0), pt(0.0, 0.0));
    }

    #[test]
    fn arc_polygon_has_both_edges() {
        let poly = arc_polygon(10.0, 90.0, 0.5, 8);
        assert_eq!(poly.len(), 18);
        assert_eq!(poly[0], pt(0.0, 0.25));
        assert_eq!(poly[17], pt(0.0, -0.25));
    }

    #[test]
    fn offsets_are_symmetric() {
        assert_eq!(centered_offsets(3, 2.0), vec![-2.0, 0.0, 2.0]);
        assert_eq!(centered_offsets(2, 1.0), vec![-0.5, 0.5]);
        assert!(centered_offsets(0, 1.0).is_empty());
    }
}
