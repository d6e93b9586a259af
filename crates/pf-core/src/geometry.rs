//! Planar geometry: points, orientations and placement transforms.
//!
//! Angles are degrees, counter-clockwise from +x. Rotations by multiples of
//! 90 degrees are computed exactly so that cardinal placements never pick up
//! floating point noise.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::numeric::{Real, round_to_digits};

pub type Point = Point2<Real>;
pub type Vector = Vector2<Real>;

#[inline]
pub fn pt(x: Real, y: Real) -> Point {
    Point::new(x, y)
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_angle(deg: Real) -> Real {
    let a = round_to_digits(deg.rem_euclid(360.0), 9);
    if a >= 360.0 { 0.0 } else { a }
}

/// Smallest absolute difference between two angles, in `[0, 180]`.
pub fn angle_difference(a: Real, b: Real) -> Real {
    let d = normalize_angle(a - b);
    if d > 180.0 { 360.0 - d } else { d }
}

fn quarter_turns(deg: Real) -> Option<u8> {
    let a = normalize_angle(deg);
    let q = a / 90.0;
    if (q - q.round()).abs() < 1e-12 {
        Some((q.round() as u8) % 4)
    } else {
        None
    }
}

/// Unit vector pointing along `deg`.
pub fn direction(deg: Real) -> Vector {
    rotate_vector(&Vector::new(1.0, 0.0), deg)
}

/// Rotate a vector counter-clockwise by `deg`.
pub fn rotate_vector(v: &Vector, deg: Real) -> Vector {
    match quarter_turns(deg) {
        Some(0) => *v,
        Some(1) => Vector::new(-v.y, v.x),
        Some(2) => Vector::new(-v.x, -v.y),
        Some(3) => Vector::new(v.y, -v.x),
        _ => {
            let (s, c) = deg.to_radians().sin_cos();
            Vector::new(c * v.x - s * v.y, s * v.x + c * v.y)
        }
    }
}

/// Placement of a child inside a parent: mirror across the x axis (optional),
/// then rotate, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector,
    pub rotation: Real,
    pub mirror: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector::zeros(),
            rotation: 0.0,
            mirror: false,
        }
    }

    pub fn translate(dx: Real, dy: Real) -> Self {
        Self {
            translation: Vector::new(dx, dy),
            ..Self::identity()
        }
    }

    pub fn rotate(deg: Real) -> Self {
        Self {
            rotation: normalize_angle(deg),
            ..Self::identity()
        }
    }

    pub fn mirror_x() -> Self {
        Self {
            mirror: true,
            ..Self::identity()
        }
    }

    pub fn is_identity(&self) -> bool {
        !self.mirror && self.rotation == 0.0 && self.translation == Vector::zeros()
    }

    pub fn apply_vector(&self, v: &Vector) -> Vector {
        let m = if self.mirror { Vector::new(v.x, -v.y) } else { *v };
        rotate_vector(&m, self.rotation)
    }

    pub fn apply_point(&self, p: &Point) -> Point {
        Point::from(self.apply_vector(&p.coords) + self.translation)
    }

    pub fn apply_angle(&self, deg: Real) -> Real {
        let a = if self.mirror { -deg } else { deg };
        normalize_angle(a + self.rotation)
    }

    /// Compose: apply `self` first, then `outer`.
    pub fn then(&self, outer: &Transform) -> Transform {
        let inner_rotation = if outer.mirror {
            -self.rotation
        } else {
            self.rotation
        };
        Transform {
            translation: outer.apply_point(&Point::from(self.translation)).coords,
            rotation: normalize_angle(outer.rotation + inner_rotation),
            mirror: self.mirror ^ outer.mirror,
        }
    }

    /// Transform that docks a local connection point onto a target one.
    ///
    /// After the transform the local point coincides with `target` and faces
    /// the opposite way to `target_orientation`, so the two connections meet
    /// head-on with no gap.
    pub fn connect(
        local: &Point,
        local_orientation: Real,
        target: &Point,
        target_orientation: Real,
        mirror: bool,
    ) -> Transform {
        let local_angle = if mirror {
            -local_orientation
        } else {
            local_orientation
        };
        let rotation = normalize_angle(target_orientation + 180.0 - local_angle);
        let placed = Transform {
            translation: Vector::zeros(),
            rotation,
            mirror,
        };
        let moved = placed.apply_point(local);
        Transform {
            translation: target - moved,
            ..placed
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BBox {
            min: *first,
            max: *first,
        };
        for p in iter {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min: pt(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: pt(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            pt(self.max.x, self.min.y),
            self.max,
            pt(self.min.x, self.max.y),
        ]
    }

    pub fn transformed(&self, t: &Transform) -> BBox {
        let moved: Vec<Point> = self.corners().iter().map(|c| t.apply_point(c)).collect();
        // four corners always yield a box
        BBox::from_points(moved.iter()).unwrap_or(*self)
    }

    pub fn center(&self) -> Point {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn width(&self) -> Real {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Real {
        self.max.y - self.min.y
    }
}
