//! In-memory geometry kernel.

use std::sync::{Mutex, MutexGuard};

use pf_core::{BBox, Point, Transform};
use serde::Serialize;

use crate::error::{KernelError, KernelResult};
use crate::kernel::{GeometryHandle, GeometryKernel, Layer};

#[derive(Debug, Clone)]
enum Shape {
    Polygon { points: Vec<Point>, layer: Layer },
    Instance { target: GeometryHandle, transform: Transform },
    Group(Vec<GeometryHandle>),
}

/// Flattened polygon used for serialization.
#[derive(Debug, Clone, Serialize)]
struct FlatPolygon {
    layer: Layer,
    points: Vec<[f64; 2]>,
}

/// Reference kernel keeping every shape in a mutex-guarded arena.
///
/// Shapes are append-only; handles index into the arena and stay valid for
/// the kernel's lifetime.
#[derive(Debug, Default)]
pub struct MemoryKernel {
    shapes: Mutex<Vec<Shape>>,
}

impl MemoryKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shapes allocated so far.
    pub fn shape_count(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn lock(&self) -> KernelResult<MutexGuard<'_, Vec<Shape>>> {
        self.shapes.lock().map_err(|_| KernelError::Backend {
            message: "memory kernel store poisoned".to_string(),
        })
    }

    fn push(&self, shape: Shape) -> KernelResult<GeometryHandle> {
        let mut shapes = self.lock()?;
        shapes.push(shape);
        Ok(GeometryHandle(shapes.len() as u64 - 1))
    }

    fn fetch(shapes: &[Shape], handle: GeometryHandle) -> KernelResult<&Shape> {
        shapes
            .get(handle.0 as usize)
            .ok_or(KernelError::UnknownHandle(handle))
    }

    fn flatten(
        shapes: &[Shape],
        handle: GeometryHandle,
        transform: &Transform,
        out: &mut Vec<FlatPolygon>,
    ) -> KernelResult<()> {
        match Self::fetch(shapes, handle)? {
            Shape::Polygon { points, layer } => {
                out.push(FlatPolygon {
                    layer: *layer,
                    points: points
                        .iter()
                        .map(|p| {
                            let q = transform.apply_point(p);
                            [q.x, q.y]
                        })
                        .collect(),
                });
            }
            Shape::Instance {
                target,
                transform: inner,
            } => {
                Self::flatten(shapes, *target, &inner.then(transform), out)?;
            }
            Shape::Group(parts) => {
                for part in parts {
                    Self::flatten(shapes, *part, transform, out)?;
                }
            }
        }
        Ok(())
    }

    fn bbox_of(shapes: &[Shape], handle: GeometryHandle) -> KernelResult<Option<BBox>> {
        match Self::fetch(shapes, handle)? {
            Shape::Polygon { points, .. } => Ok(BBox::from_points(points.iter())),
            Shape::Instance { target, transform } => {
                Ok(Self::bbox_of(shapes, *target)?.map(|b| b.transformed(transform)))
            }
            Shape::Group(parts) => {
                let mut acc: Option<BBox> = None;
                for part in parts {
                    if let Some(b) = Self::bbox_of(shapes, *part)? {
                        acc = Some(match acc {
                            Some(a) => a.union(&b),
                            None => b,
                        });
                    }
                }
                Ok(acc)
            }
        }
    }
}

impl GeometryKernel for MemoryKernel {
    fn name(&self) -> &str {
        "memory"
    }

    fn allocate_polygon(&self, points: &[Point], layer: Layer) -> KernelResult<GeometryHandle> {
        if points.len() < 3 {
            return Err(KernelError::DegeneratePolygon {
                layer: layer.to_string(),
                reason: "polygon needs at least three vertices",
            });
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(KernelError::DegeneratePolygon {
                layer: layer.to_string(),
                reason: "polygon vertex is not finite",
            });
        }
        self.push(Shape::Polygon {
            points: points.to_vec(),
            layer,
        })
    }

    fn instantiate(
        &self,
        target: GeometryHandle,
        transform: &Transform,
    ) -> KernelResult<GeometryHandle> {
        {
            let shapes = self.lock()?;
            Self::fetch(&shapes, target)?;
        }
        self.push(Shape::Instance {
            target,
            transform: *transform,
        })
    }

    fn compose(&self, parts: &[GeometryHandle]) -> KernelResult<GeometryHandle> {
        {
            let shapes = self.lock()?;
            for part in parts {
                Self::fetch(&shapes, *part)?;
            }
        }
        self.push(Shape::Group(parts.to_vec()))
    }

    fn bounding_box(&self, handle: GeometryHandle) -> KernelResult<Option<BBox>> {
        let shapes = self.lock()?;
        Self::bbox_of(&shapes, handle)
    }

    fn serialize(&self, handle: GeometryHandle) -> KernelResult<Vec<u8>> {
        let shapes = self.lock()?;
        let mut flat = Vec::new();
        Self::flatten(&shapes, handle, &Transform::identity(), &mut flat)?;
        serde_json::to_vec(&flat).map_err(|e| KernelError::Backend {
            message: format!("geometry serialization failed: {e}"),
        })
    }
}
