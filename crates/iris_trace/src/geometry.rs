//! Tagged geometry variant.
//!
//! Builders and the scene query geometry through this enum; mesh expansion
//! is reached by matching the variant and calling the mesh's own
//! `triangles()`, never by runtime type inspection.

use crate::intersection::Intersection;
use crate::mesh::Mesh;
use crate::triangle::Triangle;
use iris_math::{Aabb, Ray};

/// Geometry a primitive can carry: a bare triangle or an indexed mesh.
#[derive(Clone, Debug)]
pub enum Geometry {
    Triangle(Triangle),
    Mesh(Mesh),
}

impl Geometry {
    /// Bounding box of the underlying shape.
    pub fn bounds(&self) -> Aabb {
        match self {
            Geometry::Triangle(tri) => tri.bounds(),
            Geometry::Mesh(mesh) => mesh.bounds(),
        }
    }

    /// Nearest-hit test against the underlying shape.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Geometry::Triangle(tri) => tri.intersect(ray),
            Geometry::Mesh(mesh) => mesh.intersect(ray),
        }
    }
}

impl From<Triangle> for Geometry {
    fn from(tri: Triangle) -> Self {
        Geometry::Triangle(tri)
    }
}

impl From<Mesh> for Geometry {
    fn from(mesh: Mesh) -> Self {
        Geometry::Mesh(mesh)
    }
}
