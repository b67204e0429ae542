//! Triangle primitive and its ray / box tests.
//!
//! Ray intersection uses the Moller-Trumbore algorithm; box overlap (used by
//! the grid builder) is a full separating-axis test.

use crate::intersection::Intersection;
use iris_math::{Aabb, Ray, Vec3};

/// Determinant / distance tolerance for the Moller-Trumbore test. A ray
/// whose determinant falls inside this band is parallel to the triangle
/// plane and reported as a miss, and hits at `t <= EPSILON` (behind or
/// exactly at the origin) are rejected.
const EPSILON: f32 = 1e-6;

/// Flip a normal so it points to the same side of the surface as `wo`.
fn faceforward(normal: Vec3, wo: Vec3) -> Vec3 {
    if normal.dot(wo) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// A triangle, immutable after construction.
///
/// The geometric normal, the two edges out of `v0` and the bounding box are
/// computed once in the constructor. The box is seeded from `v0` and grown
/// with the other two vertices; it is the only per-triangle box there is,
/// and the intersection test pre-rejects against it.
#[derive(Clone, Debug)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// Geometric normal (unit length).
    pub normal: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    bounds: Aabb,
    face_id: Option<u32>,
}

impl Triangle {
    /// Create a triangle from three vertices, computing the normal.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        Self::with_normal(v0, v1, v2, normal)
    }

    /// Create a triangle with a precomputed normal (e.g. a mesh face normal).
    pub fn with_normal(v0: Vec3, v1: Vec3, v2: Vec3, normal: Vec3) -> Self {
        let mut bounds = Aabb::from_point(v0);
        bounds.grow(v1);
        bounds.grow(v2);

        Self {
            v0,
            v1,
            v2,
            normal,
            edge1: v1 - v0,
            edge2: v2 - v0,
            bounds,
            face_id: None,
        }
    }

    /// Tag the triangle with the id of the mesh face it came from.
    pub fn with_face_id(mut self, id: u32) -> Self {
        self.face_id = Some(id);
        self
    }

    /// Bounding box covering the three vertices.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Vertex centroid, the sort key for BVH median splits.
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Triangle area via Heron's formula.
    pub fn area(&self) -> f32 {
        let a = self.edge1.length();
        let b = self.edge2.length();
        let c = (self.v2 - self.v1).length();
        let s = (a + b + c) / 2.0;
        (s * (s - a) * (s - b) * (s - c)).sqrt()
    }

    /// Moller-Trumbore ray-triangle intersection.
    ///
    /// Hits exactly at the boundary follow the documented inequalities:
    /// `u` and `v` at 0 and `u + v` at 1 are accepted, anything outside is
    /// rejected. The normal on the returned record is facefowarded toward
    /// the outgoing direction.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        if !self.bounds.hit(ray) {
            return None;
        }

        let pvec = ray.direction.cross(self.edge2);
        let det = self.edge1.dot(pvec);

        // Ray is parallel to the triangle plane
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.v0;
        let u = inv_det * s.dot(pvec);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = s.cross(self.edge1);
        let v = inv_det * ray.direction.dot(qvec);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * self.edge2.dot(qvec);
        if t <= EPSILON {
            return None;
        }

        let wo = -ray.direction;
        let normal = faceforward(self.normal, wo);
        Some(Intersection {
            point: ray.at(t),
            geometric_normal: normal,
            shading_normal: normal,
            wo,
            depth: t,
            material: None,
            face_id: self.face_id,
            emission: None,
        })
    }

    /// Separating-axis triangle/box overlap test.
    ///
    /// Axes tested: the three box face normals (as a componentwise bounds
    /// reject), the triangle normal, and the nine edge x axis cross
    /// products. Used by the grid builder to replicate a triangle into
    /// every subcell it touches.
    pub fn overlaps(&self, bb: &Aabb) -> bool {
        // Box face normals reduce to a componentwise interval check.
        let tri_min = self.v0.min(self.v1).min(self.v2);
        let tri_max = self.v0.max(self.v1).max(self.v2);
        if tri_max.x < bb.min.x
            || tri_min.x > bb.max.x
            || tri_max.y < bb.min.y
            || tri_min.y > bb.max.y
            || tri_max.z < bb.min.z
            || tri_min.z > bb.max.z
        {
            return false;
        }

        let corners = [
            Vec3::new(bb.min.x, bb.min.y, bb.min.z),
            Vec3::new(bb.max.x, bb.min.y, bb.min.z),
            Vec3::new(bb.min.x, bb.max.y, bb.min.z),
            Vec3::new(bb.max.x, bb.max.y, bb.min.z),
            Vec3::new(bb.min.x, bb.min.y, bb.max.z),
            Vec3::new(bb.max.x, bb.min.y, bb.max.z),
            Vec3::new(bb.min.x, bb.max.y, bb.max.z),
            Vec3::new(bb.max.x, bb.max.y, bb.max.z),
        ];
        let edges = [self.v1 - self.v0, self.v2 - self.v1, self.v0 - self.v2];
        let box_normals = [Vec3::X, Vec3::Y, Vec3::Z];

        let separated = |axis: Vec3| {
            let (mut tri_lo, mut tri_hi) = (f32::INFINITY, f32::NEG_INFINITY);
            for v in [self.v0, self.v1, self.v2] {
                let d = v.dot(axis);
                tri_lo = tri_lo.min(d);
                tri_hi = tri_hi.max(d);
            }
            let (mut box_lo, mut box_hi) = (f32::INFINITY, f32::NEG_INFINITY);
            for c in corners {
                let d = c.dot(axis);
                box_lo = box_lo.min(d);
                box_hi = box_hi.max(d);
            }
            tri_hi < box_lo || tri_lo > box_hi
        };

        if separated(edges[0].cross(edges[1])) {
            return false;
        }
        for edge in edges {
            for normal in box_normals {
                if separated(edge.cross(normal)) {
                    return false;
                }
            }
        }

        true
    }
}
