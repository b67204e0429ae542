//! Indexed triangle mesh.
//!
//! A mesh is a deduplicated vertex buffer plus a face list. Faces store
//! vertex indices, a precomputed geometric normal and a stable id; the
//! triangle view of a face (and with it the face's only bounding box) is
//! produced by one constructor path, so mesh-level and triangle-level boxes
//! cannot diverge.

use crate::intersection::{nearer, Intersection};
use crate::triangle::Triangle;
use iris_math::{Aabb, Ray, Vec3};

/// One triangular face of a mesh.
#[derive(Clone, Debug)]
pub struct Face {
    /// Indices into the mesh vertex buffer.
    pub vertices: [u32; 3],
    /// Precomputed geometric normal (unit length).
    pub normal: Vec3,
    /// Stable face identifier, reported on hits.
    pub id: u32,
}

/// A triangle mesh with a shared, deduplicated vertex buffer.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
    bounds: Aabb,
}

impl Mesh {
    /// Create a mesh from a vertex buffer and prebuilt faces.
    ///
    /// The mesh box is seeded from the first vertex and grown with the
    /// rest; an empty vertex buffer leaves the degenerate default box.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        let bounds = match vertices.split_first() {
            Some((first, rest)) => {
                let mut bb = Aabb::from_point(*first);
                for v in rest {
                    bb.grow(*v);
                }
                bb
            }
            None => Aabb::default(),
        };

        Self {
            vertices,
            faces,
            bounds,
        }
    }

    /// Create a mesh from raw index triples, computing face normals and
    /// assigning sequential face ids.
    pub fn from_indices(vertices: Vec<Vec3>, indices: &[[u32; 3]]) -> Self {
        let faces = indices
            .iter()
            .enumerate()
            .map(|(id, idx)| {
                let p0 = vertices[idx[0] as usize];
                let p1 = vertices[idx[1] as usize];
                let p2 = vertices[idx[2] as usize];
                Face {
                    vertices: *idx,
                    normal: (p1 - p0).cross(p2 - p0).normalize(),
                    id: id as u32,
                }
            })
            .collect();
        Self::new(vertices, faces)
    }

    /// Bounding box covering every vertex.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// The triangle view of one face, carrying its normal and id.
    pub fn face_triangle(&self, face: &Face) -> Triangle {
        Triangle::with_normal(
            self.vertices[face.vertices[0] as usize],
            self.vertices[face.vertices[1] as usize],
            self.vertices[face.vertices[2] as usize],
            face.normal,
        )
        .with_face_id(face.id)
    }

    /// Flatten the mesh into per-face triangles.
    ///
    /// This is the explicit expansion operation the accelerator builders
    /// invoke; they never inspect mesh internals themselves.
    pub fn triangles(&self) -> Vec<Triangle> {
        self.faces.iter().map(|f| self.face_triangle(f)).collect()
    }

    /// Nearest-hit test by linear scan over all faces.
    ///
    /// Intentionally O(faces) after the mesh-box reject; the accelerators
    /// exist to replace this scan with sublinear descent.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        if !self.bounds.hit(ray) {
            return None;
        }

        let mut nearest = None;
        for face in &self.faces {
            if let Some(hit) = self.face_triangle(face).intersect(ray) {
                nearest = nearer(nearest, hit);
            }
        }
        nearest
    }
}
