//! Scene query facade.
//!
//! Owns the primitive, material and light tables plus the chosen
//! accelerator, and answers the two queries the renderer needs: nearest
//! hit (`trace`, merging scene geometry with emissive geometry) and shadow
//! segment visibility.

use thiserror::Error;

use crate::accel::{Accelerator, AcceleratorKind};
use crate::bvh::Bvh;
use crate::geometry::Geometry;
use crate::grid::HierarchicalGrid;
use crate::intersection::{nearer, Intersection};
use crate::light::AreaLight;
use crate::material::{Material, MaterialId};
use crate::primitive::Primitive;
use iris_math::Ray;

/// Errors detected while assembling a scene.
///
/// Geometric queries have no error channel; the only thing that can go
/// wrong is inconsistent tables handed in by the loader, and that is
/// rejected here, before anything is built.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("primitive {primitive} references material {material}, but the table holds {count}")]
    MaterialOutOfRange {
        primitive: usize,
        material: MaterialId,
        count: usize,
    },
    #[error("face {face} references vertex {vertex}, but the mesh holds {count} vertices")]
    VertexOutOfRange { face: u32, vertex: u32, count: usize },
}

/// A static scene: geometry tables plus an optional accelerator.
///
/// Built once; all queries afterwards are read-only, so a scene can be
/// shared across rendering threads.
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    lights: Vec<AreaLight>,
    accel: Option<Box<dyn Accelerator>>,
}

impl Scene {
    /// Assemble a scene without an accelerator; `trace` falls back to a
    /// linear scan over the primitives.
    pub fn new(
        primitives: Vec<Primitive>,
        materials: Vec<Material>,
        lights: Vec<AreaLight>,
    ) -> Result<Self, SceneError> {
        validate(&primitives, &materials)?;
        Ok(Self {
            primitives,
            materials,
            lights,
            accel: None,
        })
    }

    /// Assemble a scene and build the requested accelerator over it.
    pub fn with_accelerator(
        primitives: Vec<Primitive>,
        materials: Vec<Material>,
        lights: Vec<AreaLight>,
        kind: AcceleratorKind,
    ) -> Result<Self, SceneError> {
        let mut scene = Self::new(primitives, materials, lights)?;
        log::info!(
            "building {kind:?} accelerator over {} primitives",
            scene.primitives.len()
        );
        scene.accel = Some(match kind {
            AcceleratorKind::Bvh => Box::new(Bvh::build(&scene.primitives)),
            AcceleratorKind::Grid => Box::new(HierarchicalGrid::build(&scene.primitives)),
        });
        Ok(scene)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lights(&self) -> &[AreaLight] {
        &self.lights
    }

    /// Resolve a material index forwarded on a hit record.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id]
    }

    /// Nearest hit along the ray across scene geometry and light geometry.
    ///
    /// Scene geometry goes through the accelerator (or the linear scan when
    /// none was built); emissive triangles are tested in a separate pass
    /// and the overall nearest hit wins. Light hits carry their radiance in
    /// `emission`.
    pub fn trace(&self, ray: &Ray) -> Option<Intersection> {
        let mut nearest = match &self.accel {
            Some(accel) => accel.trace(ray),
            None => self.trace_linear(ray),
        };

        for light in &self.lights {
            if let Some(hit) = light.intersect(ray) {
                nearest = nearer(nearest, hit);
            }
        }

        nearest
    }

    /// Whether the segment `[origin, origin + max_dist * direction)` is
    /// free of scene geometry: any hit strictly closer than `max_dist`
    /// blocks it. Light geometry never blocks.
    pub fn visibility(&self, ray: &Ray, max_dist: f32) -> bool {
        match &self.accel {
            Some(accel) => match accel.trace(ray) {
                Some(hit) => hit.depth >= max_dist,
                None => true,
            },
            None => {
                // Early-exit scan: the first blocking hit settles it.
                for prim in &self.primitives {
                    if let Some(hit) = prim.geometry.intersect(ray) {
                        if hit.depth < max_dist {
                            return false;
                        }
                    }
                }
                true
            }
        }
    }

    /// Reference linear scan over the primitive list.
    fn trace_linear(&self, ray: &Ray) -> Option<Intersection> {
        let mut nearest = None;
        for prim in &self.primitives {
            if let Some(mut hit) = prim.geometry.intersect(ray) {
                hit.material = Some(prim.material);
                nearest = nearer(nearest, hit);
            }
        }
        nearest
    }
}

fn validate(primitives: &[Primitive], materials: &[Material]) -> Result<(), SceneError> {
    for (index, prim) in primitives.iter().enumerate() {
        if prim.material >= materials.len() {
            return Err(SceneError::MaterialOutOfRange {
                primitive: index,
                material: prim.material,
                count: materials.len(),
            });
        }
        if let Geometry::Mesh(mesh) = &prim.geometry {
            let count = mesh.vertices.len();
            for face in &mesh.faces {
                if let Some(&vertex) = face.vertices.iter().find(|&&v| v as usize >= count) {
                    return Err(SceneError::VertexOutOfRange {
                        face: face.id,
                        vertex,
                        count,
                    });
                }
            }
        }
    }
    Ok(())
}
