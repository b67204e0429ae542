//! Hit record produced by ray-geometry intersection tests.

use crate::material::MaterialId;
use iris_math::Vec3;

/// Record of the nearest intersection found along a ray.
#[derive(Clone, Debug)]
pub struct Intersection {
    /// Point of intersection.
    pub point: Vec3,
    /// Geometric normal, facefowarded toward `wo`.
    pub geometric_normal: Vec3,
    /// Shading normal (identical to the geometric normal for now).
    pub shading_normal: Vec3,
    /// Outgoing direction, back toward the ray origin.
    pub wo: Vec3,
    /// Parametric distance of the hit along the ray.
    pub depth: f32,
    /// Index into the scene's material table. None until an accelerator or
    /// the scene resolves it; geometry tests never fill this in themselves.
    pub material: Option<MaterialId>,
    /// Identifier of the mesh face that was hit, if the geometry carries one.
    pub face_id: Option<u32>,
    /// Emitted radiance, present only when the hit is on light geometry.
    pub emission: Option<Vec3>,
}

impl Intersection {
    /// Whether this hit landed on light geometry rather than scene geometry.
    pub fn is_light(&self) -> bool {
        self.emission.is_some()
    }
}

/// Fold a candidate hit into the running nearest hit.
///
/// Every traversal in this crate composes results the same way: first hit
/// wins, later hits replace it only when strictly closer.
pub(crate) fn nearer(
    current: Option<Intersection>,
    candidate: Intersection,
) -> Option<Intersection> {
    match current {
        Some(best) if best.depth <= candidate.depth => Some(best),
        _ => Some(candidate),
    }
}
