//! Emissive geometry tested by the scene's merge pass.

use crate::intersection::Intersection;
use crate::triangle::Triangle;
use iris_math::{Ray, Vec3};

/// An area light: a triangle that emits radiance.
///
/// Lights live outside the accelerators; the scene intersects them in a
/// separate pass and keeps whichever hit is nearest overall.
#[derive(Clone, Debug)]
pub struct AreaLight {
    pub triangle: Triangle,
    /// Emitted radiance (RGB).
    pub radiance: Vec3,
}

impl AreaLight {
    pub fn new(triangle: Triangle, radiance: Vec3) -> Self {
        Self { triangle, radiance }
    }

    /// Nearest-hit test against the light geometry; hits carry the emitted
    /// radiance so the merge pass can tag them.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let mut hit = self.triangle.intersect(ray)?;
        hit.emission = Some(self.radiance);
        Some(hit)
    }
}
