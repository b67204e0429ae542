//! Material table values.
//!
//! The tracing core never reads material contents; it only forwards the
//! table index recorded on a primitive. The value record exists so the
//! scene can own the table and hand out references on lookup.

use iris_math::Vec3;

/// Index into the scene's material table.
pub type MaterialId = usize;

/// A Phong-style surface description.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Ambient reflectance (RGB).
    pub ambient: Vec3,
    /// Diffuse reflectance (RGB).
    pub diffuse: Vec3,
    /// Specular reflectance (RGB).
    pub specular: Vec3,
    /// Transmittance (RGB).
    pub transmittance: Vec3,
    /// Specular exponent.
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::new(0.5, 0.5, 0.5), // Grey default
            specular: Vec3::ZERO,
            transmittance: Vec3::ZERO,
            shininess: 1.0,
        }
    }
}

impl Material {
    /// Create a purely diffuse material.
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }
}
