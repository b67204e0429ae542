use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// The direction is not required to be unit length; parametric distances
/// returned by intersection tests are measured in multiples of it. Primary
/// rays may carry the pixel they were generated for, which is used purely
/// for debugging and attribution.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Pixel coordinates this ray was spawned from, if any.
    pub pixel: Option<(u32, u32)>,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            pixel: None,
        }
    }

    /// Create a ray tagged with the pixel it belongs to.
    pub fn with_pixel(origin: Vec3, direction: Vec3, pixel: (u32, u32)) -> Self {
        Self {
            origin,
            direction,
            pixel: Some(pixel),
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_at_scales_with_direction() {
        // Parametric distance is in multiples of the direction, unit or not.
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(ray.at(0.5), Vec3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn test_ray_pixel_tag() {
        let ray = Ray::with_pixel(Vec3::ZERO, Vec3::Z, (12, 34));
        assert_eq!(ray.pixel, Some((12, 34)));
        assert_eq!(Ray::new(Vec3::ZERO, Vec3::Z).pixel, None);
    }
}
