//! The accelerator contract.

use crate::intersection::Intersection;
use crate::primitive::Primitive;
use iris_math::Ray;

/// A spatial structure answering nearest-hit queries over a primitive set.
///
/// `build` consumes the primitive list once, before any query; it imposes
/// no ordering on its input beyond what it sorts internally. `trace` is a
/// pure read-only function of the built structure, so a single instance may
/// serve any number of rendering threads concurrently. Building over an
/// empty list must produce a structure that misses everything rather than
/// failing.
pub trait Accelerator: Send + Sync {
    /// Build the structure over the given primitives.
    fn build(primitives: &[Primitive]) -> Self
    where
        Self: Sized;

    /// Nearest intersection along the ray, if any.
    fn trace(&self, ray: &Ray) -> Option<Intersection>;
}

/// Which accelerator a scene should build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceleratorKind {
    /// Median-split bounding volume hierarchy.
    Bvh,
    /// 3x3x3 hierarchical grid.
    Grid,
}
