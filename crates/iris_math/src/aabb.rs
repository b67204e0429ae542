use crate::{Ray, Vec3};

/// Tolerance used by [`Aabb::contains`]; downstream membership tests are
/// floating-point approximate.
const CONTAINS_EPSILON: f32 = 1e-4;

/// Axis-aligned bounding box for spatial acceleration structures.
///
/// The box is the componentwise `[min, max]` volume. It is built by seeding
/// from a first point or box and growing with the rest; every node builder
/// follows that contract. A degenerate box (min == max, e.g. a single point)
/// is a valid state and all queries stay well defined on it. The default box
/// sits at the origin and is degenerate; it must be seeded before `center`
/// or the ray tests mean anything.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from explicit corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Seed a box from a single point (degenerate until grown).
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the box to include a point. No-op if the point is inside.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow the box to the componentwise union with another box.
    /// Idempotent: merging a box it already covers changes nothing.
    pub fn grow_aabb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Componentwise extent.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index (0=X, 1=Y, 2=Z) of the axis with the largest extent.
    /// Ties break toward X, then Y.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Slab test: does the ray's line, at t >= entry of every axis slab,
    /// pass through the box? Touching a face or an edge counts as a hit.
    pub fn hit(&self, ray: &Ray) -> bool {
        self.hit_span(ray).is_some()
    }

    /// Slab test returning the entry/exit parametric distances.
    ///
    /// A zero direction component divides to an infinite inverse; the
    /// resulting +-inf distances order correctly through the swap below, so
    /// axis-aligned rays need no special casing. The one hazard is
    /// `0 * inf = NaN` when the origin sits exactly on a slab plane of a
    /// parallel ray; `f32::max`/`f32::min` ignore NaN operands, which leaves
    /// that axis unconstrained. Both behaviors are pinned by unit tests.
    pub fn hit_span(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some((t_near, t_far))
    }

    /// Bounds check with a small per-axis tolerance.
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x - CONTAINS_EPSILON
            && p.x <= self.max.x + CONTAINS_EPSILON
            && p.y >= self.min.y - CONTAINS_EPSILON
            && p.y <= self.max.y + CONTAINS_EPSILON
            && p.z >= self.min.z - CONTAINS_EPSILON
            && p.z <= self.max.z + CONTAINS_EPSILON
    }
}
