//! Iris tracing core - nearest-hit queries over triangulated surfaces.
//!
//! This crate answers one question: for an arbitrary ray, what is the
//! nearest surface it hits, and what geometric/material data describes that
//! hit? It provides:
//!
//! - **Geometry**: `Triangle`, `Mesh` and the `Geometry` variant over them
//! - **Accelerators**: a median-split BVH and a 3x3x3 hierarchical grid,
//!   both behind the `Accelerator` contract
//! - **Scene facade**: `Scene`, which owns the primitive and material
//!   tables, merges accelerator hits with area-light hits, and answers
//!   `trace` / `visibility` queries
//!
//! Structures are build-once, trace-many: construction is single-threaded
//! and must finish before the first query; a built structure is immutable,
//! so any number of threads may trace against it concurrently.

mod accel;
mod bvh;
mod geometry;
mod grid;
mod intersection;
mod light;
mod material;
mod mesh;
mod primitive;
mod scene;
mod triangle;

pub use accel::{Accelerator, AcceleratorKind};
pub use bvh::{Bvh, PrimitiveBvh};
pub use geometry::Geometry;
pub use grid::HierarchicalGrid;
pub use intersection::Intersection;
pub use light::AreaLight;
pub use material::{Material, MaterialId};
pub use mesh::{Face, Mesh};
pub use primitive::Primitive;
pub use scene::{Scene, SceneError};
pub use triangle::Triangle;

/// Re-export common math types from iris_math
pub use iris_math::{Aabb, Ray, Vec3};
