//! Hierarchical grid accelerator.
//!
//! Fixed 3x3x3 subdivision down to a fixed maximum depth. Triangles are
//! replicated into every subcell they overlap (separating-axis test), so a
//! triangle spanning several cells is found no matter which cell the ray
//! descends into. Cells live in an arena and reference triangles by index
//! into one flat pool, so replication duplicates indices, not geometry.

use crate::accel::Accelerator;
use crate::geometry::Geometry;
use crate::intersection::{nearer, Intersection};
use crate::material::MaterialId;
use crate::primitive::Primitive;
use crate::triangle::Triangle;
use iris_math::{Aabb, Ray, Vec3};

/// Children per axis at every level.
const BRANCH: usize = 3;
/// Subdivision stops here; remaining triangles become the leaf's list.
const MAX_DEPTH: u32 = 3;

/// One flattened triangle with the owning primitive's material.
struct GridItem {
    triangle: Triangle,
    material: MaterialId,
}

/// Arena cell. Child slots are absent where no triangle overlapped the
/// subcell; item indices are populated only at the depth limit.
struct Cell {
    bounds: Aabb,
    depth: u32,
    children: [[[Option<u32>; BRANCH]; BRANCH]; BRANCH],
    items: Vec<u32>,
}

/// Uniform hierarchical grid over the scene's flattened triangle set.
pub struct HierarchicalGrid {
    items: Vec<GridItem>,
    cells: Vec<Cell>,
    root: Option<u32>,
}

/// Exact-at-the-endpoints interpolation: t = 0 gives `lo`, t = 1 gives
/// `hi`, and shared interior boundaries evaluate identically for both
/// neighboring subcells, leaving no gaps.
fn interpolate(lo: f32, hi: f32, t: f32) -> f32 {
    t * hi + (1.0 - t) * lo
}

fn subcell_bounds(bounds: &Aabb, x: usize, y: usize, z: usize) -> Aabb {
    let frac = |i: usize| i as f32 / BRANCH as f32;
    let min = Vec3::new(
        interpolate(bounds.min.x, bounds.max.x, frac(x)),
        interpolate(bounds.min.y, bounds.max.y, frac(y)),
        interpolate(bounds.min.z, bounds.max.z, frac(z)),
    );
    let max = Vec3::new(
        interpolate(bounds.min.x, bounds.max.x, frac(x + 1)),
        interpolate(bounds.min.y, bounds.max.y, frac(y + 1)),
        interpolate(bounds.min.z, bounds.max.z, frac(z + 1)),
    );
    Aabb::new(min, max)
}

/// Map a coordinate inside a cell to a subcell index, clamped to [0, 2].
/// NaN and infinite quotients (degenerate cell extents) clamp rather than
/// panic.
fn subcell_index(coord: f32, min: f32, size: f32) -> usize {
    (((coord - min) / size) as i32).clamp(0, (BRANCH - 1) as i32) as usize
}

impl Accelerator for HierarchicalGrid {
    fn build(primitives: &[Primitive]) -> Self {
        let mut grid = HierarchicalGrid {
            items: Vec::new(),
            cells: Vec::new(),
            root: None,
        };

        // Flatten every primitive to material-tagged triangles once.
        for prim in primitives {
            match &prim.geometry {
                Geometry::Mesh(mesh) => {
                    for triangle in mesh.triangles() {
                        grid.items.push(GridItem {
                            triangle,
                            material: prim.material,
                        });
                    }
                }
                Geometry::Triangle(tri) => grid.items.push(GridItem {
                    triangle: tri.clone(),
                    material: prim.material,
                }),
            }
        }

        let Some((first, rest)) = primitives.split_first() else {
            return grid;
        };
        let mut bounds = first.geometry.bounds();
        for prim in rest {
            bounds.grow_aabb(&prim.geometry.bounds());
        }

        let all: Vec<u32> = (0..grid.items.len() as u32).collect();
        let root = grid.push_cell(bounds, 0);
        grid.subdivide(root, all, 0);
        grid.root = Some(root);

        log::info!(
            "grid built over {} primitives: {} cells, {} triangles",
            primitives.len(),
            grid.cells.len(),
            grid.items.len()
        );
        grid
    }

    fn trace(&self, ray: &Ray) -> Option<Intersection> {
        let root = self.root?;
        if !self.cells[root as usize].bounds.hit(ray) {
            return None;
        }
        self.intersect_cell(root, ray)
    }
}

impl HierarchicalGrid {
    /// Number of arena cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn push_cell(&mut self, bounds: Aabb, depth: u32) -> u32 {
        let id = self.cells.len() as u32;
        self.cells.push(Cell {
            bounds,
            depth,
            children: [[[None; BRANCH]; BRANCH]; BRANCH],
            items: Vec::new(),
        });
        id
    }

    /// Distribute items into the 27 subcells of `cell`, allocating children
    /// only for subcells that received something, and recurse until the
    /// depth limit stores the remaining list at the leaf.
    fn subdivide(&mut self, cell: u32, item_ids: Vec<u32>, level: u32) {
        if level >= MAX_DEPTH {
            self.cells[cell as usize].items = item_ids;
            return;
        }

        let bounds = self.cells[cell as usize].bounds;
        for x in 0..BRANCH {
            for y in 0..BRANCH {
                for z in 0..BRANCH {
                    let sub = subcell_bounds(&bounds, x, y, z);
                    let overlapping: Vec<u32> = item_ids
                        .iter()
                        .copied()
                        .filter(|&id| self.items[id as usize].triangle.overlaps(&sub))
                        .collect();
                    if overlapping.is_empty() {
                        continue;
                    }
                    let child = self.push_cell(sub, level + 1);
                    self.cells[cell as usize].children[x][y][z] = Some(child);
                    self.subdivide(child, overlapping, level + 1);
                }
            }
        }
    }

    /// Test items stored at this cell, then descend only into the subcells
    /// spanned by the ray's entry/exit points. The per-axis index ranges
    /// are clamped and ordered, so reversed rays traverse the same product
    /// of cells.
    fn intersect_cell(&self, cell_id: u32, ray: &Ray) -> Option<Intersection> {
        let cell = &self.cells[cell_id as usize];

        let mut nearest = None;
        for &id in &cell.items {
            let item = &self.items[id as usize];
            if let Some(mut hit) = item.triangle.intersect(ray) {
                hit.material = Some(item.material);
                nearest = nearer(nearest, hit);
            }
        }

        if cell.depth >= MAX_DEPTH {
            return nearest;
        }

        let Some((t_entry, t_exit)) = cell.bounds.hit_span(ray) else {
            return nearest;
        };
        let entry = ray.at(t_entry);
        let exit = ray.at(t_exit);
        let size = cell.bounds.size() / BRANCH as f32;

        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for axis in 0..3 {
            let a = subcell_index(entry[axis], cell.bounds.min[axis], size[axis]);
            let b = subcell_index(exit[axis], cell.bounds.min[axis], size[axis]);
            lo[axis] = a.min(b);
            hi[axis] = a.max(b);
        }

        for x in lo[0]..=hi[0] {
            for y in lo[1]..=hi[1] {
                for z in lo[2]..=hi[2] {
                    if let Some(child) = cell.children[x][y][z] {
                        if let Some(hit) = self.intersect_cell(child, ray) {
                            nearest = nearer(nearest, hit);
                        }
                    }
                }
            }
        }

        nearest
    }
}
