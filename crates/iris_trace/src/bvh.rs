//! Bounding volume hierarchy accelerator.
//!
//! Median-split construction: at every level the item list is sorted by
//! center along the widest axis of the covering box and cut at the middle
//! index. Nodes live in an arena (`Vec` + child indices), so the tree needs
//! no recursive ownership and is Send/Sync for free.

use std::cmp::Ordering;

use crate::accel::Accelerator;
use crate::geometry::Geometry;
use crate::intersection::{nearer, Intersection};
use crate::material::MaterialId;
use crate::primitive::Primitive;
use crate::triangle::Triangle;
use iris_math::{Aabb, Ray};

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Arena node of the triangle-level tree.
///
/// Leaves hold triangles directly plus the owning primitive's material
/// index; inner nodes hold only child indices and the covering box. The
/// single-item base case means a node may carry triangles and children at
/// once, and traversal composes hits across all of them.
struct GeoNode {
    bounds: Aabb,
    left: Option<u32>,
    right: Option<u32>,
    triangles: Vec<Triangle>,
    material: Option<MaterialId>,
}

/// BVH over the scene's flattened triangle set.
///
/// Meshes are expanded into per-face triangles at build time, each tagged
/// with the owning primitive's material, so traversal only ever touches
/// triangles. For the alternate tree over whole primitive handles, see
/// [`PrimitiveBvh`].
pub struct Bvh {
    nodes: Vec<GeoNode>,
    root: Option<u32>,
}

impl Accelerator for Bvh {
    fn build(primitives: &[Primitive]) -> Self {
        let mut bvh = Bvh {
            nodes: Vec::new(),
            root: None,
        };
        let mut items: Vec<&Primitive> = primitives.iter().collect();
        bvh.root = bvh.build_primitives(&mut items);
        log::info!(
            "BVH built over {} primitives: {} nodes",
            primitives.len(),
            bvh.nodes.len()
        );
        bvh
    }

    fn trace(&self, ray: &Ray) -> Option<Intersection> {
        self.traverse(self.root, ray)
    }
}

impl Bvh {
    /// Bounding box of the whole tree (None when built over nothing).
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.map(|id| self.nodes[id as usize].bounds)
    }

    /// Number of arena nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, node: GeoNode) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(node);
        id
    }

    /// Recursive median split over primitives. The single-primitive base
    /// case expands a mesh into its triangles and keeps splitting those.
    fn build_primitives(&mut self, prims: &mut [&Primitive]) -> Option<u32> {
        let (first, rest) = prims.split_first()?;
        let mut bounds = first.geometry.bounds();
        for prim in rest {
            bounds.grow_aabb(&prim.geometry.bounds());
        }

        if prims.len() == 1 {
            let prim = prims[0];
            return match &prim.geometry {
                Geometry::Mesh(mesh) => {
                    let mut triangles = mesh.triangles();
                    self.build_triangles(&mut triangles, prim.material)
                }
                Geometry::Triangle(tri) => Some(self.push(GeoNode {
                    bounds,
                    left: None,
                    right: None,
                    triangles: vec![tri.clone()],
                    material: Some(prim.material),
                })),
            };
        }

        let axis = bounds.longest_axis();
        prims.sort_by(|a, b| {
            cmp_f32(
                a.geometry.bounds().center()[axis],
                b.geometry.bounds().center()[axis],
            )
        });

        let mid = prims.len() / 2;
        let (left_half, right_half) = prims.split_at_mut(mid);
        let left = self.build_primitives(left_half);
        let right = self.build_primitives(right_half);

        Some(self.push(GeoNode {
            bounds,
            left,
            right,
            triangles: Vec::new(),
            material: None,
        }))
    }

    /// Median split over the triangles of one primitive; every node in this
    /// subtree reports the same material.
    fn build_triangles(&mut self, tris: &mut [Triangle], material: MaterialId) -> Option<u32> {
        let (first, rest) = tris.split_first()?;
        let mut bounds = first.bounds();
        for tri in rest {
            bounds.grow_aabb(&tri.bounds());
        }

        if tris.len() == 1 {
            return Some(self.push(GeoNode {
                bounds,
                left: None,
                right: None,
                triangles: tris.to_vec(),
                material: Some(material),
            }));
        }

        let axis = bounds.longest_axis();
        tris.sort_by(|a, b| cmp_f32(a.centroid()[axis], b.centroid()[axis]));

        let mid = tris.len() / 2;
        let (left_half, right_half) = tris.split_at_mut(mid);
        let left = self.build_triangles(left_half, material);
        let right = self.build_triangles(right_half, material);

        Some(self.push(GeoNode {
            bounds,
            left,
            right,
            triangles: Vec::new(),
            material: None,
        }))
    }

    /// Classic recursive walk. Both children are visited whenever their
    /// boxes are hit; no distance ordering between them, the nearest hit is
    /// composed afterwards.
    fn traverse(&self, node: Option<u32>, ray: &Ray) -> Option<Intersection> {
        let node = &self.nodes[node? as usize];
        if !node.bounds.hit(ray) {
            return None;
        }

        let mut nearest = self.traverse(node.left, ray);
        if let Some(hit) = self.traverse(node.right, ray) {
            nearest = nearer(nearest, hit);
        }

        for tri in &node.triangles {
            if let Some(mut hit) = tri.intersect(ray) {
                hit.material = node.material;
                nearest = nearer(nearest, hit);
            }
        }

        nearest
    }
}

/// Arena node of the primitive-handle tree.
struct PrimNode {
    bounds: Aabb,
    left: Option<u32>,
    right: Option<u32>,
    primitive: Option<u32>,
}

/// Diagnostic BVH over whole primitive handles.
///
/// Same median-split construction as [`Bvh`], but leaves defer to
/// `Geometry::intersect` (meshes keep their internal linear scan) instead
/// of flattening to triangles. Queries are served by [`Bvh`]; this variant
/// exists as an independently built alternate path, useful as an oracle
/// when validating the flattened tree.
pub struct PrimitiveBvh {
    primitives: Vec<Primitive>,
    nodes: Vec<PrimNode>,
    root: Option<u32>,
}

impl Accelerator for PrimitiveBvh {
    fn build(primitives: &[Primitive]) -> Self {
        let mut tree = PrimitiveBvh {
            primitives: primitives.to_vec(),
            nodes: Vec::new(),
            root: None,
        };
        let mut order: Vec<u32> = (0..tree.primitives.len() as u32).collect();
        tree.root = tree.build_range(&mut order);
        log::debug!(
            "primitive BVH built over {} primitives: {} nodes",
            tree.primitives.len(),
            tree.nodes.len()
        );
        tree
    }

    fn trace(&self, ray: &Ray) -> Option<Intersection> {
        self.traverse(self.root, ray)
    }
}

impl PrimitiveBvh {
    fn push(&mut self, node: PrimNode) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(node);
        id
    }

    fn build_range(&mut self, ids: &mut [u32]) -> Option<u32> {
        let (first, rest) = ids.split_first()?;
        let mut bounds = self.primitives[*first as usize].geometry.bounds();
        for &id in rest {
            bounds.grow_aabb(&self.primitives[id as usize].geometry.bounds());
        }

        if ids.len() == 1 {
            let primitive = Some(ids[0]);
            return Some(self.push(PrimNode {
                bounds,
                left: None,
                right: None,
                primitive,
            }));
        }

        let axis = bounds.longest_axis();
        let primitives = &self.primitives;
        ids.sort_by(|&a, &b| {
            cmp_f32(
                primitives[a as usize].geometry.bounds().center()[axis],
                primitives[b as usize].geometry.bounds().center()[axis],
            )
        });

        let mid = ids.len() / 2;
        let (left_half, right_half) = ids.split_at_mut(mid);
        let left = self.build_range(left_half);
        let right = self.build_range(right_half);

        Some(self.push(PrimNode {
            bounds,
            left,
            right,
            primitive: None,
        }))
    }

    fn traverse(&self, node: Option<u32>, ray: &Ray) -> Option<Intersection> {
        let node = &self.nodes[node? as usize];
        if !node.bounds.hit(ray) {
            return None;
        }

        let mut nearest = self.traverse(node.left, ray);
        if let Some(hit) = self.traverse(node.right, ray) {
            nearest = nearer(nearest, hit);
        }

        if let Some(id) = node.primitive {
            let prim = &self.primitives[id as usize];
            if let Some(mut hit) = prim.geometry.intersect(ray) {
                hit.material = Some(prim.material);
                nearest = nearer(nearest, hit);
            }
        }

        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use iris_math::Vec3;

    /// Tiny deterministic generator so test scenes need no rand dependency.
    struct Lcg(u32);

    impl Lcg {
        fn next(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (self.0 >> 8) as f32 / 16_777_216.0
        }

        fn range(&mut self, lo: f32, hi: f32) -> f32 {
            lo + (hi - lo) * self.next()
        }
    }

    fn scattered_triangles(count: usize, seed: u32) -> Vec<Primitive> {
        let mut rng = Lcg(seed);
        (0..count)
            .map(|i| {
                let c = Vec3::new(
                    rng.range(-4.0, 4.0),
                    rng.range(-4.0, 4.0),
                    rng.range(-4.0, 4.0),
                );
                let o1 = Vec3::new(
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                );
                let o2 = Vec3::new(
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                );
                Primitive::new(Triangle::new(c, c + o1, c + o2), i % 3)
            })
            .collect()
    }

    /// A bumpy terrain mesh plus two floating triangles: exercises mesh
    /// flattening and mixed-geometry scenes.
    fn terrain_scene() -> Vec<Primitive> {
        const N: usize = 6;
        let mut vertices = Vec::new();
        for i in 0..N {
            for j in 0..N {
                let h = ((i * 3 + j * 5) % 7) as f32 * 0.3;
                vertices.push(Vec3::new(i as f32, j as f32, h));
            }
        }
        let mut indices = Vec::new();
        for i in 0..N - 1 {
            for j in 0..N - 1 {
                let a = (i * N + j) as u32;
                let b = ((i + 1) * N + j) as u32;
                indices.push([a, b, a + 1]);
                indices.push([a + 1, b, b + 1]);
            }
        }

        vec![
            Primitive::new(Mesh::from_indices(vertices, &indices), 1),
            Primitive::new(
                Triangle::new(
                    Vec3::new(1.0, 1.0, 4.0),
                    Vec3::new(3.0, 1.0, 4.0),
                    Vec3::new(1.0, 3.0, 4.0),
                ),
                0,
            ),
            Primitive::new(
                Triangle::new(
                    Vec3::new(2.5, 2.5, 6.0),
                    Vec3::new(4.5, 2.5, 6.0),
                    Vec3::new(2.5, 4.5, 6.0),
                ),
                2,
            ),
        ]
    }

    fn probe_rays(count: usize, seed: u32) -> Vec<Ray> {
        let mut rng = Lcg(seed);
        (0..count)
            .map(|_| {
                let origin = Vec3::new(
                    rng.range(-6.0, 6.0),
                    rng.range(-6.0, 6.0),
                    rng.range(7.0, 10.0),
                );
                let target = Vec3::new(
                    rng.range(-4.0, 5.0),
                    rng.range(-4.0, 5.0),
                    rng.range(-1.0, 2.0),
                );
                Ray::new(origin, target - origin)
            })
            .collect()
    }

    /// Brute-force reference: scan every primitive, keep the nearest hit.
    fn linear_trace(primitives: &[Primitive], ray: &Ray) -> Option<Intersection> {
        let mut nearest = None;
        for prim in primitives {
            if let Some(mut hit) = prim.geometry.intersect(ray) {
                hit.material = Some(prim.material);
                nearest = nearer(nearest, hit);
            }
        }
        nearest
    }

    fn assert_hits_agree(label: &str, got: &Option<Intersection>, want: &Option<Intersection>) {
        match (got, want) {
            (None, None) => {}
            (Some(g), Some(w)) => {
                assert!(
                    (g.depth - w.depth).abs() < 1e-4,
                    "{label}: depth {} vs {}",
                    g.depth,
                    w.depth
                );
                assert_eq!(g.material, w.material, "{label}: material mismatch");
            }
            _ => panic!("{label}: hit/miss mismatch: {got:?} vs {want:?}"),
        }
    }

    #[test]
    fn test_empty_build_always_misses() {
        let bvh = Bvh::build(&[]);
        assert_eq!(bvh.node_count(), 0);
        assert!(bvh.bounds().is_none());
        for ray in probe_rays(16, 7) {
            assert!(bvh.trace(&ray).is_none());
        }
    }

    #[test]
    fn test_single_primitive_leaf_box_is_exact() {
        let tri = Triangle::new(
            Vec3::new(0.5, -1.0, 2.0),
            Vec3::new(2.0, 1.5, 2.5),
            Vec3::new(-0.5, 0.5, 3.0),
        );
        let prims = vec![Primitive::new(tri.clone(), 0)];
        let bvh = Bvh::build(&prims);

        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.bounds(), Some(tri.bounds()));
    }

    #[test]
    fn test_single_mesh_flattens_to_triangle_tree() {
        let prims = terrain_scene();
        let mesh_only = &prims[..1];
        let bvh = Bvh::build(mesh_only);

        // 50 faces cannot fit one node: the mesh got expanded and split.
        assert!(bvh.node_count() > 1);
        let Geometry::Mesh(mesh) = &mesh_only[0].geometry else {
            unreachable!()
        };
        assert_eq!(bvh.bounds(), Some(mesh.bounds()));

        let ray = Ray::new(Vec3::new(2.2, 2.2, 5.0), -Vec3::Z);
        let hit = bvh.trace(&ray).expect("straight down into the terrain");
        assert_eq!(hit.material, Some(1));
        assert!(hit.face_id.is_some());
    }

    #[test]
    fn test_quad_scenario() {
        // Two unit triangles forming a quad at z = 0.
        let quad = vec![
            Primitive::new(
                Triangle::new(
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                ),
                0,
            ),
            Primitive::new(
                Triangle::new(
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                ),
                1,
            ),
        ];
        let bvh = Bvh::build(&quad);

        let center = Ray::new(Vec3::new(0.5, 0.5, -1.0), Vec3::Z);
        let hit = bvh.trace(&center).expect("quad center must hit");
        assert!((hit.depth - 1.0).abs() < 1e-6);
        assert!(matches!(hit.material, Some(0) | Some(1)));

        // Off the shared diagonal the covering triangle is unambiguous.
        let lower = Ray::new(Vec3::new(0.6, 0.2, -1.0), Vec3::Z);
        assert_eq!(bvh.trace(&lower).unwrap().material, Some(0));
        let upper = Ray::new(Vec3::new(0.2, 0.6, -1.0), Vec3::Z);
        assert_eq!(bvh.trace(&upper).unwrap().material, Some(1));
    }

    #[test]
    fn test_in_plane_origin_outside_edges_misses() {
        let quad = vec![Primitive::new(
            Triangle::new(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ),
            0,
        )];
        let bvh = Bvh::build(&quad);

        // Plane intersection lands at u = 1.5, outside the edges.
        let ray = Ray::new(Vec3::new(1.5, 0.25, -1.0), Vec3::Z);
        assert!(bvh.trace(&ray).is_none());
        assert!(linear_trace(&quad, &ray).is_none());
    }

    #[test]
    fn test_matches_linear_scan_on_scattered_scene() {
        let prims = scattered_triangles(64, 11);
        let bvh = Bvh::build(&prims);

        for (i, ray) in probe_rays(200, 23).iter().enumerate() {
            let want = linear_trace(&prims, ray);
            let got = bvh.trace(ray);
            assert_hits_agree(&format!("ray {i}"), &got, &want);
        }
    }

    #[test]
    fn test_matches_linear_scan_on_terrain_scene() {
        let prims = terrain_scene();
        let bvh = Bvh::build(&prims);

        for (i, ray) in probe_rays(200, 31).iter().enumerate() {
            let want = linear_trace(&prims, ray);
            let got = bvh.trace(ray);
            assert_hits_agree(&format!("ray {i}"), &got, &want);
        }
    }

    #[test]
    fn test_primitive_tree_agrees_with_geo_tree() {
        let prims = terrain_scene();
        let geo = Bvh::build(&prims);
        let handles = PrimitiveBvh::build(&prims);

        for (i, ray) in probe_rays(200, 43).iter().enumerate() {
            assert_hits_agree(&format!("ray {i}"), &handles.trace(ray), &geo.trace(ray));
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let prims = scattered_triangles(32, 5);
        let first = Bvh::build(&prims);
        let second = Bvh::build(&prims);

        for ray in probe_rays(100, 57) {
            let a = first.trace(&ray);
            let b = second.trace(&ray);
            match (a, b) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    assert_eq!(a.depth, b.depth);
                    assert_eq!(a.material, b.material);
                    assert_eq!(a.face_id, b.face_id);
                }
                other => panic!("fresh builds disagree: {other:?}"),
            }
        }
    }

    #[test]
    fn test_concurrent_traversal() {
        use rayon::prelude::*;

        let prims = scattered_triangles(48, 3);
        let bvh = Bvh::build(&prims);
        let rays = probe_rays(512, 71);

        let sequential: Vec<Option<f32>> =
            rays.iter().map(|r| bvh.trace(r).map(|h| h.depth)).collect();
        let parallel: Vec<Option<f32>> = rays
            .par_iter()
            .map(|r| bvh.trace(r).map(|h| h.depth))
            .collect();

        assert_eq!(sequential, parallel);
    }
}
