//! Scene primitive: geometry paired with a material table index.

use crate::geometry::Geometry;
use crate::material::MaterialId;

/// One renderable unit of the scene.
///
/// The material is an index into the scene's table; primitives never own
/// material data.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub geometry: Geometry,
    pub material: MaterialId,
}

impl Primitive {
    pub fn new(geometry: impl Into<Geometry>, material: MaterialId) -> Self {
        Self {
            geometry: geometry.into(),
            material,
        }
    }
}
