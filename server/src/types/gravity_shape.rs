use super::DbVec3;

/// Geometry of a gravity source row.
///
/// Notes:
/// - Combined with the row's `translation` and `rotation`.
/// - A flat floor's surface normal is `rotation * +Y`.
#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub enum GravityShape {
    /// Oriented slab with local half extents (hx, hy, hz).
    FlatFloor(DbVec3),
    /// Solid sphere walked on from the outside; radius in meters.
    SphereFloor(f32),
    /// Hollow sphere walked on from the inside; radius in meters.
    LevelSphere(f32),
}

impl From<GravityShape> for shared::GravityShapeDef {
    fn from(shape: GravityShape) -> Self {
        match shape {
            GravityShape::FlatFloor(half_extents) => shared::GravityShapeDef::FlatFloor {
                half_extents: half_extents.into(),
            },
            GravityShape::SphereFloor(radius) => shared::GravityShapeDef::SphereFloor { radius },
            GravityShape::LevelSphere(radius) => shared::GravityShapeDef::LevelSphere { radius },
        }
    }
}

impl From<shared::GravityShapeDef> for GravityShape {
    fn from(def: shared::GravityShapeDef) -> Self {
        match def {
            shared::GravityShapeDef::FlatFloor { half_extents } => {
                GravityShape::FlatFloor(half_extents.into())
            }
            shared::GravityShapeDef::SphereFloor { radius } => GravityShape::SphereFloor(radius),
            shared::GravityShapeDef::LevelSphere { radius } => GravityShape::LevelSphere(radius),
        }
    }
}
