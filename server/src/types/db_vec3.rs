/// A 3D vector in world space (meters, or meters per second for velocities).
///
/// Semantics:
/// - Used for positions, velocities, forces and gravity vectors.
/// - This is a data type only; math happens on the `shared` side after conversion.
#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct DbVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for DbVec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl DbVec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<DbVec3> for nalgebra::Vector3<f32> {
    fn from(v: DbVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}
impl From<&DbVec3> for nalgebra::Vector3<f32> {
    fn from(v: &DbVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Vector3<f32>> for DbVec3 {
    fn from(v: nalgebra::Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}
impl From<&nalgebra::Vector3<f32>> for DbVec3 {
    fn from(v: &nalgebra::Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}
