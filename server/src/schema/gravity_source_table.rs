use crate::types::*;
use spacetimedb::*;

/// Immutable gravity sources of the level.
///
/// Seeded in `init`. The server caches a query world built from these rows, and clients build
/// the same world from their subscription so both sides sample identical gravity.
#[table(name = gravity_source, public)]
pub struct GravitySource {
    /// Unique id; also the deterministic registration order.
    #[primary_key]
    pub id: u32,

    pub translation: DbVec3,
    pub rotation: DbQuat,
    pub shape: GravityShape,

    /// Gravity acceleration magnitude (m/s^2).
    pub strength: f32,
    /// Field thickness beyond the surface (meters).
    pub field_radius: f32,
}
