use crate::types::*;
use spacetimedb::*;

/// Player account data persisted across sessions.
///
/// The live `Agent` exists only while the player is in world. Its pose and health are copied
/// back here on leave/disconnect so the player rejoins where they left.
#[table(name = player, public)]
pub struct Player {
    #[primary_key]
    pub identity: Identity,

    /// Optional live agent id. None if not currently in-world.
    #[index(btree)]
    pub agent_id: Option<u64>,

    pub position: DbVec3,
    pub rotation: DbQuat,
    pub health: f32,
}
