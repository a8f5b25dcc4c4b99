use super::agent_lifecycle::spawn_agent;
use crate::schema::*;
use spacetimedb::ReducerContext;

/// Enter the world: create the caller's live agent from their persisted player state.
///
/// Behavior:
/// - Validates a Player row exists for the caller.
/// - Rejects if the caller already has a live agent.
/// - Spawns an agent at rest, magnetized and touching nothing; the first uploaded move samples
///   gravity and it falls onto whatever pulls it.
#[spacetimedb::reducer]
pub fn enter_world(ctx: &ReducerContext) -> Result<(), String> {
    let Some(player) = ctx.db.player().identity().find(ctx.sender) else {
        return Err("No player found!".into());
    };

    if player.agent_id.is_some() {
        return Err("Player is already in world".into());
    }

    spawn_agent(ctx, player)?;
    Ok(())
}
