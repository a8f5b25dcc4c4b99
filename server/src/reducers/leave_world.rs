use super::agent_lifecycle::despawn_agent;
use crate::schema::*;
use spacetimedb::ReducerContext;

/// Leave the world: persist the caller's agent pose and health, then despawn it.
///
/// A caller without a live agent is a no-op.
#[spacetimedb::reducer]
pub fn leave_world(ctx: &ReducerContext) {
    let Some(player) = ctx.db.player().identity().find(ctx.sender) else {
        return;
    };
    despawn_agent(ctx, player);
}
