use super::agent_lifecycle::clear_field_occupancy;
use crate::{schema::*, world::movement_settings_for};
use shared::{AgentStatus, Health};
use spacetimedb::ReducerContext;

const SPAWN_POSITION: DbVec3 = DbVec3::new(0.0, 1.0, 0.0);

/// Apply damage to an agent. A fatal hit respawns it at the world spawn point with full health.
#[spacetimedb::reducer]
pub fn take_damage(ctx: &ReducerContext, agent_id: u64, amount: f32) -> Result<(), String> {
    if ctx.db.agent().identity().find(ctx.sender).is_none() {
        return Err("Only agents in world may deal damage".into());
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err("Damage must be finite and positive".into());
    }
    let Some(mut target) = ctx.db.agent().id().find(agent_id) else {
        return Err("Target agent not found".into());
    };

    let settings = movement_settings_for(ctx)?;
    let mut status = target.state.to_status(&settings)?;
    if status.health.take_damage(amount) {
        log::info!("Agent {} died", target.id);
        let mut respawned =
            AgentStatus::spawn(SPAWN_POSITION.into(), DbQuat::IDENTITY.into(), &settings);
        respawned.health = Health::new(status.health.max);
        // Keep the move clock so the owner's next upload is not rejected as stale.
        respawned.last_move = status.last_move;
        respawned.tick = status.tick;
        status = respawned;
        clear_field_occupancy(ctx, target.id);
    }

    target.state = AgentState::from(&status);
    ctx.db.agent().id().update(target);
    Ok(())
}
