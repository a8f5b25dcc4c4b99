//! Connection lifecycle reducers.
//!
//! - On connect: ensure a `Player` row exists for the caller and clear any dangling
//!   `agent_id` left by a crash.
//! - On disconnect: persist and despawn the live agent, if any.
//!
//! These reducers only touch the data layer; no move is simulated here.

use super::agent_lifecycle::despawn_agent;
use crate::schema::*;
use spacetimedb::{ReducerContext, Table};

#[spacetimedb::reducer(client_connected)]
pub fn identity_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);

    if let Some(player) = ctx.db.player().identity().find(ctx.sender) {
        if player.agent_id.is_some() {
            // Reconnected without a clean disconnect.
            despawn_agent(ctx, player);
        }
    } else {
        ctx.db.player().insert(Player {
            identity: ctx.sender,
            agent_id: None,
            position: DbVec3::new(0.0, 1.0, 0.0),
            rotation: DbQuat::IDENTITY,
            health: shared::constants::DEFAULT_MAX_HEALTH,
        });
    }
}

#[spacetimedb::reducer(client_disconnected)]
pub fn identity_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);

    let Some(player) = ctx.db.player().identity().find(ctx.sender) else {
        return;
    };
    despawn_agent(ctx, player);
}
