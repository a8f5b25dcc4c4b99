use crate::{
    schema::*,
    world::{gravity_world, movement_settings_for},
};
use shared::{receive_move, LogSink, Move, MoveRejection, MoveStepper, TickEvents};
use spacetimedb::{ReducerContext, Table};

/// Apply one uploaded move to the caller's agent.
///
/// Behavior:
/// - The move is re-simulated against the authoritative status; the client's position is
///   never read.
/// - Stale moves (at or before the last applied timestamp) are logged and dropped without
///   failing the reducer; a late duplicate is normal on an unreliable channel.
/// - Malformed moves fail the reducer.
/// - Field enter/exit events are mirrored into `field_occupant`.
#[spacetimedb::reducer]
pub fn upload_move(ctx: &ReducerContext, mv: MoveData) -> Result<(), String> {
    let Some(mut agent) = ctx.db.agent().identity().find(ctx.sender) else {
        return Err("Agent not found".into());
    };
    let settings = movement_settings_for(ctx)?;
    let mut status = agent.state.to_status(&settings)?;

    let stepper = MoveStepper::new(gravity_world(ctx), &settings);
    let events = match receive_move(&mut status, &Move::from(&mv), &stepper, &mut LogSink) {
        Ok(events) => events,
        Err(rejection @ MoveRejection::Stale { .. }) => {
            log::warn!("Agent {}: {rejection}", agent.id);
            return Ok(());
        }
        Err(rejection) => {
            log::warn!("Agent {}: {rejection}", agent.id);
            return Err(rejection.to_string());
        }
    };

    sync_field_occupancy(ctx, agent.id, &events);
    agent.state = AgentState::from(&status);
    ctx.db.agent().id().update(agent);
    Ok(())
}

fn sync_field_occupancy(ctx: &ReducerContext, agent_id: u64, events: &TickEvents) {
    for source in &events.fields_exited {
        let rows: Vec<FieldOccupant> = ctx
            .db
            .field_occupant()
            .agent_id()
            .filter(agent_id)
            .filter(|row| row.source == source.raw())
            .collect();
        for row in rows {
            ctx.db.field_occupant().id().delete(row.id);
        }
    }
    for source in &events.fields_entered {
        let already = ctx
            .db
            .field_occupant()
            .agent_id()
            .filter(agent_id)
            .any(|row| row.source == source.raw());
        if !already {
            ctx.db.field_occupant().insert(FieldOccupant {
                id: 0,
                source: source.raw(),
                agent_id,
            });
        }
    }
    if !events.fields_entered.is_empty() || !events.fields_exited.is_empty() {
        log::debug!(
            "Agent {agent_id} fields +{:?} -{:?}",
            events.fields_entered.iter().map(|h| h.id()).collect::<Vec<_>>(),
            events.fields_exited.iter().map(|h| h.id()).collect::<Vec<_>>(),
        );
    }
}
