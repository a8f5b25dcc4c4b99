use super::agent_lifecycle::clear_field_occupancy;
use crate::schema::*;
use spacetimedb::*;

/// Low-rate cleanup of rows orphaned by crashes or interrupted reducers.
#[table(name = housekeeping_timer, scheduled(housekeeping_reducer))]
pub struct HousekeepingTimer {
    #[primary_key]
    #[auto_inc]
    pub scheduled_id: u64,
    pub scheduled_at: ScheduleAt,
}

pub fn init_housekeeping(ctx: &ReducerContext) {
    let interval = TimeDuration::from_micros(1_000_000);
    ctx.db.housekeeping_timer().scheduled_id().delete(1);
    ctx.db.housekeeping_timer().insert(HousekeepingTimer {
        scheduled_id: 1,
        scheduled_at: ScheduleAt::Interval(interval),
    });
}

#[spacetimedb::reducer]
pub fn housekeeping_reducer(ctx: &ReducerContext, _timer: HousekeepingTimer) -> Result<(), String> {
    // Only the server (module identity) may invoke the scheduled reducer.
    if ctx.sender != ctx.identity() {
        return Err("`housekeeping_reducer` may not be invoked by clients.".into());
    }

    // Agents whose player no longer links to them.
    let orphans: Vec<Agent> = ctx
        .db
        .agent()
        .iter()
        .filter(|agent| {
            ctx.db
                .player()
                .identity()
                .find(agent.identity)
                .is_none_or(|player| player.agent_id != Some(agent.id))
        })
        .collect();
    for agent in orphans {
        log::warn!("Removing orphaned agent {}", agent.id);
        ctx.db.agent().id().delete(agent.id);
        clear_field_occupancy(ctx, agent.id);
    }

    // Occupancy rows whose agent is gone.
    let stale: Vec<FieldOccupant> = ctx
        .db
        .field_occupant()
        .iter()
        .filter(|row| ctx.db.agent().id().find(row.agent_id).is_none())
        .collect();
    for row in stale {
        ctx.db.field_occupant().id().delete(row.id);
    }
    Ok(())
}
