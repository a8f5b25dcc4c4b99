//! In-process authority reached through a simulated unreliable link.
//!
//! The client never talks to a real host here. Each fixed tick:
//! 1. The local move is predicted and uploaded; bots upload scripted moves.
//! 2. The link delivers whatever is due. The authority applies delivered moves to its own
//!    statuses and publishes every agent's status back.
//! 3. Delivered statuses go to the local reconciler (own agent) or to remote proxies.

use crate::{
    agent::{AgentStatuses, Prediction, SimDebugEvents},
    input::PendingInput,
    tuning::{Link, Movement, Netcode},
    world::Level,
};
use bevy::prelude::*;
use shared::{
    AgentId, AgentStatus, FIXED_DT, Move, MoveButton, MoveStepper, MovementSettings, NullSink,
    Quat, Reconciler, SimulatedLink, Vec3, receive_move, registry::FieldOccupancy,
};
use std::collections::BTreeMap;

pub const LOCAL_AGENT: AgentId = 1;
const LOCAL_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Agents this far from the origin have left the level and are respawned.
const OUT_OF_BOUNDS: f32 = 400.0;

/// Authoritative side of the loopback.
#[derive(Resource, Default)]
pub struct Authority {
    pub statuses: BTreeMap<AgentId, AgentStatus>,
    pub occupancy: FieldOccupancy,
}

#[derive(Resource)]
pub struct Wire(pub SimulatedLink);

/// Strictly increasing move clock, in fixed ticks.
#[derive(Resource, Default)]
pub struct MoveClock(pub u64);

impl MoveClock {
    fn next_timestamp(&mut self) -> f64 {
        self.0 += 1;
        self.0 as f64 * FIXED_DT as f64
    }
}

/// A scripted remote agent so proxies have something to smooth.
#[derive(Clone, Copy, Debug)]
struct Bot {
    id: AgentId,
    spawn: Vec3,
    /// Ticks between jumps.
    jump_period: u64,
    turn_rate: f32,
}

const BOTS: [Bot; 2] = [
    Bot {
        id: 2,
        spawn: Vec3::new(6.0, 1.0, 4.0),
        jump_period: 180,
        turn_rate: 0.02,
    },
    Bot {
        id: 3,
        spawn: Vec3::new(-8.0, 1.0, -6.0),
        jump_period: 300,
        turn_rate: -0.015,
    },
];

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Authority>();
    app.init_resource::<MoveClock>();
    app.add_systems(Startup, enter_world);
    app.add_systems(
        FixedUpdate,
        (upload_local_move, upload_bot_moves, exchange).chain(),
    );
}

fn enter_world(
    mut commands: Commands,
    movement: Res<Movement>,
    netcode: Res<Netcode>,
    link: Res<Link>,
    mut authority: ResMut<Authority>,
) {
    let local = AgentStatus::spawn(LOCAL_SPAWN, Quat::identity(), &movement.0);
    authority.statuses.insert(LOCAL_AGENT, local.clone());
    for bot in BOTS {
        authority
            .statuses
            .insert(bot.id, AgentStatus::spawn(bot.spawn, Quat::identity(), &movement.0));
    }

    commands.insert_resource(Prediction(Reconciler::new(local, netcode.0)));
    commands.insert_resource(Wire(SimulatedLink::new(link.0)));
    info!(
        "Entered world as agent {LOCAL_AGENT} with {} bots (latency {} ticks)",
        BOTS.len(),
        link.0.latency_ticks
    );
}

fn upload_local_move(
    mut pending: ResMut<PendingInput>,
    mut clock: ResMut<MoveClock>,
    mut prediction: ResMut<Prediction>,
    mut wire: ResMut<Wire>,
    mut debug_events: ResMut<SimDebugEvents>,
    level: Res<Level>,
    movement: Res<Movement>,
) {
    let mv = pending.0.take(clock.next_timestamp());
    let stepper = MoveStepper::new(&level.world, &movement.0);
    let upload = prediction.0.predict(mv, &stepper, &mut debug_events.0);
    if !wire.0.send_move(LOCAL_AGENT, upload) {
        debug!(
            "Move {:.3}s dropped by the link (last ack {:?}, {} pending)",
            upload.timestamp,
            prediction.0.last_ack(),
            prediction.0.pending_len()
        );
    }
}

fn upload_bot_moves(clock: Res<MoveClock>, authority: Res<Authority>, mut wire: ResMut<Wire>) {
    let timestamp = clock.0 as f64 * FIXED_DT as f64;
    for bot in BOTS {
        let Some(status) = authority.statuses.get(&bot.id) else {
            continue;
        };
        wire.0.send_move(bot.id, bot_move(bot, status, clock.0, timestamp));
    }
}

fn bot_move(bot: Bot, status: &AgentStatus, tick: u64, timestamp: f64) -> Move {
    let mut mv = Move::idle(timestamp)
        .with_movement(Vec3::new(1.0, 0.0, 0.0))
        .with_look(0.0, bot.turn_rate);
    if tick % bot.jump_period == 0 && status.contact().is_grounded() {
        mv = mv.with_button(MoveButton::Jump);
    }
    mv
}

fn exchange(
    mut wire: ResMut<Wire>,
    mut authority: ResMut<Authority>,
    mut prediction: ResMut<Prediction>,
    mut replicated: ResMut<AgentStatuses>,
    level: Res<Level>,
    movement: Res<Movement>,
) {
    let stepper = MoveStepper::new(&level.world, &movement.0);
    let delivery = wire.0.tick();

    let Authority {
        statuses,
        occupancy,
    } = &mut *authority;
    for (agent, mv) in &delivery.moves {
        let Some(status) = statuses.get_mut(agent) else {
            continue;
        };
        match receive_move(status, mv, &stepper, &mut NullSink) {
            Ok(events) => {
                occupancy.apply(*agent, &events.fields_entered, &events.fields_exited);
                if status.position.norm() > OUT_OF_BOUNDS {
                    respawn(*agent, status, occupancy, &movement.0);
                }
            }
            Err(rejection) => warn!("Agent {agent}: {rejection}"),
        }
    }
    for (agent, status) in statuses.iter() {
        wire.0.publish_status(*agent, status.clone());
    }

    for (agent, status) in delivery.statuses {
        if agent == LOCAL_AGENT {
            prediction.0.apply_authoritative(status, &stepper);
        } else {
            replicated.0.insert(agent, status);
        }
    }
}

fn spawn_point(agent: AgentId) -> Vec3 {
    BOTS.iter()
        .find(|bot| bot.id == agent)
        .map_or(LOCAL_SPAWN, |bot| bot.spawn)
}

/// Put an agent back at its spawn point, keeping its move clock so later moves still apply.
fn respawn(
    agent: AgentId,
    status: &mut AgentStatus,
    occupancy: &mut FieldOccupancy,
    settings: &MovementSettings,
) {
    let left = occupancy.remove_agent(agent);
    let mut fresh = AgentStatus::spawn(spawn_point(agent), Quat::identity(), settings);
    fresh.last_move = status.last_move;
    fresh.tick = status.tick;
    *status = fresh;
    warn!(
        "Agent {agent} left the level; respawned and dropped from {} fields",
        left.len()
    );
}
