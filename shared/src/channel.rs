//! In-process model of the replication channel.
//!
//! Moves travel client to server unreliably: at most once, possibly dropped, never retried.
//! Statuses travel server to clients as last-value-wins replication: only the newest status
//! per agent is delivered on any tick.

use std::collections::{BTreeMap, VecDeque};

use crate::{moves::Move, registry::AgentId, status::AgentStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkSettings {
    /// One-way delay in fixed ticks, applied in both directions.
    pub latency_ticks: u64,
    /// Drop every Nth uploaded move; 0 never drops.
    pub drop_every_nth: u32,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            latency_ticks: 6,
            drop_every_nth: 0,
        }
    }
}

/// What arrived on one tick.
#[derive(Clone, Debug, Default)]
pub struct Delivery {
    /// Uploaded moves in send order.
    pub moves: Vec<(AgentId, Move)>,
    /// Newest status per agent.
    pub statuses: BTreeMap<AgentId, AgentStatus>,
}

#[derive(Debug, Default)]
pub struct SimulatedLink {
    settings: LinkSettings,
    now: u64,
    sent_moves: u64,
    dropped_moves: u64,
    moves: VecDeque<(u64, AgentId, Move)>,
    statuses: VecDeque<(u64, AgentId, AgentStatus)>,
}

impl SimulatedLink {
    pub fn new(settings: LinkSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> LinkSettings {
        self.settings
    }

    /// Upload a move. Returns false if the link dropped it.
    pub fn send_move(&mut self, agent: AgentId, mv: Move) -> bool {
        self.sent_moves += 1;
        let nth = self.settings.drop_every_nth as u64;
        if nth > 0 && self.sent_moves % nth == 0 {
            self.dropped_moves += 1;
            return false;
        }
        self.moves
            .push_back((self.now + self.settings.latency_ticks, agent, mv));
        true
    }

    pub fn publish_status(&mut self, agent: AgentId, status: AgentStatus) {
        self.statuses
            .push_back((self.now + self.settings.latency_ticks, agent, status));
    }

    /// Advance one tick and collect everything now due.
    pub fn tick(&mut self) -> Delivery {
        self.now += 1;
        let mut delivery = Delivery::default();

        while self.moves.front().is_some_and(|(due, _, _)| *due <= self.now) {
            if let Some((_, agent, mv)) = self.moves.pop_front() {
                delivery.moves.push((agent, mv));
            }
        }
        while self.statuses.front().is_some_and(|(due, _, _)| *due <= self.now) {
            if let Some((_, agent, status)) = self.statuses.pop_front() {
                delivery.statuses.insert(agent, status);
            }
        }
        delivery
    }

    pub fn dropped_moves(&self) -> u64 {
        self.dropped_moves
    }

    pub fn in_flight(&self) -> usize {
        self.moves.len() + self.statuses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authority::receive_move,
        constants::FIXED_DT,
        debug::NullSink,
        reconcile::Reconciler,
        settings::{MovementSettings, NetcodeSettings},
        status::ContactState,
        stepper::MoveStepper,
        utils::{Quat, Vec3},
        world::{GravityWorld, demo_world},
    };

    #[test]
    fn moves_arrive_after_latency_and_drops_are_counted() {
        let mut link = SimulatedLink::new(LinkSettings {
            latency_ticks: 2,
            drop_every_nth: 3,
        });
        assert!(link.send_move(1, Move::idle(0.0)));
        assert!(link.send_move(1, Move::idle(1.0)));
        assert!(!link.send_move(1, Move::idle(2.0)));

        assert!(link.tick().moves.is_empty());
        let arrived = link.tick().moves;
        assert_eq!(arrived.len(), 2);
        assert_eq!(arrived[1].1.timestamp, 1.0);
        assert_eq!(link.dropped_moves(), 1);
    }

    #[test]
    fn only_the_newest_status_is_delivered() {
        let settings = MovementSettings::default();
        let mut link = SimulatedLink::new(LinkSettings {
            latency_ticks: 1,
            drop_every_nth: 0,
        });
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        link.publish_status(7, status.clone());
        status.position.x = 3.0;
        link.publish_status(7, status.clone());

        let delivery = link.tick();
        assert_eq!(delivery.statuses.len(), 1);
        assert_eq!(delivery.statuses[&7].position.x, 3.0);
        assert_eq!(link.in_flight(), 0);
    }

    #[test]
    fn dropped_moves_are_not_filled_in() {
        let world = GravityWorld::build(demo_world());
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let spawn = AgentStatus::spawn(Vec3::new(0.0, 1.0, 0.0), Quat::identity(), &settings);

        let mut link = SimulatedLink::new(LinkSettings {
            latency_ticks: 3,
            drop_every_nth: 5,
        });
        let mut client = Reconciler::new(spawn.clone(), NetcodeSettings::default());
        let mut server = spawn;
        let mut applied = 0;
        let mut last_applied = f64::MIN;

        for i in 0..300 {
            let input = if i < 100 { Vec3::new(1.0, 0.0, 0.0) } else { Vec3::zeros() };
            let mv = Move::idle(1.0 + i as f64 * FIXED_DT as f64).with_movement(input);
            let upload = client.predict(mv, &stepper, &mut NullSink);
            link.send_move(1, upload);

            let delivery = link.tick();
            for (_, mv) in delivery.moves {
                receive_move(&mut server, &mv, &stepper, &mut NullSink).unwrap();
                assert!(mv.timestamp > last_applied);
                last_applied = mv.timestamp;
                applied += 1;
            }
            link.publish_status(1, server.clone());
            if let Some(status) = delivery.statuses.get(&1) {
                client.apply_authoritative(status.clone(), &stepper);
            }
        }
        // Let the link drain without new input.
        for _ in 0..10 {
            let delivery = link.tick();
            for (_, mv) in delivery.moves {
                receive_move(&mut server, &mv, &stepper, &mut NullSink).unwrap();
                applied += 1;
            }
            link.publish_status(1, server.clone());
            if let Some(status) = delivery.statuses.get(&1) {
                client.apply_authoritative(status.clone(), &stepper);
            }
        }

        assert_eq!(applied + link.dropped_moves() as usize, 300);
        assert!(link.dropped_moves() > 0);
        // Whatever the prediction still holds is newer than the last acknowledged move.
        let ack = client.last_ack().unwrap_or(f64::MIN);
        assert_eq!(client.last_ack(), server.last_move_timestamp());
        assert!(client.pending().all(|mv| mv.timestamp > ack));
        // Once the agent is at rest, the prediction agrees with the server again.
        assert_eq!(server.contact(), ContactState::FlatFloorContact);
        assert!((client.local().position - server.position).norm() < 1e-4);
    }
}
