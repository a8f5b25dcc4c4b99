/*!
Fixed-step orchestration.

[`MoveStepper::simulate`] folds one [`Move`] into an [`AgentStatus`]. The server runs it once
per received move, a predicting client once per local tick and again for every replayed move.
Both must produce identical results, so nothing in here reads wall-clock time.

Phase order within a tick:
1. timers due this tick
2. look (yaw turns the body, pitch the spring arm)
3. gravity sample
4. field tracking
5. abilities (magnetize, jump, boost)
6. orientation
7. movement profile
8. gravity force while airborne and magnetized
9. damping
10. swept integration, landing or bouncing on the first blocking hit
11. flat-floor edge probe
12. jump force decay
*/

use std::f32::consts::{PI, TAU};

use crate::{
    abilities::{boost, jump, recharge_boost, remagnetize, toggle_magnetize},
    body::{AgentBody, PhysicsBody},
    constants::{DIST_EPS, FIXED_DT},
    contact::{HitOutcome, on_fields_changed, on_surface_hit, set_contact},
    debug::{DebugEvent, DebugSink},
    gravity::sample_gravity,
    handle::SourceHandle,
    movement::integrate_input,
    moves::{Move, MoveButton},
    orientation,
    query::SpatialQuery,
    settings::MovementSettings,
    status::{AgentStatus, ContactState, GravityTracking},
    timers::TimerKind,
    utils::{Vec3, approach, local_up, rotation_about, up_of},
};

/// What happened during one simulated tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickEvents {
    pub landed: Option<ContactState>,
    pub bounced: bool,
    pub contact_lost: bool,
    pub jumped: bool,
    pub boosted: bool,
    pub magnetize_toggled: bool,
    pub recharged: bool,
    pub fields_entered: Vec<SourceHandle>,
    pub fields_exited: Vec<SourceHandle>,
}

/// Runs the movement core for one agent against one world.
pub struct MoveStepper<'a> {
    world: &'a dyn SpatialQuery,
    settings: &'a MovementSettings,
    dt: f32,
}

impl<'a> MoveStepper<'a> {
    pub fn new(world: &'a dyn SpatialQuery, settings: &'a MovementSettings) -> Self {
        Self {
            world,
            settings,
            dt: FIXED_DT,
        }
    }

    pub fn settings(&self) -> &MovementSettings {
        self.settings
    }

    pub fn world(&self) -> &dyn SpatialQuery {
        self.world
    }

    /// Fold one move into `status`.
    pub fn simulate(
        &self,
        status: &mut AgentStatus,
        mv: &Move,
        sink: &mut dyn DebugSink,
    ) -> TickEvents {
        let mut events = TickEvents::default();
        let start_contact = status.contact();

        status.tick += 1;
        self.fire_timers(status, &mut events);
        self.apply_look(status, mv);
        self.track_gravity(status, sink);
        self.track_fields(status, &mut events);
        self.use_abilities(status, mv, &mut events);
        self.orient(status, sink);
        integrate_input(status, mv.movement, self.world, self.settings, self.dt);
        self.apply_gravity_and_damping(status);
        self.integrate_motion(status, &mut events, sink);
        self.probe_edge(status, sink);
        self.decay_jump_force(status);
        status.last_move = Some(*mv);

        let end_contact = status.contact();
        if start_contact.is_grounded() && !end_contact.is_grounded() {
            events.contact_lost = true;
        }
        if start_contact != end_contact {
            sink.record(DebugEvent::ContactChanged {
                position: status.position,
                from: start_contact,
                to: end_contact,
            });
        }
        events
    }

    fn fire_timers(&self, status: &mut AgentStatus, events: &mut TickEvents) {
        while let Some(kind) = status.timers.pop_due(status.tick) {
            match kind {
                TimerKind::BoostRecharge => {
                    events.recharged |= recharge_boost(status, self.settings);
                }
                TimerKind::Remagnetize => remagnetize(status),
            }
        }
    }

    fn apply_look(&self, status: &mut AgentStatus, mv: &Move) {
        let limit = self.settings.max_spring_arm_pitch;
        status.spring_arm_pitch = (status.spring_arm_pitch + mv.look_pitch).clamp(-limit, limit);
        if status.magnetized {
            status.rotation *= rotation_about(local_up(), -mv.look_yaw);
        } else {
            // Free-floating: look around without turning the body.
            status.spring_arm_yaw = wrap_angle(status.spring_arm_yaw + mv.look_yaw);
        }
        status.last_look_pitch = mv.look_pitch;
        status.last_look_yaw = mv.look_yaw;
    }

    fn track_gravity(&self, status: &mut AgentStatus, sink: &mut dyn DebugSink) {
        if !status.magnetized {
            status.gravity = GravityTracking::SENTINEL;
            return;
        }

        let sample = sample_gravity(self.world, status, self.settings);
        match sample {
            Some(sample) => status.gravity = sample.tracking(),
            None => {
                if status.contact().is_grounded() {
                    set_contact(status, ContactState::NoContact, self.settings);
                }
                status.gravity = GravityTracking::SENTINEL;
            }
        }
        sink.record(DebugEvent::GravitySample {
            origin: status.position,
            vector: status.gravity.vector,
            impact: status.gravity.impact,
            source: status.gravity.source,
        });
    }

    fn track_fields(&self, status: &mut AgentStatus, events: &mut TickEvents) {
        let current = self.world.fields_containing(status.position);
        if current == status.fields {
            return;
        }

        events.fields_entered = current
            .iter()
            .filter(|h| !status.fields.contains(h))
            .copied()
            .collect();
        events.fields_exited = status
            .fields
            .iter()
            .filter(|h| !current.contains(h))
            .copied()
            .collect();

        let had_fields = !status.fields.is_empty();
        status.fields = current;
        status.reevaluate_level_sphere = true;
        on_fields_changed(status, had_fields, self.settings);
    }

    fn use_abilities(&self, status: &mut AgentStatus, mv: &Move, events: &mut TickEvents) {
        if mv.pressed(MoveButton::Magnetize) {
            toggle_magnetize(status, self.settings, self.dt);
            events.magnetize_toggled = true;
        }
        if mv.pressed(MoveButton::Jump) {
            events.jumped = jump(status, self.settings);
        }
        if mv.pressed(MoveButton::Boost) {
            events.boosted = boost(status, mv.boost_direction, self.settings, self.dt);
        }
    }

    fn orient(&self, status: &mut AgentStatus, sink: &mut dyn DebugSink) {
        if !status.gravity.has_gravity() {
            return;
        }
        let before = status.rotation;
        status.rotation = orientation::solve(
            &before,
            status.gravity.vector,
            status.velocity,
            status.contact(),
            status.gravity.distance,
            self.dt,
            self.settings,
        );
        sink.record(DebugEvent::Orientation {
            position: status.position,
            from: before,
            to: status.rotation,
        });
    }

    fn apply_gravity_and_damping(&self, status: &mut AgentStatus) {
        let pulled = !status.contact().is_grounded()
            && status.magnetized
            && status.gravity.has_gravity();
        let gravity = status.gravity.vector;

        let mut body = AgentBody::new(status, self.dt);
        if pulled {
            body.apply_force(gravity);
        }
        body.apply_damping();
    }

    fn integrate_motion(
        &self,
        status: &mut AgentStatus,
        events: &mut TickEvents,
        sink: &mut dyn DebugSink,
    ) {
        let spin = status.angular_velocity;
        if !status.contact().is_grounded() && spin.norm_squared() > DIST_EPS * DIST_EPS {
            status.rotation = rotation_about(spin, spin.norm() * self.dt) * status.rotation;
        }

        let delta = (status.velocity + status.jump_force) * self.dt;
        let length = delta.norm();
        if length <= DIST_EPS {
            return;
        }
        let radius = self.settings.agent_radius;
        let from = status.position;
        let to = from + delta;
        let hit = self.world.sweep(from, to, radius, None);
        sink.record(DebugEvent::Sweep {
            from,
            to,
            radius,
            hit: hit.map(|h| h.impact_point),
        });

        let Some(hit) = hit else {
            status.position = to;
            return;
        };

        let travel = (hit.distance - self.settings.hover_height).max(0.0);
        status.position = from + delta / length * travel;
        match on_surface_hit(status, &hit, self.settings) {
            HitOutcome::Landed(state) => {
                status.position =
                    hit.impact_point + hit.normal * (radius + self.settings.hover_height);
                events.landed = Some(state);
            }
            HitOutcome::Bounced => events.bounced = true,
            HitOutcome::Slid | HitOutcome::Ignored => {}
        }
    }

    fn probe_edge(&self, status: &mut AgentStatus, sink: &mut dyn DebugSink) {
        if status.contact() != ContactState::FlatFloorContact {
            return;
        }
        let up = up_of(&status.rotation);
        let hold = self.settings.agent_radius + self.settings.hover_height;
        let from = status.position;
        let to = from - up * (hold + self.settings.edge_probe_distance);
        let support = status
            .gravity
            .source
            .and_then(|source| self.world.line_trace(from, to, Some(source)));
        sink.record(DebugEvent::EdgeProbe {
            from,
            to,
            supported: support.is_some(),
        });

        match support {
            Some(hit) => status.position = hit.impact_point + up * hold,
            None => {
                log::debug!("Walked off source at tick {}", status.tick);
                set_contact(status, ContactState::NoContact, self.settings);
            }
        }
    }

    fn decay_jump_force(&self, status: &mut AgentStatus) {
        if status.jump_force == Vec3::zeros() {
            return;
        }
        status.jump_force = approach(
            status.jump_force,
            Vec3::zeros(),
            self.settings.jump_force_decay,
            self.dt,
        );
        if status.jump_force.norm() < 1.0e-3 {
            status.jump_force = Vec3::zeros();
        }
    }
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        debug::NullSink,
        utils::{Quat, forward_of},
        world::{GravityShapeDef, GravitySourceDef, GravityWorld, demo_world},
    };

    fn ground_def(half: f32) -> GravitySourceDef {
        GravitySourceDef {
            id: 1,
            translation: Vec3::new(0.0, -2.5, 0.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::FlatFloor {
                half_extents: Vec3::new(half, 0.5, half),
            },
            strength: 20.0,
            field_radius: 12.0,
        }
    }

    fn ground_world(half: f32) -> GravityWorld {
        GravityWorld::build(vec![ground_def(half)])
    }

    fn run(
        stepper: &MoveStepper,
        status: &mut AgentStatus,
        moves: &[Move],
    ) -> Vec<TickEvents> {
        moves
            .iter()
            .map(|mv| stepper.simulate(status, mv, &mut NullSink))
            .collect()
    }

    fn idle(count: usize, start: f64) -> Vec<Move> {
        (0..count)
            .map(|i| Move::idle(start + i as f64 * FIXED_DT as f64))
            .collect()
    }

    #[test]
    fn falls_onto_the_floor_and_lands_exactly_once() {
        let world = ground_world(20.0);
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);

        let mut landings = 0;
        let mut last_y = status.position.y;
        for mv in idle(240, 0.0) {
            let events = stepper.simulate(&mut status, &mv, &mut NullSink);
            if events.landed.is_some() {
                landings += 1;
                assert_eq!(events.landed, Some(ContactState::FlatFloorContact));
            }
            assert!(status.position.y <= last_y + 1e-4);
            last_y = status.position.y;
        }

        assert_eq!(landings, 1);
        assert_eq!(status.contact(), ContactState::FlatFloorContact);
        assert_eq!(status.gravity.source.map(|s| s.id()), Some(1));
        let rest = -2.0 + settings.agent_radius + settings.hover_height;
        assert!((status.position.y - rest).abs() < 1e-3);
        assert!(status.velocity.norm() < 1e-3);
    }

    #[test]
    fn replaying_the_same_moves_is_deterministic() {
        let world = GravityWorld::build(demo_world());
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let start = AgentStatus::spawn(Vec3::new(0.0, 1.0, 0.0), Quat::identity(), &settings);

        let mut moves = idle(300, 1.0);
        for (i, mv) in moves.iter_mut().enumerate() {
            mv.movement = Vec3::new(1.0, if i % 50 < 25 { 0.5 } else { -0.5 }, 0.0);
            mv.look_yaw = 0.01;
            if i == 80 || i == 200 {
                mv.buttons.add(MoveButton::Jump);
            }
            if i == 120 {
                mv.buttons.add(MoveButton::Boost);
                mv.boost_direction = Vec3::new(0.0, 1.0, 0.0);
            }
            if i == 150 || i == 170 {
                mv.buttons.add(MoveButton::Magnetize);
            }
        }

        let mut a = start.clone();
        let mut b = start.clone();
        let events_a = run(&stepper, &mut a, &moves);
        let events_b = run(&stepper, &mut b, &moves);

        assert_eq!(a, b);
        assert_eq!(events_a, events_b);
        assert_eq!(a.last_move_timestamp(), moves.last().map(|m| m.timestamp));
    }

    #[test]
    fn losing_contact_resets_tracking_in_the_same_tick() {
        let world = ground_world(20.0);
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        run(&stepper, &mut status, &idle(120, 0.0));
        assert!(status.contact().is_grounded());

        let mut jumped = 0;
        for i in 0..400 {
            let mut mv = Move::idle(10.0 + i as f64 * FIXED_DT as f64);
            if i % 100 == 0 {
                mv.buttons.add(MoveButton::Jump);
            }
            let events = stepper.simulate(&mut status, &mv, &mut NullSink);
            if events.jumped {
                jumped += 1;
            }
            if events.contact_lost {
                assert_eq!(status.contact(), ContactState::NoContact);
                assert!(status.gravity.is_sentinel());
            }
        }
        assert_eq!(jumped, 4);
    }

    #[test]
    fn walking_off_the_edge_drops_contact() {
        let world = ground_world(2.0);
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        run(&stepper, &mut status, &idle(120, 0.0));
        assert_eq!(status.contact(), ContactState::FlatFloorContact);

        let mut lost = false;
        for i in 0..120 {
            let mv = Move::idle(10.0 + i as f64 * FIXED_DT as f64)
                .with_movement(Vec3::new(1.0, 0.0, 0.0));
            if stepper.simulate(&mut status, &mv, &mut NullSink).contact_lost {
                lost = true;
                break;
            }
        }
        assert!(lost);
        assert_eq!(status.contact(), ContactState::NoContact);
        assert!(status.position.z < -2.0);
    }

    #[test]
    fn edge_probe_ignores_other_sources_under_the_feet() {
        let settings = MovementSettings::default();
        let floor_only = ground_world(20.0);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        run(&MoveStepper::new(&floor_only, &settings), &mut status, &idle(120, 0.0));
        assert_eq!(status.contact(), ContactState::FlatFloorContact);
        let resting = status.position;

        // A thin plate overlapping the floor, closer to the agent than the floor's top.
        let plate = GravitySourceDef {
            id: 2,
            translation: Vec3::new(0.0, -2.0, 0.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::FlatFloor {
                half_extents: Vec3::new(2.0, 0.01, 2.0),
            },
            strength: 20.0,
            field_radius: 1.0,
        };
        let overlapping = GravityWorld::build(vec![ground_def(20.0), plate]);
        let stepper = MoveStepper::new(&overlapping, &settings);

        for (i, events) in run(&stepper, &mut status, &idle(60, 10.0)).iter().enumerate() {
            assert!(!events.contact_lost, "contact lost on tick {i}");
        }
        assert_eq!(status.contact(), ContactState::FlatFloorContact);
        assert_eq!(status.gravity.source.map(|s| s.id()), Some(1));
        assert!((status.position - resting).norm() < 1e-4);
    }

    #[test]
    fn falls_onto_a_planetoid_and_lands_on_its_curve() {
        let center = Vec3::new(0.0, -10.0, 0.0);
        let radius = 5.0;
        let world = GravityWorld::build(vec![GravitySourceDef {
            id: 1,
            translation: center,
            rotation: Quat::identity(),
            shape: GravityShapeDef::SphereFloor { radius },
            strength: 20.0,
            field_radius: 10.0,
        }]);
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);

        let landings: Vec<_> = run(&stepper, &mut status, &idle(240, 0.0))
            .into_iter()
            .filter_map(|events| events.landed)
            .collect();

        assert_eq!(landings, vec![ContactState::ConvexSphereContact]);
        assert_eq!(status.contact(), ContactState::ConvexSphereContact);
        assert_eq!(status.gravity.source.map(|s| s.id()), Some(1));
        let held = (status.position - center).norm();
        let rest = radius + settings.agent_radius + settings.hover_height;
        assert!((held - rest).abs() < 1e-3, "held at {held}, expected {rest}");
        let radial = (status.position - center).normalize();
        assert!((up_of(&status.rotation) - radial).norm() < 1e-3);
    }

    #[test]
    fn remagnetize_timer_fires_after_its_delay() {
        let world = ground_world(20.0);
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        status.magnetized = false;
        let delay = settings.remagnetize_delay_ticks();
        status.timers.schedule(TimerKind::Remagnetize, 0, delay);

        run(&stepper, &mut status, &idle(delay as usize - 1, 0.0));
        assert!(!status.magnetized);
        run(&stepper, &mut status, &idle(1, 5.0));
        assert!(status.magnetized);
    }

    #[test]
    fn unmagnetized_agent_has_no_gravity() {
        let world = ground_world(20.0);
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        status.magnetized = false;

        run(&stepper, &mut status, &idle(60, 0.0));
        assert!(status.gravity.is_sentinel());
        assert_eq!(status.position, Vec3::zeros());
    }

    #[test]
    fn look_turns_body_and_clamps_pitch() {
        let world = ground_world(20.0);
        let settings = MovementSettings::default();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);

        let mv = Move::idle(0.0).with_look(3.0, std::f32::consts::FRAC_PI_2);
        stepper.simulate(&mut status, &mv, &mut NullSink);
        assert!((status.spring_arm_pitch - settings.max_spring_arm_pitch).abs() < 1e-6);
        assert!((forward_of(&status.rotation) - Vec3::x()).norm() < 1e-4);

        status.magnetized = false;
        let before = status.rotation;
        stepper.simulate(&mut status, &Move::idle(1.0).with_look(0.0, 0.5), &mut NullSink);
        assert!((status.spring_arm_yaw - 0.5).abs() < 1e-6);
        assert!(status.rotation.angle_to(&before) < 1e-6);
    }
}
