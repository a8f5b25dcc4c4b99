/*!
Movement integrator.

Input is converted to motion by one of three profiles, selected by contact state:

- [`GroundProfile`] on flat floors: asymmetric speed table, velocity eased toward the target
  at `surface_acceleration` and toward rest at `surface_stop_rate`.
- [`SphereWalkProfile`] on convex and concave spheres: the same speed table drives a tangent
  velocity that is turned into an angular step around the sphere's center.
- [`AirProfile`] while airborne: input (including the vertical axis) accumulates straight
  into velocity.
*/

use crate::{
    body::{AgentBody, PhysicsBody},
    constants::DIST_EPS,
    query::SpatialQuery,
    settings::MovementSettings,
    status::{AgentStatus, ContactState},
    utils::{
        Vec3, approach, axis_active, input_to_world, project_on_plane, rotation_about, up_of,
    },
};

pub trait MovementProfile {
    /// Advance the agent's velocity (and, for curved surfaces, its position) by one step.
    fn apply(
        &self,
        status: &mut AgentStatus,
        input: Vec3,
        world: &dyn SpatialQuery,
        settings: &MovementSettings,
        dt: f32,
    );
}

pub struct GroundProfile;
pub struct SphereWalkProfile;
pub struct AirProfile;

pub fn profile_for(contact: ContactState) -> &'static dyn MovementProfile {
    match contact {
        ContactState::NoContact => &AirProfile,
        ContactState::FlatFloorContact => &GroundProfile,
        ContactState::ConvexSphereContact | ContactState::ConcaveSphereContact => {
            &SphereWalkProfile
        }
    }
}

/// Surface target velocity in move space (`x` forward, `y` right).
///
/// - forward only: `x * forward_speed`
/// - forward and lateral: half of `forward_lateral_speed` on each axis
/// - lateral only: `y * lateral_speed`
/// - backward only: `x * backward_speed`
/// - backward and lateral: half of `backward_speed` on each axis
pub fn surface_target(input: Vec3, settings: &MovementSettings) -> Vec3 {
    let forward = input.x;
    let right = input.y;
    let has_forward = axis_active(forward);
    let has_right = axis_active(right);

    let (x, y) = match (has_forward, has_right) {
        (false, false) => (0.0, 0.0),
        (false, true) => (0.0, right * settings.lateral_speed),
        (true, false) if forward > 0.0 => (forward * settings.forward_speed, 0.0),
        (true, false) => (forward * settings.backward_speed, 0.0),
        (true, true) => {
            let speed = if forward > 0.0 {
                settings.forward_lateral_speed
            } else {
                settings.backward_speed
            };
            (forward * speed * 0.5, right * speed * 0.5)
        }
    };
    Vec3::new(x, y, 0.0)
}

fn has_surface_input(input: Vec3) -> bool {
    axis_active(input.x) || axis_active(input.y)
}

impl MovementProfile for GroundProfile {
    fn apply(
        &self,
        status: &mut AgentStatus,
        input: Vec3,
        _world: &dyn SpatialQuery,
        settings: &MovementSettings,
        dt: f32,
    ) {
        let up = up_of(&status.rotation);
        let current = project_on_plane(status.velocity, up);
        let next = if has_surface_input(input) {
            let target = input_to_world(&status.rotation, surface_target(input, settings));
            approach(current, target, settings.surface_acceleration, dt)
        } else {
            approach(current, Vec3::zeros(), settings.surface_stop_rate, dt)
        };
        AgentBody::new(status, dt).set_linear_velocity(next);
    }
}

impl MovementProfile for SphereWalkProfile {
    fn apply(
        &self,
        status: &mut AgentStatus,
        input: Vec3,
        world: &dyn SpatialQuery,
        settings: &MovementSettings,
        dt: f32,
    ) {
        let Some(source) = status.gravity.source.and_then(|h| world.source(h)) else {
            return;
        };
        let Some(radius) = source.radius() else {
            return;
        };
        let center = source.translation;
        let offset = status.position - center;
        let Some(radial) = offset.try_normalize(DIST_EPS) else {
            return;
        };

        status.sphere_velocity = project_on_plane(status.sphere_velocity, radial);
        status.sphere_velocity = if has_surface_input(input) {
            let target = project_on_plane(
                input_to_world(&status.rotation, surface_target(input, settings)),
                radial,
            );
            approach(status.sphere_velocity, target, settings.surface_acceleration, dt)
        } else {
            approach(status.sphere_velocity, Vec3::zeros(), settings.surface_stop_rate, dt)
        };

        let speed = status.sphere_velocity.norm();
        if speed <= DIST_EPS {
            return;
        }
        let angle = speed * dt / radius;
        let step = rotation_about(offset.cross(&status.sphere_velocity), angle);

        let hold = settings.agent_radius + settings.hover_height;
        let rest = match status.contact() {
            ContactState::ConcaveSphereContact => radius - hold,
            _ => radius + hold,
        };
        let turned = step * radial;
        status.position = center + turned * rest;
        status.rotation = step * status.rotation;
        status.sphere_velocity = step * status.sphere_velocity;
    }
}

impl MovementProfile for AirProfile {
    fn apply(
        &self,
        status: &mut AgentStatus,
        input: Vec3,
        _world: &dyn SpatialQuery,
        settings: &MovementSettings,
        dt: f32,
    ) {
        if !input.iter().any(|c| axis_active(*c)) {
            return;
        }
        let push = input_to_world(&status.rotation, input) * settings.air_speed;
        AgentBody::new(status, dt).apply_force(push);
    }
}

/// Run the profile for the agent's current contact state.
///
/// The vertical input axis only reaches the air profile.
pub fn integrate_input(
    status: &mut AgentStatus,
    input: Vec3,
    world: &dyn SpatialQuery,
    settings: &MovementSettings,
    dt: f32,
) {
    let contact = status.contact();
    let input = if contact.is_grounded() {
        Vec3::new(input.x, input.y, 0.0)
    } else {
        input
    };
    profile_for(contact).apply(status, input, world, settings, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        contact::set_contact,
        handle::{SourceHandle, SourceKind},
        utils::Quat,
        world::{GravityShapeDef, GravitySourceDef, GravityWorld},
    };

    const DT: f32 = 1.0 / 60.0;

    fn grounded(settings: &MovementSettings) -> AgentStatus {
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), settings);
        set_contact(&mut status, ContactState::FlatFloorContact, settings);
        status
    }

    fn ground_displacement(input: Vec3, settings: &MovementSettings, ticks: usize) -> Vec3 {
        let world = GravityWorld::build(Vec::new());
        let mut status = grounded(settings);
        for _ in 0..ticks {
            integrate_input(&mut status, input, &world, settings, DT);
            AgentBody::new(&mut status, DT).apply_damping();
            status.position += status.velocity * DT;
        }
        status.position
    }

    #[test]
    fn speed_table_matches_direction() {
        let s = MovementSettings::default();
        assert_eq!(surface_target(Vec3::new(1.0, 0.0, 0.0), &s), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(surface_target(Vec3::new(1.0, 1.0, 0.0), &s), Vec3::new(6.0, 6.0, 0.0));
        assert_eq!(surface_target(Vec3::new(0.0, -1.0, 0.0), &s), Vec3::new(0.0, -7.0, 0.0));
        assert_eq!(surface_target(Vec3::new(-1.0, 0.0, 0.0), &s), Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(surface_target(Vec3::new(-1.0, 1.0, 0.0), &s), Vec3::new(-2.5, 2.5, 0.0));
        assert_eq!(surface_target(Vec3::zeros(), &s), Vec3::zeros());
    }

    #[test]
    fn forward_covers_exactly_twice_the_backward_distance() {
        let settings = MovementSettings {
            forward_speed: 1000.0,
            backward_speed: 500.0,
            ..Default::default()
        };
        let forward = ground_displacement(Vec3::new(1.0, 0.0, 0.0), &settings, 30);
        let backward = ground_displacement(Vec3::new(-1.0, 0.0, 0.0), &settings, 30);

        assert!(forward.z < 0.0 && backward.z > 0.0);
        let ratio = forward.norm() / backward.norm();
        assert!((ratio - 2.0).abs() < 1e-4, "ratio {ratio}");
    }

    #[test]
    fn ground_velocity_eases_in_and_out() {
        let settings = MovementSettings::default();
        let world = GravityWorld::build(Vec::new());
        let mut status = grounded(&settings);

        integrate_input(&mut status, Vec3::new(1.0, 0.0, 0.0), &world, &settings, DT);
        let first = status.velocity.norm();
        assert!(first > 0.0 && first < settings.forward_speed);

        for _ in 0..120 {
            integrate_input(&mut status, Vec3::new(1.0, 0.0, 0.0), &world, &settings, DT);
        }
        assert!((status.velocity.norm() - settings.forward_speed).abs() < 1e-2);

        integrate_input(&mut status, Vec3::zeros(), &world, &settings, DT);
        let braking = status.velocity.norm();
        assert!(braking < settings.forward_speed && braking > 0.0);
    }

    #[test]
    fn ground_ignores_vertical_input() {
        let settings = MovementSettings::default();
        let world = GravityWorld::build(Vec::new());
        let mut status = grounded(&settings);
        integrate_input(&mut status, Vec3::new(0.0, 0.0, 1.0), &world, &settings, DT);
        assert_eq!(status.velocity, Vec3::zeros());
    }

    #[test]
    fn air_input_accumulates_without_decay() {
        let settings = MovementSettings::default();
        let world = GravityWorld::build(Vec::new());
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);

        for _ in 0..60 {
            integrate_input(&mut status, Vec3::new(0.0, 0.0, 1.0), &world, &settings, DT);
        }
        assert!((status.velocity - Vec3::new(0.0, settings.air_speed, 0.0)).norm() < 1e-3);

        for _ in 0..60 {
            integrate_input(&mut status, Vec3::zeros(), &world, &settings, DT);
        }
        assert!((status.velocity.y - settings.air_speed).abs() < 1e-3);
    }

    #[test]
    fn sphere_walk_turns_by_speed_time_over_radius() {
        let radius = 12.0;
        let center = Vec3::new(0.0, -20.0, 0.0);
        let world = GravityWorld::build(vec![GravitySourceDef {
            id: 3,
            translation: center,
            rotation: Quat::identity(),
            shape: GravityShapeDef::SphereFloor { radius },
            strength: 20.0,
            field_radius: 10.0,
        }]);
        let settings = MovementSettings {
            surface_acceleration: 1.0e6,
            ..Default::default()
        };
        let start = center + Vec3::y() * (radius + settings.agent_radius + settings.hover_height);
        let mut status = AgentStatus::spawn(start, Quat::identity(), &settings);
        set_contact(&mut status, ContactState::ConvexSphereContact, &settings);
        status.gravity.source = Some(SourceHandle::new(3, SourceKind::SphereFloor));

        let ticks = 90;
        for _ in 0..ticks {
            integrate_input(&mut status, Vec3::new(1.0, 0.0, 0.0), &world, &settings, DT);
        }

        let before = (start - center).normalize();
        let after = (status.position - center).normalize();
        let angle = before.dot(&after).clamp(-1.0, 1.0).acos();
        let expected = settings.forward_speed * ticks as f32 * DT / radius;
        assert!((angle - expected).abs() < 1e-3, "angle {angle} expected {expected}");

        // Walking forward (-Z) over the top of the sphere.
        assert!(status.position.z < 0.0);
        // Up stays radial.
        assert!((up_of(&status.rotation) - after).norm() < 1e-3);
        let held = (status.position - center).norm();
        assert!((held - (radius + settings.agent_radius + settings.hover_height)).abs() < 1e-3);
    }

    #[test]
    fn concave_walk_follows_the_inside_of_the_shell() {
        let radius = 20.0;
        let center = Vec3::new(0.0, 30.0, 0.0);
        let world = GravityWorld::build(vec![GravitySourceDef {
            id: 9,
            translation: center,
            rotation: Quat::identity(),
            shape: GravityShapeDef::LevelSphere { radius },
            strength: 20.0,
            field_radius: 0.0,
        }]);
        let settings = MovementSettings {
            surface_acceleration: 1.0e6,
            ..Default::default()
        };
        let hold = settings.agent_radius + settings.hover_height;
        // Standing on the bottom of the shell, up toward the center.
        let start = center - Vec3::y() * (radius - hold);
        let mut status = AgentStatus::spawn(start, Quat::identity(), &settings);
        set_contact(&mut status, ContactState::ConcaveSphereContact, &settings);
        status.gravity.source = Some(SourceHandle::new(9, SourceKind::LevelSphere));

        let ticks = 90;
        for _ in 0..ticks {
            integrate_input(&mut status, Vec3::new(1.0, 0.0, 0.0), &world, &settings, DT);
        }

        let before = (start - center).normalize();
        let after = (status.position - center).normalize();
        let angle = before.dot(&after).clamp(-1.0, 1.0).acos();
        let expected = settings.forward_speed * ticks as f32 * DT / radius;
        assert!((angle - expected).abs() < 1e-3, "angle {angle} expected {expected}");

        assert!(status.position.z < 0.0);
        assert!((up_of(&status.rotation) + after).norm() < 1e-3);
        let held = (status.position - center).norm();
        assert!((held - (radius - hold)).abs() < 1e-3);
    }
}
