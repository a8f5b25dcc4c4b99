//! Player abilities: jump, magnetize and boost.
//!
//! Each ability is a silent no-op when its preconditions fail and reports whether it fired.

use crate::{
    body::{AgentBody, PhysicsBody},
    constants::DIST_EPS,
    contact::set_contact,
    settings::MovementSettings,
    status::{AgentStatus, ContactState, GravityTracking},
    timers::TimerKind,
    utils::{Vec3, forward_of, input_to_world, project_on_plane, up_of},
};

/// Leave the surface with an upward impulse, keeping tangent momentum.
///
/// Requires contact and magnetize.
pub fn jump(status: &mut AgentStatus, settings: &MovementSettings) -> bool {
    let contact = status.contact();
    if !contact.is_grounded() || !status.magnetized {
        return false;
    }

    let up = up_of(&status.rotation);
    let tangent = project_on_plane(status.velocity + status.sphere_velocity, up);

    set_contact(status, ContactState::NoContact, settings);
    status.sphere_velocity = Vec3::zeros();
    status.velocity = tangent + up * settings.jump_velocity;
    status.jump_force = up * settings.jump_force;
    status.last_jump_position = Some(status.position);
    if contact == ContactState::ConcaveSphereContact {
        status.reevaluate_level_sphere = true;
    }
    log::debug!("Jump from {contact:?} at tick {}", status.tick);
    true
}

/// Flip magnetize. Returns the new state.
///
/// Turning off frees the agent: no contact, no gravity tracking. Turning on inside a gravity
/// field halves linear and angular velocity.
pub fn toggle_magnetize(status: &mut AgentStatus, settings: &MovementSettings, dt: f32) -> bool {
    status.timers.cancel(TimerKind::Remagnetize);

    if status.magnetized {
        status.magnetized = false;
        set_contact(status, ContactState::NoContact, settings);
        status.gravity = GravityTracking::SENTINEL;
    } else {
        status.magnetized = true;
        if !status.fields.is_empty() {
            let mut body = AgentBody::new(status, dt);
            let linear = body.linear_velocity();
            let angular = body.angular_velocity();
            body.set_linear_velocity(linear * 0.5);
            body.set_angular_velocity(angular * 0.5);
        }
    }
    log::debug!("Magnetize {} at tick {}", status.magnetized, status.tick);
    status.magnetized
}

/// Timer callback after a bounce.
pub fn remagnetize(status: &mut AgentStatus) {
    if !status.magnetized {
        status.magnetized = true;
        log::debug!("Re-magnetized at tick {}", status.tick);
    }
}

/// Spend a charge to dash along `direction` (move space: `x` forward, `y` right, `z` up).
///
/// A zero direction boosts forward.
pub fn boost(
    status: &mut AgentStatus,
    direction: Vec3,
    settings: &MovementSettings,
    dt: f32,
) -> bool {
    if status.boost_charges == 0 {
        return false;
    }

    let forward = forward_of(&status.rotation);
    let world_dir = input_to_world(&status.rotation, direction)
        .try_normalize(DIST_EPS)
        .unwrap_or(forward);
    let up = up_of(&status.rotation);
    let tangent = project_on_plane(world_dir, up)
        .try_normalize(DIST_EPS)
        .unwrap_or(forward);

    match status.contact() {
        ContactState::NoContact => {
            let mut body = AgentBody::new(status, dt);
            let kept = body.linear_velocity() * settings.boost_velocity_retain;
            body.set_linear_velocity(kept);
            body.apply_impulse(world_dir * settings.boost_speed);
        }
        ContactState::FlatFloorContact => {
            AgentBody::new(status, dt)
                .set_linear_velocity(tangent * settings.boost_speed * settings.flat_boost_percent);
        }
        ContactState::ConvexSphereContact => {
            status.sphere_velocity =
                tangent * settings.boost_speed * settings.convex_boost_percent;
        }
        ContactState::ConcaveSphereContact => {
            status.sphere_velocity =
                tangent * settings.boost_speed * settings.concave_boost_percent;
        }
    }

    status.boost_charges -= 1;
    status.timers.schedule_once(
        TimerKind::BoostRecharge,
        status.tick,
        settings.boost_recharge_ticks(),
    );
    true
}

/// Timer callback: restore one charge and keep recharging while below max.
pub fn recharge_boost(status: &mut AgentStatus, settings: &MovementSettings) -> bool {
    if status.boost_charges >= settings.max_boosts {
        return false;
    }
    status.boost_charges += 1;
    if status.boost_charges < settings.max_boosts {
        status.timers.schedule_once(
            TimerKind::BoostRecharge,
            status.tick,
            settings.boost_recharge_ticks(),
        );
    }
    true
}
