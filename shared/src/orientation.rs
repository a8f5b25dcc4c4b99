//! Orientation solver: turn the agent so its up axis opposes gravity.

use crate::{
    constants::{FALLING_ALIGNMENT_THRESHOLD, MIN_ORIENT_DISTANCE},
    settings::MovementSettings,
    status::ContactState,
    utils::{
        Quat, Vec3, basis_from_up_forward, basis_from_up_right, exp_blend, forward_of, right_of,
        safe_slerp, stable_perpendicular,
    },
};

/// Fully aligned rotation for `gravity`, keeping as much of the current heading as possible.
///
/// While falling along gravity the right axis is the stabilizer, since forward tends to swing
/// toward the fall direction. Returns `None` for zero gravity.
pub fn target_rotation(current: &Quat, gravity: Vec3, velocity: Vec3) -> Option<Quat> {
    let up = -gravity;
    let falling = velocity.dot(&gravity) >= FALLING_ALIGNMENT_THRESHOLD;

    let primary = if falling {
        basis_from_up_right(up, right_of(current))
    } else {
        basis_from_up_forward(up, forward_of(current))
    };
    primary
        .or_else(|| {
            if falling {
                basis_from_up_forward(up, forward_of(current))
            } else {
                basis_from_up_right(up, right_of(current))
            }
        })
        .or_else(|| basis_from_up_forward(up, stable_perpendicular(up)))
}

/// How far toward the target to rotate this tick, in `[0, 1]`.
pub fn blend_factor(
    contact: ContactState,
    distance: f32,
    dt: f32,
    settings: &MovementSettings,
) -> f32 {
    match contact {
        ContactState::NoContact => {
            (settings.orient_distance_gain * dt / distance.max(MIN_ORIENT_DISTANCE)).clamp(0.0, 1.0)
        }
        ContactState::ConvexSphereContact | ContactState::ConcaveSphereContact => 1.0,
        ContactState::FlatFloorContact => exp_blend(settings.flat_orient_speed, dt),
    }
}

/// One tick of reorientation. Zero gravity leaves the rotation untouched.
pub fn solve(
    current: &Quat,
    gravity: Vec3,
    velocity: Vec3,
    contact: ContactState,
    distance: f32,
    dt: f32,
    settings: &MovementSettings,
) -> Quat {
    match target_rotation(current, gravity, velocity) {
        Some(target) => safe_slerp(current, &target, blend_factor(contact, distance, dt, settings)),
        None => *current,
    }
}
