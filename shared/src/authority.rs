//! Server-side move intake.
//!
//! The server never takes a client's position. It re-runs every accepted move against its own
//! status with the same [`MoveStepper`] the client predicted with.

use std::fmt;

use crate::{
    debug::DebugSink,
    moves::Move,
    status::AgentStatus,
    stepper::{MoveStepper, TickEvents},
};

/// Rotation difference (radians) above which a client's pose snapshot is reported as desynced.
const POSE_MISMATCH_ANGLE: f32 = 1.0e-3;

/// Why an uploaded move was not applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveRejection {
    /// At or before the last applied move; duplicates and reordered packets land here.
    Stale { timestamp: f64, last: f64 },
    Malformed(&'static str),
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::Stale { timestamp, last } => {
                write!(f, "stale move at {timestamp:.4}s (last applied {last:.4}s)")
            }
            MoveRejection::Malformed(reason) => write!(f, "malformed move: {reason}"),
        }
    }
}

/// Validate and apply one uploaded move to the authoritative status.
pub fn receive_move(
    status: &mut AgentStatus,
    mv: &Move,
    stepper: &MoveStepper,
    sink: &mut dyn DebugSink,
) -> Result<TickEvents, MoveRejection> {
    mv.validate().map_err(MoveRejection::Malformed)?;

    if let Some(last) = status.last_move_timestamp() {
        if mv.timestamp <= last {
            return Err(MoveRejection::Stale {
                timestamp: mv.timestamp,
                last,
            });
        }
    }

    if let Some(pose) = &mv.pose {
        let angle = pose.pre_rotation.angle_to(&status.rotation);
        if angle > POSE_MISMATCH_ANGLE {
            log::debug!(
                "Pose desync before move {:.4}s: client and server differ by {angle:.4} rad",
                mv.timestamp
            );
        }
    }

    let events = stepper.simulate(status, mv, sink);

    if let Some(pose) = &mv.pose {
        let angle = pose.post_rotation.angle_to(&status.rotation);
        if angle > POSE_MISMATCH_ANGLE {
            log::debug!(
                "Pose desync after move {:.4}s: client and server differ by {angle:.4} rad",
                mv.timestamp
            );
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        debug::NullSink,
        settings::MovementSettings,
        utils::{Quat, Vec3},
        world::{GravityWorld, demo_world},
    };

    fn setup() -> (GravityWorld, MovementSettings) {
        (GravityWorld::build(demo_world()), MovementSettings::default())
    }

    #[test]
    fn applies_moves_in_timestamp_order() {
        let (world, settings) = setup();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);

        assert!(receive_move(&mut status, &Move::idle(1.0), &stepper, &mut NullSink).is_ok());
        assert!(receive_move(&mut status, &Move::idle(1.5), &stepper, &mut NullSink).is_ok());
        assert_eq!(status.last_move_timestamp(), Some(1.5));
        assert_eq!(status.tick, 2);
    }

    #[test]
    fn duplicate_and_older_moves_are_stale() {
        let (world, settings) = setup();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        receive_move(&mut status, &Move::idle(2.0), &stepper, &mut NullSink).unwrap();
        let before = status.clone();

        let dup = receive_move(&mut status, &Move::idle(2.0), &stepper, &mut NullSink);
        assert_eq!(
            dup,
            Err(MoveRejection::Stale {
                timestamp: 2.0,
                last: 2.0
            })
        );
        let old = receive_move(&mut status, &Move::idle(1.0), &stepper, &mut NullSink);
        assert!(matches!(old, Err(MoveRejection::Stale { .. })));
        assert_eq!(status, before);
    }

    #[test]
    fn malformed_moves_are_rejected_untouched() {
        let (world, settings) = setup();
        let stepper = MoveStepper::new(&world, &settings);
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        let before = status.clone();

        let bad = Move::idle(1.0).with_movement(Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(
            receive_move(&mut status, &bad, &stepper, &mut NullSink),
            Err(MoveRejection::Malformed("Move vectors are not finite"))
        );
        assert_eq!(status, before);
    }
}
