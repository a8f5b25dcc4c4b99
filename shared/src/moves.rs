//! One tick of player input, and the accumulator that builds it.

use crate::{
    bitmask_flags::BitmaskFlags,
    define_bitmask_flags,
    utils::{Quat, Vec3, is_finite_quat, is_finite_vec},
};

define_bitmask_flags!(MoveButton, u8, {
    Jump,
    Magnetize,
    Boost,
});

pub type MoveButtons = BitmaskFlags<u8>;

/// Rotations captured around the local simulation of a move.
///
/// The server never trusts these for simulation. They travel with the move so a desync can be
/// pinpointed to the tick where the two sides first disagreed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseSnapshot {
    pub pre_rotation: Quat,
    pub post_rotation: Quat,
    pub spring_arm_pitch: f32,
}

/// One fixed tick of input plus enough context to replay it.
///
/// Axes of `movement` and `boost_direction`:
/// - `x`: forward (+) / backward (-)
/// - `y`: right (+) / left (-)
/// - `z`: up (+) / down (-), only honoured while airborne
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    pub movement: Vec3,
    /// Pitch delta in radians.
    pub look_pitch: f32,
    /// Yaw delta in radians.
    pub look_yaw: f32,
    pub buttons: MoveButtons,
    pub boost_direction: Vec3,
    /// Server-clock timestamp in seconds. Strictly increasing per agent.
    pub timestamp: f64,
    pub pose: Option<PoseSnapshot>,
}

impl Move {
    /// An empty move at `timestamp`.
    pub fn idle(timestamp: f64) -> Self {
        Self {
            movement: Vec3::zeros(),
            look_pitch: 0.0,
            look_yaw: 0.0,
            buttons: MoveButtons::default(),
            boost_direction: Vec3::zeros(),
            timestamp,
            pose: None,
        }
    }

    pub fn pressed(&self, button: MoveButton) -> bool {
        self.buttons.has(button)
    }

    pub fn with_movement(mut self, movement: Vec3) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_button(mut self, button: MoveButton) -> Self {
        self.buttons.add(button);
        self
    }

    pub fn with_look(mut self, pitch: f32, yaw: f32) -> Self {
        self.look_pitch = pitch;
        self.look_yaw = yaw;
        self
    }

    pub fn with_boost_direction(mut self, direction: Vec3) -> Self {
        self.boost_direction = direction;
        self
    }

    /// Reject moves that could poison the simulation.
    ///
    /// Intended for the deserialization boundary; the stepper assumes validated input.
    pub fn validate(&self) -> Result<(), &'static str> {
        const AXIS_LIMIT: f32 = 1.0 + 1.0e-3;
        const MAX_LOOK_DELTA: f32 = std::f32::consts::PI;

        if !self.timestamp.is_finite() {
            return Err("Move timestamp is not finite");
        }
        if !is_finite_vec(&self.movement) || !is_finite_vec(&self.boost_direction) {
            return Err("Move vectors are not finite");
        }
        if self.movement.iter().any(|c| c.abs() > AXIS_LIMIT) {
            return Err("Move axis out of range");
        }
        if !self.look_pitch.is_finite() || !self.look_yaw.is_finite() {
            return Err("Look deltas are not finite");
        }
        if self.look_pitch.abs() > MAX_LOOK_DELTA || self.look_yaw.abs() > MAX_LOOK_DELTA {
            return Err("Look delta too large");
        }
        if let Some(pose) = &self.pose {
            if !is_finite_quat(&pose.pre_rotation)
                || !is_finite_quat(&pose.post_rotation)
                || !pose.spring_arm_pitch.is_finite()
            {
                return Err("Pose snapshot is not finite");
            }
        }
        Ok(())
    }
}

/// Accumulates raw input events between fixed ticks.
///
/// Axis input keeps the latest value, look deltas sum, and button presses latch until the
/// next [`PendingMove::take`] so a short tap between ticks is never lost.
#[derive(Clone, Debug, Default)]
pub struct PendingMove {
    movement: Vec3,
    look_pitch: f32,
    look_yaw: f32,
    buttons: MoveButtons,
    boost_direction: Vec3,
}

impl PendingMove {
    pub fn set_movement(&mut self, forward: f32, right: f32) {
        self.movement.x = forward.clamp(-1.0, 1.0);
        self.movement.y = right.clamp(-1.0, 1.0);
    }

    pub fn set_air_movement(&mut self, up: f32) {
        self.movement.z = up.clamp(-1.0, 1.0);
    }

    pub fn add_look(&mut self, pitch: f32, yaw: f32) {
        self.look_pitch += pitch;
        self.look_yaw += yaw;
    }

    pub fn press(&mut self, button: MoveButton) {
        self.buttons.add(button);
    }

    pub fn set_boost_direction(&mut self, direction: Vec3) {
        self.boost_direction = direction;
    }

    /// Build the move for this tick and reset the per-tick accumulators.
    ///
    /// Held axes carry over to the next tick; look deltas and presses do not.
    pub fn take(&mut self, timestamp: f64) -> Move {
        let limit = std::f32::consts::PI;
        let mv = Move {
            movement: self.movement,
            look_pitch: self.look_pitch.clamp(-limit, limit),
            look_yaw: self.look_yaw.clamp(-limit, limit),
            buttons: self.buttons,
            boost_direction: self.boost_direction,
            timestamp,
            pose: None,
        };
        self.look_pitch = 0.0;
        self.look_yaw = 0.0;
        self.buttons.clear();
        mv
    }
}
