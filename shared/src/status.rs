//! Full simulation snapshot of one agent.
//!
//! `AgentStatus` is the unit the server replicates and the unit a client replays moves against.
//! The server owns exactly one per agent; a predicting client keeps a local copy and a
//! reconciled copy (see [`crate::reconcile`]).

use crate::{
    combat::Health,
    constants::NO_SOURCE_DISTANCE,
    handle::SourceHandle,
    moves::Move,
    settings::MovementSettings,
    timers::TimerQueue,
    utils::{Quat, Vec3},
};

/// What the agent is standing on. Exactly one holds at any time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContactState {
    #[default]
    NoContact,
    FlatFloorContact,
    ConvexSphereContact,
    ConcaveSphereContact,
}

impl ContactState {
    pub fn is_grounded(self) -> bool {
        self != ContactState::NoContact
    }

    pub fn is_sphere(self) -> bool {
        matches!(
            self,
            ContactState::ConvexSphereContact | ContactState::ConcaveSphereContact
        )
    }

    /// Stable wire tag for persistence.
    pub fn as_u8(self) -> u8 {
        match self {
            ContactState::NoContact => 0,
            ContactState::FlatFloorContact => 1,
            ContactState::ConvexSphereContact => 2,
            ContactState::ConcaveSphereContact => 3,
        }
    }

    pub fn from_u8(tag: u8) -> Result<Self, &'static str> {
        match tag {
            0 => Ok(ContactState::NoContact),
            1 => Ok(ContactState::FlatFloorContact),
            2 => Ok(ContactState::ConvexSphereContact),
            3 => Ok(ContactState::ConcaveSphereContact),
            _ => Err("Unknown contact state tag"),
        }
    }
}

/// Which gravity source currently pulls the agent, and how far away it is.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GravityTracking {
    /// Gravity acceleration (direction * strength); zero when untracked.
    pub vector: Vec3,
    pub source: Option<SourceHandle>,
    /// Distance to the source's surface; [`NO_SOURCE_DISTANCE`] when untracked.
    pub distance: f32,
    pub impact: Option<Vec3>,
}

impl GravityTracking {
    pub const SENTINEL: Self = Self {
        vector: Vec3::new(0.0, 0.0, 0.0),
        source: None,
        distance: NO_SOURCE_DISTANCE,
        impact: None,
    };

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    pub fn has_gravity(&self) -> bool {
        self.source.is_some() && self.vector.norm_squared() > 0.0
    }
}

impl Default for GravityTracking {
    fn default() -> Self {
        Self::SENTINEL
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentStatus {
    pub position: Vec3,
    pub rotation: Quat,
    pub spring_arm_pitch: f32,
    pub spring_arm_yaw: f32,
    /// World-space linear velocity.
    pub velocity: Vec3,
    /// World-space tangent velocity while walking on a sphere.
    pub sphere_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Residual launch momentum from the last jump, decaying to zero.
    pub jump_force: Vec3,
    pub last_jump_position: Option<Vec3>,
    pub boost_charges: u8,
    pub magnetized: bool,
    pub(crate) contact: ContactState,
    pub gravity: GravityTracking,
    pub last_move: Option<Move>,
    pub last_look_pitch: f32,
    pub last_look_yaw: f32,
    pub linear_damping: f32,
    pub tick: u64,
    pub timers: TimerQueue,
    /// Sources whose trigger field currently contains the agent, in registration order.
    pub fields: Vec<SourceHandle>,
    /// Level sphere the agent was last found inside.
    pub level_sphere: Option<SourceHandle>,
    /// Re-run the level sphere containment check on the next gravity sample.
    pub reevaluate_level_sphere: bool,
    pub health: Health,
}

impl AgentStatus {
    /// A freshly spawned agent: at rest, magnetized, touching nothing.
    pub fn spawn(position: Vec3, rotation: Quat, settings: &MovementSettings) -> Self {
        Self {
            position,
            rotation,
            spring_arm_pitch: 0.0,
            spring_arm_yaw: 0.0,
            velocity: Vec3::zeros(),
            sphere_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            jump_force: Vec3::zeros(),
            last_jump_position: None,
            boost_charges: settings.max_boosts,
            magnetized: true,
            contact: ContactState::NoContact,
            gravity: GravityTracking::SENTINEL,
            last_move: None,
            last_look_pitch: 0.0,
            last_look_yaw: 0.0,
            linear_damping: settings.air_damping,
            tick: 0,
            timers: TimerQueue::default(),
            fields: Vec::new(),
            level_sphere: None,
            reevaluate_level_sphere: true,
            health: Health::new(crate::constants::DEFAULT_MAX_HEALTH),
        }
    }

    pub fn contact(&self) -> ContactState {
        self.contact
    }

    /// Timestamp of the last move folded into this status.
    pub fn last_move_timestamp(&self) -> Option<f64> {
        self.last_move.as_ref().map(|m| m.timestamp)
    }

    /// Velocity actually carrying the agent this tick, including surface and launch terms.
    pub fn effective_velocity(&self) -> Vec3 {
        self.velocity + self.sphere_velocity + self.jump_force
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_starts_untracked_and_magnetized() {
        let settings = MovementSettings::default();
        let status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        assert_eq!(status.contact(), ContactState::NoContact);
        assert!(status.gravity.is_sentinel());
        assert!(status.magnetized);
        assert_eq!(status.boost_charges, settings.max_boosts);
        assert_eq!(status.last_move_timestamp(), None);
    }

    #[test]
    fn contact_tags_round_trip() {
        for state in [
            ContactState::NoContact,
            ContactState::FlatFloorContact,
            ContactState::ConvexSphereContact,
            ContactState::ConcaveSphereContact,
        ] {
            assert_eq!(ContactState::from_u8(state.as_u8()), Ok(state));
        }
        assert!(ContactState::from_u8(9).is_err());
    }
}
