use super::{DbQuat, DbVec3};
use shared::{Move, MoveButtons, PoseSnapshot};

/// Client-captured rotations around a predicted move.
#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct PoseData {
    pub pre_rotation: DbQuat,
    pub post_rotation: DbQuat,
    pub spring_arm_pitch: f32,
}

/// Wire form of one fixed tick of input.
///
/// Semantics:
/// - `movement`: x forward, y right, z up (airborne only); each axis in [-1, 1].
/// - `buttons`: raw `MoveButton` bits.
/// - `timestamp`: seconds, strictly increasing per agent.
#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct MoveData {
    pub movement: DbVec3,
    pub look_pitch: f32,
    pub look_yaw: f32,
    pub buttons: u8,
    pub boost_direction: DbVec3,
    pub timestamp: f64,
    pub pose: Option<PoseData>,
}

impl From<&Move> for MoveData {
    fn from(mv: &Move) -> Self {
        Self {
            movement: mv.movement.into(),
            look_pitch: mv.look_pitch,
            look_yaw: mv.look_yaw,
            buttons: mv.buttons.bits,
            boost_direction: mv.boost_direction.into(),
            timestamp: mv.timestamp,
            pose: mv.pose.map(|pose| PoseData {
                pre_rotation: pose.pre_rotation.into(),
                post_rotation: pose.post_rotation.into(),
                spring_arm_pitch: pose.spring_arm_pitch,
            }),
        }
    }
}

impl From<&MoveData> for Move {
    fn from(data: &MoveData) -> Self {
        Self {
            movement: data.movement.into(),
            look_pitch: data.look_pitch,
            look_yaw: data.look_yaw,
            buttons: MoveButtons::new(data.buttons),
            boost_direction: data.boost_direction.into(),
            timestamp: data.timestamp,
            pose: data.pose.map(|pose| PoseSnapshot {
                pre_rotation: pose.pre_rotation.into(),
                post_rotation: pose.post_rotation.into(),
                spring_arm_pitch: pose.spring_arm_pitch,
            }),
        }
    }
}
