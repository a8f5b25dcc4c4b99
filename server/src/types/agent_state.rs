use super::{DbQuat, DbVec3, MoveData};
use shared::{
    contact::restore_contact,
    timers::{TimerEntry, TimerKind, TimerQueue},
    AgentStatus, ContactState, GravityTracking, Health, MovementSettings, SourceHandle,
};

#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub enum TimerKindData {
    BoostRecharge,
    Remagnetize,
}

#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct TimerData {
    pub due_tick: u64,
    pub seq: u64,
    pub kind: TimerKindData,
}

/// Which source pulls the agent. `source` is a packed `SourceHandle`.
#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct GravityData {
    pub vector: DbVec3,
    pub source: Option<u64>,
    pub distance: f32,
    pub impact: Option<DbVec3>,
}

/// Persisted mirror of `shared::AgentStatus`.
///
/// Every field the stepper reads is stored so that a status rebuilt from this row simulates
/// exactly like the one that was written.
#[derive(spacetimedb::SpacetimeType, Debug, Clone, PartialEq)]
pub struct AgentState {
    pub position: DbVec3,
    pub rotation: DbQuat,
    pub spring_arm_pitch: f32,
    pub spring_arm_yaw: f32,
    pub velocity: DbVec3,
    pub sphere_velocity: DbVec3,
    pub angular_velocity: DbVec3,
    pub jump_force: DbVec3,
    pub last_jump_position: Option<DbVec3>,
    pub boost_charges: u8,
    pub magnetized: bool,
    /// `ContactState::as_u8` tag.
    pub contact: u8,
    pub gravity: GravityData,
    pub last_move: Option<MoveData>,
    pub last_look_pitch: f32,
    pub last_look_yaw: f32,
    pub linear_damping: f32,
    pub tick: u64,
    pub timers: Vec<TimerData>,
    pub timer_seq: u64,
    pub fields: Vec<u64>,
    pub level_sphere: Option<u64>,
    pub reevaluate_level_sphere: bool,
    pub health: f32,
    pub max_health: f32,
}

impl From<&AgentStatus> for AgentState {
    fn from(status: &AgentStatus) -> Self {
        Self {
            position: status.position.into(),
            rotation: status.rotation.into(),
            spring_arm_pitch: status.spring_arm_pitch,
            spring_arm_yaw: status.spring_arm_yaw,
            velocity: status.velocity.into(),
            sphere_velocity: status.sphere_velocity.into(),
            angular_velocity: status.angular_velocity.into(),
            jump_force: status.jump_force.into(),
            last_jump_position: status.last_jump_position.map(Into::into),
            boost_charges: status.boost_charges,
            magnetized: status.magnetized,
            contact: status.contact().as_u8(),
            gravity: GravityData {
                vector: status.gravity.vector.into(),
                source: status.gravity.source.map(SourceHandle::raw),
                distance: status.gravity.distance,
                impact: status.gravity.impact.map(Into::into),
            },
            last_move: status.last_move.as_ref().map(MoveData::from),
            last_look_pitch: status.last_look_pitch,
            last_look_yaw: status.last_look_yaw,
            linear_damping: status.linear_damping,
            tick: status.tick,
            timers: status
                .timers
                .entries()
                .into_iter()
                .map(|entry| TimerData {
                    due_tick: entry.due_tick,
                    seq: entry.seq,
                    kind: match entry.kind {
                        TimerKind::BoostRecharge => TimerKindData::BoostRecharge,
                        TimerKind::Remagnetize => TimerKindData::Remagnetize,
                    },
                })
                .collect(),
            timer_seq: status.timers.next_seq(),
            fields: status.fields.iter().map(|h| h.raw()).collect(),
            level_sphere: status.level_sphere.map(SourceHandle::raw),
            reevaluate_level_sphere: status.reevaluate_level_sphere,
            health: status.health.current,
            max_health: status.health.max,
        }
    }
}

impl AgentState {
    /// Rebuild the simulation status from this row.
    ///
    /// Fails on corrupt tags or non-finite pose data rather than simulating garbage.
    pub fn to_status(&self, settings: &MovementSettings) -> Result<AgentStatus, String> {
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err("Agent row holds non-finite motion".into());
        }
        let contact = ContactState::from_u8(self.contact)?;
        let source = self.gravity.source.map(SourceHandle::from_raw).transpose()?;
        let fields = self
            .fields
            .iter()
            .map(|raw| SourceHandle::from_raw(*raw))
            .collect::<Result<Vec<_>, _>>()?;
        let level_sphere = self.level_sphere.map(SourceHandle::from_raw).transpose()?;

        let mut status = AgentStatus::spawn(self.position.into(), self.rotation.into(), settings);
        status.spring_arm_pitch = self.spring_arm_pitch;
        status.spring_arm_yaw = self.spring_arm_yaw;
        status.velocity = self.velocity.into();
        status.sphere_velocity = self.sphere_velocity.into();
        status.angular_velocity = self.angular_velocity.into();
        status.jump_force = self.jump_force.into();
        status.last_jump_position = self.last_jump_position.map(Into::into);
        status.boost_charges = self.boost_charges;
        status.magnetized = self.magnetized;
        status.gravity = GravityTracking {
            vector: self.gravity.vector.into(),
            source,
            distance: self.gravity.distance,
            impact: self.gravity.impact.map(Into::into),
        };
        status.last_move = self.last_move.as_ref().map(Into::into);
        status.last_look_pitch = self.last_look_pitch;
        status.last_look_yaw = self.last_look_yaw;
        status.linear_damping = self.linear_damping;
        status.tick = self.tick;
        status.timers = TimerQueue::from_parts(
            self.timers.iter().map(|t| TimerEntry {
                due_tick: t.due_tick,
                seq: t.seq,
                kind: match t.kind {
                    TimerKindData::BoostRecharge => TimerKind::BoostRecharge,
                    TimerKindData::Remagnetize => TimerKind::Remagnetize,
                },
            }),
            self.timer_seq,
        );
        status.fields = fields;
        status.level_sphere = level_sphere;
        status.reevaluate_level_sphere = self.reevaluate_level_sphere;
        status.health = Health {
            current: self.health,
            max: self.max_health,
        };
        restore_contact(&mut status, contact);
        Ok(status)
    }
}
