/*!
Client-side prediction and reconciliation.

A locally controlled agent keeps two copies of its status:
- `local`: predicted every tick from local input, rendered immediately;
- `reconciled`: the last authoritative status with every unacknowledged move replayed on top.

When an authoritative status arrives, acknowledged moves are dropped from the buffer and the
rest are replayed. If the replay lands more than `drift_tolerance` away from the live
prediction, the reconciler enters correction mode: the buffer is discarded, prediction stops,
and the rendered pose catches up at the fast correction speed. Smaller drift is absorbed at
the idle correction speed without touching the buffer.

The rendered pose is `local` plus a decaying visual offset, so a correction never teleports
the mesh.

Remote agents use [`RemoteProxy`] instead: no prediction, just interpolation toward the latest
status extrapolated by its velocity for a bounded time.
*/

use std::collections::VecDeque;

use crate::{
    debug::{DebugSink, NullSink},
    moves::{Move, PoseSnapshot},
    settings::NetcodeSettings,
    status::AgentStatus,
    stepper::MoveStepper,
    utils::{Quat, Vec3, exp_blend, rotation_about, safe_slerp},
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CorrectionMode {
    #[default]
    Predicting,
    Correcting,
}

/// Pick the correction branch for a measured drift.
///
/// Drift exactly at the tolerance stays in [`CorrectionMode::Predicting`].
pub fn correction_branch(drift: f32, tolerance: f32) -> CorrectionMode {
    if drift > tolerance {
        CorrectionMode::Correcting
    } else {
        CorrectionMode::Predicting
    }
}

pub struct Reconciler {
    local: AgentStatus,
    reconciled: AgentStatus,
    pending: VecDeque<Move>,
    mode: CorrectionMode,
    visual_offset: Vec3,
    visual_rotation_offset: Quat,
    last_ack: Option<f64>,
    last_drift: f32,
    netcode: NetcodeSettings,
}

impl Reconciler {
    pub fn new(status: AgentStatus, netcode: NetcodeSettings) -> Self {
        Self {
            last_ack: status.last_move_timestamp(),
            local: status.clone(),
            reconciled: status,
            pending: VecDeque::new(),
            mode: CorrectionMode::Predicting,
            visual_offset: Vec3::zeros(),
            visual_rotation_offset: Quat::identity(),
            last_drift: 0.0,
            netcode,
        }
    }

    /// Run one tick of local input.
    ///
    /// Returns the move to upload. While correcting, the move is uploaded but neither
    /// simulated locally nor buffered.
    pub fn predict(
        &mut self,
        mut mv: Move,
        stepper: &MoveStepper,
        sink: &mut dyn DebugSink,
    ) -> Move {
        if self.mode == CorrectionMode::Correcting {
            return mv;
        }

        let pre_rotation = self.local.rotation;
        stepper.simulate(&mut self.local, &mv, sink);
        mv.pose = Some(PoseSnapshot {
            pre_rotation,
            post_rotation: self.local.rotation,
            spring_arm_pitch: self.local.spring_arm_pitch,
        });
        self.local.last_move = Some(mv);
        self.pending.push_back(mv);
        mv
    }

    /// Fold a new authoritative status into the prediction. Returns the resulting mode.
    pub fn apply_authoritative(
        &mut self,
        status: AgentStatus,
        stepper: &MoveStepper,
    ) -> CorrectionMode {
        let ack = status.last_move_timestamp();
        if let (Some(previous), Some(incoming)) = (self.last_ack, ack) {
            if incoming < previous {
                return self.mode;
            }
        }
        self.last_ack = ack.or(self.last_ack);

        if let Some(ack) = ack {
            self.pending.retain(|mv| mv.timestamp > ack);
        }

        let mut reconciled = status;
        for mv in &self.pending {
            stepper.simulate(&mut reconciled, mv, &mut NullSink);
        }

        let drift = (self.local.position - reconciled.position).norm();
        self.last_drift = drift;
        if correction_branch(drift, self.netcode.drift_tolerance) == CorrectionMode::Correcting {
            if self.mode != CorrectionMode::Correcting {
                log::info!(
                    "Prediction drifted {drift:.3} m (tolerance {:.3}); correcting",
                    self.netcode.drift_tolerance
                );
            }
            self.mode = CorrectionMode::Correcting;
            self.pending.clear();
        }

        let visual_position = self.visual_position();
        let visual_rotation = self.visual_rotation();
        self.local = reconciled.clone();
        self.reconciled = reconciled;
        self.visual_offset = visual_position - self.local.position;
        self.visual_rotation_offset = visual_rotation * self.local.rotation.inverse();
        self.mode
    }

    /// Decay the visual offset for a rendered frame and return the pose to draw.
    pub fn render(&mut self, dt: f32) -> (Vec3, Quat) {
        let speed = match self.mode {
            CorrectionMode::Predicting => self.netcode.idle_correction_speed,
            CorrectionMode::Correcting => self.netcode.fast_correction_speed,
        };
        let t = exp_blend(speed, dt);
        self.visual_offset *= 1.0 - t;
        self.visual_rotation_offset =
            safe_slerp(&self.visual_rotation_offset, &Quat::identity(), t);

        if self.mode == CorrectionMode::Correcting
            && self.visual_offset.norm() <= self.netcode.settle_distance
        {
            self.visual_offset = Vec3::zeros();
            self.visual_rotation_offset = Quat::identity();
            self.mode = CorrectionMode::Predicting;
            log::info!("Correction settled");
        }
        (self.visual_position(), self.visual_rotation())
    }

    pub fn visual_position(&self) -> Vec3 {
        self.local.position + self.visual_offset
    }

    pub fn visual_rotation(&self) -> Quat {
        self.visual_rotation_offset * self.local.rotation
    }

    pub fn local(&self) -> &AgentStatus {
        &self.local
    }

    pub fn reconciled(&self) -> &AgentStatus {
        &self.reconciled
    }

    pub fn mode(&self) -> CorrectionMode {
        self.mode
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Move> {
        self.pending.iter()
    }

    /// Timestamp of the newest move the authority has acknowledged.
    pub fn last_ack(&self) -> Option<f64> {
        self.last_ack
    }

    /// Distance between prediction and replay at the last reconciliation.
    pub fn last_drift(&self) -> f32 {
        self.last_drift
    }
}

/// Smoothed view of an agent controlled elsewhere.
#[derive(Clone, Debug)]
pub struct RemoteProxy {
    position: Vec3,
    rotation: Quat,
    anchor_position: Vec3,
    anchor_rotation: Quat,
    velocity: Vec3,
    angular_velocity: Vec3,
    since_update: f32,
}

impl RemoteProxy {
    pub fn new(status: &AgentStatus) -> Self {
        Self {
            position: status.position,
            rotation: status.rotation,
            anchor_position: status.position,
            anchor_rotation: status.rotation,
            velocity: status.effective_velocity(),
            angular_velocity: status.angular_velocity,
            since_update: 0.0,
        }
    }

    /// A fresh authoritative status: interpolate toward it from here on.
    pub fn on_status(&mut self, status: &AgentStatus) {
        self.anchor_position = status.position;
        self.anchor_rotation = status.rotation;
        self.velocity = status.effective_velocity();
        self.angular_velocity = status.angular_velocity;
        self.since_update = 0.0;
    }

    /// Where the proxy believes the agent is now: the last status pushed forward by its
    /// velocity, for at most `max_remote_extrapolate_secs`.
    pub fn target(&self, netcode: &NetcodeSettings) -> (Vec3, Quat) {
        let ahead = self.since_update.min(netcode.max_remote_extrapolate_secs);
        let spin = rotation_about(self.angular_velocity, self.angular_velocity.norm() * ahead);
        (
            self.anchor_position + self.velocity * ahead,
            spin * self.anchor_rotation,
        )
    }

    pub fn advance(&mut self, dt: f32, netcode: &NetcodeSettings) -> (Vec3, Quat) {
        self.since_update += dt.max(0.0);
        let (position, rotation) = self.target(netcode);
        let t = exp_blend(netcode.remote_interp_speed, dt);
        self.position = self.position.lerp(&position, t);
        self.rotation = safe_slerp(&self.rotation, &rotation, t);
        (self.position, self.rotation)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }
}
