//! The physics body capability the movement core drives.
//!
//! Abilities and the integrator never write velocities directly; they go through
//! [`PhysicsBody`] so an engine-backed body could be swapped in. [`AgentBody`] is the
//! kinematic implementation over an [`AgentStatus`], with unit mass.

use crate::{status::AgentStatus, utils::Vec3};

pub trait PhysicsBody {
    /// Continuous force for this step (acceleration at unit mass).
    fn apply_force(&mut self, force: Vec3);
    /// Instant change in velocity.
    fn apply_impulse(&mut self, impulse: Vec3);
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn linear_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, velocity: Vec3);
    fn angular_velocity(&self) -> Vec3;
    fn set_damping(&mut self, damping: f32);
    /// Apply the current damping over one step.
    fn apply_damping(&mut self);
}

pub struct AgentBody<'a> {
    status: &'a mut AgentStatus,
    dt: f32,
}

impl<'a> AgentBody<'a> {
    pub fn new(status: &'a mut AgentStatus, dt: f32) -> Self {
        Self { status, dt }
    }
}

impl PhysicsBody for AgentBody<'_> {
    fn apply_force(&mut self, force: Vec3) {
        self.status.velocity += force * self.dt;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.status.velocity += impulse;
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.status.velocity = velocity;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.status.velocity
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.status.angular_velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.status.angular_velocity
    }

    fn set_damping(&mut self, damping: f32) {
        self.status.linear_damping = damping.max(0.0);
    }

    fn apply_damping(&mut self) {
        // Same form as rapier's linear damping: v *= 1 / (1 + d * dt).
        let factor = 1.0 / (1.0 + self.status.linear_damping * self.dt);
        self.status.velocity *= factor;
        self.status.angular_velocity *= factor;
    }
}
