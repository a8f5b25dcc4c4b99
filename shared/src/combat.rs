//! Hooks the movement core exposes to the combat layer.
//!
//! Combat itself lives elsewhere; this module only forwards damage into a health component and
//! answers "what is the agent aiming at".

use crate::{
    query::{HitResult, SpatialQuery},
    settings::MovementSettings,
    status::AgentStatus,
    utils::{Vec3, local_forward, rotation_about, up_of},
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, clamping at zero. Returns true when this hit was fatal.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !amount.is_finite() || amount <= 0.0 || self.is_dead() {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

/// Eye position of the agent in world space.
pub fn eye_position(status: &AgentStatus, settings: &MovementSettings) -> Vec3 {
    status.position + up_of(&status.rotation) * settings.eye_height
}

/// World-space view direction: body rotation, then spring arm yaw and pitch.
pub fn aim_direction(status: &AgentStatus) -> Vec3 {
    let arm = rotation_about(Vec3::y(), -status.spring_arm_yaw)
        * rotation_about(Vec3::x(), status.spring_arm_pitch);
    status.rotation * (arm * local_forward())
}

/// The surface point the agent is currently aiming at, if any is within `range`.
pub fn aim_target(
    status: &AgentStatus,
    world: &dyn SpatialQuery,
    settings: &MovementSettings,
    range: f32,
) -> Option<HitResult> {
    let eye = eye_position(status, settings);
    world.line_trace(eye, eye + aim_direction(status) * range, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        utils::Quat,
        world::{GravityShapeDef, GravitySourceDef, GravityWorld},
    };

    #[test]
    fn damage_clamps_at_zero_and_reports_death_once() {
        let mut health = Health::new(100.0);
        assert!(!health.take_damage(40.0));
        assert!((health.current - 60.0).abs() < 1e-6);
        assert!(health.take_damage(500.0));
        assert_eq!(health.current, 0.0);
        assert!(!health.take_damage(10.0));
    }

    #[test]
    fn negative_or_nan_damage_is_ignored() {
        let mut health = Health::new(50.0);
        assert!(!health.take_damage(-5.0));
        assert!(!health.take_damage(f32::NAN));
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn aim_down_hits_floor() {
        let world = GravityWorld::build(vec![GravitySourceDef {
            id: 1,
            translation: Vec3::new(0.0, -2.5, 0.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::FlatFloor {
                half_extents: Vec3::new(10.0, 0.5, 10.0),
            },
            strength: 20.0,
            field_radius: 10.0,
        }]);
        let settings = MovementSettings::default();
        let mut status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        status.spring_arm_pitch = -std::f32::consts::FRAC_PI_2;

        let hit = aim_target(&status, &world, &settings, 50.0).unwrap();
        assert!((hit.impact_point.y + 2.0).abs() < 1e-3);
    }

    #[test]
    fn level_aim_points_forward() {
        let settings = MovementSettings::default();
        let status = AgentStatus::spawn(Vec3::zeros(), Quat::identity(), &settings);
        assert!((aim_direction(&status) - local_forward()).norm() < 1e-5);
    }
}
