/*!
Movement tuning shared by the authoritative server and predicting clients.

Both sides must simulate with identical values or replay diverges, so the server keeps a
single-row copy of [`MovementSettings`] that clients read before predicting.

Notes
- Distances are in meters, time in seconds, angles in radians unless the name says `deg`.
- Defaults come from [`crate::constants`].
*/

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementSettings {
    /// Pure forward ground speed.
    pub forward_speed: f32,
    /// Forward + lateral ground speed; each axis receives half.
    pub forward_lateral_speed: f32,
    /// Pure lateral ground speed.
    pub lateral_speed: f32,
    /// Backward ground speed; halved per axis when combined with lateral input.
    pub backward_speed: f32,
    pub surface_acceleration: f32,
    pub surface_stop_rate: f32,
    pub air_speed: f32,

    pub jump_velocity: f32,
    /// Initial magnitude of the decaying launch force added on jump.
    pub jump_force: f32,
    pub jump_force_decay: f32,

    pub max_boosts: u8,
    pub boost_speed: f32,
    pub boost_recharge_secs: f32,
    /// Fraction of existing velocity kept by an airborne boost.
    pub boost_velocity_retain: f32,
    pub flat_boost_percent: f32,
    pub convex_boost_percent: f32,
    pub concave_boost_percent: f32,

    pub gravity_search_radius: f32,
    pub orient_distance_gain: f32,
    pub flat_orient_speed: f32,

    pub landing_alignment: f32,
    pub bounce_restitution: f32,
    pub remagnetize_delay_secs: f32,

    pub floor_damping: f32,
    pub air_damping: f32,

    pub agent_radius: f32,
    pub hover_height: f32,
    pub edge_probe_distance: f32,
    pub eye_height: f32,
    pub max_spring_arm_pitch: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            forward_speed: DEFAULT_FORWARD_SPEED,
            forward_lateral_speed: DEFAULT_FORWARD_LATERAL_SPEED,
            lateral_speed: DEFAULT_LATERAL_SPEED,
            backward_speed: DEFAULT_BACKWARD_SPEED,
            surface_acceleration: DEFAULT_SURFACE_ACCELERATION,
            surface_stop_rate: DEFAULT_SURFACE_STOP_RATE,
            air_speed: DEFAULT_AIR_SPEED,
            jump_velocity: DEFAULT_JUMP_VELOCITY,
            jump_force: DEFAULT_JUMP_FORCE,
            jump_force_decay: DEFAULT_JUMP_FORCE_DECAY,
            max_boosts: DEFAULT_MAX_BOOSTS,
            boost_speed: DEFAULT_BOOST_SPEED,
            boost_recharge_secs: DEFAULT_BOOST_RECHARGE_SECS,
            boost_velocity_retain: DEFAULT_BOOST_VELOCITY_RETAIN,
            flat_boost_percent: DEFAULT_FLAT_BOOST_PERCENT,
            convex_boost_percent: DEFAULT_CONVEX_BOOST_PERCENT,
            concave_boost_percent: DEFAULT_CONCAVE_BOOST_PERCENT,
            gravity_search_radius: DEFAULT_GRAVITY_SEARCH_RADIUS,
            orient_distance_gain: DEFAULT_ORIENT_DISTANCE_GAIN,
            flat_orient_speed: DEFAULT_FLAT_ORIENT_SPEED,
            landing_alignment: DEFAULT_LANDING_ALIGNMENT,
            bounce_restitution: DEFAULT_BOUNCE_RESTITUTION,
            remagnetize_delay_secs: DEFAULT_REMAGNETIZE_DELAY_SECS,
            floor_damping: DEFAULT_FLOOR_DAMPING,
            air_damping: DEFAULT_AIR_DAMPING,
            agent_radius: DEFAULT_AGENT_RADIUS,
            hover_height: DEFAULT_HOVER_HEIGHT,
            edge_probe_distance: DEFAULT_EDGE_PROBE_DISTANCE,
            eye_height: DEFAULT_EYE_HEIGHT,
            max_spring_arm_pitch: DEFAULT_MAX_SPRING_ARM_PITCH_DEG.to_radians(),
        }
    }
}

impl MovementSettings {
    /// Convert a duration in seconds to a whole number of fixed ticks (at least one).
    pub fn secs_to_ticks(secs: f32) -> u64 {
        ((secs / FIXED_DT).round() as u64).max(1)
    }

    pub fn boost_recharge_ticks(&self) -> u64 {
        Self::secs_to_ticks(self.boost_recharge_secs)
    }

    pub fn remagnetize_delay_ticks(&self) -> u64 {
        Self::secs_to_ticks(self.remagnetize_delay_secs)
    }

    /// Validates that the settings can drive a stable simulation.
    pub fn validate(&self) -> Result<(), &'static str> {
        let speeds = [
            self.forward_speed,
            self.forward_lateral_speed,
            self.lateral_speed,
            self.backward_speed,
            self.air_speed,
            self.boost_speed,
        ];
        if speeds.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err("Speeds must be finite and non-negative");
        }
        if self.agent_radius <= 0.0 || !self.agent_radius.is_finite() {
            return Err("Agent radius must be positive");
        }
        if !(0.0..=1.0).contains(&self.landing_alignment) {
            return Err("Landing alignment must be within [0, 1]");
        }
        if self.gravity_search_radius <= 0.0 {
            return Err("Gravity search radius must be positive");
        }
        Ok(())
    }
}

/// Client-side reconciliation and proxy smoothing tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetcodeSettings {
    /// Drift strictly above this switches the reconciler into correction mode.
    pub drift_tolerance: f32,
    pub idle_correction_speed: f32,
    pub fast_correction_speed: f32,
    pub remote_interp_speed: f32,
    pub max_remote_extrapolate_secs: f32,
    /// Correction mode ends once the visual offset shrinks below this.
    pub settle_distance: f32,
}

impl Default for NetcodeSettings {
    fn default() -> Self {
        Self {
            drift_tolerance: DEFAULT_DRIFT_TOLERANCE,
            idle_correction_speed: DEFAULT_IDLE_CORRECTION_SPEED,
            fast_correction_speed: DEFAULT_FAST_CORRECTION_SPEED,
            remote_interp_speed: DEFAULT_REMOTE_INTERP_SPEED,
            max_remote_extrapolate_secs: MAX_REMOTE_EXTRAPOLATE_SECS,
            settle_distance: DEFAULT_CORRECTION_SETTLE_DISTANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(MovementSettings::default().validate(), Ok(()));
    }

    #[test]
    fn negative_speed_is_rejected() {
        let settings = MovementSettings {
            backward_speed: -1.0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err("Speeds must be finite and non-negative")
        );
    }

    #[test]
    fn secs_to_ticks_rounds_and_never_returns_zero() {
        assert_eq!(MovementSettings::secs_to_ticks(1.0), 60);
        assert_eq!(MovementSettings::secs_to_ticks(0.0), 1);
        assert_eq!(MovementSettings::secs_to_ticks(2.0), 120);
    }
}
