use spacetimedb::*;

/// Movement tuning shared by server and clients.
///
/// This is intended to be a single-row table (`id = 1`) that both:
/// - the server reads to build the `MoveStepper` for every uploaded move, and
/// - clients subscribe to so their prediction runs with identical values.
///
/// Notes
/// - Values are expressed in meters, seconds, and radians, matching `shared::MovementSettings`.
#[table(name = movement_settings, public)]
pub struct MovementSettingsRow {
    /// Unique id (primary key). Use a single row with `id = 1`.
    #[primary_key]
    pub id: u32,

    pub forward_speed: f32,
    pub forward_lateral_speed: f32,
    pub lateral_speed: f32,
    pub backward_speed: f32,
    pub surface_acceleration: f32,
    pub surface_stop_rate: f32,
    pub air_speed: f32,

    pub jump_velocity: f32,
    pub jump_force: f32,
    pub jump_force_decay: f32,

    pub max_boosts: u8,
    pub boost_speed: f32,
    pub boost_recharge_secs: f32,
    pub boost_velocity_retain: f32,
    pub flat_boost_percent: f32,
    pub convex_boost_percent: f32,
    pub concave_boost_percent: f32,

    pub gravity_search_radius: f32,
    pub orient_distance_gain: f32,
    pub flat_orient_speed: f32,

    /// Minimum `normal · up` for a magnetized hit to count as a landing.
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

impl MovementSettingsRow {
    pub fn from_settings(id: u32, s: &shared::MovementSettings) -> Self {
        Self {
            id,
            forward_speed: s.forward_speed,
            forward_lateral_speed: s.forward_lateral_speed,
            lateral_speed: s.lateral_speed,
            backward_speed: s.backward_speed,
            surface_acceleration: s.surface_acceleration,
            surface_stop_rate: s.surface_stop_rate,
            air_speed: s.air_speed,
            jump_velocity: s.jump_velocity,
            jump_force: s.jump_force,
            jump_force_decay: s.jump_force_decay,
            max_boosts: s.max_boosts,
            boost_speed: s.boost_speed,
            boost_recharge_secs: s.boost_recharge_secs,
            boost_velocity_retain: s.boost_velocity_retain,
            flat_boost_percent: s.flat_boost_percent,
            convex_boost_percent: s.convex_boost_percent,
            concave_boost_percent: s.concave_boost_percent,
            gravity_search_radius: s.gravity_search_radius,
            orient_distance_gain: s.orient_distance_gain,
            flat_orient_speed: s.flat_orient_speed,
            landing_alignment: s.landing_alignment,
            bounce_restitution: s.bounce_restitution,
            remagnetize_delay_secs: s.remagnetize_delay_secs,
            floor_damping: s.floor_damping,
            air_damping: s.air_damping,
            agent_radius: s.agent_radius,
            hover_height: s.hover_height,
            edge_probe_distance: s.edge_probe_distance,
            eye_height: s.eye_height,
            max_spring_arm_pitch: s.max_spring_arm_pitch,
        }
    }

    pub fn to_settings(&self) -> shared::MovementSettings {
        shared::MovementSettings {
            forward_speed: self.forward_speed,
            forward_lateral_speed: self.forward_lateral_speed,
            lateral_speed: self.lateral_speed,
            backward_speed: self.backward_speed,
            surface_acceleration: self.surface_acceleration,
            surface_stop_rate: self.surface_stop_rate,
            air_speed: self.air_speed,
            jump_velocity: self.jump_velocity,
            jump_force: self.jump_force,
            jump_force_decay: self.jump_force_decay,
            max_boosts: self.max_boosts,
            boost_speed: self.boost_speed,
            boost_recharge_secs: self.boost_recharge_secs,
            boost_velocity_retain: self.boost_velocity_retain,
            flat_boost_percent: self.flat_boost_percent,
            convex_boost_percent: self.convex_boost_percent,
            concave_boost_percent: self.concave_boost_percent,
            gravity_search_radius: self.gravity_search_radius,
            orient_distance_gain: self.orient_distance_gain,
            flat_orient_speed: self.flat_orient_speed,
            landing_alignment: self.landing_alignment,
            bounce_restitution: self.bounce_restitution,
            remagnetize_delay_secs: self.remagnetize_delay_secs,
            floor_damping: self.floor_damping,
            air_damping: self.air_damping,
            agent_radius: self.agent_radius,
            hover_height: self.hover_height,
            edge_probe_distance: self.edge_probe_distance,
            eye_height: self.eye_height,
            max_spring_arm_pitch: self.max_spring_arm_pitch,
        }
    }
}
