/// Fixed simulation step in seconds.
///
/// Every replayable step runs at exactly this rate on both server and client. Wall-clock
/// frame time never enters the movement core, so replaying the same moves is bit-exact.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Maximum fixed steps a host runs for a single rendered frame.
///
/// Anything beyond this is dropped so a stalled frame cannot spiral.
pub const MAX_STEPS_PER_FRAME: u32 = 5;

/// Sentinel distance for "no gravity source tracked".
pub const NO_SOURCE_DISTANCE: f32 = f32::MAX;

/// Upper bound on gravity candidates evaluated by the narrow phase in one tick.
pub const MAX_GRAVITY_CANDIDATES: usize = 8;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-5;

/// Input magnitude below which an axis counts as released.
pub const INPUT_DEADZONE: f32 = 1.0e-3;

/// Minimum distance used when scaling orientation blend by `1 / distance` (meters).
///
/// Keeps the blend finite when the agent is skimming a surface.
pub const MIN_ORIENT_DISTANCE: f32 = 0.05;

/// Velocity·gravity threshold above which the orientation basis is stabilized with the
/// agent's right axis instead of its forward axis.
pub const FALLING_ALIGNMENT_THRESHOLD: f32 = 1.0;

/// Spin imparted per unit of tangential speed when a grazing hit bounces the agent.
pub const BOUNCE_SPIN_FACTOR: f32 = 0.05;

/// How long a remote proxy keeps extrapolating past its last update.
pub const MAX_REMOTE_EXTRAPOLATE_SECS: f32 = 0.25;

/// Default movement speeds (meters per second).
pub const DEFAULT_FORWARD_SPEED: f32 = 10.0;
pub const DEFAULT_FORWARD_LATERAL_SPEED: f32 = 12.0;
pub const DEFAULT_LATERAL_SPEED: f32 = 7.0;
pub const DEFAULT_BACKWARD_SPEED: f32 = 5.0;

/// Air control acceleration (meters per second squared).
///
/// Applied straight into velocity while airborne; nothing damps it back toward zero.
pub const DEFAULT_AIR_SPEED: f32 = 6.0;

/// Rates (1/s) at which surface velocity approaches its target (accelerate) or zero (stop).
pub const DEFAULT_SURFACE_ACCELERATION: f32 = 8.0;
pub const DEFAULT_SURFACE_STOP_RATE: f32 = 12.0;

/// Gravity acceleration magnitude of a source when none is configured (m/s^2).
pub const DEFAULT_GRAVITY_STRENGTH: f32 = 20.0;

/// Radius of the broad-phase gravity search around the agent (meters).
pub const DEFAULT_GRAVITY_SEARCH_RADIUS: f32 = 30.0;

/// Thickness of a source's trigger field beyond its surface (meters).
pub const DEFAULT_FIELD_RADIUS: f32 = 12.0;

/// Jump tuning.
pub const DEFAULT_JUMP_VELOCITY: f32 = 8.0;
pub const DEFAULT_JUMP_FORCE: f32 = 4.0;
pub const DEFAULT_JUMP_FORCE_DECAY: f32 = 4.0;

/// Boost tuning.
pub const DEFAULT_MAX_BOOSTS: u8 = 3;
pub const DEFAULT_BOOST_SPEED: f32 = 18.0;
pub const DEFAULT_BOOST_RECHARGE_SECS: f32 = 2.0;
pub const DEFAULT_BOOST_VELOCITY_RETAIN: f32 = 0.5;

/// Surface boost multipliers per surface type.
///
/// Curvature changes how far a linear impulse carries the agent around a sphere, so each
/// surface type scales the boost separately.
pub const DEFAULT_FLAT_BOOST_PERCENT: f32 = 1.0;
pub const DEFAULT_CONVEX_BOOST_PERCENT: f32 = 0.75;
pub const DEFAULT_CONCAVE_BOOST_PERCENT: f32 = 0.6;

/// Linear damping while on a floor and while airborne.
pub const DEFAULT_FLOOR_DAMPING: f32 = 3.0;
pub const DEFAULT_AIR_DAMPING: f32 = 0.01;

/// Minimum `normal · up` for a hit to count as a landing.
pub const DEFAULT_LANDING_ALIGNMENT: f32 = 0.8;

/// Fraction of speed kept when a grazing hit reflects the agent.
pub const DEFAULT_BOUNCE_RESTITUTION: f32 = 0.5;

/// Delay before a bounced agent is magnetized again (seconds).
pub const DEFAULT_REMAGNETIZE_DELAY_SECS: f32 = 1.0;

/// Orientation blend gain while airborne, divided by distance to the source.
pub const DEFAULT_ORIENT_DISTANCE_GAIN: f32 = 20.0;

/// Orientation smoothing speed while standing on a flat floor (1/s).
pub const DEFAULT_FLAT_ORIENT_SPEED: f32 = 12.0;

/// Agent collision sphere radius and the gap kept above surfaces (meters).
pub const DEFAULT_AGENT_RADIUS: f32 = 0.5;
pub const DEFAULT_HOVER_HEIGHT: f32 = 0.02;

/// Extra reach of the downward edge probe below the agent's sphere (meters).
pub const DEFAULT_EDGE_PROBE_DISTANCE: f32 = 0.25;

/// Eye height above the agent center, used for aim traces (meters).
pub const DEFAULT_EYE_HEIGHT: f32 = 0.6;

/// Spring arm pitch limit in degrees.
pub const DEFAULT_MAX_SPRING_ARM_PITCH_DEG: f32 = 80.0;

/// Starting and maximum health.
pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

/// Reconciliation tuning.
pub const DEFAULT_DRIFT_TOLERANCE: f32 = 0.5;
pub const DEFAULT_IDLE_CORRECTION_SPEED: f32 = 5.0;
pub const DEFAULT_FAST_CORRECTION_SPEED: f32 = 20.0;
pub const DEFAULT_REMOTE_INTERP_SPEED: f32 = 12.0;

/// Visual offset below which a correction counts as caught up (meters).
pub const DEFAULT_CORRECTION_SETTLE_DISTANCE: f32 = 0.01;
