pub mod abilities;
pub mod authority;
pub mod bitmask_flags;
pub mod body;
pub mod channel;
pub mod combat;
pub mod constants;
pub mod contact;
pub mod debug;
pub mod gravity;
pub mod handle;
pub mod movement;
pub mod moves;
pub mod orientation;
pub mod query;
pub mod reconcile;
pub mod registry;
pub mod settings;
pub mod status;
pub mod stepper;
pub mod timers;
pub mod utils;
pub mod world;

pub use authority::{MoveRejection, receive_move};
pub use channel::{Delivery, LinkSettings, SimulatedLink};
pub use combat::{Health, aim_target};
pub use constants::{FIXED_DT, MAX_STEPS_PER_FRAME};
pub use debug::{DebugEvent, DebugSink, LogSink, NullSink};
pub use handle::{SourceHandle, SourceId, SourceKind, validate_handle};
pub use moves::{Move, MoveButton, MoveButtons, PendingMove, PoseSnapshot};
pub use query::{HitResult, SpatialQuery};
pub use reconcile::{CorrectionMode, Reconciler, RemoteProxy};
pub use registry::{AgentId, FieldOccupancy};
pub use settings::{MovementSettings, NetcodeSettings};
pub use status::{AgentStatus, ContactState, GravityTracking};
pub use stepper::{MoveStepper, TickEvents};
pub use utils::{Quat, Vec3};
pub use world::{GravityShapeDef, GravitySourceDef, GravityWorld, demo_world};
