mod agent_state;
mod db_quat;
mod db_vec3;
mod gravity_shape;
mod move_data;

pub use agent_state::{AgentState, GravityData, TimerData, TimerKindData};
pub use db_quat::DbQuat;
pub use db_vec3::DbVec3;
pub use gravity_shape::GravityShape;
pub use move_data::{MoveData, PoseData};
