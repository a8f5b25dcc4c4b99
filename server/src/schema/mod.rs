mod agent_table;
mod field_occupant_table;
mod gravity_source_table;
mod movement_settings_table;
mod player_table;

pub use crate::types::*;
pub use agent_table::*;
pub use field_occupant_table::*;
pub use gravity_source_table::*;
pub use movement_settings_table::*;
pub use player_table::*;
