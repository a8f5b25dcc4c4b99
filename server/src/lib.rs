mod reducers {
    mod agent_lifecycle;
    mod connection;
    pub mod enter_world;
    pub(crate) mod housekeeping;
    pub mod leave_world;
    pub mod take_damage;
    pub mod upload_move;
}
pub mod schema;
pub mod types;
pub mod views;
mod world;

use reducers::housekeeping::init_housekeeping;
use spacetimedb::*;

#[reducer(init)]
pub fn init(ctx: &ReducerContext) {
    world::seed_movement_settings(ctx);
    world::recreate_gravity_sources(ctx);
    init_housekeeping(ctx);
}
