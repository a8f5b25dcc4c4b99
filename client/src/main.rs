// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod agent;
mod camera;
mod convert;
mod input;
mod net;
mod tuning;
mod world;

use bevy::prelude::*;
use std::time::Duration;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Gravity Sandbox".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        // The movement core is stepped at exactly one move per fixed tick. Capping the virtual
        // delta bounds how many fixed ticks a stalled frame can queue.
        app.insert_resource(Time::<Fixed>::from_hz(1.0 / shared::FIXED_DT as f64));
        app.insert_resource(Time::<Virtual>::from_max_delta(Duration::from_secs_f32(
            shared::FIXED_DT * shared::MAX_STEPS_PER_FRAME as f32,
        )));

        app.add_plugins((
            tuning::plugin,
            world::plugin,
            input::plugin,
            net::plugin,
            agent::plugin,
            camera::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
