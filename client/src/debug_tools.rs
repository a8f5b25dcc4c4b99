//! Debug/performance tooling for native dev builds.
//!
//! Compiled only behind `dev_native`. Draws what local prediction recorded this frame
//! (gravity samples, sweeps, edge probes, orientation changes, contact transitions), the aim
//! ray, and which gravity fields the authority currently counts agents in.

use crate::{
    agent::{Prediction, SimDebugEvents},
    convert::vec_to_bevy,
    net::Authority,
    tuning::Movement,
    world::Level,
};
use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;
use shared::{
    DebugEvent,
    combat::{aim_direction, aim_target, eye_position},
    utils::up_of,
};

const AIM_RANGE: f32 = 60.0;

/// Add debug/perf tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(PostUpdate, (draw_sim_events, draw_aim, draw_field_occupancy));
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn draw_sim_events(mut gizmos: Gizmos, events: Res<SimDebugEvents>) {
    for event in &events.0 {
        match event {
            DebugEvent::GravitySample {
                origin,
                vector,
                impact,
                ..
            } => {
                let origin = vec_to_bevy(*origin);
                let color = Color::srgb(0.9, 0.8, 0.1);
                gizmos.arrow(origin, origin + vec_to_bevy(*vector) * 0.1, color);
                if let Some(impact) = impact {
                    gizmos.sphere(
                        Isometry3d::from_translation(vec_to_bevy(*impact)),
                        0.1,
                        color,
                    );
                }
            }
            DebugEvent::Sweep {
                from,
                to,
                radius,
                hit,
            } => {
                gizmos.line(vec_to_bevy(*from), vec_to_bevy(*to), Color::srgb(0.3, 0.6, 1.0));
                if let Some(hit) = hit {
                    gizmos.sphere(
                        Isometry3d::from_translation(vec_to_bevy(*hit)),
                        *radius,
                        Color::srgb(1.0, 0.3, 0.2),
                    );
                }
            }
            DebugEvent::EdgeProbe { from, to, supported } => {
                let color = if *supported {
                    Color::srgb(0.2, 0.9, 0.3)
                } else {
                    Color::srgb(1.0, 0.1, 0.1)
                };
                gizmos.line(vec_to_bevy(*from), vec_to_bevy(*to), color);
            }
            DebugEvent::Orientation { position, from, to } => {
                let position = vec_to_bevy(*position);
                let before = position + vec_to_bevy(up_of(from));
                let after = position + vec_to_bevy(up_of(to));
                gizmos.line(position, before, Color::srgb(0.5, 0.5, 0.5));
                gizmos.line(position, after, Color::srgb(0.1, 1.0, 0.1));
            }
            DebugEvent::ContactChanged { position, from, to } => {
                debug!("Contact {from:?} -> {to:?}");
                gizmos.sphere(
                    Isometry3d::from_translation(vec_to_bevy(*position)),
                    0.6,
                    Color::WHITE,
                );
            }
        }
    }
}

fn draw_aim(
    mut gizmos: Gizmos,
    prediction: Res<Prediction>,
    level: Res<Level>,
    movement: Res<Movement>,
) {
    let local = prediction.0.local();
    let eye = vec_to_bevy(eye_position(local, &movement.0));
    match aim_target(local, &level.world, &movement.0, AIM_RANGE) {
        Some(hit) => {
            let point = vec_to_bevy(hit.impact_point);
            gizmos.line(eye, point, Color::srgba(1.0, 1.0, 1.0, 0.4));
            gizmos.sphere(
                Isometry3d::from_translation(point),
                0.15,
                Color::srgb(1.0, 0.2, 0.6),
            );
        }
        None => {
            let dir = vec_to_bevy(aim_direction(local));
            gizmos.line(eye, eye + dir * AIM_RANGE, Color::srgba(1.0, 1.0, 1.0, 0.1));
        }
    }
}

/// Ring every gravity source whose field holds at least one agent, one ring per occupant.
fn draw_field_occupancy(mut gizmos: Gizmos, authority: Res<Authority>, level: Res<Level>) {
    for source in level.world.sources() {
        let center = vec_to_bevy(source.translation);
        let flat = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        for i in 0..authority.occupancy.occupants(source.handle).len() {
            gizmos.circle(
                Isometry3d::new(center, flat),
                1.0 + i as f32 * 0.5,
                Color::srgb(0.6, 0.2, 1.0),
            );
        }
    }
}
