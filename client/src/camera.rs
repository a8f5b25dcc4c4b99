use crate::{
    agent::{AgentRenderSet, LocalAgent, Prediction},
    convert::vec_to_bevy,
    tuning::Movement,
};
use bevy::{prelude::*, transform::TransformSystems};
use shared::{combat::aim_direction, utils::up_of};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(
        PostUpdate,
        follow_agent
            .after(AgentRenderSet)
            .before(TransformSystems::Propagate),
    );
}

/// Spring arm length behind the eye.
const ARM_LENGTH: f32 = 6.0;
/// Lift of the arm along the agent's up, so the agent stays below screen center.
const ARM_LIFT: f32 = 1.2;
const CAMERA_DECAY_RATE: f32 = 24.0;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 6.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                400.0,
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

/// Third-person spring arm: behind the look direction, with the camera's up tracking the
/// agent's up so walking around a planetoid keeps the horizon level.
fn follow_agent(
    mut camera: Single<&mut Transform, (With<Camera3d>, Without<LocalAgent>)>,
    agent: Single<&Transform, With<LocalAgent>>,
    prediction: Res<Prediction>,
    movement: Res<Movement>,
    time: Res<Time>,
) {
    let local = prediction.0.local();
    let up = vec_to_bevy(up_of(&local.rotation));
    let look = vec_to_bevy(aim_direction(local));
    let eye = agent.translation + up * movement.0.eye_height;

    let target = eye - look * ARM_LENGTH + up * ARM_LIFT;
    camera
        .translation
        .smooth_nudge(&target, CAMERA_DECAY_RATE, time.delta_secs());
    camera.look_at(eye + look * ARM_LENGTH, up);
}
