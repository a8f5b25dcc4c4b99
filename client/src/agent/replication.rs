use super::{AgentStatuses, LocalAgent, Prediction, RemoteAgent};
use crate::{
    convert::{quat_to_bevy, vec_to_bevy},
    tuning::Movement,
};
use bevy::prelude::*;
use shared::RemoteProxy;

pub(super) fn spawn_local_agent(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    prediction: Res<Prediction>,
    movement: Res<Movement>,
) {
    let local = prediction.0.local();
    let entity = spawn_agent_body(
        &mut commands,
        &mut meshes,
        &mut materials,
        movement.0.agent_radius,
        Color::linear_rgb(0.2, 0.9, 0.8),
        Transform::from_translation(vec_to_bevy(local.position))
            .with_rotation(quat_to_bevy(local.rotation)),
    );
    commands.entity(entity).insert((Name::new("LocalAgent"), LocalAgent));
}

/// Feed delivered statuses to existing proxies and spawn proxies for agents seen first time.
pub(super) fn replicate_remote_agents(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut statuses: ResMut<AgentStatuses>,
    mut remotes: Query<&mut RemoteAgent>,
    movement: Res<Movement>,
) {
    if statuses.0.is_empty() {
        return;
    }

    for mut remote in &mut remotes {
        if let Some(status) = statuses.0.remove(&remote.id) {
            remote.proxy.on_status(&status);
        }
    }

    // Whatever is left has no entity yet.
    for (id, status) in std::mem::take(&mut statuses.0) {
        let entity = spawn_agent_body(
            &mut commands,
            &mut meshes,
            &mut materials,
            movement.0.agent_radius,
            Color::linear_rgb(0.9, 0.2, 0.2),
            Transform::from_translation(vec_to_bevy(status.position))
                .with_rotation(quat_to_bevy(status.rotation)),
        );
        commands.entity(entity).insert((
            Name::new(format!("RemoteAgent{id}")),
            RemoteAgent {
                id,
                proxy: RemoteProxy::new(&status),
            },
        ));
        info!("Remote agent {id} replicated");
    }
}

fn spawn_agent_body(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    radius: f32,
    base_color: Color,
    transform: Transform,
) -> Entity {
    let mut entity_commands = commands.spawn((
        Mesh3d(meshes.add(Sphere::new(radius).mesh().uv(24, 12))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color,
            ..default()
        })),
        transform,
    ));

    // Eyes mark the forward (-Z) side so orientation reads at a glance.
    entity_commands.with_children(|parent| {
        let eye_mesh = meshes.add(Mesh::from(Sphere { radius: 0.1 }));
        let eye_mat = materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 1.0, 1.0),
            ..default()
        });

        let x = 0.15;
        let y = radius * 0.4;
        let z = -radius * 0.85;

        parent.spawn((
            Name::new("LeftEye"),
            Mesh3d(eye_mesh.clone()),
            MeshMaterial3d(eye_mat.clone()),
            Transform::from_translation(Vec3::new(-x, y, z)),
        ));
        parent.spawn((
            Name::new("RightEye"),
            Mesh3d(eye_mesh),
            MeshMaterial3d(eye_mat),
            Transform::from_translation(Vec3::new(x, y, z)),
        ));
    });
    entity_commands.id()
}
