use crate::convert::{quat_to_bevy, vec_to_bevy};
use bevy::prelude::*;
use shared::{GravityShapeDef, GravitySourceDef, GravityWorld, demo_world};

/// The level's gravity sources, queried by prediction and by the loopback authority alike.
#[derive(Resource)]
pub struct Level {
    pub world: GravityWorld,
    pub defs: Vec<GravitySourceDef>,
}

impl Default for Level {
    fn default() -> Self {
        let defs = demo_world();
        Self {
            world: GravityWorld::build(defs.clone()),
            defs,
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Level>();
    app.add_systems(Startup, setup);
}

fn setup(
    mut commands: Commands,
    level: Res<Level>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("Spawning {} gravity sources", level.world.len());

    for def in &level.defs {
        let (mesh, material) = match def.shape {
            GravityShapeDef::FlatFloor { half_extents } => (
                meshes.add(Cuboid::new(
                    half_extents.x * 2.0,
                    half_extents.y * 2.0,
                    half_extents.z * 2.0,
                )),
                StandardMaterial {
                    base_color: Color::linear_rgb(0.2, 0.3, 0.25),
                    perceptual_roughness: 1.0,
                    metallic: 0.0,
                    ..default()
                },
            ),
            GravityShapeDef::SphereFloor { radius } => (
                meshes.add(Sphere::new(radius).mesh().uv(48, 24)),
                StandardMaterial {
                    base_color: Color::srgb_u8(124, 144, 255),
                    perceptual_roughness: 0.8,
                    ..default()
                },
            ),
            GravityShapeDef::LevelSphere { radius } => (
                meshes.add(Sphere::new(radius).mesh().uv(64, 32)),
                StandardMaterial {
                    base_color: Color::srgb(0.35, 0.3, 0.45),
                    // Walked on from the inside, so the inner faces must render.
                    cull_mode: None,
                    double_sided: true,
                    perceptual_roughness: 1.0,
                    ..default()
                },
            ),
        };

        commands.spawn((
            Name::new(format!("GravitySource{}", def.id)),
            Mesh3d(mesh),
            MeshMaterial3d(materials.add(material)),
            Transform {
                translation: vec_to_bevy(def.translation),
                rotation: quat_to_bevy(def.rotation),
                scale: Vec3::ONE,
            },
        ));
    }

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(20.0, 60.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
