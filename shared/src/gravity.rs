/*!
Gravity sampling.

Two passes per tick:
1. Broad: [`SpatialQuery::overlap_sphere`] around the agent, capped at
   [`MAX_GRAVITY_CANDIDATES`].
2. Narrow: each candidate is measured by the [`GravityStrategy`] for its kind.

The closest candidate wins. Comparison is strict `<`, and candidates arrive in id order, so
equal distances resolve to the source registered first.

While in contact, only the contact source is measured. Level spheres are only considered
when the agent was last found inside them; that containment is re-checked when
`reevaluate_level_sphere` is set (spawn, field changes, jumping off a shell).
*/

use crate::{
    constants::{DIST_EPS, MAX_GRAVITY_CANDIDATES},
    handle::{SourceHandle, SourceKind},
    query::SpatialQuery,
    settings::MovementSettings,
    status::{AgentStatus, GravityTracking},
    utils::Vec3,
    world::GravitySource,
};

/// Result of measuring one gravity source from the agent's position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GravitySample {
    /// Acceleration applied while airborne: `direction * strength`.
    pub vector: Vec3,
    /// Unit direction of the pull.
    pub direction: Vec3,
    /// Gap between the agent's sphere and the surface.
    pub distance: f32,
    pub source: SourceHandle,
    pub impact: Vec3,
}

impl GravitySample {
    pub fn tracking(&self) -> GravityTracking {
        GravityTracking {
            vector: self.vector,
            source: Some(self.source),
            distance: self.distance,
            impact: Some(self.impact),
        }
    }
}

/// How a kind of source pulls an agent at `position`.
pub trait GravityStrategy {
    fn measure(
        &self,
        world: &dyn SpatialQuery,
        source: &GravitySource,
        position: Vec3,
        settings: &MovementSettings,
    ) -> Option<GravitySample>;
}

/// Pulls along the floor normal toward whichever face the agent is on.
pub struct FlatFloorGravity;

/// Pulls toward the sphere's center.
pub struct ConvexSphereGravity;

/// Pulls away from the shell's center, toward the inner surface.
///
/// The same direction is used airborne and in contact; a pull toward the center while standing
/// on the inner surface would lift the agent off it.
pub struct ConcaveShellGravity;

impl GravityStrategy for FlatFloorGravity {
    fn measure(
        &self,
        world: &dyn SpatialQuery,
        source: &GravitySource,
        position: Vec3,
        settings: &MovementSettings,
    ) -> Option<GravitySample> {
        let normal = source.normal();
        let side = if (position - source.translation).dot(&normal) >= 0.0 {
            1.0
        } else {
            -1.0
        };
        let direction = -normal * side;
        let reach = settings.gravity_search_radius;
        let hit = world.sweep(
            position,
            position + direction * reach,
            settings.agent_radius,
            Some(source.handle),
        )?;

        Some(GravitySample {
            vector: direction * source.strength,
            direction,
            distance: hit.distance,
            source: source.handle,
            impact: hit.impact_point,
        })
    }
}

impl GravityStrategy for ConvexSphereGravity {
    fn measure(
        &self,
        world: &dyn SpatialQuery,
        source: &GravitySource,
        position: Vec3,
        settings: &MovementSettings,
    ) -> Option<GravitySample> {
        let to_center = source.translation - position;
        let direction = to_center.try_normalize(DIST_EPS)?;
        let radius = source.radius()?;

        let (distance, impact) = match world.sweep(
            position,
            source.translation,
            settings.agent_radius,
            Some(source.handle),
        ) {
            Some(hit) => (hit.distance, hit.impact_point),
            None => (
                (to_center.norm() - radius - settings.agent_radius).max(0.0),
                source.translation - direction * radius,
            ),
        };

        Some(GravitySample {
            vector: direction * source.strength,
            direction,
            distance,
            source: source.handle,
            impact,
        })
    }
}

impl GravityStrategy for ConcaveShellGravity {
    fn measure(
        &self,
        _world: &dyn SpatialQuery,
        source: &GravitySource,
        position: Vec3,
        settings: &MovementSettings,
    ) -> Option<GravitySample> {
        let radius = source.radius()?;
        let offset = position - source.translation;
        let from_center = offset.norm();
        if from_center >= radius {
            return None;
        }
        // At the exact center there is no outward direction.
        let direction = offset.try_normalize(DIST_EPS)?;

        Some(GravitySample {
            vector: direction * source.strength,
            direction,
            distance: (radius - from_center - settings.agent_radius).max(0.0),
            source: source.handle,
            impact: source.translation + direction * radius,
        })
    }
}

pub fn strategy_for(kind: SourceKind) -> &'static dyn GravityStrategy {
    match kind {
        SourceKind::FlatFloor => &FlatFloorGravity,
        SourceKind::SphereFloor => &ConvexSphereGravity,
        SourceKind::LevelSphere => &ConcaveShellGravity,
    }
}

/// Measure a single source by handle; `None` if it is gone or does not pull.
pub fn measure_source(
    world: &dyn SpatialQuery,
    handle: SourceHandle,
    position: Vec3,
    settings: &MovementSettings,
) -> Option<GravitySample> {
    let source = world.source(handle)?;
    strategy_for(source.kind()).measure(world, source, position, settings)
}

/// Find the gravity acting on the agent this tick.
///
/// Updates the cached level sphere when re-evaluation was requested. Returns `None` when
/// nothing is in range.
pub fn sample_gravity(
    world: &dyn SpatialQuery,
    status: &mut AgentStatus,
    settings: &MovementSettings,
) -> Option<GravitySample> {
    let position = status.position;

    if status.contact().is_grounded() {
        let handle = status.gravity.source?;
        return measure_source(world, handle, position, settings);
    }

    let candidates: Vec<SourceHandle> = world
        .overlap_sphere(position, settings.gravity_search_radius)
        .into_iter()
        .take(MAX_GRAVITY_CANDIDATES)
        .collect();

    if status.reevaluate_level_sphere {
        status.level_sphere = candidates
            .iter()
            .copied()
            .find(|h| h.kind() == SourceKind::LevelSphere);
        status.reevaluate_level_sphere = false;
    }

    let mut best: Option<GravitySample> = None;
    for handle in candidates {
        if handle.kind() == SourceKind::LevelSphere && status.level_sphere != Some(handle) {
            continue;
        }
        let Some(sample) = measure_source(world, handle, position, settings) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| sample.distance < b.distance) {
            best = Some(sample);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        status::ContactState,
        utils::{Quat, rotation_about},
        world::{GravityShapeDef, GravitySourceDef, GravityWorld},
    };

    fn floor(id: u32, y: f32) -> GravitySourceDef {
        GravitySourceDef {
            id,
            translation: Vec3::new(0.0, y, 0.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::FlatFloor {
                half_extents: Vec3::new(10.0, 0.5, 10.0),
            },
            strength: 20.0,
            field_radius: 12.0,
        }
    }

    fn shell(id: u32, radius: f32) -> GravitySourceDef {
        GravitySourceDef {
            id,
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            shape: GravityShapeDef::LevelSphere { radius },
            strength: 10.0,
            field_radius: 0.0,
        }
    }

    fn spawn(position: Vec3) -> (AgentStatus, MovementSettings) {
        let settings = MovementSettings::default();
        (AgentStatus::spawn(position, Quat::identity(), &settings), settings)
    }

    #[test]
    fn floor_below_pulls_down() {
        let world = GravityWorld::build(vec![floor(1, -2.5)]);
        let (mut status, settings) = spawn(Vec3::zeros());

        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert_eq!(sample.source.id(), 1);
        assert!((sample.direction - -Vec3::y()).norm() < 1e-6);
        assert!((sample.distance - 1.5).abs() < 1e-3);
        assert!((sample.vector.y + 20.0).abs() < 1e-5);
    }

    #[test]
    fn under_a_floor_pulls_up_into_it() {
        let world = GravityWorld::build(vec![floor(1, 2.5)]);
        let (mut status, settings) = spawn(Vec3::zeros());

        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert!((sample.direction - Vec3::y()).norm() < 1e-6);
        assert!((sample.distance - 1.5).abs() < 1e-3);
    }

    #[test]
    fn closer_source_wins() {
        let world = GravityWorld::build(vec![floor(1, -6.0), floor(2, 4.0)]);
        let (mut status, settings) = spawn(Vec3::zeros());
        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert_eq!(sample.source.id(), 2);
    }

    #[test]
    fn equal_distance_keeps_registration_order() {
        let world = GravityWorld::build(vec![floor(7, -3.0), floor(5, -3.0)]);
        let (mut status, settings) = spawn(Vec3::zeros());
        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert_eq!(sample.source.id(), 5);
    }

    #[test]
    fn nothing_in_range_is_no_gravity() {
        let world = GravityWorld::build(vec![floor(1, -200.0)]);
        let (mut status, settings) = spawn(Vec3::zeros());
        assert!(sample_gravity(&world, &mut status, &settings).is_none());
    }

    #[test]
    fn convex_sphere_pulls_to_center() {
        let world = GravityWorld::build(vec![GravitySourceDef {
            id: 3,
            translation: Vec3::new(0.0, -12.0, 0.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::SphereFloor { radius: 10.0 },
            strength: 20.0,
            field_radius: 10.0,
        }]);
        let (mut status, settings) = spawn(Vec3::zeros());

        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert!((sample.direction - -Vec3::y()).norm() < 1e-6);
        assert!((sample.distance - 1.5).abs() < 1e-3);
        assert!((sample.impact - Vec3::new(0.0, -2.0, 0.0)).norm() < 1e-3);
    }

    #[test]
    fn concave_shell_pulls_outward() {
        let world = GravityWorld::build(vec![shell(4, 20.0)]);
        let (mut status, settings) = spawn(Vec3::new(0.0, 0.0, 5.0));

        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert_eq!(status.level_sphere, Some(sample.source));
        assert!(!status.reevaluate_level_sphere);
        assert!((sample.direction - Vec3::z()).norm() < 1e-6);
        assert!((sample.distance - 14.5).abs() < 1e-4);
    }

    #[test]
    fn shell_center_is_skipped() {
        let world = GravityWorld::build(vec![shell(4, 20.0)]);
        let (mut status, settings) = spawn(Vec3::zeros());
        assert!(sample_gravity(&world, &mut status, &settings).is_none());
    }

    #[test]
    fn shell_is_ignored_until_containment_is_reevaluated() {
        let world = GravityWorld::build(vec![shell(4, 20.0)]);
        let (mut status, settings) = spawn(Vec3::new(0.0, 3.0, 0.0));
        status.reevaluate_level_sphere = false;
        status.level_sphere = None;
        assert!(sample_gravity(&world, &mut status, &settings).is_none());

        status.reevaluate_level_sphere = true;
        assert!(sample_gravity(&world, &mut status, &settings).is_some());
    }

    #[test]
    fn contact_only_measures_the_contact_source() {
        let world = GravityWorld::build(vec![floor(1, -2.5), floor(2, 1.2)]);
        let (mut status, settings) = spawn(Vec3::new(0.0, -1.48, 0.0));
        crate::contact::set_contact(&mut status, ContactState::FlatFloorContact, &settings);
        status.gravity.source = Some(SourceHandle::new(1, SourceKind::FlatFloor));

        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert_eq!(sample.source.id(), 1);
    }

    #[test]
    fn tilted_floor_pulls_along_its_normal() {
        let mut def = floor(2, 0.0);
        def.translation = Vec3::new(5.0, 0.0, 0.0);
        def.rotation = rotation_about(Vec3::z(), std::f32::consts::FRAC_PI_2);
        let world = GravityWorld::build(vec![def]);
        let (mut status, settings) = spawn(Vec3::zeros());

        let sample = sample_gravity(&world, &mut status, &settings).unwrap();
        assert!((sample.direction - Vec3::x()).norm() < 1e-5);
        assert!((sample.distance - 4.0).abs() < 1e-3);
    }
}
