//! Gravity source registry and its parry-backed spatial queries.
//!
//! This module is used by both server and client to build an in-memory query world from a set
//! of gravity source definitions (typically sourced from DB rows).
//!
//! Design goals
//! - Deterministic: definitions are sorted by `id` before insertion, and every query iterates
//!   in that order. Equal-distance ties therefore resolve to registration order.
//! - Query-focused: no dynamics are stepped; the agent integrates its own motion and only asks
//!   for overlaps, sweeps and traces.
//! - Immutable: sources do not move after construction. Rebuild to change the world.

use nalgebra::{Isometry3, Point3, Translation3};
use rapier3d::parry::{
    bounding_volume::{Aabb, BoundingVolume},
    query::{self, Ray, ShapeCastOptions},
    shape::{Ball, Cuboid, Shape},
};

use crate::{
    constants::{DEFAULT_FIELD_RADIUS, DEFAULT_GRAVITY_STRENGTH, DIST_EPS},
    handle::{SourceHandle, SourceId, SourceKind},
    query::{HitResult, SpatialQuery},
    utils::{Quat, Vec3, is_finite_quat, is_finite_vec, rotation_about, stable_perpendicular},
};

/// Canonical, schema-agnostic definition of a gravity source.
///
/// Conventions
/// - Units are meters.
/// - A flat floor's surface normal is `rotation * +Y`; its field extends `field_radius` past
///   both faces, so standing under a floor pulls the agent up into its underside.
#[derive(Clone, Debug, PartialEq)]
pub struct GravitySourceDef {
    /// Stable unique identifier; also the registration order.
    pub id: SourceId,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: GravityShapeDef,
    /// Gravity acceleration magnitude (m/s^2).
    pub strength: f32,
    /// Field thickness beyond the surface (meters). Ignored by level spheres, whose field is
    /// their whole interior.
    pub field_radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GravityShapeDef {
    /// Oriented slab with local-space half extents.
    FlatFloor { half_extents: Vec3 },
    /// Solid sphere walked on from the outside.
    SphereFloor { radius: f32 },
    /// Hollow sphere walked on from the inside.
    LevelSphere { radius: f32 },
}

impl GravityShapeDef {
    pub fn kind(&self) -> SourceKind {
        match self {
            GravityShapeDef::FlatFloor { .. } => SourceKind::FlatFloor,
            GravityShapeDef::SphereFloor { .. } => SourceKind::SphereFloor,
            GravityShapeDef::LevelSphere { .. } => SourceKind::LevelSphere,
        }
    }
}

impl GravitySourceDef {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !is_finite_vec(&self.translation) || !is_finite_quat(&self.rotation) {
            return Err("Gravity source pose is not finite");
        }
        if !self.strength.is_finite() || self.strength < 0.0 {
            return Err("Gravity strength must be finite and non-negative");
        }
        if !self.field_radius.is_finite() || self.field_radius < 0.0 {
            return Err("Field radius must be finite and non-negative");
        }
        let positive = match self.shape {
            GravityShapeDef::FlatFloor { half_extents } => half_extents.iter().all(|h| *h > 0.0),
            GravityShapeDef::SphereFloor { radius } | GravityShapeDef::LevelSphere { radius } => {
                radius > 0.0
            }
        };
        if !positive {
            return Err("Gravity source dimensions must be positive");
        }
        Ok(())
    }
}

enum SourceCollider {
    Slab(Cuboid),
    Ball(Ball),
}

impl SourceCollider {
    fn as_shape(&self) -> &dyn Shape {
        match self {
            SourceCollider::Slab(cuboid) => cuboid,
            SourceCollider::Ball(ball) => ball,
        }
    }
}

/// A registered gravity source with its prepared collision geometry.
pub struct GravitySource {
    pub handle: SourceHandle,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: GravityShapeDef,
    pub strength: f32,
    pub field_radius: f32,
    iso: Isometry3<f32>,
    collider: SourceCollider,
    aabb: Aabb,
}

impl GravitySource {
    fn from_def(def: &GravitySourceDef) -> Self {
        let iso = Isometry3::from_parts(Translation3::from(def.translation), def.rotation);
        let collider = match def.shape {
            GravityShapeDef::FlatFloor { half_extents } => {
                SourceCollider::Slab(Cuboid::new(half_extents))
            }
            GravityShapeDef::SphereFloor { radius } | GravityShapeDef::LevelSphere { radius } => {
                SourceCollider::Ball(Ball::new(radius))
            }
        };
        let aabb = collider.as_shape().compute_aabb(&iso);
        Self {
            handle: SourceHandle::new(def.id, def.shape.kind()),
            translation: def.translation,
            rotation: def.rotation,
            shape: def.shape,
            strength: def.strength,
            field_radius: def.field_radius,
            iso,
            collider,
            aabb,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.handle.kind()
    }

    /// Top-face normal of a flat floor.
    pub fn normal(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    pub fn radius(&self) -> Option<f32> {
        match self.shape {
            GravityShapeDef::SphereFloor { radius } | GravityShapeDef::LevelSphere { radius } => {
                Some(radius)
            }
            GravityShapeDef::FlatFloor { .. } => None,
        }
    }

    /// Whether `point` is inside this source's trigger field.
    pub fn field_contains(&self, point: Vec3) -> bool {
        match self.shape {
            GravityShapeDef::FlatFloor { half_extents } => {
                let local = self.iso.inverse_transform_point(&Point3::from(point));
                local.x.abs() <= half_extents.x
                    && local.z.abs() <= half_extents.z
                    && local.y.abs() <= half_extents.y + self.field_radius
            }
            GravityShapeDef::SphereFloor { radius } => {
                (point - self.translation).norm() <= radius + self.field_radius
            }
            GravityShapeDef::LevelSphere { radius } => (point - self.translation).norm() < radius,
        }
    }

    /// Outward-facing surface normal nearest `point`, used when a query cannot supply one.
    fn fallback_normal(&self, point: Vec3) -> Vec3 {
        let offset = point - self.translation;
        match self.shape {
            GravityShapeDef::FlatFloor { .. } => {
                let n = self.normal();
                if offset.dot(&n) >= 0.0 { n } else { -n }
            }
            GravityShapeDef::SphereFloor { .. } => offset
                .try_normalize(DIST_EPS)
                .unwrap_or_else(|| stable_perpendicular(self.normal())),
            GravityShapeDef::LevelSphere { .. } => -offset
                .try_normalize(DIST_EPS)
                .unwrap_or_else(|| stable_perpendicular(self.normal())),
        }
    }

    fn sweep_sphere(&self, from: Vec3, dir: Vec3, length: f32, radius: f32) -> Option<HitResult> {
        if let GravityShapeDef::LevelSphere { radius: shell } = self.shape {
            return self.sweep_inside_shell(from, dir, length, radius, shell);
        }

        let ball = Ball::new(radius);
        let ball_iso = Isometry3::translation(from.x, from.y, from.z);
        let opts = ShapeCastOptions::with_max_time_of_impact(length);
        let hit = query::cast_shapes(
            &ball_iso,
            &dir,
            &ball,
            &self.iso,
            &Vec3::zeros(),
            self.collider.as_shape(),
            opts,
        )
        .ok()
        .flatten()?;

        let center_at_hit = from + dir * hit.time_of_impact;
        // Witness and normal on the ball are expressed in the ball's (unrotated) local frame.
        let impact_point = center_at_hit + hit.witness1.coords;
        let normal = (-hit.normal1.into_inner())
            .try_normalize(DIST_EPS)
            .unwrap_or_else(|| self.fallback_normal(center_at_hit));

        Some(HitResult {
            impact_point,
            normal,
            distance: hit.time_of_impact,
            source: self.handle,
        })
    }

    /// Analytic sweep of a sphere moving inside a hollow shell.
    fn sweep_inside_shell(
        &self,
        from: Vec3,
        dir: Vec3,
        length: f32,
        radius: f32,
        shell: f32,
    ) -> Option<HitResult> {
        let inner = shell - radius;
        if inner <= 0.0 {
            return None;
        }
        let offset = from - self.translation;
        let b = offset.dot(&dir);
        let c = offset.norm_squared() - inner * inner;

        let t = if c >= 0.0 {
            // Already touching the shell: only blocks motion heading further out.
            if b > 0.0 { 0.0 } else { return None }
        } else {
            -b + (b * b - c).sqrt()
        };
        if t > length {
            return None;
        }

        let at_hit = offset + dir * t;
        let outward = at_hit
            .try_normalize(DIST_EPS)
            .unwrap_or_else(|| stable_perpendicular(dir));
        Some(HitResult {
            impact_point: self.translation + outward * shell,
            normal: -outward,
            distance: t,
            source: self.handle,
        })
    }

    fn trace(&self, ray: &Ray, length: f32) -> Option<HitResult> {
        let from = ray.origin.coords;
        let (solid, inside_shell) = match self.shape {
            GravityShapeDef::LevelSphere { radius } => {
                if (from - self.translation).norm() >= radius {
                    return None;
                }
                (false, true)
            }
            _ => (true, false),
        };

        let hit = self
            .collider
            .as_shape()
            .cast_ray_and_get_normal(&self.iso, ray, length, solid)?;
        let impact_point = from + ray.dir * hit.time_of_impact;
        let normal = if inside_shell {
            self.fallback_normal(impact_point)
        } else {
            hit.normal
                .try_normalize(DIST_EPS)
                .unwrap_or_else(|| self.fallback_normal(impact_point))
        };

        Some(HitResult {
            impact_point,
            normal,
            distance: hit.time_of_impact,
            source: self.handle,
        })
    }
}

/// Immutable set of gravity sources, queryable through [`SpatialQuery`].
pub struct GravityWorld {
    sources: Vec<GravitySource>,
}

impl GravityWorld {
    /// Build a query world from source definitions.
    ///
    /// Determinism
    /// - The input is sorted by `id` before insertion.
    /// - Invalid or duplicate definitions are skipped with a warning.
    pub fn build(mut defs: Vec<GravitySourceDef>) -> Self {
        defs.sort_by_key(|d| d.id);
        defs.dedup_by(|dup, kept| {
            let duplicate = dup.id == kept.id;
            if duplicate {
                log::warn!("Skipping duplicate gravity source {}", dup.id);
            }
            duplicate
        });

        let sources = defs
            .iter()
            .filter(|def| match def.validate() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Skipping gravity source {}: {err}", def.id);
                    false
                }
            })
            .map(GravitySource::from_def)
            .collect();

        Self { sources }
    }

    pub fn sources(&self) -> &[GravitySource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SpatialQuery for GravityWorld {
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<SourceHandle> {
        let query_ball = Ball::new(radius.max(DIST_EPS));
        let query_iso = Isometry3::translation(center.x, center.y, center.z);
        let query_aabb = query_ball.compute_aabb(&query_iso);

        self.sources
            .iter()
            .filter(|source| match source.shape {
                GravityShapeDef::LevelSphere { radius: shell } => {
                    (center - source.translation).norm() < shell
                }
                _ => {
                    source.aabb.intersects(&query_aabb)
                        && query::intersection_test(
                            &query_iso,
                            &query_ball,
                            &source.iso,
                            source.collider.as_shape(),
                        )
                        .unwrap_or(false)
                }
            })
            .map(|source| source.handle)
            .collect()
    }

    fn sweep(
        &self,
        from: Vec3,
        to: Vec3,
        radius: f32,
        only: Option<SourceHandle>,
    ) -> Option<HitResult> {
        let delta = to - from;
        let length = delta.norm();
        let dir = delta.try_normalize(DIST_EPS)?;

        let mut best: Option<HitResult> = None;
        for source in &self.sources {
            if only.is_some_and(|handle| handle != source.handle) {
                continue;
            }
            if let Some(hit) = source.sweep_sphere(from, dir, length, radius) {
                if best.as_ref().is_none_or(|b| hit.distance < b.distance) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    fn line_trace(&self, from: Vec3, to: Vec3, only: Option<SourceHandle>) -> Option<HitResult> {
        let delta = to - from;
        let length = delta.norm();
        let dir = delta.try_normalize(DIST_EPS)?;
        let ray = Ray::new(Point3::from(from), dir);

        let mut best: Option<HitResult> = None;
        for source in &self.sources {
            if only.is_some_and(|handle| handle != source.handle) {
                continue;
            }
            if let Some(hit) = source.trace(&ray, length) {
                if best.as_ref().is_none_or(|b| hit.distance < b.distance) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    fn fields_containing(&self, point: Vec3) -> Vec<SourceHandle> {
        self.sources
            .iter()
            .filter(|source| source.field_contains(point))
            .map(|source| source.handle)
            .collect()
    }

    fn source(&self, handle: SourceHandle) -> Option<&GravitySource> {
        self.sources
            .binary_search_by_key(&handle.id(), |s| s.handle.id())
            .ok()
            .map(|i| &self.sources[i])
            .filter(|s| s.handle == handle)
    }
}

/// The sandbox level: a ground slab, a wall floor, a planetoid and an enclosing level sphere.
///
/// Used to seed the server's `gravity_source` table and by the client when running against
/// its in-process authority.
pub fn demo_world() -> Vec<GravitySourceDef> {
    vec![
        GravitySourceDef {
            id: 1,
            translation: Vec3::new(0.0, -2.5, 0.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::FlatFloor {
                half_extents: Vec3::new(20.0, 0.5, 20.0),
            },
            strength: DEFAULT_GRAVITY_STRENGTH,
            field_radius: DEFAULT_FIELD_RADIUS,
        },
        GravitySourceDef {
            id: 2,
            translation: Vec3::new(34.0, 10.0, 0.0),
            rotation: rotation_about(Vec3::z(), std::f32::consts::FRAC_PI_2),
            shape: GravityShapeDef::FlatFloor {
                half_extents: Vec3::new(8.0, 0.5, 8.0),
            },
            strength: DEFAULT_GRAVITY_STRENGTH,
            field_radius: DEFAULT_FIELD_RADIUS,
        },
        GravitySourceDef {
            id: 3,
            translation: Vec3::new(0.0, 12.0, -60.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::SphereFloor { radius: 12.0 },
            strength: DEFAULT_GRAVITY_STRENGTH,
            field_radius: DEFAULT_FIELD_RADIUS,
        },
        GravitySourceDef {
            id: 4,
            translation: Vec3::new(0.0, 0.0, -20.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::LevelSphere { radius: 150.0 },
            strength: DEFAULT_GRAVITY_STRENGTH * 0.5,
            field_radius: 0.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(id: SourceId, y: f32) -> GravitySourceDef {
        GravitySourceDef {
            id,
            translation: Vec3::new(0.0, y, 0.0),
            rotation: Quat::identity(),
            shape: GravityShapeDef::FlatFloor {
                half_extents: Vec3::new(10.0, 0.5, 10.0),
            },
            strength: 20.0,
            field_radius: 10.0,
        }
    }

    fn sphere(id: SourceId, center: Vec3, radius: f32) -> GravitySourceDef {
        GravitySourceDef {
            id,
            translation: center,
            rotation: Quat::identity(),
            shape: GravityShapeDef::SphereFloor { radius },
            strength: 20.0,
            field_radius: 10.0,
        }
    }

    fn shell(id: SourceId, radius: f32) -> GravitySourceDef {
        GravitySourceDef {
            id,
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            shape: GravityShapeDef::LevelSphere { radius },
            strength: 10.0,
            field_radius: 0.0,
        }
    }

    #[test]
    fn build_sorts_by_id_and_skips_invalid() {
        let mut bad = floor(5, 0.0);
        bad.strength = f32::NAN;
        let world = GravityWorld::build(vec![floor(3, 0.0), bad, floor(1, -5.0)]);
        let ids: Vec<_> = world.sources().iter().map(|s| s.handle.id()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn sweep_down_hits_floor_top() {
        let world = GravityWorld::build(vec![floor(1, -2.5)]);
        let hit = world
            .sweep(Vec3::zeros(), Vec3::new(0.0, -10.0, 0.0), 0.5, None)
            .unwrap();
        // Floor top at y = -2.0, sphere radius 0.5 -> travel 1.5.
        assert!((hit.distance - 1.5).abs() < 1e-3);
        assert!((hit.normal - Vec3::y()).norm() < 1e-3);
        assert!((hit.impact_point.y + 2.0).abs() < 1e-3);
    }

    #[test]
    fn sweep_respects_only_filter() {
        let world = GravityWorld::build(vec![floor(1, -2.5), floor(2, -6.0)]);
        let handle = SourceHandle::new(2, SourceKind::FlatFloor);
        let hit = world
            .sweep(Vec3::new(0.0, -4.0, 0.0), Vec3::new(0.0, -10.0, 0.0), 0.5, Some(handle))
            .unwrap();
        assert_eq!(hit.source, handle);
    }

    #[test]
    fn sweep_toward_sphere_reports_outward_normal() {
        let world = GravityWorld::build(vec![sphere(1, Vec3::new(10.0, 0.0, 0.0), 5.0)]);
        let hit = world
            .sweep(Vec3::zeros(), Vec3::new(10.0, 0.0, 0.0), 0.5, None)
            .unwrap();
        assert!((hit.distance - 4.5).abs() < 1e-3);
        assert!((hit.normal + Vec3::x()).norm() < 1e-3);
    }

    #[test]
    fn sweep_inside_shell_hits_inner_surface() {
        let world = GravityWorld::build(vec![shell(1, 20.0)]);
        let hit = world
            .sweep(Vec3::zeros(), Vec3::new(0.0, -30.0, 0.0), 1.0, None)
            .unwrap();
        assert!((hit.distance - 19.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::y()).norm() < 1e-4);
        assert!((hit.impact_point.y + 20.0).abs() < 1e-4);
    }

    #[test]
    fn overlap_finds_nearby_surfaces_and_containing_shells() {
        let world = GravityWorld::build(vec![
            floor(1, -2.5),
            sphere(2, Vec3::new(100.0, 0.0, 0.0), 5.0),
            shell(3, 500.0),
        ]);
        let found = world.overlap_sphere(Vec3::zeros(), 10.0);
        let ids: Vec<_> = found.iter().map(|h| h.id()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn floor_field_is_two_sided() {
        let world = GravityWorld::build(vec![floor(1, 0.0)]);
        assert_eq!(world.fields_containing(Vec3::new(0.0, 5.0, 0.0)).len(), 1);
        assert_eq!(world.fields_containing(Vec3::new(0.0, -5.0, 0.0)).len(), 1);
        assert!(world.fields_containing(Vec3::new(0.0, 11.0, 0.0)).is_empty());
        assert!(world.fields_containing(Vec3::new(11.0, 1.0, 0.0)).is_empty());
    }

    #[test]
    fn line_trace_hits_nearest_surface() {
        let world = GravityWorld::build(vec![floor(1, -2.5), floor(2, -6.0)]);
        let hit = world
            .line_trace(Vec3::zeros(), Vec3::new(0.0, -20.0, 0.0), None)
            .unwrap();
        assert_eq!(hit.source.id(), 1);
        assert!((hit.distance - 2.0).abs() < 1e-3);
    }

    #[test]
    fn line_trace_respects_only_filter() {
        let world = GravityWorld::build(vec![floor(1, -2.5), floor(2, -6.0)]);
        let handle = SourceHandle::new(2, SourceKind::FlatFloor);
        let hit = world
            .line_trace(Vec3::zeros(), Vec3::new(0.0, -20.0, 0.0), Some(handle))
            .unwrap();
        assert_eq!(hit.source, handle);
        assert!((hit.distance - 5.5).abs() < 1e-3);
    }

    #[test]
    fn build_keeps_the_first_of_duplicate_ids() {
        let world = GravityWorld::build(vec![floor(4, -2.5), floor(4, -9.0)]);
        assert_eq!(world.len(), 1);
        assert!((world.sources()[0].translation.y + 2.5).abs() < 1e-6);
    }

    #[test]
    fn line_trace_from_inside_shell_hits_far_wall() {
        let world = GravityWorld::build(vec![shell(1, 20.0)]);
        let hit = world
            .line_trace(Vec3::zeros(), Vec3::new(50.0, 0.0, 0.0), None)
            .unwrap();
        assert!((hit.distance - 20.0).abs() < 1e-3);
        assert!((hit.normal + Vec3::x()).norm() < 1e-3);
    }

    #[test]
    fn stale_handle_resolves_to_none() {
        let world = GravityWorld::build(vec![floor(1, 0.0)]);
        assert!(world.source(SourceHandle::new(1, SourceKind::FlatFloor)).is_some());
        assert!(world.source(SourceHandle::new(1, SourceKind::SphereFloor)).is_none());
        assert!(world.source(SourceHandle::new(9, SourceKind::FlatFloor)).is_none());
    }

    #[test]
    fn demo_world_is_valid() {
        let defs = demo_world();
        assert!(defs.iter().all(|d| d.validate().is_ok()));
        assert_eq!(GravityWorld::build(defs).len(), 4);
    }
}
