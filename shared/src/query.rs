/*!
Spatial query provider contract.

The movement core never touches a physics engine directly. Everything it needs from the
world goes through [`SpatialQuery`]: a broad "what is near me" overlap, a swept-sphere cast,
and a line trace. [`crate::world::GravityWorld`] is the parry-backed implementation used by
both server and client; tests may provide their own.
*/

use crate::{
    handle::SourceHandle,
    utils::Vec3,
    world::GravitySource,
};

/// A single blocking hit returned by a sweep or line trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitResult {
    /// World-space point on the hit surface.
    pub impact_point: Vec3,
    /// World-space surface normal at the impact, pointing back toward the query origin.
    pub normal: Vec3,
    /// Distance travelled along the query direction before the hit (meters).
    pub distance: f32,
    pub source: SourceHandle,
}

pub trait SpatialQuery {
    /// Sources whose surface lies within `radius` of `center`, plus level spheres containing
    /// `center`. Returned in registration (id) order.
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<SourceHandle>;

    /// Sweep a sphere of `radius` from `from` to `to` and return the earliest blocking hit.
    ///
    /// When `only` is set, every other source is ignored.
    fn sweep(
        &self,
        from: Vec3,
        to: Vec3,
        radius: f32,
        only: Option<SourceHandle>,
    ) -> Option<HitResult>;

    /// Cast a ray segment from `from` to `to` and return the earliest hit.
    ///
    /// `only` filters sources the same way as in [`SpatialQuery::sweep`].
    fn line_trace(&self, from: Vec3, to: Vec3, only: Option<SourceHandle>) -> Option<HitResult>;

    /// Sources whose trigger field contains `point`, in registration order.
    fn fields_containing(&self, point: Vec3) -> Vec<SourceHandle>;

    /// Resolve a handle; `None` once the source is gone.
    fn source(&self, handle: SourceHandle) -> Option<&GravitySource>;
}
