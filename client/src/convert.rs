//! nalgebra (simulation) <-> glam (Bevy) conversions.

use bevy::prelude::{Quat, Vec3};

pub fn vec_to_bevy(v: shared::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn quat_to_bevy(q: shared::Quat) -> Quat {
    let q = q.into_inner();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}
