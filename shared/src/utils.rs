use nalgebra::{Matrix3, Rotation3, Unit, UnitQuaternion, Vector3};

use crate::constants::{DIST_EPS, INPUT_DEADZONE};

/// Common math aliases for clarity and consistency.
pub type Vec3 = Vector3<f32>;
pub type Quat = UnitQuaternion<f32>;

/// Local-space up axis of an agent.
pub fn local_up() -> Vec3 {
    Vec3::y()
}

/// Local-space forward axis of an agent (`-Z`, matching Bevy cameras).
pub fn local_forward() -> Vec3 {
    -Vec3::z()
}

/// Local-space right axis of an agent.
pub fn local_right() -> Vec3 {
    Vec3::x()
}

pub fn up_of(rotation: &Quat) -> Vec3 {
    rotation * local_up()
}

pub fn forward_of(rotation: &Quat) -> Vec3 {
    rotation * local_forward()
}

pub fn right_of(rotation: &Quat) -> Vec3 {
    rotation * local_right()
}

/// Map a move-style input vector (`x` forward, `y` right, `z` up) into world space.
pub fn input_to_world(rotation: &Quat, input: Vec3) -> Vec3 {
    rotation * Vec3::new(input.y, input.z, -input.x)
}

/// Remove the component of `v` along `normal`. `normal` must be unit length.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(&normal)
}

/// Exponential smoothing factor for a rate `speed` (1/s) over `dt` seconds.
///
/// Frame-rate independent: applying it twice at `dt` equals once at `2 * dt`.
#[inline]
pub fn exp_blend(speed: f32, dt: f32) -> f32 {
    (1.0 - (-speed.max(0.0) * dt.max(0.0)).exp()).clamp(0.0, 1.0)
}

/// Move `current` toward `target` by the fraction `rate * dt`, clamped to reach it exactly.
#[inline]
pub fn approach(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Whether an input axis value is outside the deadzone.
#[inline]
pub fn axis_active(value: f32) -> bool {
    value.abs() > INPUT_DEADZONE
}

/// An arbitrary unit vector orthogonal to `v`.
///
/// Picks the world axis least aligned with `v` so the cross product never degenerates.
pub fn stable_perpendicular(v: Vec3) -> Vec3 {
    let n = v.try_normalize(DIST_EPS).unwrap_or_else(Vec3::y);
    let helper = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    n.cross(&helper).normalize()
}

/// Build a rotation whose up axis is exactly `up` and whose forward axis is as close as
/// possible to `forward_hint`.
///
/// Returns `None` when `up` is zero or `forward_hint` is (anti)parallel to it.
pub fn basis_from_up_forward(up: Vec3, forward_hint: Vec3) -> Option<Quat> {
    let up = up.try_normalize(DIST_EPS)?;
    let forward = project_on_plane(forward_hint, up).try_normalize(DIST_EPS)?;
    let right = forward.cross(&up);
    Some(rotation_from_axes(right, up, forward))
}

/// Build a rotation whose up axis is exactly `up` and whose right axis is as close as
/// possible to `right_hint`.
pub fn basis_from_up_right(up: Vec3, right_hint: Vec3) -> Option<Quat> {
    let up = up.try_normalize(DIST_EPS)?;
    let right = project_on_plane(right_hint, up).try_normalize(DIST_EPS)?;
    let forward = up.cross(&right);
    Some(rotation_from_axes(right, up, forward))
}

fn rotation_from_axes(right: Vec3, up: Vec3, forward: Vec3) -> Quat {
    let m = Matrix3::from_columns(&[right, up, -forward]);
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(m))
}

/// Rotation about `axis` by `angle`, or identity when the axis is degenerate.
pub fn rotation_about(axis: Vec3, angle: f32) -> Quat {
    match Unit::try_new(axis, DIST_EPS) {
        Some(axis) if angle.is_finite() => UnitQuaternion::from_axis_angle(&axis, angle),
        _ => Quat::identity(),
    }
}

/// Shortest-path slerp that never yields a non-finite rotation.
pub fn safe_slerp(from: &Quat, to: &Quat, t: f32) -> Quat {
    if t >= 1.0 {
        return *to;
    }
    if t <= 0.0 {
        return *from;
    }
    let blended = from.try_slerp(to, t, 1.0e-6).unwrap_or(*to);
    if is_finite_quat(&blended) {
        blended
    } else {
        *from
    }
}

pub fn is_finite_quat(q: &Quat) -> bool {
    q.coords.iter().all(|c| c.is_finite())
}

pub fn is_finite_vec(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Reflect `v` off a surface with unit `normal`.
#[inline]
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * (2.0 * v.dot(&normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn identity_basis_from_world_up_and_forward() {
        let q = basis_from_up_forward(Vec3::y(), -Vec3::z()).unwrap();
        assert!(q.angle_to(&Quat::identity()) < 1e-5);
    }

    #[test]
    fn basis_keeps_up_exact_and_forward_projected() {
        let up = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = basis_from_up_forward(up, -Vec3::z()).unwrap();
        assert!(approx(up_of(&q), up));
        assert!(approx(forward_of(&q), -Vec3::z()));
    }

    #[test]
    fn up_right_basis_matches_up_forward_basis() {
        let up = Vec3::new(0.0, 0.0, 1.0);
        let a = basis_from_up_forward(up, Vec3::y()).unwrap();
        let b = basis_from_up_right(up, right_of(&a)).unwrap();
        assert!(a.angle_to(&b) < 1e-5);
    }

    #[test]
    fn parallel_hint_is_degenerate() {
        assert!(basis_from_up_forward(Vec3::y(), Vec3::y()).is_none());
        assert!(basis_from_up_right(Vec3::y(), -Vec3::y() * 3.0).is_none());
        assert!(basis_from_up_forward(Vec3::zeros(), Vec3::x()).is_none());
    }

    #[test]
    fn stable_perpendicular_is_orthogonal_unit() {
        for v in [Vec3::x(), Vec3::y(), Vec3::z(), Vec3::new(0.3, -2.0, 0.1)] {
            let p = stable_perpendicular(v);
            assert!(p.dot(&v).abs() < 1e-5);
            assert!((p.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn input_maps_forward_right_up_into_local_axes() {
        let q = Quat::identity();
        assert!(approx(input_to_world(&q, Vec3::new(1.0, 0.0, 0.0)), -Vec3::z()));
        assert!(approx(input_to_world(&q, Vec3::new(0.0, 1.0, 0.0)), Vec3::x()));
        assert!(approx(input_to_world(&q, Vec3::new(0.0, 0.0, 1.0)), Vec3::y()));
    }

    #[test]
    fn exp_blend_composes_over_time() {
        let once = exp_blend(5.0, 0.2);
        let half = exp_blend(5.0, 0.1);
        let twice = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((once - twice).abs() < 1e-6);
    }

    #[test]
    fn safe_slerp_handles_opposite_rotations() {
        let a = Quat::identity();
        let b = rotation_about(Vec3::y(), std::f32::consts::PI);
        let q = safe_slerp(&a, &b, 0.5);
        assert!(is_finite_quat(&q));
    }

    #[test]
    fn reflect_flips_normal_component() {
        let r = reflect(Vec3::new(1.0, -2.0, 0.0), Vec3::y());
        assert!(approx(r, Vec3::new(1.0, 2.0, 0.0)));
    }
}
