//! Reflection across the creature's sagittal plane and bone-chain alignment.
//!
//! All inputs are creature-local. The mirror plane is local `x = 0`.

use glam::{Mat3, Quat, Vec3};

use crate::constants::BONE_PITCH_CORRECTION_DEGREES;
use crate::skeleton::Transform;

/// Reflect a creature-local point across the `x = 0` plane.
pub fn reflect_position(position: Vec3) -> Vec3 {
    Vec3::new(-position.x, position.y, position.z)
}

/// Reflect an orientation across the `x = 0` plane.
///
/// For the reflection `M = diag(-1, 1, 1)` the mirrored rotation is `M R M`,
/// which keeps the x component of the quaternion and negates y and z. This is
/// the Euler-angle rule `(x, y, z) -> (x, -y, -z)` without the wrap-around
/// ambiguity of Euler decomposition.
pub fn reflect_rotation(rotation: Quat) -> Quat {
    Quat::from_xyzw(rotation.x, -rotation.y, -rotation.z, rotation.w)
}

/// Reflect a transform; scale is a magnitude and is copied unchanged.
pub fn reflect_transform(transform: &Transform) -> Transform {
    Transform {
        translation: reflect_position(transform.translation),
        rotation: reflect_rotation(transform.rotation),
        scale: transform.scale,
    }
}

/// Rotation whose +Z axis points along `forward` and whose +Y axis is as close
/// to `up` as possible.
///
/// Returns `None` when `forward` is degenerate or parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3, epsilon: f32) -> Option<Quat> {
    if forward.length_squared() <= epsilon * epsilon {
        return None;
    }
    let forward = forward.normalize();
    let right = up.cross(forward);
    if right.length_squared() <= epsilon * epsilon {
        return None;
    }
    let right = right.normalize();
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize())
}

/// Aim each bone at its successor and give the last bone the rotation of the
/// one before it.
///
/// `up_hint` is the creature's right vector; when a segment runs parallel to it
/// `fallback_up` is used instead. Coincident bones keep their rotation.
pub fn realign_chain(bones: &mut [Transform], up_hint: Vec3, fallback_up: Vec3, epsilon: f32) {
    let n = bones.len();
    if n < 2 {
        return;
    }

    let pitch = Quat::from_rotation_x(BONE_PITCH_CORRECTION_DEGREES.to_radians());
    for j in 1..n {
        let direction = bones[j].translation - bones[j - 1].translation;
        let aim = look_rotation(direction, up_hint, epsilon)
            .or_else(|| look_rotation(direction, fallback_up, epsilon));
        if let Some(aim) = aim {
            bones[j - 1].rotation = aim * pitch;
        }
    }
    bones[n - 1].rotation = bones[n - 2].rotation;
}
