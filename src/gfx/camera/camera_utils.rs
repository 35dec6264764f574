use cgmath::{InnerSpace, Matrix4, Vector3};

/// cgmath builds OpenGL clip space (depth -1..1), wgpu expects depth 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Unit direction for a yaw/pitch pair in degrees (yaw 0 looks down +Z)
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vector3<f32> {
    let (sin_yaw, cos_yaw) = yaw.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = pitch.to_radians().sin_cos();
    Vector3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch)
}

/// The vertical basis vector tilted by `pitch`, orthogonal to [`direction_from_angles`]
pub fn up_from_angles(yaw: f32, pitch: f32) -> Vector3<f32> {
    let (sin_yaw, cos_yaw) = yaw.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = pitch.to_radians().sin_cos();
    Vector3::new(-sin_yaw * sin_pitch, cos_pitch, -cos_yaw * sin_pitch)
}

/// Inverse of [`direction_from_angles`]; `direction` need not be normalized
pub fn angles_from_direction(direction: Vector3<f32>) -> (f32, f32) {
    let d = direction.normalize();
    let yaw = wrap_degrees(d.x.atan2(d.z).to_degrees());
    let pitch = d.y.clamp(-1.0, 1.0).asin().to_degrees();
    (yaw, pitch)
}

/// Wraps an angle into `[0, 360)`
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
