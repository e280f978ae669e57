/// Matrix helpers for the 2D and 3D pipelines.
///
/// glam stores matrices column-major. The public contract of the library is
/// row-major flat arrays (translation in the last column), so conversions
/// happen here and nowhere else.
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Build a 3x3 matrix from 9 row-major floats.
#[inline]
pub fn mat3_from_rows(m: [f32; 9]) -> Mat3 {
    Mat3::from_cols_array(&m).transpose()
}

/// Flatten a 3x3 matrix into 9 row-major floats.
#[inline]
pub fn mat3_to_rows(m: &Mat3) -> [f32; 9] {
    m.transpose().to_cols_array()
}

/// Build a 4x4 matrix from 16 row-major floats.
#[inline]
pub fn mat4_from_rows(m: [f32; 16]) -> Mat4 {
    Mat4::from_cols_array(&m).transpose()
}

/// Flatten a 4x4 matrix into 16 row-major floats.
#[inline]
pub fn mat4_to_rows(m: &Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}

/// 2D affine translation.
#[inline]
pub fn translate2d(offset: Vec2) -> Mat3 {
    Mat3::from_translation(offset)
}

/// 2D rotation around the origin (radians, counter-clockwise in a y-up frame).
#[inline]
pub fn rotate2d(angle: f32) -> Mat3 {
    Mat3::from_angle(angle)
}

/// 2D non-uniform scale.
#[inline]
pub fn scale2d(scale: Vec2) -> Mat3 {
    Mat3::from_scale(scale)
}

/// Apply a 2D affine transform to a point (translation applied).
#[inline]
pub fn transform_point2d(m: &Mat3, p: Vec2) -> Vec2 {
    m.transform_point2(p)
}

/// Right-handed look-at view matrix.
#[inline]
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

/// Right-handed perspective projection into the `-w <= z <= w` clip volume.
#[inline]
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y, aspect, near, far)
}

/// Right-handed orthographic projection into the `-w <= z <= w` clip volume.
#[inline]
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
}

/// Off-centre perspective projection (glFrustum semantics).
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rl = right - left;
    let tb = top - bottom;
    let fnr = far - near;

    mat4_from_rows([
        2.0 * near / rl, 0.0, (right + left) / rl, 0.0,
        0.0, 2.0 * near / tb, (top + bottom) / tb, 0.0,
        0.0, 0.0, -(far + near) / fnr, -2.0 * far * near / fnr,
        0.0, 0.0, -1.0, 0.0,
    ])
}

/// Whether `projection` produces a clip-space `w` other than 1, i.e. its
/// last row is not `(0, 0, 0, 1)`.
pub fn is_perspective(projection: &Mat4) -> bool {
    !projection.row(3).abs_diff_eq(Vec4::W, 1e-6)
}

/// Inverse-transpose of the model's upper 3x3, extended back to 4x4.
/// Used to carry normals into world space under non-uniform scale.
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    let upper = Mat3::from_mat4(*model);
    if upper.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    Mat4::from_mat3(upper.inverse().transpose())
}
