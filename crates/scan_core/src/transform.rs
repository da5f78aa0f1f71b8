//! View, projection and screen mapping for the fixed scene camera.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Eye position of the fixed look-at view.
pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const NEAR: f32 = 1.0;
pub const FAR: f32 = 10.0;

/// Fixed look-at: eye on +Z looking at the origin, +Y up.
pub fn view_matrix() -> Mat4 {
    Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y)
}

/// Off-axis perspective frustum, right-handed, clip depth in [0, 1].
#[rustfmt::skip]
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let w = right - left;
    let h = top - bottom;
    let d = near - far;
    Mat4::from_cols(
        Vec4::new(2.0 * near / w,        0.0,                   0.0,             0.0),
        Vec4::new(0.0,                   2.0 * near / h,        0.0,             0.0),
        Vec4::new((right + left) / w,    (top + bottom) / h,    far / d,        -1.0),
        Vec4::new(0.0,                   0.0,                   near * far / d,  0.0),
    )
}

/// Projection for a `width` x `height` viewport: X spans ±aspect, Y spans ±1
/// at the near plane.
pub fn projection_matrix(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    frustum(-aspect, aspect, -1.0, 1.0, NEAR, FAR)
}

/// Maps a point through `mvp` to window pixels (origin top-left).
///
/// Returns `None` for points behind the eye or outside the depth range.
pub fn project_to_screen(mvp: &Mat4, point: Vec3, viewport: Vec2) -> Option<Vec2> {
    let clip = *mvp * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    ))
}
