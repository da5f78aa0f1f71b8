use glam::{Mat4, Vec3};
use parking_lot::RwLock;
use std::sync::Arc;

pub const SCALE_MIN: f32 = 0.1;
pub const SCALE_MAX: f32 = 5.0;
pub const TRANSLATION_LIMIT: f32 = 5.0;

/// Drag pixels per degree of rotation.
const ROTATE_DIVISOR: f32 = 5.0;
/// Translation units per drag pixel at scale 1.
const TRANSLATE_SPEED: f32 = 0.01;

/// View transform state for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Uniform model scale, clamped to `[SCALE_MIN, SCALE_MAX]`.
    pub scale: f32,
    /// Accumulated rotation about X, degrees. Unbounded.
    pub rotation_x: f32,
    /// Accumulated rotation about Y, degrees. Unbounded.
    pub rotation_y: f32,
    /// Model translation, each axis clamped to `±TRANSLATION_LIMIT`.
    pub translation_x: f32,
    pub translation_y: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            translation_x: 0.0,
            translation_y: 0.0,
        }
    }
}

impl CameraState {
    /// `translate * rotX * rotY * scale`, rebuilt from scratch every call so
    /// the transform never drifts from the state.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.translation_x, self.translation_y, 0.0))
            * Mat4::from_rotation_x(self.rotation_x.to_radians())
            * Mat4::from_rotation_y(self.rotation_y.to_radians())
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

/// Handle to the single camera state of a session.
///
/// Clones share the same state: input handling mutates it through one clone
/// while the render context reads it through another. Every write leaves the
/// state clamped, so a reader never observes an out-of-bounds value.
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    state: Arc<RwLock<CameraState>>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state, consistent for one frame.
    pub fn state(&self) -> CameraState {
        *self.state.read()
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.state.read().model_matrix()
    }

    /// Drag rotation: vertical drag tilts about X, horizontal about Y.
    pub fn rotate(&self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let mut s = self.state.write();
        s.rotation_x += dy / ROTATE_DIVISOR;
        s.rotation_y += dx / ROTATE_DIVISOR;
    }

    /// Multiplies the current scale by a pinch `factor`.
    pub fn scale(&self, factor: f32) {
        if !factor.is_finite() {
            return;
        }
        let mut s = self.state.write();
        s.scale = (s.scale * factor).clamp(SCALE_MIN, SCALE_MAX);
    }

    /// Pans the model; speed is divided by the current scale so a drag
    /// covers the same screen distance at any zoom.
    pub fn translate(&self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let mut s = self.state.write();
        let speed = TRANSLATE_SPEED / s.scale;
        s.translation_x =
            (s.translation_x + dx * speed).clamp(-TRANSLATION_LIMIT, TRANSLATION_LIMIT);
        s.translation_y =
            (s.translation_y + dy * speed).clamp(-TRANSLATION_LIMIT, TRANSLATION_LIMIT);
    }

    pub fn reset_view(&self) {
        *self.state.write() = CameraState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_divides_drag_by_five() {
        let cam = CameraController::new();
        cam.rotate(10.0, -25.0);
        let s = cam.state();
        assert_eq!(s.rotation_y, 2.0);
        assert_eq!(s.rotation_x, -5.0);
    }

    #[test]
    fn scale_is_clamped() {
        let cam = CameraController::new();
        for _ in 0..10 {
            cam.scale(10.0);
            assert!(cam.state().scale <= SCALE_MAX);
        }
        assert_eq!(cam.state().scale, SCALE_MAX);
        for _ in 0..10 {
            cam.scale(0.01);
        }
        assert_eq!(cam.state().scale, SCALE_MIN);
    }

    #[test]
    fn translate_is_clamped_and_zoom_compensated() {
        let cam = CameraController::new();
        cam.translate(100.0, 0.0);
        assert!((cam.state().translation_x - 1.0).abs() < 1e-6);

        cam.scale(2.0);
        cam.translate(100.0, 0.0);
        assert!((cam.state().translation_x - 1.5).abs() < 1e-6);

        for _ in 0..10 {
            cam.translate(1000.0, 0.0);
            assert!(cam.state().translation_x <= TRANSLATION_LIMIT);
        }
        assert_eq!(cam.state().translation_x, TRANSLATION_LIMIT);
        assert_eq!(cam.state().translation_y, 0.0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let cam = CameraController::new();
        cam.scale(f32::NAN);
        cam.translate(f32::INFINITY, 0.0);
        cam.rotate(f32::NAN, 1.0);
        assert_eq!(cam.state(), CameraState::default());
    }

    #[test]
    fn reset_restores_identity_and_clones_share_state() {
        let cam = CameraController::new();
        let input_side = cam.clone();
        input_side.rotate(50.0, 50.0);
        input_side.scale(3.0);
        input_side.translate(-20.0, 40.0);
        assert_ne!(cam.state(), CameraState::default());

        cam.reset_view();
        assert_eq!(input_side.state(), CameraState::default());
        assert_eq!(cam.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn model_applies_scale_then_rotation_then_translation() {
        let state = CameraState {
            scale: 2.0,
            rotation_x: 0.0,
            rotation_y: 90.0,
            translation_x: 1.0,
            translation_y: -1.0,
        };
        // (1,0,0) -> scale (2,0,0) -> rotY 90° (0,0,-2) -> translate (1,-1,-2)
        let p = state.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, -1.0, -2.0), 1e-5));
    }
}
