//! Per-frame planning: everything the GPU side needs to draw one frame.

use crate::camera::CameraState;
use crate::color::ColorMode;
use crate::transform;
use glam::Mat4;
use std::time::Duration;

/// Display toggles set from the control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub axis_visible: bool,
    pub grid_visible: bool,
    pub color_mode: ColorMode,
    display_ratio: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            axis_visible: true,
            grid_visible: true,
            color_mode: ColorMode::Intensity,
            display_ratio: 1.0,
        }
    }
}

impl ViewSettings {
    #[inline]
    pub fn display_ratio(&self) -> f32 {
        self.display_ratio
    }

    /// Stores `ratio` clamped to [0, 1]; NaN counts as 0.
    pub fn set_display_ratio(&mut self, ratio: f32) {
        self.display_ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
    }
}

/// Number of points submitted for a buffer holding `count` records.
#[inline]
pub fn displayed_count(count: usize, ratio: f32) -> usize {
    ((count as f64 * ratio as f64).floor() as usize).min(count)
}

/// Transforms for one frame, derived from the current camera state only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub mvp: Mat4,
}

impl FrameTransforms {
    pub fn new(camera: &CameraState, projection: Mat4) -> Self {
        let model = camera.model_matrix();
        let view = transform::view_matrix();
        Self {
            model,
            view,
            projection,
            mvp: projection * view * model,
        }
    }
}

/// Draw list for one frame, in submission order: grid, points, axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub transforms: FrameTransforms,
    pub draw_grid: bool,
    /// Points drawn from the start of the snapshot; 0 skips the point pass.
    pub point_count: u32,
    pub color_mode: ColorMode,
    pub draw_axes: bool,
    /// The ordered snapshot changed since the previous plan and must be
    /// re-uploaded before drawing.
    pub snapshot_dirty: bool,
}

/// Soft per-frame time budget. Overruns are logged, never fatal.
#[derive(Debug, Clone, Copy)]
pub struct FrameBudget {
    budget: Duration,
    overruns: u64,
}

impl FrameBudget {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            overruns: 0,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Records one frame's duration. Returns `true` if it ran over.
    pub fn record(&mut self, elapsed: Duration) -> bool {
        if elapsed <= self.budget {
            return false;
        }
        self.overruns += 1;
        log::warn!(
            "Frame took {:.1} ms (budget {} ms, {} overruns so far)",
            elapsed.as_secs_f64() * 1e3,
            self.budget.as_millis(),
            self.overruns
        );
        true
    }
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}
