//! The render-context session.
//!
//! `ScanSession` is the single owner of the point ring. It is meant to live
//! on the thread that owns the graphics surface: the generation worker only
//! ever reaches it through the handoff channel, and `append` is not reachable
//! from anywhere else. Camera state is the one piece shared with the control
//! context, through [`CameraController`] clones.

use crate::camera::CameraController;
use crate::color::ColorMode;
use crate::error::{CoreError, Result};
use crate::frame::{displayed_count, FrameBudget, FramePlan, FrameTransforms, ViewSettings};
use crate::generator::PointGenerator;
use crate::picker::{self, PickHit, DEFAULT_PICK_RADIUS_PX};
use crate::point::PointRecord;
use crate::ring::PointBuffer;
use crate::transform;
use crate::worker::{self, Batch, Cadence, GenerationWorker};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use glam::{Mat4, Vec2};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Ring capacity in records.
    pub capacity: usize,
    /// Points requested from the generator per batch.
    pub batch_size: usize,
    pub cadence: Cadence,
    pub frame_budget: Duration,
    pub pick_radius_px: f32,
    /// Fixed generator seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Toggles in effect when the session starts.
    pub initial_settings: ViewSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 850_000,
            batch_size: 850_000,
            cadence: Cadence::default(),
            frame_budget: Duration::from_millis(16),
            pick_radius_px: DEFAULT_PICK_RADIUS_PX,
            seed: None,
            initial_settings: ViewSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed; generation has not been activated yet.
    Created,
    Running,
    Paused,
    /// Terminal. No generation or frame work happens after this.
    Destroyed,
}

pub struct ScanSession {
    config: SessionConfig,
    buffer: PointBuffer,
    /// Ordered copy of the ring, re-derived after every non-empty append.
    snapshot: Vec<PointRecord>,
    snapshot_dirty: bool,
    settings: ViewSettings,
    camera: CameraController,
    viewport: Option<(u32, u32)>,
    projection: Mat4,
    batch_tx: Sender<Batch>,
    batch_rx: Receiver<Batch>,
    worker: Option<GenerationWorker>,
    lifecycle: Lifecycle,
    budget: FrameBudget,
    seed_counter: u64,
}

impl ScanSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        let buffer = PointBuffer::new(config.capacity)?;
        let (batch_tx, batch_rx) = worker::handoff();
        let settings = config.initial_settings;

        Ok(Self {
            budget: FrameBudget::new(config.frame_budget),
            snapshot: Vec::with_capacity(config.capacity),
            snapshot_dirty: false,
            settings,
            camera: CameraController::new(),
            viewport: None,
            projection: transform::projection_matrix(1, 1),
            batch_tx,
            batch_rx,
            worker: None,
            lifecycle: Lifecycle::Created,
            seed_counter: 0,
            buffer,
            config,
        })
    }

    // --- Control surface ---

    /// Shared camera handle for input handling.
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn set_axis_visible(&mut self, visible: bool) {
        self.settings.axis_visible = visible;
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.settings.grid_visible = visible;
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.settings.color_mode = mode;
    }

    /// Wire-level variant of [`set_color_mode`](Self::set_color_mode):
    /// 0 = intensity, 1 = depth, 2 = normal.
    pub fn set_color_mode_index(&mut self, index: u32) -> Result<()> {
        self.settings.color_mode = ColorMode::try_from(index)?;
        Ok(())
    }

    pub fn color_mode(&self) -> ColorMode {
        self.settings.color_mode
    }

    pub fn set_display_ratio(&mut self, ratio: f32) {
        self.settings.set_display_ratio(ratio);
    }

    pub fn display_ratio(&self) -> f32 {
        self.settings.display_ratio()
    }

    // --- Data flow ---

    /// Appends one generated batch and re-derives the upload snapshot.
    /// Empty batches and batches arriving after teardown are ignored.
    pub fn submit_batch(&mut self, batch: Batch) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        if batch.is_empty() {
            log::debug!("Ignoring empty batch");
            return;
        }

        let started = Instant::now();
        let outcome = self.buffer.append(&batch);
        self.buffer.snapshot_into(&mut self.snapshot);
        self.snapshot_dirty = true;

        log::debug!(
            "Point update took {:?}: +{} (evicted {}), count={}",
            started.elapsed(),
            outcome.written,
            outcome.evicted,
            self.buffer.len()
        );
    }

    /// Ordered records currently retained, oldest first.
    pub fn snapshot(&self) -> &[PointRecord] {
        &self.snapshot
    }

    pub fn point_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Points the next frame will draw.
    pub fn drawn_count(&self) -> usize {
        displayed_count(self.snapshot.len(), self.settings.display_ratio())
    }

    /// Nearest drawn point to a window coordinate, if within the pick radius.
    pub fn pick(&self, x: f32, y: f32, width: u32, height: u32) -> Option<PointRecord> {
        self.pick_hit(x, y, width, height).map(|hit| hit.record)
    }

    pub fn pick_hit(&self, x: f32, y: f32, width: u32, height: u32) -> Option<PickHit> {
        if width == 0 || height == 0 {
            return None;
        }
        let mvp = FrameTransforms::new(
            &self.camera.state(),
            transform::projection_matrix(width, height),
        )
        .mvp;
        let visible = &self.snapshot[..self.drawn_count()];
        let hit = picker::pick(
            visible,
            &mvp,
            Vec2::new(x, y),
            Vec2::new(width as f32, height as f32),
            self.config.pick_radius_px,
        );
        match &hit {
            Some(h) => log::debug!(
                "Picked point #{} at {:?} ({:.1} px)",
                h.index,
                h.record.position,
                h.distance_px
            ),
            None => log::debug!("Pick at ({x:.0}, {y:.0}) found nothing"),
        }
        hit
    }

    // --- Lifecycle hooks ---

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_generating(&self) -> bool {
        self.worker.as_ref().is_some_and(GenerationWorker::is_running)
    }

    pub fn on_surface_ready(&mut self, width: u32, height: u32) {
        log::info!("Surface ready: {}x{}", width, height);
        self.on_viewport_resize(width, height);
    }

    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Some((width, height));
        self.projection = transform::projection_matrix(width, height);
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    /// Takes the waiting batch, if any, and plans the frame.
    ///
    /// Returns `None` before the surface is ready and after teardown. Never
    /// blocks on the generation worker.
    pub fn on_frame(&mut self) -> Option<FramePlan> {
        if self.lifecycle == Lifecycle::Destroyed || self.viewport.is_none() {
            return None;
        }

        match self.batch_rx.try_recv() {
            Ok(batch) => self.submit_batch(batch),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
        }

        let plan = FramePlan {
            transforms: FrameTransforms::new(&self.camera.state(), self.projection),
            draw_grid: self.settings.grid_visible,
            point_count: u32::try_from(self.drawn_count()).unwrap_or(u32::MAX),
            color_mode: self.settings.color_mode,
            draw_axes: self.settings.axis_visible,
            snapshot_dirty: self.snapshot_dirty,
        };
        self.snapshot_dirty = false;
        Some(plan)
    }

    /// Reports how long the frame took; overruns are logged.
    pub fn end_frame(&mut self, elapsed: Duration) -> bool {
        self.budget.record(elapsed)
    }

    pub fn frame_overruns(&self) -> u64 {
        self.budget.overruns()
    }

    /// Activates generation with a fresh warm-up. No-op while already
    /// running or after teardown.
    pub fn on_resume(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Destroyed || self.worker.is_some() {
            return Ok(());
        }
        let generator = match self.config.seed {
            // Distinct stream per activation, reproducible per run.
            Some(seed) => {
                let seed = seed.wrapping_add(self.seed_counter);
                self.seed_counter += 1;
                PointGenerator::with_seed(self.config.batch_size, seed)
            }
            None => PointGenerator::new(self.config.batch_size),
        };
        let worker =
            GenerationWorker::spawn(generator, self.config.cadence, self.batch_tx.clone())?;
        self.worker = Some(worker);
        self.lifecycle = Lifecycle::Running;
        log::info!("Session resumed");
        Ok(())
    }

    /// Stops generation and discards any batch still waiting in the slot.
    pub fn on_pause(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.stop_generation();
        self.lifecycle = Lifecycle::Paused;
        log::info!("Session paused");
    }

    /// Releases the worker. Every later hook is a no-op.
    pub fn on_destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.stop_generation();
        self.lifecycle = Lifecycle::Destroyed;
        log::info!("Session destroyed, generation worker released");
    }

    fn stop_generation(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.cancel();
        }
        let dropped = self.batch_rx.try_iter().count();
        if dropped > 0 {
            log::debug!("Discarded {} pending batch(es)", dropped);
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.on_destroy();
    }
}

impl TryFrom<SessionConfig> for ScanSession {
    type Error = CoreError;

    fn try_from(config: SessionConfig) -> Result<Self> {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn config(capacity: usize) -> SessionConfig {
        SessionConfig {
            capacity,
            batch_size: capacity,
            cadence: Cadence {
                warmup: Duration::from_millis(0),
                interval: Duration::from_millis(1),
            },
            seed: Some(11),
            ..SessionConfig::default()
        }
    }

    fn records(n: usize, tag_base: f32) -> Vec<PointRecord> {
        (0..n)
            .map(|i| PointRecord::new([0.0, 0.0, 0.0], tag_base + i as f32, [0.0, 0.0, 1.0]))
            .collect()
    }

    fn ready(capacity: usize) -> ScanSession {
        let mut s = ScanSession::new(config(capacity)).unwrap();
        s.on_surface_ready(800, 600);
        s
    }

    /// Polls frames until the worker's first batch lands.
    fn frame_until_data(s: &mut ScanSession) -> FramePlan {
        for _ in 0..2_000 {
            let plan = s.on_frame().unwrap();
            if plan.point_count > 0 {
                return plan;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("no batch arrived");
    }

    #[test]
    fn no_frames_before_surface_is_ready() {
        let mut s = ScanSession::new(config(8)).unwrap();
        assert!(s.on_frame().is_none());
        s.on_surface_ready(640, 480);
        assert!(s.on_frame().is_some());
    }

    #[test]
    fn display_ratio_limits_points_submitted() {
        let mut s = ready(100_000);
        s.submit_batch(records(100_000, 0.0));

        s.set_display_ratio(0.5);
        let plan = s.on_frame().unwrap();
        assert_eq!(plan.point_count, 50_000);
        assert!(plan.snapshot_dirty);

        s.set_display_ratio(0.0);
        let plan = s.on_frame().unwrap();
        assert_eq!(plan.point_count, 0);
        assert!(!plan.snapshot_dirty);
    }

    #[test]
    fn empty_buffer_draws_no_points_but_keeps_grid_and_axes() {
        let mut s = ready(16);
        let plan = s.on_frame().unwrap();
        assert_eq!(plan.point_count, 0);
        assert!(plan.draw_grid && plan.draw_axes);

        s.set_grid_visible(false);
        s.set_axis_visible(false);
        s.submit_batch(Vec::new());
        let plan = s.on_frame().unwrap();
        assert!(!plan.draw_grid && !plan.draw_axes);
        assert!(!plan.snapshot_dirty);
    }

    #[test]
    fn color_mode_index_is_validated() {
        let mut s = ready(4);
        s.set_color_mode_index(1).unwrap();
        assert_eq!(s.on_frame().unwrap().color_mode, ColorMode::Depth);
        assert!(s.set_color_mode_index(9).is_err());
        assert_eq!(s.color_mode(), ColorMode::Depth);
    }

    #[test]
    fn camera_changes_flow_into_the_next_plan() {
        let mut s = ready(4);
        let before = s.on_frame().unwrap().transforms.mvp;
        let input = s.camera().clone();
        input.rotate(30.0, 0.0);
        let after = s.on_frame().unwrap().transforms.mvp;
        assert_ne!(before, after);
        input.reset_view();
        assert_eq!(s.on_frame().unwrap().transforms.mvp, before);
    }

    #[test]
    fn pick_uses_drawn_prefix_only() {
        let mut s = ready(4);
        let mut batch = records(2, 0.0);
        batch[0].position = [2.0, 2.0, 0.0];
        batch[1].position = [0.0, 0.0, 0.0];
        s.submit_batch(batch);

        let hit = s.pick(400.0, 300.0, 800, 600).unwrap();
        assert_eq!(hit.intensity, 1.0);

        s.set_display_ratio(0.5);
        assert!(s.pick(400.0, 300.0, 800, 600).is_none());
        assert!(s.pick(400.0, 300.0, 0, 600).is_none());
    }

    #[test]
    fn worker_batches_reach_the_ring() {
        let mut s = ready(320);
        assert_eq!(s.lifecycle(), Lifecycle::Created);
        s.on_resume().unwrap();
        assert!(s.is_generating());

        let plan = frame_until_data(&mut s);
        assert_eq!(plan.point_count, 320);
        assert!(plan.snapshot_dirty);
        assert_eq!(s.point_count(), 320);
    }

    #[test]
    fn pause_stops_generation_and_resume_restarts_it() {
        let mut s = ready(64);
        s.on_resume().unwrap();
        frame_until_data(&mut s);

        s.on_pause();
        assert_eq!(s.lifecycle(), Lifecycle::Paused);
        assert!(!s.is_generating());
        thread::sleep(Duration::from_millis(20));
        assert!(!s.on_frame().unwrap().snapshot_dirty);

        s.on_resume().unwrap();
        assert_eq!(s.lifecycle(), Lifecycle::Running);
        assert!(s.is_generating());
    }

    #[test]
    fn resume_restarts_the_warmup_from_zero() {
        const WARMUP: Duration = Duration::from_millis(300);
        let mut s = ScanSession::new(SessionConfig {
            cadence: Cadence {
                warmup: WARMUP,
                interval: Duration::from_millis(1),
            },
            ..config(64)
        })
        .unwrap();
        s.on_surface_ready(800, 600);

        s.on_resume().unwrap();
        thread::sleep(Duration::from_millis(200));
        s.on_pause();
        assert_eq!(s.point_count(), 0);

        let resumed = Instant::now();
        s.on_resume().unwrap();
        frame_until_data(&mut s);
        assert!(resumed.elapsed() >= WARMUP);
    }

    #[test]
    fn destroy_is_terminal() {
        let mut s = ready(64);
        s.on_resume().unwrap();
        s.on_destroy();
        assert_eq!(s.lifecycle(), Lifecycle::Destroyed);
        assert!(!s.is_generating());
        assert!(s.on_frame().is_none());

        s.submit_batch(records(4, 0.0));
        assert_eq!(s.point_count(), 0);
        s.on_resume().unwrap();
        assert!(!s.is_generating());
    }

    #[test]
    fn two_full_batches_leave_only_the_second() {
        const CAP: usize = 850_000;
        let mut s = ready(CAP);
        let first = records(CAP, 0.0);
        let second = records(CAP, CAP as f32);
        s.submit_batch(first);
        s.submit_batch(second.clone());
        assert_eq!(s.point_count(), CAP);
        assert_eq!(s.snapshot(), second.as_slice());
    }

    #[test]
    fn zero_capacity_config_fails() {
        assert!(matches!(
            ScanSession::new(config(0)),
            Err(CoreError::ZeroCapacity)
        ));
    }
}
