use crate::{
    config::Config,
    input::{InputAction, InputState},
    renderer::Renderer,
    ui::{self, HudStats},
};
use anyhow::{Context, Result};
use scan_core::{PickHit, ScanSession};
use std::sync::Arc;
use std::time::Instant;
use winit::{event::WindowEvent, window::Window};

/// Whether the GPU instance buffer lags the session snapshot.
///
/// The session reports a changed snapshot once; the upload may still be
/// skipped if the frame is dropped, so the flag lives here until it lands.
#[derive(Debug, Default)]
struct PendingUpload {
    pending: bool,
}

impl PendingUpload {
    fn note(&mut self, snapshot_dirty: bool) {
        self.pending |= snapshot_dirty;
    }

    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

pub struct App {
    pub renderer: Renderer,
    pub session: ScanSession,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    input: InputState,
    last_pick: Option<PickHit>,
    legend_visible: bool,
    upload: PendingUpload,
    quit_requested: bool,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let session_config = config.session_config();
        let renderer =
            Renderer::new(window.clone(), session_config.capacity, config.point_size_px).await?;
        let mut session = ScanSession::new(session_config).context("creating scan session")?;

        let size = renderer.gfx.size;
        session.on_surface_ready(size.width, size.height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            session,
            egui_ctx,
            egui_state,
            input: InputState::new(),
            last_pick: None,
            legend_visible: true,
            upload: PendingUpload::default(),
            quit_requested: false,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.session
                .on_viewport_resize(new_size.width, new_size.height);
        }
    }

    /// Returns `true` when the overlay consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        if let Some(action) = self.input.handle_event(event, self.session.camera()) {
            self.apply(action);
        }

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::Pick { x, y } => {
                let size = self.renderer.gfx.size;
                self.last_pick = self.session.pick_hit(x, y, size.width, size.height);
            }
            InputAction::ResetView => self.session.camera().reset_view(),
            InputAction::ToggleGrid => {
                let visible = !self.session.settings().grid_visible;
                self.session.set_grid_visible(visible);
            }
            InputAction::ToggleAxes => {
                let visible = !self.session.settings().axis_visible;
                self.session.set_axis_visible(visible);
            }
            InputAction::ToggleLegend => self.legend_visible = !self.legend_visible,
            InputAction::CycleColorMode => {
                let next = self.session.color_mode().next();
                log::info!("Color mode: {}", next.label());
                self.session.set_color_mode(next);
            }
            InputAction::AdjustRatio(step) => {
                let ratio = self.session.display_ratio() + step;
                // Snap to the step grid so repeated presses land on 0 and 1 exactly.
                self.session.set_display_ratio((ratio * 10.0).round() / 10.0);
            }
            InputAction::Quit => self.quit_requested = true,
        }
    }

    pub fn on_resume(&mut self) -> Result<()> {
        self.session.on_resume().context("starting generation")
    }

    pub fn on_pause(&mut self) {
        self.session.on_pause();
    }

    pub fn on_destroy(&mut self) {
        self.session.on_destroy();
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let started = Instant::now();

        if let Some(action) = self.input.poll(started) {
            self.apply(action);
        }

        let Some(plan) = self.session.on_frame() else {
            return Ok(());
        };

        self.upload.note(plan.snapshot_dirty);

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = self.renderer.gfx.swap_view(&frame.texture);

        if self.upload.take() {
            self.renderer.upload_points(self.session.snapshot());
        }
        self.renderer.render(&swap_view, &plan);

        let settings = *self.session.settings();
        let stats = HudStats {
            point_count: self.session.point_count(),
            drawn_count: plan.point_count as usize,
            capacity: self.session.capacity(),
            display_ratio: settings.display_ratio(),
            color_mode: plan.color_mode,
            generating: self.session.is_generating(),
            frame_overruns: self.session.frame_overruns(),
            grid_visible: settings.grid_visible,
            axis_visible: settings.axis_visible,
        };

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);
        ui::draw_hud(&self.egui_ctx, &stats);
        if self.legend_visible {
            ui::draw_legend(&self.egui_ctx, plan.color_mode);
        }
        ui::draw_pick_panel(&self.egui_ctx, self.last_pick.as_ref());
        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);

        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }
        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        self.session.end_frame(started.elapsed());
        Ok(())
    }
}
