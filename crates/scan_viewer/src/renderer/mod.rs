//! GPU side of the frame: owns the context, the depth target and the two
//! draw pipelines, and executes a `FramePlan` in its fixed order.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{
        lines::LinePipeline,
        points::{PointPipeline, PointUniforms},
    },
    targets::DepthTarget,
};
use anyhow::{bail, Result};
use scan_core::{FramePlan, PointRecord};
use std::sync::Arc;
use winit::window::Window;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

/// Builds one pipeline inside a validation scope so a bad shader surfaces
/// as an error instead of the default uncaptured-error panic.
async fn build_checked<T>(
    device: &wgpu::Device,
    name: &str,
    build: impl FnOnce() -> T,
) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let built = build();
    if let Some(err) = device.pop_error_scope().await {
        bail!("failed to build the {name} program: {err}");
    }
    log::debug!("Built {name} program");
    Ok(built)
}

pub struct Renderer {
    pub gfx: GfxContext,
    pub depth: DepthTarget,
    pub points: PointPipeline,
    pub lines: LinePipeline,
    pub egui_renderer: egui_wgpu::Renderer,
    point_size_px: f32,
}

impl Renderer {
    /// Fails if either draw program does not compile; there is no
    /// degraded fallback.
    pub async fn new(window: Arc<Window>, capacity: usize, point_size_px: f32) -> Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let depth = DepthTarget::new(&gfx.device, gfx.size);
        let color_fmt = gfx.view_format;

        let points = build_checked(&gfx.device, "point", || {
            PointPipeline::new(&gfx.device, color_fmt, depth.format, capacity)
        })
        .await?;
        let lines = build_checked(&gfx.device, "line", || {
            LinePipeline::new(&gfx.device, color_fmt, depth.format)
        })
        .await?;

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, color_fmt, None, 1);

        Ok(Self {
            gfx,
            depth,
            points,
            lines,
            egui_renderer,
            point_size_px,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.depth.resize(&self.gfx.device, new_size);
        }
    }

    /// Copies the ordered snapshot into the instance buffer.
    pub fn upload_points(&self, snapshot: &[PointRecord]) {
        self.points.upload(&self.gfx.queue, snapshot);
    }

    /// Draws grid, points, then axes into `swap_view`.
    pub fn render(&mut self, swap_view: &wgpu::TextureView, plan: &FramePlan) {
        let mvp = plan.transforms.mvp;
        let viewport = [self.gfx.size.width as f32, self.gfx.size.height as f32];
        self.lines.set_mvp(&self.gfx.queue, mvp);
        self.points.set_uniforms(
            &self.gfx.queue,
            &PointUniforms::new(mvp, viewport, self.point_size_px, plan.color_mode),
        );

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if plan.draw_grid {
                self.lines.draw_grid(&mut pass);
            }
            self.points.draw(&mut pass, plan.point_count);
            if plan.draw_axes {
                self.lines.draw_axes(&mut pass);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
