//! Entry point for the scan viewer.

use anyhow::{Context, Result};
use clap::Parser;
use scan_viewer::{app::App, config::Config};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!("Starting with {:?}", config);

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Scan Viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .build(&event_loop)?,
    );

    // Shader failures abort here, before any frame is drawn.
    let mut app = pollster::block_on(App::new(window.clone(), &config))
        .context("initializing renderer")?;

    // Errors from inside the loop closure are carried out through this slot.
    let mut fatal: Option<anyhow::Error> = None;

    event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::Resumed => {
                if let Err(err) = app.on_resume() {
                    log::error!("{err:#}");
                    fatal = Some(err);
                    elwt.exit();
                }
            }
            Event::Suspended => app.on_pause(),
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                if app.handle_event(&window, &event) {
                    return;
                }
                if app.should_quit() {
                    elwt.exit();
                    return;
                }
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::RedrawRequested => match app.render(&window) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            log::warn!("Surface lost; reconfiguring");
                            app.renderer.gfx.reconfigure();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("WGPU out of memory, exiting.");
                            elwt.exit();
                        }
                        Err(e) => log::error!("Render error: {:?}", e),
                    },
                    _ => {}
                }
            }
            Event::AboutToWait => window.request_redraw(),
            Event::LoopExiting => app.on_destroy(),
            _ => {}
        }
    })?;

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
