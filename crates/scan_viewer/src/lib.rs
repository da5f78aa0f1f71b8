// src/lib.rs
//! Interactive viewer for the streaming scan core.
//!
//! Hosts a `scan_core::ScanSession` in a winit window, draws its frame plans
//! with wgpu and overlays an egui HUD.

pub mod app;
pub mod config;
pub mod input;
pub mod renderer;
pub mod ui;
