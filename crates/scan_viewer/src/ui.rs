//! egui overlay: color legend, HUD and the last pick.

use egui::{Align2, Color32, RichText};
use scan_core::{ColorMode, PickHit};

const LEGEND_STEPS: usize = 32;
const LEGEND_SIZE: egui::Vec2 = egui::vec2(220.0, 14.0);

/// Numbers shown in the HUD.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudStats {
    pub point_count: usize,
    pub drawn_count: usize,
    pub capacity: usize,
    pub display_ratio: f32,
    pub color_mode: ColorMode,
    pub generating: bool,
    pub frame_overruns: u64,
    pub grid_visible: bool,
    pub axis_visible: bool,
}

fn to_color32(rgb: [f32; 3]) -> Color32 {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(c(rgb[0]), c(rgb[1]), c(rgb[2]))
}

/// Evenly spaced samples of the mode's gradient, low end first.
pub fn legend_swatches(mode: ColorMode, steps: usize) -> Vec<Color32> {
    let last = steps.saturating_sub(1).max(1) as f32;
    (0..steps)
        .filter_map(|i| mode.gradient(i as f32 / last))
        .map(to_color32)
        .collect()
}

/// Gradient bar for the current mode. Normal mode has no legend.
pub fn draw_legend(ctx: &egui::Context, mode: ColorMode) {
    let Some((low, high)) = mode.legend_labels() else {
        return;
    };
    let swatches = legend_swatches(mode, LEGEND_STEPS);

    egui::Window::new("Legend")
        .anchor(Align2::RIGHT_BOTTOM, [-10.0, -10.0])
        .title_bar(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(RichText::new(mode.label()).strong());
            let (rect, _) = ui.allocate_exact_size(LEGEND_SIZE, egui::Sense::hover());
            let w = rect.width() / swatches.len() as f32;
            let painter = ui.painter();
            for (i, color) in swatches.iter().enumerate() {
                let x0 = rect.left() + i as f32 * w;
                let cell = egui::Rect::from_min_max(
                    egui::pos2(x0, rect.top()),
                    egui::pos2(x0 + w, rect.bottom()),
                );
                painter.rect_filled(cell, 0.0, *color);
            }
            ui.horizontal(|ui| {
                ui.label(low);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(high);
                });
            });
        });
}

pub fn draw_hud(ctx: &egui::Context, stats: &HudStats) {
    egui::Window::new("HUD")
        .anchor(Align2::LEFT_TOP, [10.0, 10.0])
        .title_bar(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Points: {} / {}", stats.point_count, stats.capacity));
            ui.label(format!(
                "Drawn: {} ({:.0}%)",
                stats.drawn_count,
                stats.display_ratio * 100.0
            ));
            ui.label(format!("Color: {}", stats.color_mode.label()));
            ui.label(format!(
                "Grid: {}  Axes: {}",
                on_off(stats.grid_visible),
                on_off(stats.axis_visible)
            ));
            let status = if stats.generating { "scanning" } else { "idle" };
            ui.label(format!("Generator: {status}"));
            if stats.frame_overruns > 0 {
                ui.colored_label(
                    Color32::YELLOW,
                    format!("Slow frames: {}", stats.frame_overruns),
                );
            }
            ui.separator();
            ui.small("drag: rotate | right-drag: pan | wheel: zoom | hold: pick");
            ui.small("R reset | G grid | A axes | L legend | C color | [ ] ratio");
        });
}

pub fn draw_pick_panel(ctx: &egui::Context, hit: Option<&PickHit>) {
    let Some(hit) = hit else {
        return;
    };
    let p = hit.record.position;
    let n = hit.record.normal;

    egui::Window::new("Picked point")
        .anchor(Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("#{} ({:.1} px away)", hit.index, hit.distance_px));
            ui.label(format!("x {:.4}  y {:.4}  z {:.4}", p[0], p[1], p[2]));
            ui.label(format!("intensity {:.1}", hit.record.intensity));
            ui.label(format!("normal ({:.3}, {:.3}, {:.3})", n[0], n[1], n[2]));
        });
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
