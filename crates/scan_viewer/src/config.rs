use clap::Parser;
use scan_core::frame::ViewSettings;
use scan_core::session::SessionConfig;
use scan_core::worker::Cadence;
use scan_core::ColorMode;
use std::time::Duration;

/// `scan_viewer` - Live viewer for a synthetic rotating scanner.
///
/// Generates rings of points on a background thread, streams them into a
/// fixed-capacity ring buffer and renders the most recent sweep with an
/// interactive camera.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Number of points the ring buffer retains.
    #[arg(long, env = "SCAN_CAPACITY", default_value_t = 850_000)]
    pub capacity: usize,

    /// Points requested from the generator per batch.
    ///
    /// Rounded down to a whole number of points per ring.
    #[arg(long, env = "SCAN_BATCH_SIZE", default_value_t = 850_000)]
    pub batch_size: usize,

    /// Delay between activation and the first generated batch.
    #[arg(long, env = "SCAN_WARMUP_MS", default_value_t = 2000)]
    pub warmup_ms: u64,

    /// Target period between generated batches.
    #[arg(long, env = "SCAN_INTERVAL_MS", default_value_t = 33)]
    pub interval_ms: u64,

    /// Frames slower than this are logged as overruns.
    #[arg(long, env = "SCAN_FRAME_BUDGET_MS", default_value_t = 16)]
    pub frame_budget_ms: u64,

    /// Maximum cursor distance for a pick to match a point.
    #[arg(long, env = "SCAN_PICK_RADIUS_PX", default_value_t = 24.0)]
    pub pick_radius_px: f32,

    /// Point sprite size in physical pixels.
    #[arg(long, env = "SCAN_POINT_SIZE_PX", default_value_t = 2.0)]
    pub point_size_px: f32,

    /// Initial color mode: 0 = intensity, 1 = depth, 2 = normal.
    #[arg(long, env = "SCAN_COLOR_MODE", default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=2))]
    pub color_mode: u32,

    /// Fraction of buffered points drawn, in [0, 1].
    #[arg(long, env = "SCAN_DISPLAY_RATIO", default_value_t = 1.0)]
    pub display_ratio: f32,

    /// Fixed generator seed for reproducible sweeps.
    #[arg(long, env = "SCAN_SEED")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        let mut initial_settings = ViewSettings::default();
        initial_settings.color_mode = ColorMode::try_from(self.color_mode).unwrap_or_default();
        initial_settings.set_display_ratio(self.display_ratio);

        SessionConfig {
            capacity: self.capacity,
            batch_size: self.batch_size,
            cadence: Cadence {
                warmup: Duration::from_millis(self.warmup_ms),
                interval: Duration::from_millis(self.interval_ms),
            },
            frame_budget: Duration::from_millis(self.frame_budget_ms),
            pick_radius_px: self.pick_radius_px,
            seed: self.seed,
            initial_settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_defaults() {
        let cfg = Config::try_parse_from(["scan_viewer"]).unwrap();
        let session = cfg.session_config();
        let expected = SessionConfig::default();

        assert_eq!(session.capacity, expected.capacity);
        assert_eq!(session.batch_size, expected.batch_size);
        assert_eq!(session.cadence, expected.cadence);
        assert_eq!(session.frame_budget, expected.frame_budget);
        assert_eq!(session.pick_radius_px, expected.pick_radius_px);
        assert_eq!(session.seed, None);
        assert_eq!(session.initial_settings, expected.initial_settings);
        assert_eq!(cfg.point_size_px, 2.0);
    }

    #[test]
    fn flags_flow_into_session_config() {
        let cfg = Config::try_parse_from([
            "scan_viewer",
            "--capacity",
            "1000",
            "--warmup-ms",
            "0",
            "--color-mode",
            "2",
            "--display-ratio",
            "1.5",
            "--seed",
            "42",
        ])
        .unwrap();
        let session = cfg.session_config();

        assert_eq!(session.capacity, 1000);
        assert_eq!(session.cadence.warmup, Duration::ZERO);
        assert_eq!(session.initial_settings.color_mode, ColorMode::Normal);
        assert_eq!(session.initial_settings.display_ratio(), 1.0);
        assert_eq!(session.seed, Some(42));
    }

    #[test]
    fn out_of_range_color_mode_is_rejected() {
        assert!(Config::try_parse_from(["scan_viewer", "--color-mode", "3"]).is_err());
    }
}
