//! Attribute-to-color mapping.
//!
//! `shade` is the CPU reference for the fragment stage in `points.wgsl`; the
//! legend overlay samples `gradient` so both always agree.

use crate::error::CoreError;
use crate::point::PointRecord;

/// Reference depth range for [`ColorMode::Depth`].
pub const DEPTH_MIN: f32 = -0.3;
pub const DEPTH_MAX: f32 = 0.3;

/// Nominal upper bound of the intensity channel.
pub const INTENSITY_MAX: f32 = 255.0;

const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const YELLOW: [f32; 3] = [1.0, 1.0, 0.0];
const RED: [f32; 3] = [1.0, 0.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
const MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ColorMode {
    #[default]
    Intensity = 0,
    Depth = 1,
    Normal = 2,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [ColorMode::Intensity, ColorMode::Depth, ColorMode::Normal];

    /// Value written into the point uniform (`uColorMode`).
    #[inline]
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Cycles Intensity -> Depth -> Normal -> Intensity.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::Intensity => "Intensity",
            ColorMode::Depth => "Depth",
            ColorMode::Normal => "Normal",
        }
    }

    /// Legend end labels (low, high). Normal mode has no legend.
    pub fn legend_labels(self) -> Option<(&'static str, &'static str)> {
        match self {
            ColorMode::Intensity => Some(("weak", "strong")),
            ColorMode::Depth => Some(("deep", "shallow")),
            ColorMode::Normal => None,
        }
    }

    /// Color at `t` in [0, 1] along this mode's legend gradient.
    pub fn gradient(self, t: f32) -> Option<[f32; 3]> {
        match self {
            ColorMode::Intensity => Some(three_stop(GREEN, YELLOW, RED, t)),
            ColorMode::Depth => Some(three_stop(BLUE, MAGENTA, RED, t)),
            ColorMode::Normal => None,
        }
    }
}

impl TryFrom<u32> for ColorMode {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(CoreError::InvalidColorMode(value))
    }
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Piecewise-linear gradient with `mid` at t = 0.5. `t` is clamped.
pub fn three_stop(lo: [f32; 3], mid: [f32; 3], hi: [f32; 3], t: f32) -> [f32; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t < 0.5 {
        lerp3(lo, mid, t * 2.0)
    } else {
        lerp3(mid, hi, (t - 0.5) * 2.0)
    }
}

#[inline]
pub fn intensity_key(intensity: f32) -> f32 {
    (intensity / INTENSITY_MAX).clamp(0.0, 1.0)
}

#[inline]
pub fn depth_key(z: f32) -> f32 {
    ((z - DEPTH_MIN) / (DEPTH_MAX - DEPTH_MIN)).clamp(0.0, 1.0)
}

/// RGB for one point under `mode`.
pub fn shade(mode: ColorMode, point: &PointRecord) -> [f32; 3] {
    match mode {
        ColorMode::Intensity => three_stop(GREEN, YELLOW, RED, intensity_key(point.intensity)),
        ColorMode::Depth => three_stop(BLUE, MAGENTA, RED, depth_key(point.position[2])),
        ColorMode::Normal => point.normal.map(|c| (c + 1.0) * 0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_intensity(i: f32) -> PointRecord {
        PointRecord::new([0.0; 3], i, [0.0, 0.0, 1.0])
    }

    fn with_z(z: f32) -> PointRecord {
        PointRecord::new([0.0, 0.0, z], 0.0, [0.0, 0.0, 1.0])
    }

    #[test]
    fn intensity_bounds_map_to_green_yellow_red() {
        assert_eq!(shade(ColorMode::Intensity, &with_intensity(0.0)), GREEN);
        assert_eq!(shade(ColorMode::Intensity, &with_intensity(255.0)), RED);
        assert_eq!(shade(ColorMode::Intensity, &with_intensity(127.5)), YELLOW);
        // Out-of-range intensities clamp.
        assert_eq!(shade(ColorMode::Intensity, &with_intensity(-40.0)), GREEN);
        assert_eq!(shade(ColorMode::Intensity, &with_intensity(900.0)), RED);
    }

    #[test]
    fn depth_bounds_map_to_blue_magenta_red() {
        assert_eq!(shade(ColorMode::Depth, &with_z(DEPTH_MIN)), BLUE);
        assert_eq!(shade(ColorMode::Depth, &with_z(DEPTH_MAX)), RED);
        assert_eq!(shade(ColorMode::Depth, &with_z(0.0)), MAGENTA);
        assert_eq!(shade(ColorMode::Depth, &with_z(-5.0)), BLUE);
    }

    #[test]
    fn normal_mode_remaps_components() {
        let p = PointRecord::new([0.0; 3], 0.0, [-1.0, 0.0, 1.0]);
        assert_eq!(shade(ColorMode::Normal, &p), [0.0, 0.5, 1.0]);
    }

    #[test]
    fn mode_indices_round_trip_and_cycle() {
        for mode in ColorMode::ALL {
            assert_eq!(ColorMode::try_from(mode.index()).unwrap(), mode);
        }
        assert!(matches!(
            ColorMode::try_from(3),
            Err(CoreError::InvalidColorMode(3))
        ));
        assert_eq!(ColorMode::Normal.next(), ColorMode::Intensity);
        assert_eq!(ColorMode::Intensity.next(), ColorMode::Depth);
    }

    #[test]
    fn legend_matches_shading() {
        assert_eq!(ColorMode::Intensity.gradient(0.25), Some([0.5, 1.0, 0.0]));
        assert_eq!(ColorMode::Normal.gradient(0.5), None);
        assert!(ColorMode::Normal.legend_labels().is_none());
    }
}
