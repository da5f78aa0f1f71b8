//! Synthetic rotating multi-ring scanner.

use crate::point::PointRecord;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Number of laser rings per sweep.
pub const RINGS: usize = 32;
/// Vertical angle of the lowest ring, degrees.
pub const BASE_VERTICAL_DEG: f32 = -15.0;
/// Vertical spacing between rings, degrees.
pub const RING_STEP_DEG: f32 = 1.0;
/// Radial distance range of a return, `[MIN, MAX)`.
pub const DISTANCE_MIN: f32 = 0.5;
pub const DISTANCE_MAX: f32 = 1.0;

pub struct PointGenerator {
    points_per_ring: usize,
    rng: StdRng,
}

impl PointGenerator {
    /// A generator producing roughly `requested` points per batch, split
    /// evenly over [`RINGS`] rings.
    pub fn new(requested: usize) -> Self {
        Self::with_rng(requested, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a reproducible random source.
    pub fn with_seed(requested: usize, seed: u64) -> Self {
        Self::with_rng(requested, StdRng::seed_from_u64(seed))
    }

    fn with_rng(requested: usize, rng: StdRng) -> Self {
        Self {
            points_per_ring: requested / RINGS,
            rng,
        }
    }

    pub fn points_per_ring(&self) -> usize {
        self.points_per_ring
    }

    /// Exact number of records in every batch.
    pub fn batch_len(&self) -> usize {
        self.points_per_ring * RINGS
    }

    /// Produces one full sweep, ring by ring.
    ///
    /// Intensity is derived from position, `((x + 1) / 2) * 255`, so it
    /// varies smoothly across the sweep.
    pub fn next_batch(&mut self) -> Vec<PointRecord> {
        let per_ring = self.points_per_ring;
        let mut batch = Vec::with_capacity(self.batch_len());

        for ring in 0..RINGS {
            let vertical = (BASE_VERTICAL_DEG + ring as f32 * RING_STEP_DEG).to_radians();
            let (sin_v, cos_v) = vertical.sin_cos();

            for i in 0..per_ring {
                let horizontal = (i as f32 / per_ring as f32 * 360.0).to_radians();
                let (sin_h, cos_h) = horizontal.sin_cos();
                let distance: f32 = self.rng.gen_range(DISTANCE_MIN..DISTANCE_MAX);

                let x = distance * cos_v * cos_h;
                let y = distance * cos_v * sin_h;
                let z = distance * sin_v;
                let intensity = (x + 1.0) / 2.0 * 255.0;

                let norm = if distance != 0.0 { distance } else { 1.0 };
                batch.push(PointRecord::new(
                    [x, y, z],
                    intensity,
                    [x / norm, y / norm, z / norm],
                ));
            }
        }

        batch
    }
}
