//! Screen-space nearest-point picking.

use crate::point::PointRecord;
use crate::transform::project_to_screen;
use glam::{Mat4, Vec2};
use rayon::prelude::*;

/// Default maximum distance, in pixels, between the cursor and a pickable point.
pub const DEFAULT_PICK_RADIUS_PX: f32 = 24.0;

/// Below this many candidates the scan stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 16_384;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// The picked record.
    pub record: PointRecord,
    /// Logical index in the ordered snapshot (0 = oldest).
    pub index: usize,
    /// Cursor-to-point distance in pixels.
    pub distance_px: f32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    dist2: f32,
}

impl Candidate {
    /// Nearer wins; equal distances resolve to the older record.
    fn nearer(self, other: Self) -> Self {
        match self.dist2.partial_cmp(&other.dist2) {
            Some(std::cmp::Ordering::Less) => self,
            Some(std::cmp::Ordering::Greater) => other,
            _ if self.index <= other.index => self,
            _ => other,
        }
    }
}

/// Finds the point in `points` whose projection is nearest to `cursor`.
///
/// `cursor` and the result are in window pixels with a top-left origin.
/// Points farther than `radius_px`, behind the eye, or outside the depth
/// range never match. A miss returns `None`.
pub fn pick(
    points: &[PointRecord],
    mvp: &Mat4,
    cursor: Vec2,
    viewport: Vec2,
    radius_px: f32,
) -> Option<PickHit> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 || !(radius_px >= 0.0) {
        return None;
    }
    let limit2 = radius_px * radius_px;

    let candidate = |(index, p): (usize, &PointRecord)| {
        let screen = project_to_screen(mvp, p.position(), viewport)?;
        let dist2 = screen.distance_squared(cursor);
        (dist2 <= limit2).then_some(Candidate { index, dist2 })
    };

    let best = if points.len() >= PARALLEL_THRESHOLD {
        points
            .par_iter()
            .enumerate()
            .filter_map(candidate)
            .reduce_with(Candidate::nearer)
    } else {
        points
            .iter()
            .enumerate()
            .filter_map(candidate)
            .reduce(Candidate::nearer)
    }?;

    Some(PickHit {
        record: points[best.index],
        index: best.index,
        distance_px: best.dist2.sqrt(),
    })
}
