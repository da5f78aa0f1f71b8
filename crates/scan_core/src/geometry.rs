//! Static line geometry: the ground grid and the unit axes.

/// Line-list vertex. Must match the vertex inputs of `lines.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Lattice bounds and spacing of the ground grid.
pub const GRID_HALF_EXTENT: i32 = 100;
pub const GRID_STEP: f32 = 1.0;
pub const GRID_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// Lines of the ground lattice in the z = 0 plane, two vertices per line.
pub fn grid_vertices() -> Vec<LineVertex> {
    let lo = -GRID_HALF_EXTENT as f32 * GRID_STEP;
    let hi = GRID_HALF_EXTENT as f32 * GRID_STEP;
    let lines = (2 * GRID_HALF_EXTENT + 1) as usize;
    let mut out = Vec::with_capacity(lines * 4);

    // Integer stepping so the last line lands exactly on `hi`.
    for k in -GRID_HALF_EXTENT..=GRID_HALF_EXTENT {
        let x = k as f32 * GRID_STEP;
        out.push(LineVertex::new([x, lo, 0.0], GRID_COLOR));
        out.push(LineVertex::new([x, hi, 0.0], GRID_COLOR));
    }
    for k in -GRID_HALF_EXTENT..=GRID_HALF_EXTENT {
        let y = k as f32 * GRID_STEP;
        out.push(LineVertex::new([lo, y, 0.0], GRID_COLOR));
        out.push(LineVertex::new([hi, y, 0.0], GRID_COLOR));
    }
    out
}

/// Unit X (red), Y (green) and Z (blue) segments from the origin.
pub const AXIS_VERTICES: [LineVertex; 6] = [
    LineVertex::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
    LineVertex::new([1.0, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
    LineVertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
    LineVertex::new([0.0, 1.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
    LineVertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0, 1.0]),
    LineVertex::new([0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]),
];
