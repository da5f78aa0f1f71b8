//! The per-point record shared by the generator, the ring and the GPU.

use glam::Vec3;

/// One scanner sample. Must match the instance layout in `points.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointRecord {
    /// Position in scanner space.
    pub position: [f32; 3],
    /// Return intensity, nominally 0..=255.
    pub intensity: f32,
    /// Unit-ish surface normal.
    pub normal: [f32; 3],
}

// Seven tightly packed f32s; the vertex layout depends on it.
const _: [(); 28] = [(); core::mem::size_of::<PointRecord>()];

impl PointRecord {
    /// Number of f32 fields per record in the flat upload array.
    pub const FLOATS: usize = 7;

    pub fn new(position: [f32; 3], intensity: f32, normal: [f32; 3]) -> Self {
        Self {
            position,
            intensity,
            normal,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        Vec3::from(self.normal)
    }
}

/// Views a record slice as the flat `[x, y, z, i, nx, ny, nz, ...]` array.
#[inline]
pub fn as_flat(records: &[PointRecord]) -> &[f32] {
    bytemuck::cast_slice(records)
}
