//! Pitched (row-padded) staging buffers.
//!
//! Device allocators pad each row so that row starts land on an aligned
//! offset; every address computation must use the pitch, not the logical
//! width. The CPU backend stages fields through [`PitchedBuffer`] to exercise
//! the same addressing discipline as the device path, and the wgpu backend
//! lays its storage buffers out with the same row stride.

use crate::field::Field;

/// Row alignment for pitched buffers, in bytes.
///
/// 256 bytes matches the offset alignment wgpu requires for buffer copies,
/// and is a typical device row-pitch granularity.
pub const ROW_ALIGN_BYTES: usize = 256;

/// Row stride in elements for a row of `width` `f32` samples.
pub fn pitch_elems(width: u32) -> usize {
    let elem = std::mem::size_of::<f32>();
    let row_bytes = width as usize * elem;
    let padded = row_bytes.div_ceil(ROW_ALIGN_BYTES) * ROW_ALIGN_BYTES;
    padded / elem
}

/// A row-padded copy of a square field.
///
/// Rows are `pitch()` elements apart; only the first `width` elements of each
/// row are meaningful. The trailing pad of each row is never read by the
/// kernels.
#[derive(Debug, Clone)]
pub struct PitchedBuffer {
    width: u32,
    pitch: usize,
    data: Vec<f32>,
}

impl PitchedBuffer {
    /// Allocate a zeroed pitched buffer for a `width × width` field.
    pub fn new(width: u32) -> Self {
        let pitch = pitch_elems(width);
        Self {
            width,
            pitch,
            data: vec![0.0; pitch * width as usize],
        }
    }

    /// Logical row width in elements.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Row stride in elements.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Row stride in bytes.
    pub fn pitch_bytes(&self) -> usize {
        self.pitch * std::mem::size_of::<f32>()
    }

    /// Linear index of `(x, y)` under the pitch.
    #[inline]
    pub fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.pitch + x as usize
    }

    /// Flat view including row padding.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable flat view including row padding.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Copy an unpadded row-major field in, row by row, translating to the
    /// pitched layout.
    pub fn copy_from_field(&mut self, field: &Field) {
        let width = self.width as usize;
        let src = field.as_slice();
        for y in 0..self.width as usize {
            let dst_start = y * self.pitch;
            let src_start = y * width;
            self.data[dst_start..dst_start + width]
                .copy_from_slice(&src[src_start..src_start + width]);
        }
    }

    /// Copy the `w × h` region at `(x0, y0)` out to the same coordinates of
    /// an unpadded field, leaving every cell outside the region untouched.
    ///
    /// The drain path for smoothing results: only the interior region is
    /// defined, so only the interior region is written back.
    pub fn copy_region_to_field(&self, x0: u32, y0: u32, w: u32, h: u32, field: &mut Field) {
        let field_width = self.width as usize;
        let dst = field.as_mut_slice();
        for row in 0..h as usize {
            let y = y0 as usize + row;
            let src_start = y * self.pitch + x0 as usize;
            let dst_start = y * field_width + x0 as usize;
            dst[dst_start..dst_start + w as usize]
                .copy_from_slice(&self.data[src_start..src_start + w as usize]);
        }
    }

    /// Copy out to an unpadded row-major field, dropping the row padding.
    pub fn copy_to_field(&self, field: &mut Field) {
        let width = self.width as usize;
        let dst = field.as_mut_slice();
        for y in 0..self.width as usize {
            let src_start = y * self.pitch;
            let dst_start = y * width;
            dst[dst_start..dst_start + width]
                .copy_from_slice(&self.data[src_start..src_start + width]);
        }
    }
}
