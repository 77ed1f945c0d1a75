//! Dense square fields of samples.

use crate::error::{Result, SmoothError};
use crate::geometry::GridGeometry;

/// A dense row-major square grid of `f32` samples.
///
/// Fields are the host-side currency of the smoother: the input field is
/// read-only to the kernels, the output field receives averaged values in its
/// interior region only. Cells outside the interior are left untouched by a
/// smoothing call and must not be interpreted as results.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: u32,
    data: Vec<f32>,
}

impl Field {
    /// Create a zero-filled field.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0.0; width as usize * width as usize],
        }
    }

    /// Create a field filled with a constant value.
    pub fn constant(width: u32, value: f32) -> Self {
        Self {
            width,
            data: vec![value; width as usize * width as usize],
        }
    }

    /// Create a field by evaluating `f(x, y)` at every cell.
    pub fn from_fn(width: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut data = Vec::with_capacity(width as usize * width as usize);
        for y in 0..width {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, data }
    }

    /// Side length of the field.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the field holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Sample at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.width {
            Some(self.data[self.idx(x, y)])
        } else {
            None
        }
    }

    /// Overwrite the sample at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.width {
            let idx = self.idx(x, y);
            self.data[idx] = value;
        }
    }

    /// Flat row-major view of the samples.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable flat row-major view of the samples.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Copy out the interior region defined by `geometry` as a
    /// `interior_width × interior_width` row-major vector.
    ///
    /// This is the read-back path for collaborators: only these cells carry
    /// defined results after a smoothing call.
    pub fn interior(&self, geometry: &GridGeometry) -> Vec<f32> {
        let k = geometry.kernel_offset();
        let interior = geometry.interior_width();
        let mut out = Vec::with_capacity(interior as usize * interior as usize);
        for y in k..k + interior {
            for x in k..k + interior {
                out.push(self.data[self.idx(x, y)]);
            }
        }
        out
    }

    /// Check that this field matches the geometry's grid width.
    pub fn check_shape(&self, geometry: &GridGeometry) -> Result<()> {
        if self.width != geometry.grid_width() {
            return Err(SmoothError::ShapeMismatch {
                expected: geometry.grid_width(),
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}
