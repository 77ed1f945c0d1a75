//! Brute-force windowed-average reference.
//!
//! A single-pass, non-tiled implementation of the same smoothing semantics,
//! used as a correctness oracle for the tiled backends: any off-by-one or
//! double-counted halo read shows up as a mismatch near tile boundaries.

use crate::field::Field;
use crate::geometry::GridGeometry;

/// Smooth `input` with a plain nested-loop window average.
///
/// Accumulation order matches the tiled kernels (window row outer, column
/// inner, one division after full accumulation), so results are bit-identical
/// to the tiled paths, not merely close. Cells outside the interior region
/// are left at zero.
pub fn smooth_reference(input: &Field, geometry: &GridGeometry) -> Field {
    let grid = geometry.grid_width();
    let kernel = geometry.kernel_width();
    let koffset = geometry.kernel_offset();
    let norm = (kernel * kernel) as f32;

    let mut output = Field::new(grid);
    for y in koffset..grid - koffset {
        for x in koffset..grid - koffset {
            let mut sum = 0.0f32;
            for j in 0..kernel {
                for i in 0..kernel {
                    let sx = x - koffset + i;
                    let sy = y - koffset + j;
                    sum += input.get(sx, sy).unwrap_or(0.0);
                }
            }
            output.set(x, y, sum / norm);
        }
    }
    output
}
