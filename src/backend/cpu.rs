//! CPU emulation of the tiled device kernel.
//!
//! Runs the identical two-phase protocol the device shader runs: each tile
//! stages its elements plus halo into a scratch buffer via the strided
//! cooperative coverage rule, then reduces every window out of that staging
//! buffer. The
//! phase boundary between staging and reduction stands in for the device
//! barrier; tiles themselves are independent and run in parallel under
//! rayon. Staging goes through pitched buffers so the address arithmetic
//! matches the device path element for element.

use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::field::Field;
use crate::geometry::GridGeometry;
use crate::memory::PitchedBuffer;
use crate::timing::SmoothTimings;

use super::SmoothBackend;

/// Always-available backend that emulates the device protocol on the host.
#[derive(Debug, Default)]
pub struct CpuBackend;

impl CpuBackend {
    /// Create a CPU backend.
    pub fn new() -> Self {
        Self
    }
}

/// Output of one tile: its origin within the interior region and its
/// `tile_width × tile_width` averaged values.
struct TileResult {
    block_x: u32,
    block_y: u32,
    values: Vec<f32>,
}

/// Run both kernel phases for the tile at block coordinate `(bx, by)`.
fn run_tile(input: &PitchedBuffer, geometry: &GridGeometry, bx: u32, by: u32) -> TileResult {
    let tile = geometry.tile_width();
    let kernel = geometry.kernel_width();
    let staged_width = geometry.staged_width() as usize;
    let origin_x = bx * tile;
    let origin_y = by * tile;

    // Phase 1: cooperative staging. Worker (tx, ty) strides across the
    // staging buffer in tile_width steps, covering its own element plus
    // every halo slot congruent to it modulo the tile width. Each staged
    // slot therefore has exactly one writer, and the halo is fully covered
    // even when it is wider than the tile.
    let mut staged = vec![0.0f32; geometry.staged_slots() as usize];
    for ty in 0..tile {
        for tx in 0..tile {
            let mut sy = ty;
            while sy < staged_width as u32 {
                let mut sx = tx;
                while sx < staged_width as u32 {
                    staged[sy as usize * staged_width + sx as usize] =
                        input.as_slice()[input.idx(origin_x + sx, origin_y + sy)];
                    sx += tile;
                }
                sy += tile;
            }
        }
    }

    // Barrier: staging is complete before any reduction begins.

    // Phase 2: window reduction. Row-major accumulation over the window,
    // one division after the full sum.
    let norm = (kernel * kernel) as f32;
    let mut values = vec![0.0f32; (tile * tile) as usize];
    for ty in 0..tile {
        for tx in 0..tile {
            let mut sum = 0.0f32;
            for j in 0..kernel {
                for i in 0..kernel {
                    sum += staged[(ty + j) as usize * staged_width + (tx + i) as usize];
                }
            }
            values[(ty * tile + tx) as usize] = sum / norm;
        }
    }

    TileResult {
        block_x: bx,
        block_y: by,
        values,
    }
}

impl SmoothBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn smooth(
        &self,
        input: &Field,
        output: &mut Field,
        geometry: &GridGeometry,
    ) -> Result<SmoothTimings> {
        input.check_shape(geometry)?;
        output.check_shape(geometry)?;

        let grid = geometry.grid_width();
        let koffset = geometry.kernel_offset();
        let tile = geometry.tile_width();
        let tiles = geometry.tiles_per_axis();

        // Allocation plus transfer-in.
        let transfer_start = Instant::now();
        let mut staged_in = PitchedBuffer::new(grid);
        let mut staged_out = PitchedBuffer::new(grid);
        staged_in.copy_from_field(input);
        let transfer = transfer_start.elapsed();

        // Kernel execution: one launch covering tiles_per_axis² independent
        // tiles, then the blocking drain of the interior region.
        let compute_start = Instant::now();
        let results: Vec<TileResult> = (0..tiles * tiles)
            .into_par_iter()
            .map(|block| run_tile(&staged_in, geometry, block % tiles, block / tiles))
            .collect();

        for result in &results {
            let out_x = result.block_x * tile + koffset;
            let out_y = result.block_y * tile + koffset;
            for ty in 0..tile {
                let row_start = staged_out.idx(out_x, out_y + ty);
                let src_start = (ty * tile) as usize;
                staged_out.as_mut_slice()[row_start..row_start + tile as usize]
                    .copy_from_slice(&result.values[src_start..src_start + tile as usize]);
            }
        }

        let interior = geometry.interior_width();
        staged_out.copy_region_to_field(koffset, koffset, interior, interior, output);
        let compute = compute_start.elapsed();

        let timings = SmoothTimings { transfer, compute };
        debug!(
            backend = self.name(),
            grid,
            kernel = geometry.kernel_width(),
            tile,
            %timings,
            "smoothing complete"
        );
        Ok(timings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::smooth_reference;

    #[test]
    fn matches_reference_across_tile_boundaries() {
        let geom = GridGeometry::new(20, 5, 4).unwrap();
        let input = Field::from_fn(20, |x, y| ((x * 7 + y * 13) % 17) as f32);
        let expected = smooth_reference(&input, &geom);

        let mut output = Field::new(20);
        CpuBackend::new().smooth(&input, &mut output, &geom).unwrap();

        let koffset = geom.kernel_offset();
        for y in koffset..20 - koffset {
            for x in koffset..20 - koffset {
                assert_eq!(
                    output.get(x, y),
                    expected.get(x, y),
                    "mismatch at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn narrow_tile_matches_reference() {
        // Tile narrower than the halo: staging must stride past
        // 2 * tile_width to cover the full window.
        let geom = GridGeometry::new(10, 5, 2).unwrap();
        let input = Field::from_fn(10, |x, y| ((x * 3 + y * 11) % 7) as f32);
        let expected = smooth_reference(&input, &geom);

        let mut output = Field::new(10);
        CpuBackend::new().smooth(&input, &mut output, &geom).unwrap();

        for y in 2..8 {
            for x in 2..8 {
                assert_eq!(
                    output.get(x, y),
                    expected.get(x, y),
                    "mismatch at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn single_tile_geometry() {
        let geom = GridGeometry::new(6, 3, 4).unwrap();
        let input = Field::constant(6, 2.5);
        let mut output = Field::new(6);
        CpuBackend::new().smooth(&input, &mut output, &geom).unwrap();
        for y in 1..5 {
            for x in 1..5 {
                assert_eq!(output.get(x, y), Some(2.5));
            }
        }
    }

    #[test]
    fn rejects_mismatched_field() {
        let geom = GridGeometry::new(10, 3, 4).unwrap();
        let input = Field::new(8);
        let mut output = Field::new(10);
        assert!(CpuBackend::new()
            .smooth(&input, &mut output, &geom)
            .is_err());
    }
}
