//! Grid, window, and tile geometry.
//!
//! All sizing for one smoothing call derives from three side lengths: the
//! square field (`grid_width`), the square averaging window (`kernel_width`),
//! and the square tile of output elements computed cooperatively by one
//! workgroup (`tile_width`). The geometry is validated once, up front, so the
//! kernels themselves never bounds-check against the grid.

use crate::error::{Result, SmoothError};

/// Validated geometry for one smoothing call.
///
/// Invariants (enforced by [`GridGeometry::new`]):
/// - `kernel_width` is odd, so the window has a well-defined center offset.
/// - The interior side length `grid_width - (kernel_width - 1)` is evenly
///   divisible by `tile_width`, so every tile is full and no kernel-side
///   partial-tile handling exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    grid_width: u32,
    kernel_width: u32,
    tile_width: u32,
}

impl GridGeometry {
    /// Validate and construct a geometry.
    ///
    /// Fails eagerly, before any buffer is touched, if a precondition is
    /// violated.
    pub fn new(grid_width: u32, kernel_width: u32, tile_width: u32) -> Result<Self> {
        if grid_width == 0 || kernel_width == 0 || tile_width == 0 {
            return Err(SmoothError::InvalidGeometry(
                "grid, kernel, and tile widths must be non-zero".to_string(),
            ));
        }
        if kernel_width % 2 == 0 {
            return Err(SmoothError::InvalidGeometry(format!(
                "kernel width {kernel_width} must be odd"
            )));
        }
        if kernel_width > grid_width {
            return Err(SmoothError::InvalidGeometry(format!(
                "kernel width {kernel_width} exceeds grid width {grid_width}"
            )));
        }
        let interior = grid_width - (kernel_width - 1);
        if interior % tile_width != 0 {
            return Err(SmoothError::InvalidGeometry(format!(
                "interior width {interior} is not divisible by tile width {tile_width}"
            )));
        }
        Ok(Self {
            grid_width,
            kernel_width,
            tile_width,
        })
    }

    /// Side length of the square field.
    pub fn grid_width(&self) -> u32 {
        self.grid_width
    }

    /// Side length of the square averaging window.
    pub fn kernel_width(&self) -> u32 {
        self.kernel_width
    }

    /// Side length of one output tile.
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Offset from a window's corner to its center.
    pub fn kernel_offset(&self) -> u32 {
        (self.kernel_width - 1) / 2
    }

    /// Side length of the interior region, the only region with defined
    /// output.
    pub fn interior_width(&self) -> u32 {
        self.grid_width - (self.kernel_width - 1)
    }

    /// Number of tiles launched per axis.
    pub fn tiles_per_axis(&self) -> u32 {
        self.interior_width() / self.tile_width
    }

    /// Side length of the per-tile staging buffer: the tile itself plus the
    /// halo needed by windows near the tile edge.
    pub fn staged_width(&self) -> u32 {
        self.tile_width + self.kernel_width - 1
    }

    /// Element count of the per-tile staging buffer.
    pub fn staged_slots(&self) -> u32 {
        self.staged_width() * self.staged_width()
    }

    /// Number of elements in one full field.
    pub fn field_len(&self) -> usize {
        self.grid_width as usize * self.grid_width as usize
    }

    /// True if `(x, y)` lies in the interior region.
    pub fn contains_interior(&self, x: u32, y: u32) -> bool {
        let k = self.kernel_offset();
        x >= k && y >= k && x < self.grid_width - k && y < self.grid_width - k
    }
}
