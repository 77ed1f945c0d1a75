//! # tilesmooth
//!
//! Tiled 2D nearest-neighbor (box) kernel smoother.
//!
//! For each interior cell of a dense square grid, the smoother replaces the
//! value with the mean of a `kernel_width × kernel_width` window centered on
//! that cell. Boundary cells whose window would fall outside the grid are
//! never computed. The compute-bound stencil pass is offloaded to a tiled
//! kernel: every output tile cooperatively stages its elements plus a halo
//! into fast per-tile storage, synchronizes, then reduces each window out
//! of that staging buffer without re-reading main memory per element.
//!
//! Two backends implement the same kernel protocol:
//!
//! - [`CpuBackend`] emulates the device protocol on the host (rayon across
//!   tiles) and is always available.
//! - [`WgpuBackend`] runs it as a WGSL compute shader with workgroup storage
//!   and a workgroup barrier (feature `wgpu`, enabled by default).
//!
//! ## Example
//!
//! ```
//! use tilesmooth::{smooth, Field, GridGeometry};
//!
//! let geometry = GridGeometry::new(10, 3, 4).unwrap();
//! let input = Field::from_fn(10, |x, y| (x + y) as f32);
//! let mut output = Field::new(10);
//!
//! let timings = smooth(&input, &mut output, &geometry).unwrap();
//! println!("{timings}");
//!
//! // The mean of a linear ramp over a symmetric window is the center value.
//! assert_eq!(output.get(4, 4), Some(8.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod field;
pub mod geometry;
pub mod memory;
pub mod reference;
pub mod timing;

pub use backend::{CpuBackend, SmoothBackend};
pub use error::{Result, SmoothError};
pub use field::Field;
pub use geometry::GridGeometry;
pub use timing::SmoothTimings;

#[cfg(feature = "wgpu")]
pub use backend::WgpuBackend;

/// Smooth `input` into the interior region of `output` on the CPU backend.
///
/// Convenience entry point for callers that do not manage a backend
/// themselves; equivalent to `CpuBackend::new().smooth(...)`.
pub fn smooth(
    input: &Field,
    output: &mut Field,
    geometry: &GridGeometry,
) -> Result<SmoothTimings> {
    CpuBackend::new().smooth(input, output, geometry)
}
