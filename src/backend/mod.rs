//! Backend abstraction and implementations.
//!
//! One trait seam separates the host-side contract (validate, stage, launch,
//! drain, time) from how a backend actually runs the tiled kernel. The CPU
//! backend emulates the device protocol faithfully and is always available;
//! the wgpu backend runs the same kernel as a compute shader on whatever
//! adapter the platform offers.

mod cpu;

#[cfg(feature = "wgpu")]
pub mod wgpu;

pub use cpu::CpuBackend;

#[cfg(feature = "wgpu")]
pub use self::wgpu::WgpuBackend;

use crate::error::Result;
use crate::field::Field;
use crate::geometry::GridGeometry;
use crate::timing::SmoothTimings;

/// A compute backend capable of running the tiled smoothing kernel.
///
/// Implementations own the full host-orchestration sequence for one call:
/// allocate pitched device buffers, upload the input field, launch one
/// kernel instance per output tile, block until complete, and copy the
/// interior region back into `output`. Geometry and field shapes are
/// validated before any resource is allocated.
pub trait SmoothBackend {
    /// Human-readable backend name, for logs and reports.
    fn name(&self) -> &str;

    /// Smooth `input` into the interior region of `output`.
    ///
    /// On success, every interior cell of `output` holds the window average
    /// and every non-interior cell is untouched. Returns the per-phase
    /// timings.
    fn smooth(
        &self,
        input: &Field,
        output: &mut Field,
        geometry: &GridGeometry,
    ) -> Result<SmoothTimings>;
}
