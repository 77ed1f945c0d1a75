//! Phase timing for one smoothing call.

use std::fmt;
use std::time::Duration;

/// Elapsed wall-clock time for the two phases of a smoothing call.
///
/// `transfer` covers device allocation plus the host-to-device upload;
/// `compute` covers the kernel launch through the blocking device-to-host
/// readback. The two intervals are reported separately so transfer overhead
/// and stencil throughput can be judged independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothTimings {
    /// Allocation plus transfer-in interval.
    pub transfer: Duration,
    /// Kernel execution plus readback interval.
    pub compute: Duration,
}

impl SmoothTimings {
    /// Total elapsed time across both phases.
    pub fn total(&self) -> Duration {
        self.transfer + self.compute
    }
}

fn write_interval(f: &mut fmt::Formatter<'_>, label: &str, d: Duration) -> fmt::Result {
    write!(f, "{label}: {}.{:06} s", d.as_secs(), d.subsec_micros())
}

impl fmt::Display for SmoothTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_interval(f, "transfer", self.transfer)?;
        write!(f, ", ")?;
        write_interval(f, "compute", self.compute)
    }
}
