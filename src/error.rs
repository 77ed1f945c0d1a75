//! Error types for the smoother.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SmoothError>;

/// Errors produced by geometry validation and backend execution.
#[derive(Error, Debug)]
pub enum SmoothError {
    /// Grid/kernel/tile geometry violates a precondition.
    ///
    /// Raised before any buffer is allocated; the operation never starts.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A field buffer does not match the configured grid width.
    #[error("Field shape mismatch: expected {expected}x{expected}, got {actual} elements")]
    ShapeMismatch {
        /// Configured grid side length.
        expected: u32,
        /// Actual element count of the offending buffer.
        actual: usize,
    },

    /// No usable accelerator was found.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Device buffer allocation failed.
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    /// Host/device copy failed.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Kernel launch or pipeline creation failed.
    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    /// Backend-specific failure that fits no other variant.
    #[error("Backend error: {0}")]
    BackendError(String),
}
