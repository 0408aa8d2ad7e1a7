//! Benchmark setup error type.
//!
//! Setup helpers propagate failures with `?` instead of using `.expect()`.

use segmesh_core::{MeshError, SegmentationError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// The synthetic mesh failed validation.
    #[error("synthetic mesh is invalid: {0}")]
    Mesh(#[from] MeshError),
    /// Segmenter configuration was rejected.
    #[error("segmenter configuration failed: {0}")]
    Segmentation(#[from] SegmentationError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// A description of the parameter that was unexpectedly zero.
        context: &'static str,
    },
    /// The requested grid does not fit the vertex index space.
    #[error("grid side {side} exceeds the supported vertex range")]
    GridTooLarge {
        /// Requested number of quads along each axis.
        side: usize,
    },
}
