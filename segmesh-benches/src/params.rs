//! Benchmark parameter types.

use std::fmt;

/// Parameters for a segmentation benchmark run.
#[derive(Clone, Debug)]
pub struct SegmentBenchParams {
    /// Quads along each side of the grid.
    pub side: usize,
    /// Number of selected triangles.
    pub triangle_count: usize,
}

impl fmt::Display for SegmentBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "side={},n={}", self.side, self.triangle_count)
    }
}
