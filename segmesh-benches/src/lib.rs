//! Benchmark support crate for segmesh.
//!
//! Provides seeded synthetic meshes and parameter types used by the Criterion
//! segmentation benchmarks.

pub mod error;
pub mod grid;
pub mod params;
