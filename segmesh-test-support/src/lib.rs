//! Shared test utilities used across segmesh crates.

pub mod ci;
pub mod tracing;
