//! Property-based tests for the merge engine.
//!
//! Generates small quad-grid meshes with varied geometry, materials, vertex
//! weights, and selections, then checks that every run yields a complete,
//! disjoint partition that respects the area guard, stops at a genuine fixed
//! point, and is reproducible.

mod invariants;
mod strategies;
mod types;
