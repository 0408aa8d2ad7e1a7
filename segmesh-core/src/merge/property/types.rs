//! Fixture types for merge-engine property tests.

use test_strategy::Arbitrary;

use crate::{indexed::IndexedMesh, params::SegmentationParams};

/// Kind of mesh produced by [`MergeFixture`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(super) enum MeshShape {
    /// Planar grid; every contact costs nothing.
    #[weight(1)]
    Flat,
    /// Grid with random vertex heights, so face angles vary.
    #[weight(3)]
    Rolling,
    /// Planar grid with random materials and sharp edges.
    #[weight(3)]
    Patchwork,
    /// Planar grid whose vertices carry random group weights.
    #[weight(2)]
    Weighted,
    /// Rolling grid with part of the triangles deselected.
    #[weight(2)]
    Holey,
}

/// A generated mesh and the parameters it is segmented with.
#[derive(Clone, Debug)]
pub(super) struct MergeFixture {
    pub mesh: IndexedMesh,
    pub params: SegmentationParams,
    pub shape: MeshShape,
}
