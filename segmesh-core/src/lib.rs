//! Segmesh core library.
//!
//! Partitions the selected triangles of a mesh into segments by greedy,
//! cost-driven region merging: neighbouring triangles whose shared edges are
//! cheap to cross (flat, same material, similar vertex-group weights, no
//! sharp or seam markings) are merged first, until no contact within the cost
//! threshold remains.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod cost;
mod error;
mod graph;
mod indexed;
mod merge;
mod mesh;
mod pair;
mod palette;
mod params;
mod queue;
mod result;
mod segmenter;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    builder::SegmenterBuilder,
    error::{MeshError, MeshErrorCode, Result, SegmentationError, SegmentationErrorCode},
    indexed::IndexedMesh,
    mesh::{EdgeFlags, GroupId, MaterialIndex, MeshSource, Triangle, TriangleId, Vertex, VertexId},
    palette::{PALETTE_LEN, Rgba, assign_colors, palette, triangle_colors},
    params::{CostFactors, SegmentationParams},
    result::{ContactSummary, Segment, Segmentation, Termination},
    segmenter::Segmenter,
};
