//! Segmentation entry point.
//!
//! Provides [`Segmenter`], which builds the adjacency graph for a mesh, runs
//! the merge engine, and assembles the resulting partition.

use std::sync::{Arc, atomic::AtomicBool};

#[cfg(feature = "cpu")]
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    Result,
    error::{MeshError, SegmentationError},
    graph,
    merge::MergeEngine,
    mesh::MeshSource,
    params::SegmentationParams,
    result::Segmentation,
};

/// Runs greedy region-merging segmentation over triangle meshes.
///
/// A `Segmenter` holds validated parameters only; it can be shared across
/// threads and reused for any number of meshes.
///
/// # Examples
/// ```
/// use nalgebra::Point3;
/// use segmesh_core::{IndexedMesh, SegmenterBuilder, Triangle, TriangleId, Vertex, VertexId};
///
/// let mesh = IndexedMesh::try_new(
///     "quad",
///     vec![
///         Vertex::new(Point3::new(0.0, 0.0, 0.0)),
///         Vertex::new(Point3::new(1.0, 0.0, 0.0)),
///         Vertex::new(Point3::new(1.0, 1.0, 0.0)),
///         Vertex::new(Point3::new(0.0, 1.0, 0.0)),
///     ],
///     vec![
///         Triangle::new(TriangleId::new(0), [VertexId::new(0), VertexId::new(1), VertexId::new(2)]),
///         Triangle::new(TriangleId::new(1), [VertexId::new(0), VertexId::new(2), VertexId::new(3)]),
///     ],
/// )?;
/// let segmentation = SegmenterBuilder::new().build()?.segment(&mesh)?;
/// assert_eq!(segmentation.segments().len(), 1);
/// assert_eq!(segmentation.merge_count(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Segmenter {
    params: SegmentationParams,
}

impl Segmenter {
    pub(crate) fn new(params: SegmentationParams) -> Self {
        Self { params }
    }

    /// Returns the validated parameters.
    #[must_use]
    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }

    /// Segments the selected triangles of `mesh` to a fixed point (or until
    /// the configured merge budget is spent).
    ///
    /// # Errors
    /// Returns [`SegmentationError::Mesh`] when the mesh references a vertex
    /// it cannot resolve.
    pub fn segment<M: MeshSource + ?Sized>(&self, mesh: &M) -> Result<Segmentation> {
        self.segment_with_cancel(mesh, &AtomicBool::new(false))
    }

    /// Like [`Self::segment`], but polls `cancel` before every scan and
    /// returns the partition reached so far once it is set.
    ///
    /// # Errors
    /// Returns [`SegmentationError::Mesh`] when the mesh references a vertex
    /// it cannot resolve.
    ///
    /// # Examples
    /// ```
    /// use std::sync::atomic::AtomicBool;
    /// use segmesh_core::{IndexedMesh, SegmenterBuilder, Termination};
    ///
    /// let empty = IndexedMesh::try_new("empty", Vec::new(), Vec::new())?;
    /// let segmenter = SegmenterBuilder::new().build()?;
    /// let result = segmenter.segment_with_cancel(&empty, &AtomicBool::new(true))?;
    /// assert!(result.segments().is_empty());
    /// assert_eq!(result.termination(), Termination::FixedPoint);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[instrument(
        name = "core.segment",
        err,
        skip(self, mesh, cancel),
        fields(
            mesh = %mesh.name(),
            triangles = mesh.triangles().len(),
            selected = tracing::field::Empty,
        ),
    )]
    pub fn segment_with_cancel<M: MeshSource + ?Sized>(
        &self,
        mesh: &M,
        cancel: &AtomicBool,
    ) -> Result<Segmentation> {
        let selected = mesh.selected_count();
        tracing::Span::current().record("selected", selected);
        #[cfg(feature = "metrics")]
        metrics::counter!("segmentation_runs_total").increment(1);

        if selected == 0 {
            warn!(mesh = mesh.name(), "mesh has no selected triangles");
            return Ok(Segmentation::empty());
        }

        let graph = graph::build_graph(mesh, &self.params)
            .map_err(|error| wrap_mesh_error(mesh, error))?;
        let mut engine = MergeEngine::new(graph, &self.params);
        let termination = engine.run(cancel);
        let segmentation = Segmentation::assemble(&engine, termination);
        info!(
            segments = segmentation.segments().len(),
            merges = segmentation.merge_count(),
            remaining_contacts = segmentation.remaining_contacts().len(),
            termination = ?termination,
            "segmentation completed"
        );
        Ok(segmentation)
    }

    /// Segments independent meshes, returning results in input order.
    ///
    /// With the `cpu` feature the meshes are processed on the rayon pool;
    /// each mesh is still merged sequentially.
    ///
    /// # Examples
    /// ```
    /// use segmesh_core::{IndexedMesh, SegmenterBuilder};
    ///
    /// let meshes = vec![
    ///     IndexedMesh::try_new("a", Vec::new(), Vec::new())?,
    ///     IndexedMesh::try_new("b", Vec::new(), Vec::new())?,
    /// ];
    /// let results = SegmenterBuilder::new().build()?.segment_batch(&meshes);
    /// assert_eq!(results.len(), 2);
    /// assert!(results.iter().all(Result::is_ok));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn segment_batch<M: MeshSource + Sync>(&self, meshes: &[M]) -> Vec<Result<Segmentation>> {
        #[cfg(feature = "cpu")]
        {
            meshes.par_iter().map(|mesh| self.segment(mesh)).collect()
        }
        #[cfg(not(feature = "cpu"))]
        {
            meshes.iter().map(|mesh| self.segment(mesh)).collect()
        }
    }
}

fn wrap_mesh_error<M: MeshSource + ?Sized>(mesh: &M, error: MeshError) -> SegmentationError {
    SegmentationError::Mesh {
        mesh: Arc::from(mesh.name()),
        error,
    }
}
