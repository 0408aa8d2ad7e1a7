//! JSON mesh documents accepted by `segmesh run`.
//!
//! A document lists vertices and triangles:
//!
//! ```json
//! {
//!   "vertices": [{ "position": [0, 0, 0], "weights": [[1, 0.5]] }],
//!   "triangles": [{ "id": 0, "vertices": [0, 1, 2], "material": 2, "sharp": [false, true, false] }]
//! }
//! ```
//!
//! Omitted triangle fields default to selected, material `0`, and no edge
//! markings; omitted weights default to none.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use nalgebra::Point3;
use segmesh_core::{
    EdgeFlags, GroupId, IndexedMesh, MaterialIndex, MeshError, Triangle, TriangleId, Vertex,
    VertexId,
};
use serde::Deserialize;
use tracing::{Span, field, instrument};

use super::commands::CliError;

/// Top-level mesh document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshDocument {
    /// Vertex table; triangles index into it.
    pub vertices: Vec<VertexRecord>,
    /// Triangle list.
    pub triangles: Vec<TriangleRecord>,
}

/// One vertex of a [`MeshDocument`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VertexRecord {
    /// Position as `[x, y, z]`.
    pub position: [f64; 3],
    /// `(group, weight)` pairs.
    #[serde(default)]
    pub weights: Vec<(u32, f64)>,
}

/// One triangle of a [`MeshDocument`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriangleRecord {
    /// Caller-stable triangle id.
    pub id: u64,
    /// Corner vertex indices.
    pub vertices: [u32; 3],
    /// Whether the triangle takes part in segmentation.
    #[serde(default = "selected_by_default")]
    pub selected: bool,
    /// Material slot.
    #[serde(default)]
    pub material: u32,
    /// Sharp markings for edges `v0-v1`, `v1-v2`, `v2-v0`.
    #[serde(default)]
    pub sharp: [bool; 3],
    /// Seam markings, in the same edge order as `sharp`.
    #[serde(default)]
    pub seam: [bool; 3],
}

const fn selected_by_default() -> bool {
    true
}

impl MeshDocument {
    /// Converts the document into a validated [`IndexedMesh`].
    ///
    /// # Errors
    /// Returns the [`MeshError`] raised by [`IndexedMesh::try_new`].
    pub fn into_mesh(self, name: impl Into<String>) -> Result<IndexedMesh, MeshError> {
        let vertices = self
            .vertices
            .into_iter()
            .map(|record| {
                let [x, y, z] = record.position;
                record
                    .weights
                    .into_iter()
                    .fold(Vertex::new(Point3::new(x, y, z)), |vertex, (group, weight)| {
                        vertex.with_weight(GroupId::new(group), weight)
                    })
            })
            .collect();
        let triangles = self.triangles.into_iter().map(TriangleRecord::into_triangle).collect();
        IndexedMesh::try_new(name, vertices, triangles)
    }
}

impl TriangleRecord {
    fn into_triangle(self) -> Triangle {
        let triangle = Triangle::new(TriangleId::new(self.id), self.vertices.map(VertexId::new))
            .with_selected(self.selected)
            .with_material(MaterialIndex::new(self.material));
        (0..3).fold(triangle, |triangle, edge| {
            triangle.with_edge_flags(edge, EdgeFlags::new(self.sharp[edge], self.seam[edge]))
        })
    }
}

/// Reads and validates the mesh document at `path`.
///
/// # Errors
/// Returns [`CliError::Io`] when the file cannot be opened,
/// [`CliError::Parse`] for malformed JSON, and [`CliError::Mesh`] when the
/// geometry fails validation.
#[instrument(name = "cli.load_mesh", err, skip(name), fields(path = field::Empty))]
pub fn load_mesh(path: &Path, name: String) -> Result<IndexedMesh, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: MeshDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::Parse {
            path: PathBuf::from(path),
            source,
        })?;
    Ok(document.into_mesh(name)?)
}
