//! Owned, validated mesh implementation.

use std::collections::HashSet;

use tracing::instrument;

use crate::{
    error::MeshError,
    mesh::{MeshSource, Triangle, Vertex, VertexId},
};

/// A vertex table plus triangle list that satisfies the [`MeshSource`]
/// contract by construction.
///
/// # Examples
/// ```
/// use nalgebra::Point3;
/// use segmesh_core::{IndexedMesh, MeshSource, Triangle, TriangleId, Vertex, VertexId};
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
/// assert_eq!(mesh.name(), "quad");
/// assert_eq!(mesh.triangles().len(), 2);
/// # Ok::<(), segmesh_core::MeshError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMesh {
    name: String,
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
}

impl IndexedMesh {
    /// Validates and wraps a vertex table and triangle list.
    ///
    /// # Errors
    /// Returns [`MeshError::NonFinitePosition`] or
    /// [`MeshError::NonFiniteWeight`] for invalid vertex data,
    /// [`MeshError::UnknownVertex`] when a triangle references a missing
    /// vertex, [`MeshError::DegenerateTriangle`] when a triangle repeats a
    /// corner, and [`MeshError::DuplicateTriangle`] when ids collide.
    #[instrument(
        name = "mesh.validate",
        err,
        skip(name, vertices, triangles),
        fields(vertices = vertices.len(), triangles = triangles.len()),
    )]
    pub fn try_new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        triangles: Vec<Triangle>,
    ) -> Result<Self, MeshError> {
        for (index, vertex) in vertices.iter().enumerate() {
            let id = VertexId::new(u32::try_from(index).unwrap_or(u32::MAX));
            validate_vertex(id, vertex)?;
        }

        let mut seen = HashSet::with_capacity(triangles.len());
        for triangle in &triangles {
            for vertex in triangle.vertices() {
                if vertex.index() >= vertices.len() {
                    return Err(MeshError::UnknownVertex {
                        triangle: triangle.id(),
                        vertex,
                        vertex_count: vertices.len(),
                    });
                }
            }
            if triangle.is_degenerate() {
                return Err(MeshError::DegenerateTriangle {
                    triangle: triangle.id(),
                });
            }
            if !seen.insert(triangle.id()) {
                return Err(MeshError::DuplicateTriangle {
                    triangle: triangle.id(),
                });
            }
        }

        Ok(Self {
            name: name.into(),
            vertices,
            triangles,
        })
    }

    /// Returns the vertex table.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Consumes the mesh and returns its name, vertices, and triangles.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Vertex>, Vec<Triangle>) {
        (self.name, self.vertices, self.triangles)
    }
}

fn validate_vertex(id: VertexId, vertex: &Vertex) -> Result<(), MeshError> {
    if !vertex.position().coords.iter().all(|c| c.is_finite()) {
        return Err(MeshError::NonFinitePosition { vertex: id });
    }
    if let Some((group, _)) = vertex.weights().iter().find(|(_, w)| !w.is_finite()) {
        return Err(MeshError::NonFiniteWeight {
            vertex: id,
            group: *group,
        });
    }
    Ok(())
}

impl MeshSource for IndexedMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, id: VertexId) -> Result<&Vertex, MeshError> {
        self.vertices
            .get(id.index())
            .ok_or(MeshError::OutOfBounds { vertex: id })
    }
}
