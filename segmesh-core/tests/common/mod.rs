use nalgebra::Point3;
use segmesh_core::{IndexedMesh, MeshError, MeshSource, Triangle, TriangleId, Vertex, VertexId};

/// A flat `cols x rows` grid of unit quads, two triangles per quad.
#[must_use]
pub fn grid(cols: u32, rows: u32) -> IndexedMesh {
    grid_with(cols, rows, |triangle| triangle)
}

/// Like [`grid`], with `edit` applied to every triangle.
#[must_use]
pub fn grid_with(cols: u32, rows: u32, edit: impl Fn(Triangle) -> Triangle) -> IndexedMesh {
    let stride = cols + 1;
    let vertices = (0..=rows)
        .flat_map(|y| {
            (0..=cols).map(move |x| Vertex::new(Point3::new(f64::from(x), f64::from(y), 0.0)))
        })
        .collect();
    let mut triangles = Vec::new();
    for y in 0..rows {
        for x in 0..cols {
            let base = y * stride + x;
            let next = triangles.len() as u64;
            triangles.push(edit(Triangle::new(
                TriangleId::new(next),
                [base, base + 1, base + stride + 1].map(VertexId::new),
            )));
            triangles.push(edit(Triangle::new(
                TriangleId::new(next + 1),
                [base, base + stride + 1, base + stride].map(VertexId::new),
            )));
        }
    }
    IndexedMesh::try_new("grid", vertices, triangles).expect("grid fixture must validate")
}

/// Mesh source whose only triangle points past the vertex table.
pub struct Dangling {
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
}

impl Default for Dangling {
    fn default() -> Self {
        Self {
            vertices: vec![
                Vertex::new(Point3::new(0.0, 0.0, 0.0)),
                Vertex::new(Point3::new(1.0, 0.0, 0.0)),
            ],
            triangles: vec![Triangle::new(
                TriangleId::new(0),
                [0, 1, 2].map(VertexId::new),
            )],
        }
    }
}

impl MeshSource for Dangling {
    fn name(&self) -> &str {
        "dangling"
    }

    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, id: VertexId) -> Result<&Vertex, MeshError> {
        self.vertices
            .get(id.get() as usize)
            .ok_or(MeshError::OutOfBounds { vertex: id })
    }
}
