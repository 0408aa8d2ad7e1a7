//! Shared test utilities for `segmesh-core`.

use nalgebra::Point3;
use proptest::test_runner::Config as ProptestConfig;
use segmesh_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{
    indexed::IndexedMesh,
    mesh::{Triangle, TriangleId, Vertex, VertexId},
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// Every suite honours the same `SEGMESH_PBT_*` overrides.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        max_shrink_iters: profile.max_shrink_iters(),
        ..ProptestConfig::default()
    }
}

/// Vertices of a `cols x rows` grid of unit quads in the `z = 0` plane.
pub(crate) fn grid_vertices(cols: u32, rows: u32) -> Vec<Vertex> {
    (0..=rows)
        .flat_map(|y| {
            (0..=cols).map(move |x| Vertex::new(Point3::new(f64::from(x), f64::from(y), 0.0)))
        })
        .collect()
}

/// Triangles of a `cols x rows` quad grid, two per quad, ids in row-major
/// order starting at zero.
pub(crate) fn grid_triangles(cols: u32, rows: u32) -> Vec<Triangle> {
    let stride = cols + 1;
    let mut triangles = Vec::new();
    for y in 0..rows {
        for x in 0..cols {
            let base = y * stride + x;
            let [a, b, c, d] = [base, base + 1, base + stride + 1, base + stride];
            let next = triangles.len() as u64;
            triangles.push(Triangle::new(
                TriangleId::new(next),
                [VertexId::new(a), VertexId::new(b), VertexId::new(c)],
            ));
            triangles.push(Triangle::new(
                TriangleId::new(next + 1),
                [VertexId::new(a), VertexId::new(c), VertexId::new(d)],
            ));
        }
    }
    triangles
}

/// A flat `cols x rows` quad grid with default triangle attributes.
pub(crate) fn flat_grid(cols: u32, rows: u32) -> IndexedMesh {
    IndexedMesh::try_new("grid", grid_vertices(cols, rows), grid_triangles(cols, rows))
        .expect("grid fixture must validate")
}
