//! Strategy builders for merge-engine property tests.
//!
//! Every fixture is a quad grid of at most [`MAX_SIDE`] cells per side,
//! small enough for the engine's per-merge consistency checks to stay cheap.

use nalgebra::Point3;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{
    indexed::IndexedMesh,
    mesh::{EdgeFlags, GroupId, MaterialIndex, Triangle, Vertex},
    params::{CostFactors, SegmentationParams},
    test_utils::{grid_triangles, grid_vertices},
};

use super::types::{MergeFixture, MeshShape};

/// Largest grid side length.
const MAX_SIDE: u32 = 5;
/// Number of material slots used by patchwork meshes.
const MATERIALS: u32 = 3;
/// Number of vertex groups used by weighted meshes.
const GROUPS: u32 = 3;

pub(super) fn merge_fixture_strategy() -> impl Strategy<Value = MergeFixture> {
    (any::<MeshShape>(), any::<u64>()).prop_map(|(shape, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_fixture(shape, &mut rng)
    })
}

/// Generates a fixture for a specific shape.
pub(super) fn generate_fixture(shape: MeshShape, rng: &mut SmallRng) -> MergeFixture {
    let cols = rng.gen_range(1..=MAX_SIDE);
    let rows = rng.gen_range(1..=MAX_SIDE);
    let mut vertices = grid_vertices(cols, rows);
    let mut triangles = grid_triangles(cols, rows);

    match shape {
        MeshShape::Flat => {}
        MeshShape::Rolling => vertices = lift(vertices, rng),
        MeshShape::Patchwork => triangles = paint(triangles, rng),
        MeshShape::Weighted => vertices = weigh(vertices, rng),
        MeshShape::Holey => {
            vertices = lift(vertices, rng);
            triangles = triangles
                .into_iter()
                .map(|triangle| triangle.with_selected(rng.gen_bool(0.7)))
                .collect();
        }
    }

    let mesh = IndexedMesh::try_new("property", vertices, triangles)
        .expect("grid fixtures must validate");
    MergeFixture {
        mesh,
        params: random_params(rng),
        shape,
    }
}

fn lift(vertices: Vec<Vertex>, rng: &mut SmallRng) -> Vec<Vertex> {
    vertices
        .into_iter()
        .map(|vertex| {
            let position = vertex.position();
            Vertex::new(Point3::new(position.x, position.y, rng.gen_range(0.0..0.8)))
        })
        .collect()
}

fn paint(triangles: Vec<Triangle>, rng: &mut SmallRng) -> Vec<Triangle> {
    triangles
        .into_iter()
        .map(|triangle| {
            let triangle = triangle.with_material(MaterialIndex::new(rng.gen_range(0..MATERIALS)));
            if rng.gen_bool(0.2) {
                triangle.with_edge_flags(rng.gen_range(0..3), EdgeFlags::new(true, false))
            } else {
                triangle
            }
        })
        .collect()
}

fn weigh(vertices: Vec<Vertex>, rng: &mut SmallRng) -> Vec<Vertex> {
    vertices
        .into_iter()
        .map(|vertex| {
            let group = GroupId::new(rng.gen_range(0..GROUPS));
            vertex.with_weight(group, rng.gen_range(0.0..1.0))
        })
        .collect()
}

fn random_params(rng: &mut SmallRng) -> SegmentationParams {
    let maximum_area_threshold = match rng.gen_range(0..3) {
        0 => f64::INFINITY,
        1 => rng.gen_range(0.5..4.0),
        _ => 0.0,
    };
    let minimum_area_threshold = if rng.gen_bool(0.3) {
        rng.gen_range(0.0..1.0)
    } else {
        0.0
    };
    let perimeter_cost_factor = if rng.gen_bool(0.3) {
        rng.gen_range(0.0..1.0)
    } else {
        0.0
    };
    let factors = CostFactors::zero()
        .with_face_angle(1.0)
        .with_material_change(1.0)
        .with_vertex_group_weight(rng.gen_range(0.0..2.0))
        .with_vertex_group_change(if rng.gen_bool(0.5) { 1.0 } else { 0.0 })
        .with_edge_sharp(rng.gen_range(0.0..2.0));

    SegmentationParams {
        cost_threshold: rng.gen_range(0.0..2.0),
        maximum_area_threshold,
        minimum_area_threshold,
        contact_length_factor: if rng.gen_bool(0.8) { 1.0 } else { 0.0 },
        perimeter_cost_factor,
        factors,
        ..SegmentationParams::default()
    }
}
