//! Seeded noisy grid meshes.
//!
//! A grid of `side x side` unit quads, two triangles per quad, with jittered
//! heights, scattered material patches, and a single vertex-group weight
//! channel. The same configuration always yields the same mesh.

use nalgebra::Point3;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use segmesh_core::{
    GroupId, IndexedMesh, MaterialIndex, Triangle, TriangleId, Vertex, VertexId,
};

use crate::error::BenchSetupError;

/// Configuration for [`noisy_grid`].
#[derive(Clone, Debug)]
pub struct NoisyGridConfig {
    /// Quads along each axis.
    pub side: usize,
    /// Upper bound of the random vertex height.
    pub amplitude: f64,
    /// Number of distinct materials scattered over the quads.
    pub materials: u32,
    /// Seed for the deterministic RNG.
    pub seed: u64,
}

impl NoisyGridConfig {
    /// Defaults used by the benches for a grid of the given side.
    #[must_use]
    pub const fn with_side(side: usize) -> Self {
        Self {
            side,
            amplitude: 0.25,
            materials: 4,
            seed: 42,
        }
    }
}

/// Probability that a quad leaves the base material.
const MATERIAL_SCATTER: f64 = 0.1;

/// Builds a seeded noisy grid mesh.
///
/// # Errors
/// Returns [`BenchSetupError::ZeroValue`] when `side` or `materials` is zero,
/// [`BenchSetupError::GridTooLarge`] when the vertex count overflows `u32`,
/// and [`BenchSetupError::Mesh`] if the generated mesh fails validation.
///
/// # Examples
/// ```
/// use segmesh_benches::grid::{NoisyGridConfig, noisy_grid};
/// use segmesh_core::MeshSource;
///
/// let mesh = noisy_grid(&NoisyGridConfig::with_side(4)).expect("valid grid");
/// assert_eq!(mesh.triangles().len(), 32);
/// ```
pub fn noisy_grid(config: &NoisyGridConfig) -> Result<IndexedMesh, BenchSetupError> {
    if config.side == 0 {
        return Err(BenchSetupError::ZeroValue { context: "side" });
    }
    if config.materials == 0 {
        return Err(BenchSetupError::ZeroValue {
            context: "materials",
        });
    }
    let side = u32::try_from(config.side)
        .ok()
        .filter(|side| side.checked_add(1).and_then(|n| n.checked_mul(n)).is_some())
        .ok_or(BenchSetupError::GridTooLarge { side: config.side })?;

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let vertices = grid_vertices(side, config.amplitude, &mut rng);
    let triangles = grid_triangles(side, config.materials, &mut rng);
    Ok(IndexedMesh::try_new(
        format!("noisy-grid-{side}"),
        vertices,
        triangles,
    )?)
}

fn grid_vertices(side: u32, amplitude: f64, rng: &mut SmallRng) -> Vec<Vertex> {
    let group = GroupId::new(0);
    (0..=side)
        .flat_map(|y| (0..=side).map(move |x| (x, y)))
        .map(|(x, y)| {
            let height = if amplitude > 0.0 {
                rng.gen_range(0.0..amplitude)
            } else {
                0.0
            };
            Vertex::new(Point3::new(f64::from(x), f64::from(y), height))
                .with_weight(group, rng.gen_range(0.0..1.0))
        })
        .collect()
}

fn grid_triangles(side: u32, materials: u32, rng: &mut SmallRng) -> Vec<Triangle> {
    let stride = side + 1;
    let mut triangles = Vec::new();
    let mut next_id = 0_u64;
    for y in 0..side {
        for x in 0..side {
            let base = y * stride + x;
            let material = if materials > 1 && rng.gen_bool(MATERIAL_SCATTER) {
                MaterialIndex::new(rng.gen_range(1..materials))
            } else {
                MaterialIndex::new(0)
            };
            for corners in [
                [base, base + 1, base + stride + 1],
                [base, base + stride + 1, base + stride],
            ] {
                triangles.push(
                    Triangle::new(TriangleId::new(next_id), corners.map(VertexId::new))
                        .with_material(material),
                );
                next_id += 1;
            }
        }
    }
    triangles
}
