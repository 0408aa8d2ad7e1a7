//! Contact cost model.
//!
//! A contact between two triangles is scored by six independently weighted
//! terms, each proportional to the shared edge length `L`:
//!
//! - vertex-group weight: mean per-group weight difference between the edge
//!   endpoints and each triangle's far corner;
//! - vertex-group change: `L` when the triangles' heaviest groups differ;
//! - face angle: `L` scaled by the dihedral normal angle over a right angle;
//! - material change: `L` when the material slots differ;
//! - sharp and seam: `L` when the edge carries the marking.
//!
//! The weighted sum is the contact's raw cost. [`normalize`] turns it into the
//! sort key used by the merge engine, and [`perimeter_cost`] adds an optional
//! elongation penalty on top.

use std::{collections::HashMap, f64::consts::FRAC_PI_2, f64::consts::PI};

use nalgebra::Vector3;

use crate::{
    error::MeshError,
    mesh::{GroupId, MeshSource, Triangle, TriangleId, VertexId},
    params::SegmentationParams,
    pair::UnorderedPair,
};

/// One side of a shared edge.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EdgeSide<'t> {
    pub(crate) triangle: &'t Triangle,
    pub(crate) edge: usize,
    pub(crate) normal: Vector3<f64>,
}

/// Scores shared edges, memoising per-vertex and per-triangle lookups for the
/// lifetime of one graph build.
pub(crate) struct CostModel<'a, M: ?Sized> {
    mesh: &'a M,
    params: &'a SegmentationParams,
    vertex_weights: HashMap<VertexId, Vec<(GroupId, f64)>>,
    pair_distances: HashMap<UnorderedPair<VertexId>, f64>,
    heaviest_groups: HashMap<TriangleId, Option<GroupId>>,
}

impl<'a, M: MeshSource + ?Sized> CostModel<'a, M> {
    pub(crate) fn new(mesh: &'a M, params: &'a SegmentationParams) -> Self {
        Self {
            mesh,
            params,
            vertex_weights: HashMap::new(),
            pair_distances: HashMap::new(),
            heaviest_groups: HashMap::new(),
        }
    }

    /// Computes the weighted raw cost of the edge shared by `left` and
    /// `right`, whose length is `length`.
    pub(crate) fn raw_cost(
        &mut self,
        left: EdgeSide<'_>,
        right: EdgeSide<'_>,
        length: f64,
    ) -> Result<f64, MeshError> {
        let factors = *self.params.factors();
        let mut total = 0.0;

        if factors.vertex_group_weight() != 0.0 {
            let (v0, v1) = left.triangle.edge(left.edge);
            let left_far = left.triangle.far_vertex(left.edge);
            let right_far = right.triangle.far_vertex(right.edge);
            let sum = self.pair_distance(v0, left_far)?
                + self.pair_distance(v1, left_far)?
                + self.pair_distance(v0, right_far)?
                + self.pair_distance(v1, right_far)?;
            total += factors.vertex_group_weight() * length * 0.25 * sum;
        }

        if factors.vertex_group_change() != 0.0 {
            let left_group = self.heaviest_group(left.triangle)?;
            let right_group = self.heaviest_group(right.triangle)?;
            if left_group != right_group {
                total += factors.vertex_group_change() * length;
            }
        }

        if factors.face_angle() != 0.0 {
            let angle = left.normal.angle(&right.normal);
            total += factors.face_angle() * length * angle / FRAC_PI_2;
        }

        if factors.material_change() != 0.0
            && left.triangle.material() != right.triangle.material()
        {
            total += factors.material_change() * length;
        }

        let flags = left
            .triangle
            .edge_flags(left.edge)
            .union(right.triangle.edge_flags(right.edge));
        if factors.edge_sharp() != 0.0 && flags.sharp() {
            total += factors.edge_sharp() * length;
        }
        if factors.edge_seam() != 0.0 && flags.seam() {
            total += factors.edge_seam() * length;
        }

        Ok(total)
    }

    fn weights(&mut self, vertex: VertexId) -> Result<&[(GroupId, f64)], MeshError> {
        if !self.vertex_weights.contains_key(&vertex) {
            let ignored = self.params.ignore_vertex_groups();
            let filtered = self
                .mesh
                .vertex(vertex)?
                .weights()
                .iter()
                .copied()
                .filter(|(group, _)| !ignored.contains(group))
                .collect();
            self.vertex_weights.insert(vertex, filtered);
        }
        Ok(self
            .vertex_weights
            .get(&vertex)
            .map_or(&[][..], Vec::as_slice))
    }

    fn pair_distance(&mut self, a: VertexId, b: VertexId) -> Result<f64, MeshError> {
        let key = UnorderedPair::new(a, b);
        if let Some(distance) = self.pair_distances.get(&key) {
            return Ok(*distance);
        }
        self.weights(a)?;
        self.weights(b)?;
        let left = self.vertex_weights.get(&a).map_or(&[][..], Vec::as_slice);
        let right = self.vertex_weights.get(&b).map_or(&[][..], Vec::as_slice);
        let distance = one_sided_distance(left, right) + one_sided_distance(right, left);
        self.pair_distances.insert(key, distance);
        Ok(distance)
    }

    fn heaviest_group(&mut self, triangle: &Triangle) -> Result<Option<GroupId>, MeshError> {
        if let Some(group) = self.heaviest_groups.get(&triangle.id()) {
            return Ok(*group);
        }
        let mut totals: Vec<(GroupId, f64)> = Vec::new();
        let mut best: Option<(GroupId, f64)> = None;
        for vertex in triangle.vertices() {
            for &(group, weight) in self.weights(vertex)? {
                let total = if let Some(entry) = totals.iter_mut().find(|(id, _)| *id == group) {
                    entry.1 += weight;
                    entry.1
                } else {
                    totals.push((group, weight));
                    weight
                };
                if best.is_none_or(|(_, heaviest)| total > heaviest) {
                    best = Some((group, total));
                }
            }
        }
        let group = best.map(|(group, _)| group);
        self.heaviest_groups.insert(triangle.id(), group);
        Ok(group)
    }
}

fn one_sided_distance(from: &[(GroupId, f64)], to: &[(GroupId, f64)]) -> f64 {
    from.iter()
        .map(|(group, weight)| {
            let other = to
                .iter()
                .find_map(|(id, w)| (id == group).then_some(*w))
                .unwrap_or(0.0);
            (weight - other).abs()
        })
        .sum()
}

/// Converts a raw cost into the merge ordering key.
///
/// Divides by `length * contact_length_factor` when that product is
/// positive; otherwise the raw cost is used unscaled.
pub(crate) fn normalize(raw: f64, length: f64, contact_length_factor: f64) -> f64 {
    let scale = length * contact_length_factor;
    if contact_length_factor > 0.0 && scale > 0.0 {
        raw / scale
    } else {
        raw
    }
}

/// Radius-like scale of a disc with the given area (`sqrt(area / π)`).
fn circumference(area: f64) -> f64 {
    (area / PI).sqrt()
}

/// Measurements of one contact endpoint used by [`perimeter_cost`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Extent {
    pub(crate) area: f64,
    pub(crate) perimeter: f64,
}

/// Penalises merges whose combined outline is more elongated than the
/// area-weighted harmonic mean of the inputs' own elongation.
///
/// Returns `0.0` for zero-area or zero-perimeter inputs and whenever an
/// intermediate ratio is not finite.
pub(crate) fn perimeter_cost(first: Extent, second: Extent, length: f64) -> f64 {
    if first.area <= 0.0 || second.area <= 0.0 || first.perimeter <= 0.0 || second.perimeter <= 0.0
    {
        return 0.0;
    }
    let first_ratio = first.perimeter / circumference(first.area);
    let second_ratio = second.perimeter / circumference(second.area);
    let mean_ratio =
        (first.area + second.area) / (first.area / first_ratio + second.area / second_ratio);
    let merged_ratio = (first.perimeter + second.perimeter - 2.0 * length)
        / circumference(first.area + second.area);
    let cost = merged_ratio / mean_ratio - 1.0;
    if cost.is_finite() { cost.max(0.0) } else { 0.0 }
}
