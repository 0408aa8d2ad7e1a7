//! Two-phase adjacency graph construction.

use std::collections::{BTreeSet, HashMap, HashSet};

use nalgebra::{Point3, Vector3};
use tracing::{debug, instrument};

use super::{AdjacencyGraph, Contact, SegmentId, SegmentState};
use crate::{
    cost::{self, CostModel, EdgeSide},
    error::MeshError,
    mesh::{MeshSource, Triangle, VertexId},
    pair::UnorderedPair,
    params::SegmentationParams,
};

struct Placed<'m> {
    triangle: &'m Triangle,
    segment: SegmentId,
    corners: [Point3<f64>; 3],
    normal: Vector3<f64>,
}

impl Placed<'_> {
    fn side(&self, edge: usize) -> EdgeSide<'_> {
        EdgeSide {
            triangle: self.triangle,
            edge,
            normal: self.normal,
        }
    }

    fn edge_length(&self, edge: usize) -> f64 {
        let start = self.corners[edge % 3];
        let end = self.corners[(edge + 1) % 3];
        (end - start).norm()
    }
}

/// Builds one segment per selected triangle and one contact per shared edge
/// between distinct selected triangles.
///
/// Where an edge is shared by more than two selected triangles, every pair
/// around it forms a contact. A triangle pair is linked at most once, through
/// the first edge it is found to share.
#[instrument(
    name = "core.build_graph",
    err,
    skip(mesh, params),
    fields(mesh = %mesh.name(), triangles = mesh.triangles().len()),
)]
pub(crate) fn build_graph<M: MeshSource + ?Sized>(
    mesh: &M,
    params: &SegmentationParams,
) -> Result<AdjacencyGraph, MeshError> {
    let mut graph = AdjacencyGraph::default();
    let placed = place_segments(mesh, &mut graph)?;

    let mut edges: HashMap<UnorderedPair<VertexId>, Vec<(usize, usize)>> = HashMap::new();
    for (slot, entry) in placed.iter().enumerate() {
        for edge in 0..3 {
            let (a, b) = entry.triangle.edge(edge);
            edges
                .entry(UnorderedPair::new(a, b))
                .or_default()
                .push((slot, edge));
        }
    }

    let mut model = CostModel::new(mesh, params);
    let mut linked: HashSet<UnorderedPair<usize>> = HashSet::new();
    let mut contact_perimeter = vec![0.0; placed.len()];
    for (slot, entry) in placed.iter().enumerate() {
        for edge in 0..3 {
            let (a, b) = entry.triangle.edge(edge);
            let Some(sharing) = edges.get(&UnorderedPair::new(a, b)) else {
                continue;
            };
            for &(other_slot, other_edge) in sharing {
                if other_slot == slot || !linked.insert(UnorderedPair::new(slot, other_slot)) {
                    continue;
                }
                let other = &placed[other_slot];
                let length = entry.edge_length(edge);
                let raw = model.raw_cost(entry.side(edge), other.side(other_edge), length)?;
                graph.push_contact(Contact {
                    segments: [entry.segment, other.segment],
                    cost: raw,
                    length,
                    normalized: cost::normalize(raw, length, params.contact_length_factor()),
                });
                contact_perimeter[slot] += length;
                contact_perimeter[other_slot] += length;
            }
        }
    }

    for (entry, touching) in placed.iter().zip(contact_perimeter) {
        let state = graph.segment_mut(entry.segment);
        state.non_contact_perimeter = state.perimeter - touching;
        if state.contacts.is_empty() {
            graph.mark_initially_isolated(entry.segment);
        }
    }

    if params.perimeter_cost_enabled() {
        apply_perimeter_cost(&mut graph, params.perimeter_cost_factor());
    }

    debug!(
        segments = graph.segment_count(),
        contacts = graph.live_contacts().count(),
        isolated = graph.initially_isolated().len(),
        "adjacency graph built"
    );
    Ok(graph)
}

fn place_segments<'m, M: MeshSource + ?Sized>(
    mesh: &'m M,
    graph: &mut AdjacencyGraph,
) -> Result<Vec<Placed<'m>>, MeshError> {
    let mut placed = Vec::with_capacity(mesh.selected_count());
    for triangle in mesh.triangles().iter().filter(|tri| tri.selected()) {
        let [a, b, c] = triangle.vertices();
        let corners = [
            *mesh.vertex(a)?.position(),
            *mesh.vertex(b)?.position(),
            *mesh.vertex(c)?.position(),
        ];
        let normal = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        let perimeter = (corners[1] - corners[0]).norm()
            + (corners[2] - corners[1]).norm()
            + (corners[0] - corners[2]).norm();
        let segment = graph.push_segment(SegmentState {
            triangles: vec![triangle.id()],
            area: 0.5 * normal.norm(),
            perimeter,
            non_contact_perimeter: perimeter,
            contacts: BTreeSet::new(),
            alive: true,
        });
        placed.push(Placed {
            triangle,
            segment,
            corners,
            normal,
        });
    }
    Ok(placed)
}

fn apply_perimeter_cost(graph: &mut AdjacencyGraph, factor: f64) {
    let updates: Vec<_> = graph
        .live_contacts()
        .map(|(id, contact)| {
            let [first, second] = contact.segments;
            let penalty = cost::perimeter_cost(
                graph.segment(first).extent(),
                graph.segment(second).extent(),
                contact.length,
            );
            (id, factor * penalty)
        })
        .collect();
    for (id, penalty) in updates {
        if let Some(contact) = graph.contact_mut(id) {
            contact.normalized += penalty;
        }
    }
}
