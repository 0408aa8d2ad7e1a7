//! Result types for segmentation runs.
//!
//! A [`Segmentation`] is a partition of the selected triangles into
//! [`Segment`]s plus the diagnostics gathered by the merge engine.

use std::collections::HashMap;

use crate::{
    graph::{SegmentId, SegmentState},
    merge::MergeEngine,
    mesh::TriangleId,
};

/// Why the merge engine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// A full scan accepted no merge.
    FixedPoint,
    /// The caller's cancellation flag was raised.
    Cancelled,
    /// The configured merge budget was used up.
    BudgetExhausted,
}

impl Termination {
    /// Returns `true` when the run stopped early and live contacts may
    /// remain mergeable.
    #[must_use]
    pub const fn is_partial(self) -> bool {
        !matches!(self, Self::FixedPoint)
    }
}

/// One cell of the final partition.
///
/// # Examples
/// ```
/// use segmesh_core::{IndexedMesh, SegmenterBuilder, Triangle, TriangleId, Vertex, VertexId};
/// use nalgebra::Point3;
///
/// let mesh = IndexedMesh::try_new(
///     "single",
///     vec![
///         Vertex::new(Point3::new(0.0, 0.0, 0.0)),
///         Vertex::new(Point3::new(2.0, 0.0, 0.0)),
///         Vertex::new(Point3::new(0.0, 2.0, 0.0)),
///     ],
///     vec![Triangle::new(TriangleId::new(5), [VertexId::new(0), VertexId::new(1), VertexId::new(2)])],
/// )?;
/// let segmentation = SegmenterBuilder::new().build()?.segment(&mesh)?;
/// let segment = &segmentation.segments()[0];
/// assert_eq!(segment.triangles(), &[TriangleId::new(5)]);
/// assert_eq!(segment.area(), 2.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    triangles: Vec<TriangleId>,
    area: f64,
    perimeter: f64,
    non_contact_perimeter: f64,
}

impl Segment {
    fn from_state(state: &SegmentState) -> Self {
        let mut triangles = state.triangles.clone();
        triangles.sort_unstable();
        Self {
            triangles,
            area: state.area,
            perimeter: state.perimeter,
            non_contact_perimeter: state.non_contact_perimeter,
        }
    }

    /// Member triangle ids in ascending order.
    #[must_use]
    pub fn triangles(&self) -> &[TriangleId] {
        &self.triangles
    }

    /// Returns `true` when `triangle` belongs to this segment.
    #[must_use]
    pub fn contains(&self, triangle: TriangleId) -> bool {
        self.triangles.binary_search(&triangle).is_ok()
    }

    /// Total area of the member triangles.
    #[rustfmt::skip]
    #[must_use]
    pub const fn area(&self) -> f64 { self.area }

    /// Boundary length: outer edges plus edges shared with neighbouring
    /// segments.
    ///
    /// Merges only refresh this value while the perimeter cost is active;
    /// otherwise it is the perimeter the surviving segment was built with.
    #[rustfmt::skip]
    #[must_use]
    pub const fn perimeter(&self) -> f64 { self.perimeter }

    /// Boundary length not shared with any selected neighbour.
    #[rustfmt::skip]
    #[must_use]
    pub const fn non_contact_perimeter(&self) -> f64 { self.non_contact_perimeter }
}

/// A contact that was still live when the run stopped.
///
/// Endpoints index into [`Segmentation::segments`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSummary {
    segments: [usize; 2],
    cost: f64,
    normalized_cost: f64,
    length: f64,
}

impl ContactSummary {
    /// Indices of the two segments joined by the contact.
    #[rustfmt::skip]
    #[must_use]
    pub const fn segments(&self) -> [usize; 2] { self.segments }

    /// Accumulated raw cost.
    #[rustfmt::skip]
    #[must_use]
    pub const fn cost(&self) -> f64 { self.cost }

    /// Ordering key at termination.
    #[rustfmt::skip]
    #[must_use]
    pub const fn normalized_cost(&self) -> f64 { self.normalized_cost }

    /// Accumulated shared edge length.
    #[rustfmt::skip]
    #[must_use]
    pub const fn length(&self) -> f64 { self.length }
}

/// Partition produced by [`crate::Segmenter::segment`].
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    segments: Vec<Segment>,
    remaining: Vec<ContactSummary>,
    membership: HashMap<TriangleId, usize>,
    merge_costs: Vec<f64>,
    last_merged_cost: f64,
    merge_count: usize,
    rejected_merge_checks: usize,
    termination: Termination,
}

impl Segmentation {
    /// Partition of zero triangles.
    pub(crate) fn empty() -> Self {
        Self {
            segments: Vec::new(),
            remaining: Vec::new(),
            membership: HashMap::new(),
            merge_costs: Vec::new(),
            last_merged_cost: 0.0,
            merge_count: 0,
            rejected_merge_checks: 0,
            termination: Termination::FixedPoint,
        }
    }

    /// Assembles the partition: isolated segments in isolation order, then
    /// the endpoints of remaining contacts in queue order.
    pub(crate) fn assemble(engine: &MergeEngine<'_>, termination: Termination) -> Self {
        let graph = engine.graph();
        let mut index_of: HashMap<SegmentId, usize> = HashMap::new();
        let mut order: Vec<SegmentId> = Vec::new();
        let mut visit = |id: SegmentId| {
            *index_of.entry(id).or_insert_with(|| {
                order.push(id);
                order.len() - 1
            })
        };

        for &id in engine.isolated() {
            visit(id);
        }
        let mut remaining = Vec::with_capacity(engine.queue().len());
        for key in engine.queue().iter() {
            let Some(contact) = graph.contact(key.contact()) else {
                continue;
            };
            let [first, second] = contact.segments;
            remaining.push(ContactSummary {
                segments: [visit(first), visit(second)],
                cost: contact.cost,
                normalized_cost: contact.normalized,
                length: contact.length,
            });
        }

        let segments: Vec<Segment> = order
            .iter()
            .map(|id| Segment::from_state(graph.segment(*id)))
            .collect();
        let membership = segments
            .iter()
            .enumerate()
            .flat_map(|(index, segment)| segment.triangles.iter().map(move |tri| (*tri, index)))
            .collect();
        let stats = engine.stats();
        Self {
            segments,
            remaining,
            membership,
            merge_costs: engine.history().iter().map(|step| step.cost).collect(),
            last_merged_cost: stats.last_merged_cost,
            merge_count: stats.merge_count,
            rejected_merge_checks: stats.rejected_merge_checks,
            termination,
        }
    }

    /// The partition cells.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Contacts still live at termination, cheapest first.
    ///
    /// Contacts above the cost threshold or blocked by the area guard stay
    /// live even at a fixed point.
    #[must_use]
    pub fn remaining_contacts(&self) -> &[ContactSummary] {
        &self.remaining
    }

    /// Normalized cost of every accepted merge, in acceptance order.
    #[must_use]
    pub fn merge_costs(&self) -> &[f64] {
        &self.merge_costs
    }

    /// Normalized cost of the last accepted merge, `0.0` if none.
    #[rustfmt::skip]
    #[must_use]
    pub const fn last_merged_cost(&self) -> f64 { self.last_merged_cost }

    /// Number of accepted merges.
    #[rustfmt::skip]
    #[must_use]
    pub const fn merge_count(&self) -> usize { self.merge_count }

    /// Number of times the area guard rejected a candidate merge.
    #[rustfmt::skip]
    #[must_use]
    pub const fn rejected_merge_checks(&self) -> usize { self.rejected_merge_checks }

    /// Why the run stopped.
    #[rustfmt::skip]
    #[must_use]
    pub const fn termination(&self) -> Termination { self.termination }

    /// Number of triangles covered by the partition.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.membership.len()
    }

    /// Index into [`Self::segments`] of the segment holding `triangle`.
    #[must_use]
    pub fn segment_of(&self, triangle: TriangleId) -> Option<usize> {
        self.membership.get(&triangle).copied()
    }
}
