use std::{num::NonZeroUsize, sync::atomic::AtomicBool};

use approx::assert_relative_eq;
use rstest::rstest;

use super::*;
use crate::{
    graph::{Contact, SegmentState, build_graph},
    mesh::TriangleId,
    params::SegmentationParams,
    result::Segmentation,
    test_utils::flat_grid,
};

/// Builds a graph of unit-area segments, one triangle each.
///
/// Contacts are `(first, second, raw cost, length)`; perimeters are set to
/// the free outline plus the touching contact lengths.
fn hand_graph(outlines: &[f64], contacts: &[(usize, usize, f64, f64)]) -> AdjacencyGraph {
    let mut graph = AdjacencyGraph::default();
    for (index, &outline) in outlines.iter().enumerate() {
        graph.push_segment(SegmentState {
            triangles: vec![TriangleId::new(index as u64)],
            area: 1.0,
            perimeter: 0.0,
            non_contact_perimeter: outline,
            contacts: Default::default(),
            alive: true,
        });
    }
    for &(first, second, cost, length) in contacts {
        graph.push_contact(Contact {
            segments: [SegmentId::from_index(first), SegmentId::from_index(second)],
            cost,
            length,
            normalized: cost / length,
        });
    }
    for index in 0..outlines.len() {
        let id = SegmentId::from_index(index);
        let boundary = graph.segment(id).non_contact_perimeter + graph.contact_length(id);
        graph.segment_mut(id).perimeter = boundary;
        if graph.segment(id).contacts.is_empty() {
            graph.mark_initially_isolated(id);
        }
    }
    graph
}

/// Triangle of three segments whose `B-C` contact becomes parallel to
/// `A-C` once `B` is absorbed into `A`.
fn triangle_of_segments() -> AdjacencyGraph {
    hand_graph(
        &[2.0, 1.0, 1.0],
        &[(0, 1, 0.0, 1.0), (0, 2, 3.0, 1.0), (1, 2, 1.0, 2.0)],
    )
}

fn run(graph: AdjacencyGraph, params: &SegmentationParams, cancelled: bool) -> Segmentation {
    let mut engine = MergeEngine::new(graph, params);
    let termination = engine.run(&AtomicBool::new(cancelled));
    Segmentation::assemble(&engine, termination)
}

fn run_grid(cols: u32, rows: u32, params: &SegmentationParams) -> Segmentation {
    let graph = build_graph(&flat_grid(cols, rows), params).expect("grid must build");
    run(graph, params, false)
}

#[rstest]
fn flat_grid_collapses_to_one_segment() {
    let segmentation = run_grid(2, 2, &SegmentationParams::default());

    assert_eq!(segmentation.termination(), Termination::FixedPoint);
    assert_eq!(segmentation.segments().len(), 1);
    assert_eq!(segmentation.merge_count(), 7);
    assert!(segmentation.remaining_contacts().is_empty());
    let only = &segmentation.segments()[0];
    assert_eq!(only.triangles().len(), 8);
    assert_relative_eq!(only.area(), 4.0, epsilon = 1e-12);
    assert_relative_eq!(only.non_contact_perimeter(), 8.0, epsilon = 1e-12);
}

#[rstest]
fn zero_maximum_area_rejects_every_merge() {
    let params = SegmentationParams {
        maximum_area_threshold: 0.0,
        ..SegmentationParams::default()
    };
    let segmentation = run_grid(2, 2, &params);

    assert_eq!(segmentation.termination(), Termination::FixedPoint);
    assert_eq!(segmentation.segments().len(), 8);
    assert_eq!(segmentation.merge_count(), 0);
    assert_eq!(segmentation.rejected_merge_checks(), 8);
    assert_eq!(segmentation.remaining_contacts().len(), 8);
}

#[rstest]
fn small_sources_bypass_the_maximum_area() {
    let params = SegmentationParams {
        maximum_area_threshold: 0.0,
        minimum_area_threshold: 0.5,
        ..SegmentationParams::default()
    };
    let segmentation = run_grid(1, 1, &params);

    assert_eq!(segmentation.segments().len(), 1);
    assert_eq!(segmentation.merge_count(), 1);
    assert_eq!(segmentation.rejected_merge_checks(), 0);
}

#[rstest]
#[case::without_perimeter_cost(0.0, 2.0 + std::f64::consts::SQRT_2)]
#[case::with_perimeter_cost(1.0, 4.0)]
fn isolated_perimeter_refreshes_only_with_perimeter_cost(
    #[case] perimeter_cost_factor: f64,
    #[case] expected: f64,
) {
    let params = SegmentationParams {
        perimeter_cost_factor,
        ..SegmentationParams::default()
    };
    let segmentation = run_grid(1, 1, &params);
    let [only] = segmentation.segments() else {
        panic!("expected exactly one segment");
    };
    assert_relative_eq!(only.area(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(only.perimeter(), expected, epsilon = 1e-12);
    assert_relative_eq!(only.non_contact_perimeter(), 4.0, epsilon = 1e-12);
}

#[rstest]
fn parallel_contacts_fold_into_the_lowest_id() {
    let params = SegmentationParams::default();
    let segmentation = run(triangle_of_segments(), &params, false);

    assert_eq!(segmentation.termination(), Termination::FixedPoint);
    assert_eq!(segmentation.merge_count(), 1);
    assert_eq!(segmentation.merge_costs(), &[0.0]);
    let [contact] = segmentation.remaining_contacts() else {
        panic!("expected exactly one remaining contact");
    };
    assert_relative_eq!(contact.cost(), 4.0);
    assert_relative_eq!(contact.length(), 3.0);
    assert_relative_eq!(contact.normalized_cost(), 4.0 / 3.0);

    let merged = &segmentation.segments()[contact.segments()[0]];
    assert_eq!(merged.triangles(), &[TriangleId::new(0), TriangleId::new(1)]);
    assert_relative_eq!(merged.area(), 2.0);
    assert_relative_eq!(merged.non_contact_perimeter(), 3.0);
    assert_relative_eq!(merged.perimeter(), 4.0);
}

#[rstest]
#[case::kept_as_built(0.0, 4.0)]
#[case::refreshed(1.0, 6.0)]
fn merged_perimeter_refreshes_only_with_perimeter_cost(
    #[case] perimeter_cost_factor: f64,
    #[case] expected: f64,
) {
    let params = SegmentationParams {
        perimeter_cost_factor,
        max_merges: NonZeroUsize::new(1),
        ..SegmentationParams::default()
    };
    let mut engine = MergeEngine::new(triangle_of_segments(), &params);
    engine.run(&AtomicBool::new(false));

    let dst = engine.graph().segment(SegmentId::from_index(0));
    assert_eq!(dst.triangles.len(), 2);
    assert_relative_eq!(dst.non_contact_perimeter, 3.0);
    assert_relative_eq!(dst.perimeter, expected);
}

/// Mirrors the elongation penalty applied to re-derived contact costs.
fn expected_perimeter_cost(first: (f64, f64), second: (f64, f64), length: f64) -> f64 {
    let circumference = |area: f64| (area / std::f64::consts::PI).sqrt();
    let ((a0, p0), (a1, p1)) = (first, second);
    let mean_ratio = (a0 + a1) / (a0 / (p0 / circumference(a0)) + a1 / (p1 / circumference(a1)));
    let merged_ratio = (p0 + p1 - 2.0 * length) / circumference(a0 + a1);
    (merged_ratio / mean_ratio - 1.0).max(0.0)
}

#[rstest]
fn folded_contact_carries_perimeter_penalty() {
    // Short contacts to `C` leave the merged `A+B` outline elongated.
    let graph = hand_graph(
        &[4.0, 4.0, 4.0],
        &[(0, 1, 0.0, 1.0), (0, 2, 3.0, 0.1), (1, 2, 1.0, 0.2)],
    );
    let params = SegmentationParams {
        perimeter_cost_factor: 2.0,
        ..SegmentationParams::default()
    };
    let segmentation = run(graph, &params, false);

    assert_eq!(segmentation.merge_count(), 1);
    let [contact] = segmentation.remaining_contacts() else {
        panic!("expected exactly one remaining contact");
    };
    let [dst, neighbour] = contact.segments();
    let merged = &segmentation.segments()[dst];
    let other = &segmentation.segments()[neighbour];
    assert_eq!(merged.triangles(), &[TriangleId::new(0), TriangleId::new(1)]);
    assert_relative_eq!(merged.perimeter(), 8.3, epsilon = 1e-12);
    assert_relative_eq!(other.perimeter(), 4.3, epsilon = 1e-12);

    let penalty = expected_perimeter_cost((2.0, 8.3), (1.0, 4.3), 0.3);
    assert!(penalty > 0.3, "penalty {penalty} should be material");
    assert_relative_eq!(contact.cost(), 4.0);
    assert_relative_eq!(contact.length(), 0.3, epsilon = 1e-12);
    assert_relative_eq!(
        contact.normalized_cost(),
        2.0 * penalty + 4.0 / 0.3,
        epsilon = 1e-9
    );
}

#[rstest]
fn folded_contact_merges_once_within_threshold() {
    let params = SegmentationParams {
        cost_threshold: 1.5,
        ..SegmentationParams::default()
    };
    let segmentation = run(triangle_of_segments(), &params, false);

    assert_eq!(segmentation.segments().len(), 1);
    assert_eq!(segmentation.merge_count(), 2);
    assert_relative_eq!(segmentation.last_merged_cost(), 4.0 / 3.0);
    let only = &segmentation.segments()[0];
    assert_relative_eq!(only.perimeter(), 4.0);
    assert_relative_eq!(only.non_contact_perimeter(), 4.0);
}

#[rstest]
fn isolation_lets_the_scan_continue() {
    let graph = hand_graph(&[3.0; 4], &[(0, 1, 0.0, 1.0), (2, 3, 0.5, 1.0)]);
    let params = SegmentationParams::default();
    let mut engine = MergeEngine::new(graph, &params);

    assert!(matches!(engine.scan(), Scan::Merged));
    assert_eq!(engine.stats().merge_count, 2);
    assert_eq!(
        engine.isolated(),
        &[SegmentId::from_index(0), SegmentId::from_index(2)]
    );
    assert!(matches!(engine.scan(), Scan::Exhausted));
}

#[rstest]
fn budget_stops_a_continuing_scan() {
    let graph = hand_graph(&[3.0; 4], &[(0, 1, 0.0, 1.0), (2, 3, 0.5, 1.0)]);
    let params = SegmentationParams {
        max_merges: NonZeroUsize::new(1),
        ..SegmentationParams::default()
    };
    let segmentation = run(graph, &params, false);

    assert_eq!(segmentation.termination(), Termination::BudgetExhausted);
    assert_eq!(segmentation.merge_count(), 1);
    assert_eq!(segmentation.segments().len(), 3);
    assert_eq!(segmentation.segments()[0].triangles().len(), 2);
    assert_eq!(segmentation.remaining_contacts().len(), 1);
}

#[rstest]
fn initially_isolated_segments_are_reported_first() {
    let graph = hand_graph(&[4.0, 3.0, 3.0], &[(1, 2, 5.0, 1.0)]);
    let segmentation = run(graph, &SegmentationParams::default(), false);

    assert_eq!(segmentation.segments().len(), 3);
    assert_eq!(segmentation.segments()[0].triangles(), &[TriangleId::new(0)]);
    assert_eq!(segmentation.remaining_contacts()[0].segments(), [1, 2]);
}

#[rstest]
fn raised_cancel_flag_stops_before_merging() {
    let params = SegmentationParams::default();
    let graph = build_graph(&flat_grid(2, 2), &params).expect("grid must build");
    let segmentation = run(graph, &params, true);

    assert_eq!(segmentation.termination(), Termination::Cancelled);
    assert_eq!(segmentation.merge_count(), 0);
    assert_eq!(segmentation.segments().len(), 8);
}

#[rstest]
#[case::one(1, 7)]
#[case::three(3, 5)]
#[case::six(6, 2)]
fn merge_budget_caps_accepted_merges(#[case] budget: usize, #[case] segments: usize) {
    let params = SegmentationParams {
        max_merges: NonZeroUsize::new(budget),
        ..SegmentationParams::default()
    };
    let segmentation = run_grid(2, 2, &params);

    assert_eq!(segmentation.termination(), Termination::BudgetExhausted);
    assert!(segmentation.termination().is_partial());
    assert_eq!(segmentation.merge_count(), budget);
    assert_eq!(segmentation.segments().len(), segments);
    assert_eq!(segmentation.triangle_count(), 8);
}

#[rstest]
fn budget_beyond_need_still_reaches_fixed_point() {
    let params = SegmentationParams {
        max_merges: NonZeroUsize::new(100),
        ..SegmentationParams::default()
    };
    let segmentation = run_grid(2, 2, &params);
    assert_eq!(segmentation.termination(), Termination::FixedPoint);
    assert_eq!(segmentation.merge_count(), 7);
}

#[rstest]
fn history_records_areas_before_each_merge() {
    let params = SegmentationParams::default();
    let mut engine = MergeEngine::new(triangle_of_segments(), &params);
    engine.run(&AtomicBool::new(false));

    assert_eq!(
        engine.history(),
        &[MergeStep {
            cost: 0.0,
            dst_area: 1.0,
            src_area: 1.0,
        }]
    );
}
