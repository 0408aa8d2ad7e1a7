//! Property functions checked against every generated fixture.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;

use proptest::{prelude::*, test_runner::TestCaseResult};

use crate::{
    graph::build_graph,
    merge::{MergeEngine, MergeStep},
    mesh::{MeshSource, TriangleId},
    pair::UnorderedPair,
    params::SegmentationParams,
    result::{Segmentation, Termination},
};

use super::types::MergeFixture;

/// Relative tolerance for accumulated boundary lengths.
const LENGTH_EPSILON: f64 = 1e-9;

/// Partition and merge log of one engine run.
pub(super) struct Outcome {
    pub segmentation: Segmentation,
    pub history: Vec<MergeStep>,
}

pub(super) fn run_fixture(fixture: &MergeFixture, params: &SegmentationParams) -> Outcome {
    let graph = build_graph(&fixture.mesh, params).expect("grid fixtures must build");
    let mut engine = MergeEngine::new(graph, params);
    let termination = engine.run(&AtomicBool::new(false));
    Outcome {
        segmentation: Segmentation::assemble(&engine, termination),
        history: engine.history().to_vec(),
    }
}

/// Every selected triangle lands in exactly one segment; nothing else does.
pub(super) fn run_partition_property(fixture: &MergeFixture) -> TestCaseResult {
    let outcome = run_fixture(fixture, &fixture.params);
    let segmentation = &outcome.segmentation;
    let selected: HashSet<TriangleId> = fixture
        .mesh
        .triangles()
        .iter()
        .filter(|triangle| triangle.selected())
        .map(|triangle| triangle.id())
        .collect();

    let mut seen = HashSet::new();
    for (index, segment) in segmentation.segments().iter().enumerate() {
        prop_assert!(!segment.triangles().is_empty(), "segment {index} is empty");
        for &triangle in segment.triangles() {
            prop_assert!(seen.insert(triangle), "{triangle} appears twice ({:?})", fixture.shape);
            prop_assert_eq!(segmentation.segment_of(triangle), Some(index));
        }
    }
    prop_assert_eq!(seen, selected);
    prop_assert_eq!(segmentation.triangle_count(), fixture.mesh.selected_count());
    prop_assert_eq!(
        segmentation.segments().len() + segmentation.merge_count(),
        fixture.mesh.selected_count()
    );
    Ok(())
}

/// Each accepted merge respected the area guard and the cost threshold.
pub(super) fn run_merge_log_property(fixture: &MergeFixture) -> TestCaseResult {
    let outcome = run_fixture(fixture, &fixture.params);
    let params = &fixture.params;
    prop_assert_eq!(outcome.history.len(), outcome.segmentation.merge_count());
    prop_assert_eq!(outcome.segmentation.merge_costs().len(), outcome.history.len());
    for step in &outcome.history {
        prop_assert!(step.cost <= params.cost_threshold());
        prop_assert!(
            step.src_area <= params.minimum_area_threshold()
                || step.dst_area + step.src_area <= params.maximum_area_threshold(),
            "guard violated by {step:?} ({:?})",
            fixture.shape
        );
    }
    let last = outcome.history.last().map_or(0.0, |step| step.cost);
    prop_assert_eq!(outcome.segmentation.last_merged_cost().to_bits(), last.to_bits());
    Ok(())
}

/// At termination no remaining contact is both cheap enough and allowed.
pub(super) fn run_fixed_point_property(fixture: &MergeFixture) -> TestCaseResult {
    let outcome = run_fixture(fixture, &fixture.params);
    let segmentation = &outcome.segmentation;
    let params = &fixture.params;
    prop_assert_eq!(segmentation.termination(), Termination::FixedPoint);

    let mut pairs = HashSet::new();
    for contact in segmentation.remaining_contacts() {
        let [dst, src] = contact.segments();
        prop_assert_ne!(dst, src);
        prop_assert!(pairs.insert(UnorderedPair::new(dst, src)), "parallel contacts remain");
        if contact.normalized_cost() <= params.cost_threshold() {
            let dst_area = segmentation.segments()[dst].area();
            let src_area = segmentation.segments()[src].area();
            prop_assert!(
                src_area > params.minimum_area_threshold()
                    && dst_area + src_area > params.maximum_area_threshold(),
                "contact {contact:?} was left mergeable"
            );
        }
    }
    Ok(())
}

/// With the perimeter cost active, a segment's perimeter is its free outline
/// plus its remaining contacts.
pub(super) fn run_perimeter_property(fixture: &MergeFixture) -> TestCaseResult {
    let mut params = fixture.params.clone();
    if !params.perimeter_cost_enabled() {
        params.perimeter_cost_factor = 1.0;
    }
    let outcome = run_fixture(fixture, &params);
    let segmentation = &outcome.segmentation;
    let mut shared = vec![0.0; segmentation.segments().len()];
    for contact in segmentation.remaining_contacts() {
        for endpoint in contact.segments() {
            shared[endpoint] += contact.length();
        }
    }
    for (segment, shared) in segmentation.segments().iter().zip(shared) {
        let expected = segment.non_contact_perimeter() + shared;
        let tolerance = LENGTH_EPSILON * expected.max(1.0);
        prop_assert!(
            (segment.perimeter() - expected).abs() <= tolerance,
            "perimeter {} differs from outline {expected}",
            segment.perimeter()
        );
    }
    Ok(())
}

/// Identical inputs yield identical partitions and merge sequences.
pub(super) fn run_determinism_property(fixture: &MergeFixture) -> TestCaseResult {
    let first = run_fixture(fixture, &fixture.params);
    let second = run_fixture(fixture, &fixture.params);
    prop_assert_eq!(&first.segmentation, &second.segmentation);
    prop_assert_eq!(first.history, second.history);
    Ok(())
}

/// A threshold below every possible cost leaves one segment per triangle.
pub(super) fn run_baseline_property(fixture: &MergeFixture) -> TestCaseResult {
    let params = SegmentationParams {
        cost_threshold: -1.0,
        ..fixture.params.clone()
    };
    let outcome = run_fixture(fixture, &params);
    let segmentation = &outcome.segmentation;
    prop_assert_eq!(segmentation.merge_count(), 0);
    prop_assert_eq!(segmentation.segments().len(), fixture.mesh.selected_count());
    prop_assert!(
        segmentation
            .segments()
            .iter()
            .all(|segment| segment.triangles().len() == 1)
    );
    Ok(())
}
