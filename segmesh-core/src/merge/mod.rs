//! Greedy contact-merging state machine.
//!
//! Each pass scans live contacts from the cheapest upward. The first contact
//! within the cost threshold whose area guard allows it is merged: its
//! second endpoint (`src`) is absorbed into its first (`dst`), `src`'s other
//! contacts are re-pointed to `dst`, and parallel contacts that now join
//! `dst` to the same neighbour are collapsed into one. Because collapsing
//! rewrites costs, the scan then restarts from the cheapest contact. A pass
//! that accepts nothing ends the run.
//!
//! A segment left without contacts is isolated: it is final and never
//! revisited.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{instrument, warn};

use crate::{
    cost,
    graph::{AdjacencyGraph, ContactId, SegmentId},
    params::SegmentationParams,
    queue::{ContactQueue, QueueKey},
    result::Termination,
};

/// Counters reported alongside the final partition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct MergeStats {
    pub(crate) merge_count: usize,
    pub(crate) rejected_merge_checks: usize,
    pub(crate) last_merged_cost: f64,
}

/// One accepted merge, as seen at the moment of acceptance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MergeStep {
    pub(crate) cost: f64,
    pub(crate) dst_area: f64,
    pub(crate) src_area: f64,
}

/// Owns the graph and queue for one run.
pub(crate) struct MergeEngine<'p> {
    graph: AdjacencyGraph,
    queue: ContactQueue,
    params: &'p SegmentationParams,
    isolated: Vec<SegmentId>,
    history: Vec<MergeStep>,
    stats: MergeStats,
}

/// Outcome of a single scan.
enum Scan {
    Merged,
    Exhausted,
}

impl<'p> MergeEngine<'p> {
    pub(crate) fn new(graph: AdjacencyGraph, params: &'p SegmentationParams) -> Self {
        let mut queue = ContactQueue::default();
        for (id, contact) in graph.live_contacts() {
            queue.insert(id, contact.normalized);
        }
        let isolated = graph.initially_isolated().to_vec();
        Self {
            graph,
            queue,
            params,
            isolated,
            history: Vec::new(),
            stats: MergeStats::default(),
        }
    }

    /// Merges until a fixed point, cancellation, or the merge budget.
    ///
    /// `cancel` and the budget are polled once before every scan, so a stop
    /// always leaves a consistent partition.
    #[instrument(
        name = "core.merge",
        skip(self, cancel),
        fields(
            contacts = self.queue.len(),
            cost_threshold = self.params.cost_threshold(),
            merges = tracing::field::Empty,
        ),
    )]
    pub(crate) fn run(&mut self, cancel: &AtomicBool) -> Termination {
        let termination = loop {
            if cancel.load(Ordering::Relaxed) {
                warn!(merges = self.stats.merge_count, "segmentation cancelled");
                break Termination::Cancelled;
            }
            if self
                .params
                .max_merges()
                .is_some_and(|budget| self.stats.merge_count >= budget.get())
            {
                warn!(merges = self.stats.merge_count, "merge budget exhausted");
                break Termination::BudgetExhausted;
            }
            match self.scan() {
                Scan::Merged => {}
                Scan::Exhausted => break Termination::FixedPoint,
            }
        };
        tracing::Span::current().record("merges", self.stats.merge_count);
        termination
    }

    /// Walks the queue from the cheapest contact and performs at most one
    /// cost-changing merge.
    fn scan(&mut self) -> Scan {
        let threshold = self.params.cost_threshold();
        let mut cursor: Option<QueueKey> = None;
        let mut merged = false;
        while let Some(key) = self.queue.next_after(cursor) {
            if key.cost() > threshold {
                break;
            }
            let Some(contact) = self.graph.contact(key.contact()) else {
                self.queue.remove(key.contact());
                continue;
            };
            let [dst, src] = contact.segments;
            if !self.area_guard_allows(dst, src) {
                self.stats.rejected_merge_checks += 1;
                #[cfg(feature = "metrics")]
                metrics::counter!("segmentation_rejected_merges_total").increment(1);
                cursor = Some(key);
                continue;
            }

            self.history.push(MergeStep {
                cost: key.cost(),
                dst_area: self.graph.segment(dst).area,
                src_area: self.graph.segment(src).area,
            });
            let isolated = self.absorb(key.contact(), dst, src);
            self.stats.merge_count += 1;
            self.stats.last_merged_cost = key.cost();
            #[cfg(feature = "metrics")]
            metrics::counter!("segmentation_merges_total").increment(1);
            #[cfg(debug_assertions)]
            self.assert_invariants();

            if !isolated {
                return Scan::Merged;
            }
            // Isolation changes no costs, so the walk can resume in place.
            merged = true;
            if self.budget_spent() {
                break;
            }
            cursor = Some(key);
        }
        if merged { Scan::Merged } else { Scan::Exhausted }
    }

    fn budget_spent(&self) -> bool {
        self.params
            .max_merges()
            .is_some_and(|budget| self.stats.merge_count >= budget.get())
    }

    fn area_guard_allows(&self, dst: SegmentId, src: SegmentId) -> bool {
        let src_area = self.graph.segment(src).area;
        let dst_area = self.graph.segment(dst).area;
        src_area <= self.params.minimum_area_threshold()
            || dst_area + src_area <= self.params.maximum_area_threshold()
    }

    /// Absorbs `src` into `dst` through `consumed`. Returns `true` when `dst`
    /// ends up isolated.
    fn absorb(&mut self, consumed: ContactId, dst: SegmentId, src: SegmentId) -> bool {
        self.queue.remove(consumed);
        self.graph.remove_contact(consumed);

        let moved = {
            let source = self.graph.segment_mut(src);
            source.alive = false;
            (
                std::mem::take(&mut source.triangles),
                source.area,
                source.non_contact_perimeter,
                std::mem::take(&mut source.contacts),
            )
        };
        let (triangles, area, non_contact_perimeter, contacts) = moved;
        {
            let target = self.graph.segment_mut(dst);
            target.triangles.extend(triangles);
            target.area += area;
            target.non_contact_perimeter += non_contact_perimeter;
        }

        for id in contacts {
            let Some(contact) = self.graph.contact_mut(id) else {
                continue;
            };
            for endpoint in &mut contact.segments {
                if *endpoint == src {
                    *endpoint = dst;
                }
            }
            if contact.segments[0] == contact.segments[1] {
                self.queue.remove(id);
                self.graph.remove_contact(id);
            } else {
                self.graph.segment_mut(dst).contacts.insert(id);
            }
        }

        if self.graph.segment(dst).contacts.is_empty() {
            if self.params.perimeter_cost_enabled() {
                let target = self.graph.segment_mut(dst);
                target.perimeter = target.non_contact_perimeter;
            }
            self.isolated.push(dst);
            return true;
        }

        // Perimeters only feed the perimeter cost; without it they stay as built.
        if self.params.perimeter_cost_enabled() {
            let boundary =
                self.graph.segment(dst).non_contact_perimeter + self.graph.contact_length(dst);
            self.graph.segment_mut(dst).perimeter = boundary;
        }
        self.collapse_parallel_contacts(dst);
        false
    }

    /// Folds contacts that join `dst` to the same neighbour into the one with
    /// the lowest id, summing raw cost and length and re-keying it.
    fn collapse_parallel_contacts(&mut self, dst: SegmentId) {
        let mut by_neighbour: BTreeMap<SegmentId, Vec<ContactId>> = BTreeMap::new();
        for &id in &self.graph.segment(dst).contacts {
            if let Some(contact) = self.graph.contact(id) {
                by_neighbour.entry(contact.other(dst)).or_default().push(id);
            }
        }

        for (neighbour, group) in by_neighbour {
            let Some((&survivor, rest)) = group.split_first() else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let (mut raw, mut length) = (0.0, 0.0);
            for &id in rest {
                self.queue.remove(id);
                if let Some(removed) = self.graph.remove_contact(id) {
                    raw += removed.cost;
                    length += removed.length;
                }
            }
            let normalized = self.rederive_cost(survivor, dst, neighbour, raw, length);
            if let Some(normalized) = normalized {
                self.queue.update(survivor, normalized);
            }
        }
    }

    fn rederive_cost(
        &mut self,
        survivor: ContactId,
        dst: SegmentId,
        neighbour: SegmentId,
        extra_raw: f64,
        extra_length: f64,
    ) -> Option<f64> {
        let penalty = if self.params.perimeter_cost_enabled() {
            let length = self.graph.contact(survivor)?.length + extra_length;
            self.params.perimeter_cost_factor()
                * cost::perimeter_cost(
                    self.graph.segment(dst).extent(),
                    self.graph.segment(neighbour).extent(),
                    length,
                )
        } else {
            0.0
        };
        let clf = self.params.contact_length_factor();
        let contact = self.graph.contact_mut(survivor)?;
        contact.cost += extra_raw;
        contact.length += extra_length;
        contact.normalized = penalty + cost::normalize(contact.cost, contact.length, clf);
        Some(contact.normalized)
    }

    pub(crate) fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    pub(crate) fn queue(&self) -> &ContactQueue {
        &self.queue
    }

    /// Segments isolated so far, in isolation order.
    pub(crate) fn isolated(&self) -> &[SegmentId] {
        &self.isolated
    }

    /// Accepted merges in order.
    pub(crate) fn history(&self) -> &[MergeStep] {
        &self.history
    }

    pub(crate) fn stats(&self) -> MergeStats {
        self.stats
    }

    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        use std::collections::HashSet;

        use crate::pair::UnorderedPair;

        let mut pairs = HashSet::new();
        let mut live = 0;
        for (id, contact) in self.graph.live_contacts() {
            live += 1;
            let [a, b] = contact.segments;
            debug_assert_ne!(a, b, "contact {id:?} is a self-loop");
            debug_assert!(
                pairs.insert(UnorderedPair::new(a, b)),
                "parallel contacts between {a:?} and {b:?}"
            );
            for endpoint in contact.segments {
                let segment = self.graph.segment(endpoint);
                debug_assert!(segment.alive, "contact {id:?} touches dead {endpoint:?}");
                debug_assert!(
                    segment.contacts.contains(&id),
                    "contact {id:?} missing from {endpoint:?}"
                );
            }
            debug_assert_eq!(
                self.queue.key_of(id).map(|key| key.cost().to_bits()),
                Some(contact.normalized.to_bits()),
                "queue position of {id:?} is stale"
            );
        }
        debug_assert_eq!(live, self.queue.len(), "queue holds removed contacts");
    }
}

#[cfg(test)]
mod property;
#[cfg(test)]
mod tests;
