//! Indexed priority set of live contacts.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
    ops::Bound,
};

use crate::graph::ContactId;

/// Position of a contact in the queue: its normalized cost, then its creation
/// order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct QueueKey {
    cost: f64,
    contact: ContactId,
}

impl QueueKey {
    #[rustfmt::skip]
    pub(crate) const fn cost(&self) -> f64 { self.cost }

    #[rustfmt::skip]
    pub(crate) const fn contact(&self) -> ContactId { self.contact }
}

impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueKey {}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.contact.cmp(&other.contact))
    }
}

/// Live contacts ordered by ascending normalized cost with stable ties.
///
/// Supports removal and re-keying by contact handle in `O(log n)`.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContactQueue {
    ordered: BTreeSet<QueueKey>,
    keys: HashMap<ContactId, QueueKey>,
}

impl ContactQueue {
    /// Inserts `contact` at `cost`, replacing any earlier position.
    pub(crate) fn insert(&mut self, contact: ContactId, cost: f64) {
        let key = QueueKey { cost, contact };
        if let Some(previous) = self.keys.insert(contact, key) {
            self.ordered.remove(&previous);
        }
        self.ordered.insert(key);
    }

    /// Removes `contact`, returning whether it was queued.
    pub(crate) fn remove(&mut self, contact: ContactId) -> bool {
        match self.keys.remove(&contact) {
            Some(key) => self.ordered.remove(&key),
            None => false,
        }
    }

    /// Moves a queued contact to `cost`; unknown contacts are ignored.
    pub(crate) fn update(&mut self, contact: ContactId, cost: f64) {
        if self.keys.contains_key(&contact) {
            self.insert(contact, cost);
        }
    }

    pub(crate) fn first(&self) -> Option<QueueKey> {
        self.ordered.first().copied()
    }

    /// Returns the entry following `after`, or the cheapest entry when
    /// `after` is `None`.
    pub(crate) fn next_after(&self, after: Option<QueueKey>) -> Option<QueueKey> {
        match after {
            None => self.first(),
            Some(key) => self
                .ordered
                .range((Bound::Excluded(key), Bound::Unbounded))
                .next()
                .copied(),
        }
    }

    pub(crate) fn key_of(&self, contact: ContactId) -> Option<QueueKey> {
        self.keys.get(&contact).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = QueueKey> + '_ {
        self.ordered.iter().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }

}
