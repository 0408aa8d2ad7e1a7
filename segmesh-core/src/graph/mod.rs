//! Segment and contact arenas shared by the builder and the merge engine.
//!
//! Segments and contacts live in `Vec` arenas addressed by [`SegmentId`] and
//! [`ContactId`]. Contacts store the handles of their two endpoints; removed
//! contacts leave a `None` slot and absorbed segments are marked dead, so
//! handles stay valid for the whole run.

mod build;

pub(crate) use build::build_graph;

use std::collections::BTreeSet;

use crate::{cost::Extent, mesh::TriangleId};

/// Handle of a segment within an [`AdjacencyGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SegmentId(usize);

impl SegmentId {
    #[rustfmt::skip]
    pub(crate) const fn index(self) -> usize { self.0 }

    #[cfg(test)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Handle of a contact within an [`AdjacencyGraph`].
///
/// Contact handles are allocated in creation order, which doubles as the
/// stable tie-breaker in the contact queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ContactId(usize);

impl ContactId {
    #[rustfmt::skip]
    pub(crate) const fn index(self) -> usize { self.0 }

    #[cfg(test)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Mutable per-segment state.
#[derive(Clone, Debug)]
pub(crate) struct SegmentState {
    pub(crate) triangles: Vec<TriangleId>,
    pub(crate) area: f64,
    pub(crate) perimeter: f64,
    pub(crate) non_contact_perimeter: f64,
    pub(crate) contacts: BTreeSet<ContactId>,
    pub(crate) alive: bool,
}

impl SegmentState {
    pub(crate) const fn extent(&self) -> Extent {
        Extent {
            area: self.area,
            perimeter: self.perimeter,
        }
    }
}

/// A live adjacency between two distinct segments.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Contact {
    pub(crate) segments: [SegmentId; 2],
    pub(crate) cost: f64,
    pub(crate) length: f64,
    pub(crate) normalized: f64,
}

impl Contact {
    /// Returns the endpoint that is not `segment`.
    pub(crate) fn other(&self, segment: SegmentId) -> SegmentId {
        let [first, second] = self.segments;
        if first == segment { second } else { first }
    }
}

/// Segment arena, contact arena, and the segments that started out with no
/// contacts.
#[derive(Clone, Debug, Default)]
pub(crate) struct AdjacencyGraph {
    segments: Vec<SegmentState>,
    contacts: Vec<Option<Contact>>,
    initially_isolated: Vec<SegmentId>,
}

impl AdjacencyGraph {
    pub(crate) fn push_segment(&mut self, state: SegmentState) -> SegmentId {
        let id = SegmentId(self.segments.len());
        self.segments.push(state);
        id
    }

    /// Allocates a contact and registers it with both endpoints.
    pub(crate) fn push_contact(&mut self, contact: Contact) -> ContactId {
        let id = ContactId(self.contacts.len());
        for segment in contact.segments {
            self.segments[segment.index()].contacts.insert(id);
        }
        self.contacts.push(Some(contact));
        id
    }

    /// Removes a contact and unregisters it from both endpoints.
    pub(crate) fn remove_contact(&mut self, id: ContactId) -> Option<Contact> {
        let contact = self.contacts.get_mut(id.index())?.take()?;
        for segment in contact.segments {
            if let Some(state) = self.segments.get_mut(segment.index()) {
                state.contacts.remove(&id);
            }
        }
        Some(contact)
    }

    pub(crate) fn mark_initially_isolated(&mut self, id: SegmentId) {
        self.initially_isolated.push(id);
    }

    pub(crate) fn initially_isolated(&self) -> &[SegmentId] {
        &self.initially_isolated
    }

    pub(crate) fn segment(&self, id: SegmentId) -> &SegmentState {
        &self.segments[id.index()]
    }

    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> &mut SegmentState {
        &mut self.segments[id.index()]
    }

    pub(crate) fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn contact_mut(&mut self, id: ContactId) -> Option<&mut Contact> {
        self.contacts.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Iterates live contacts in creation order.
    pub(crate) fn live_contacts(&self) -> impl Iterator<Item = (ContactId, &Contact)> {
        self.contacts
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|contact| (ContactId(index), contact)))
    }

    /// Iterates segments that have not been absorbed.
    #[cfg(test)]
    pub(crate) fn alive_segments(&self) -> impl Iterator<Item = (SegmentId, &SegmentState)> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, state)| state.alive)
            .map(|(index, state)| (SegmentId(index), state))
    }

    /// Sum of the lengths of `segment`'s live contacts.
    pub(crate) fn contact_length(&self, segment: SegmentId) -> f64 {
        self.segment(segment)
            .contacts
            .iter()
            .filter_map(|id| self.contact(*id))
            .map(|contact| contact.length)
            .sum()
    }
}
