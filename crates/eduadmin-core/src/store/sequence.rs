//! Request sequencing for background fetches.
//!
//! Every fetch is issued a ticket carrying a sequence number taken from a
//! single increasing counter. Only the newest ticket for a target may write
//! its result into the store; older responses are dropped when they arrive.
//! A target with an outstanding ticket is "in flight", and a second
//! non-forced fetch for it is refused.

use std::collections::{HashMap, HashSet};

use super::key::{CollectionKey, EntityKind};

/// What a fetch writes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchTarget {
    Page(CollectionKey, u32),
    Collection(CollectionKey),
    Entity(EntityKind, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    target: FetchTarget,
    seq: u64,
}

impl FetchTicket {
    pub fn target(&self) -> &FetchTarget {
        &self.target
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next_seq: u64,
    latest: HashMap<FetchTarget, u64>,
    in_flight: HashSet<FetchTarget>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `target`, or `None` if one is already outstanding
    /// and `force` is false. A forced ticket supersedes the outstanding one.
    pub fn issue(&mut self, target: FetchTarget, force: bool) -> Option<FetchTicket> {
        if !force && self.in_flight.contains(&target) {
            return None;
        }
        self.next_seq += 1;
        let seq = self.next_seq;
        self.latest.insert(target.clone(), seq);
        self.in_flight.insert(target.clone());
        Some(FetchTicket { target, seq })
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.get(&ticket.target) == Some(&ticket.seq)
    }

    pub fn is_in_flight(&self, target: &FetchTarget) -> bool {
        self.in_flight.contains(target)
    }

    /// Consume a ticket whose response arrived. Returns whether the response
    /// may be applied; the target stops being in flight only when it may.
    pub fn settle(&mut self, ticket: &FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight.remove(&ticket.target);
        true
    }

    /// Forget all tickets for targets matching `pred`, so late responses are dropped.
    pub fn forget(&mut self, pred: impl Fn(&FetchTarget) -> bool) {
        self.latest.retain(|t, _| !pred(t));
        self.in_flight.retain(|t| !pred(t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key::TeacherFilter;

    fn page(n: u32) -> FetchTarget {
        FetchTarget::Page(CollectionKey::Tests(TeacherFilter::All), n)
    }

    #[test]
    fn test_duplicate_fetch_refused_while_in_flight() {
        let mut seq = RequestSequencer::new();
        let ticket = seq.issue(page(1), false).unwrap();
        assert!(seq.is_in_flight(&page(1)));
        assert!(seq.issue(page(1), false).is_none());

        assert!(seq.settle(&ticket));
        assert!(!seq.is_in_flight(&page(1)));
        assert!(seq.issue(page(1), false).is_some());
    }

    #[test]
    fn test_different_pages_are_independent() {
        let mut seq = RequestSequencer::new();
        let one = seq.issue(page(1), false).unwrap();
        let two = seq.issue(page(2), false).unwrap();

        assert!(seq.settle(&two));
        assert!(seq.settle(&one));
    }

    #[test]
    fn test_forced_ticket_supersedes_older_response() {
        let mut seq = RequestSequencer::new();
        let slow = seq.issue(page(1), false).unwrap();
        let retry = seq.issue(page(1), true).unwrap();
        assert!(retry.seq() > slow.seq());

        // The newer response lands first; the late one is discarded
        assert!(seq.settle(&retry));
        assert!(!seq.settle(&slow));
    }

    #[test]
    fn test_stale_settle_keeps_target_in_flight() {
        let mut seq = RequestSequencer::new();
        let slow = seq.issue(page(1), false).unwrap();
        let _retry = seq.issue(page(1), true).unwrap();

        assert!(!seq.settle(&slow));
        assert!(seq.is_in_flight(&page(1)));
    }

    #[test]
    fn test_forget_drops_late_responses() {
        let mut seq = RequestSequencer::new();
        let ticket = seq.issue(page(1), false).unwrap();
        seq.forget(|t| matches!(t, FetchTarget::Page(_, _)));
        assert!(!seq.settle(&ticket));
        assert!(!seq.is_in_flight(&page(1)));
    }
}
