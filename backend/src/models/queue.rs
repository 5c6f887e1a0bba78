//! Pending-request queue
//!
//! Holds the live arrivals of one traffic class that have been neither
//! served nor expired. Requests are stored in an arena and addressed by
//! generational `RequestHandle`s, so a policy can take a snapshot of handles,
//! reorder or filter it, and remove entries later without invalidating the
//! rest of the snapshot. Removing a request frees its slot; a stale handle
//! to a freed slot resolves to nothing.
//!
//! # Ordering
//!
//! New arrivals go to the front of the queue, so iteration yields the most
//! recent request first. Policies that need another order (earliest deadline,
//! per node) sort a copy of the handles; sorts are stable, so ties keep the
//! most-recent-first order.
//!
//! # Usage
//!
//! ```rust
//! use pilot_simulator_core_rs::models::{Arrival, DeadlineOrder, PendingQueue, TrafficClass};
//!
//! let mut queue = PendingQueue::new();
//! let late = queue.push_front(Arrival::new(TrafficClass::A, 0.0, 10.0, 0, 1));
//! let early = queue.push_front(Arrival::new(TrafficClass::A, 1.0, 8.0, 1, 2));
//!
//! assert_eq!(queue.by_deadline(DeadlineOrder::Earliest), vec![early, late]);
//! assert_eq!(queue.remove(early).map(|a| a.requester_id), Some(1));
//! assert!(queue.get(early).is_none());
//! assert_eq!(queue.len(), 1);
//! ```

use crate::core::time::SimTime;
use crate::models::event::Arrival;
use std::collections::VecDeque;

/// Stable reference to a request inside a `PendingQueue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle {
    index: usize,
    generation: u64,
}

/// Direction of a deadline sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineOrder {
    /// Earliest deadline first
    Earliest,
    /// Latest deadline first
    Latest,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u64,
    request: Option<Arrival>,
}

/// Arena-backed queue of live requests for one class
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    slots: Vec<Slot>,
    free: Vec<usize>,
    /// Live handles, most recent first
    order: VecDeque<RequestHandle>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a request at the head of the queue
    pub fn push_front(&mut self, request: Arrival) -> RequestHandle {
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation += 1;
                slot.request = Some(request);
                RequestHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    request: Some(request),
                });
                RequestHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        self.order.push_front(handle);
        handle
    }

    /// Look up a live request
    pub fn get(&self, handle: RequestHandle) -> Option<&Arrival> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.request.as_ref())
    }

    /// Remove a request, freeing its slot
    ///
    /// Returns `None` if the handle is stale (already removed).
    pub fn remove(&mut self, handle: RequestHandle) -> Option<Arrival> {
        let slot = self
            .slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)?;
        let request = slot.request.take()?;
        self.free.push(handle.index);
        if let Some(position) = self.order.iter().position(|h| *h == handle) {
            self.order.remove(position);
        }
        Some(request)
    }

    /// Number of live requests
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live requests in queue order (most recent first)
    pub fn iter(&self) -> impl Iterator<Item = (RequestHandle, &Arrival)> + '_ {
        self.order
            .iter()
            .filter_map(move |handle| self.get(*handle).map(|request| (*handle, request)))
    }

    /// Snapshot of live handles in queue order
    pub fn handles(&self) -> Vec<RequestHandle> {
        self.order.iter().copied().collect()
    }

    /// Snapshot of live handles sorted by deadline (stable)
    pub fn by_deadline(&self, order: DeadlineOrder) -> Vec<RequestHandle> {
        let mut entries: Vec<(RequestHandle, SimTime)> = self
            .iter()
            .map(|(handle, request)| (handle, request.deadline))
            .collect();
        match order {
            DeadlineOrder::Earliest => entries.sort_by(|a, b| a.1.total_cmp(&b.1)),
            DeadlineOrder::Latest => entries.sort_by(|a, b| b.1.total_cmp(&a.1)),
        }
        entries.into_iter().map(|(handle, _)| handle).collect()
    }

    /// Live requests of one node, in queue order
    pub fn for_requester(&self, requester_id: usize) -> Vec<RequestHandle> {
        self.iter()
            .filter(|(_, request)| request.requester_id == requester_id)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// True if the node still has a live request
    pub fn has_requester(&self, requester_id: usize) -> bool {
        self.iter()
            .any(|(_, request)| request.requester_id == requester_id)
    }

    /// Handles of requests whose deadline is strictly before `now`
    pub fn expired_at(&self, now: SimTime) -> Vec<RequestHandle> {
        self.iter()
            .filter(|(_, request)| request.is_expired_at(now))
            .map(|(handle, _)| handle)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::class::TrafficClass;

    fn request(requester_id: usize, deadline: SimTime, sequence: u64) -> Arrival {
        Arrival::new(TrafficClass::A, 0.0, deadline, requester_id, sequence)
    }

    #[test]
    fn test_new_requests_go_to_front() {
        let mut queue = PendingQueue::new();
        queue.push_front(request(0, 5.0, 1));
        queue.push_front(request(1, 5.0, 2));
        queue.push_front(request(2, 5.0, 3));

        let sequences: Vec<u64> = queue.iter().map(|(_, r)| r.sequence).collect();
        assert_eq!(sequences, vec![3, 2, 1]);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut queue = PendingQueue::new();
        let first = queue.push_front(request(0, 5.0, 1));
        assert!(queue.remove(first).is_some());

        let second = queue.push_front(request(1, 6.0, 2));
        assert_eq!(first.index, second.index, "slot should be reused");
        assert!(queue.get(first).is_none());
        assert!(queue.remove(first).is_none());
        assert_eq!(queue.get(second).map(|r| r.requester_id), Some(1));
    }

    #[test]
    fn test_deadline_sort_is_stable() {
        let mut queue = PendingQueue::new();
        let older = queue.push_front(request(0, 7.0, 1));
        let newer = queue.push_front(request(1, 7.0, 2));
        let latest_deadline = queue.push_front(request(2, 9.0, 3));

        assert_eq!(
            queue.by_deadline(DeadlineOrder::Earliest),
            vec![newer, older, latest_deadline]
        );
        assert_eq!(
            queue.by_deadline(DeadlineOrder::Latest),
            vec![latest_deadline, newer, older]
        );
    }

    #[test]
    fn test_expired_at_is_strict() {
        let mut queue = PendingQueue::new();
        let expired = queue.push_front(request(0, 4.0, 1));
        queue.push_front(request(1, 5.0, 2));

        assert_eq!(queue.expired_at(5.0), vec![expired]);
    }

    #[test]
    fn test_for_requester() {
        let mut queue = PendingQueue::new();
        let a1 = queue.push_front(request(0, 4.0, 1));
        queue.push_front(request(1, 5.0, 2));
        let a2 = queue.push_front(request(0, 6.0, 3));

        assert_eq!(queue.for_requester(0), vec![a2, a1]);
        assert!(queue.has_requester(1));
        assert!(!queue.has_requester(2));
    }
}
