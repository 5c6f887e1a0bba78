//! Queue-unaware round robin
//!
//! The RRN policies cannot see per-node queues. Instead they grant a pilot
//! slot to consecutive class-A *nodes*, starting from a cursor that persists
//! across frames and returns to node 0 once per superframe. Grants are
//! charged against the budget whether or not the node has anything queued.
//!
//! After class B has been served, `resolve_overlaps` turns grants into
//! served requests. A granted node with several live requests (its previous
//! request has not expired yet) gets only the earliest-deadline one; the
//! others wait for a later grant.

use crate::models::TrafficClass;
use crate::policy::Frame;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Persistent position of the queue-unaware round robin
///
/// # Example
/// ```
/// use pilot_simulator_core_rs::policy::RoundRobinCursor;
///
/// let cursor = RoundRobinCursor::new(10);
/// assert_eq!(cursor.position(), 0);
/// assert_eq!(cursor.superframe(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRobinCursor {
    /// Next node index to consider
    position: usize,
    /// Allocation passes seen so far
    frames_seen: u64,
    /// Passes between cursor resets
    superframe: u64,
}

impl RoundRobinCursor {
    /// New cursor at node 0 (a zero superframe is treated as 1)
    pub fn new(superframe: u64) -> Self {
        Self {
            position: 0,
            frames_seen: 0,
            superframe: superframe.max(1),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn superframe(&self) -> u64 {
        self.superframe
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Grant slots to consecutive nodes of `class` while the budget allows
    ///
    /// The scan stops at the first node whose cost does not fit, or at the
    /// end of the pool; it never wraps around within a superframe. Returns
    /// the number of nodes granted.
    pub fn grant(&mut self, frame: &mut Frame<'_>, class: TrafficClass) -> usize {
        if self.frames_seen % self.superframe == 0 {
            self.position = 0;
        }
        self.frames_seen += 1;

        let mut granted = 0;
        while self.position < frame.slice(class).len() {
            let cost = frame.slice(class).node(self.position).resource_cost();
            if !frame.take_pilots(cost) {
                break;
            }
            frame.slice_mut(class).node_mut(self.position).assign();
            self.position += 1;
            granted += 1;
        }
        granted
    }
}

/// Serve at most one request per granted node of `class`, then drop grants
///
/// Pilots were already charged by `RoundRobinCursor::grant`.
pub fn resolve_overlaps(frame: &mut Frame<'_>, class: TrafficClass) {
    let assigned: Vec<usize> = frame
        .queue(class)
        .iter()
        .map(|(_, request)| request.requester_id)
        .filter(|id| frame.slice(class).node(*id).is_assigned())
        .collect();

    let mut considered = HashSet::new();
    for requester_id in assigned {
        if !considered.insert(requester_id) {
            continue;
        }
        let queue = frame.queue(class);
        let earliest = queue
            .for_requester(requester_id)
            .into_iter()
            .filter_map(|handle| queue.get(handle).map(|request| (handle, request.deadline)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle);

        if let Some(handle) = earliest {
            frame.serve(class, handle);
        }
    }

    frame.slice_mut(class).clear_assignments();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrivals::InterArrivalConfig;
    use crate::models::{Arrival, PendingQueue, PerClass, Slice};
    use crate::reporting::{SimulationStats, TraceLog};

    fn slices(population_a: usize, cost: u32) -> PerClass<Slice> {
        let config = InterArrivalConfig::default();
        PerClass::new(
            Slice::homogeneous(TrafficClass::A, population_a, cost, 10.0, &config, 5),
            Slice::homogeneous(TrafficClass::B, 0, 1, 100.0, &config, 5),
        )
    }

    #[test]
    fn test_cursor_advances_across_frames_and_resets() {
        let mut queues = PerClass::<PendingQueue>::default();
        let mut slices = slices(5, 2);
        let mut stats = SimulationStats::new();
        let mut log = TraceLog::new();
        let mut cursor = RoundRobinCursor::new(2);

        let mut frame = Frame::new(1.0, 4, &mut queues, &mut slices, &mut stats, &mut log);
        assert_eq!(cursor.grant(&mut frame, TrafficClass::A), 2);
        resolve_overlaps(&mut frame, TrafficClass::A);
        frame.finish();
        assert_eq!(cursor.position(), 2);

        let mut frame = Frame::new(2.0, 4, &mut queues, &mut slices, &mut stats, &mut log);
        assert_eq!(cursor.grant(&mut frame, TrafficClass::A), 2);
        assert!(frame.slice(TrafficClass::A).node(3).is_assigned());
        resolve_overlaps(&mut frame, TrafficClass::A);
        frame.finish();
        assert_eq!(cursor.position(), 4);

        // third pass starts a new superframe
        let mut frame = Frame::new(3.0, 4, &mut queues, &mut slices, &mut stats, &mut log);
        cursor.grant(&mut frame, TrafficClass::A);
        assert!(frame.slice(TrafficClass::A).node(0).is_assigned());
        resolve_overlaps(&mut frame, TrafficClass::A);
        frame.finish();
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_superframe_of_one_resets_every_pass() {
        let mut queues = PerClass::<PendingQueue>::default();
        let mut slices = slices(3, 1);
        let mut stats = SimulationStats::new();
        let mut log = TraceLog::new();
        let mut cursor = RoundRobinCursor::new(1);

        for now in [1.0, 2.0, 3.0] {
            let mut frame = Frame::new(now, 2, &mut queues, &mut slices, &mut stats, &mut log);
            cursor.grant(&mut frame, TrafficClass::A);
            assert!(frame.slice(TrafficClass::A).node(0).is_assigned());
            resolve_overlaps(&mut frame, TrafficClass::A);
            frame.finish();
        }
    }

    #[test]
    fn test_overlap_serves_earliest_and_keeps_node_active() {
        let mut queues = PerClass::<PendingQueue>::default();
        let mut slices = slices(2, 1);
        let mut stats = SimulationStats::new();
        let mut log = TraceLog::new();

        queues.a.push_front(Arrival::new(TrafficClass::A, 0.0, 9.0, 0, 1));
        queues.a.push_front(Arrival::new(TrafficClass::A, 3.0, 12.0, 0, 2));
        queues.a.push_front(Arrival::new(TrafficClass::A, 3.0, 13.0, 1, 1));
        slices.a.node_mut(0).set_active(true);
        slices.a.node_mut(0).assign();

        let mut frame = Frame::new(4.0, 5, &mut queues, &mut slices, &mut stats, &mut log);
        resolve_overlaps(&mut frame, TrafficClass::A);
        let outcome = frame.finish();

        assert_eq!(outcome.served.a, 1);
        assert_eq!(log.entries()[0].sequence, 1);
        assert!(slices.a.node(0).is_active());
        assert!(!slices.a.node(0).is_assigned());
        // node 1 was never granted
        assert_eq!(queues.a.for_requester(1).len(), 1);
        assert_eq!(queues.a.len(), 2);
    }
}
