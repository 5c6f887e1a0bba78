//! Round robin with queue visibility
//!
//! Visits the nodes of a slice in pool order and drains each node's pending
//! requests before moving on. The pass stops at the first request that does
//! not fit; nodes after it get nothing this frame.

use crate::models::TrafficClass;
use crate::policy::{Flow, Frame};

/// Drain `class` node by node while the budget allows
pub fn drain_per_node(frame: &mut Frame<'_>, class: TrafficClass) -> Flow {
    for requester_id in 0..frame.slice(class).len() {
        let handles = frame.queue(class).for_requester(requester_id);
        for handle in handles {
            if frame.try_serve(class, handle) == Flow::Exhausted {
                return Flow::Exhausted;
            }
        }
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrivals::InterArrivalConfig;
    use crate::models::{Arrival, PendingQueue, PerClass, Slice};
    use crate::reporting::{SimulationStats, TraceLog};

    #[test]
    fn test_first_node_drained_before_second() {
        let config = InterArrivalConfig::default();
        let mut queues = PerClass::<PendingQueue>::default();
        let mut slices = PerClass::new(
            Slice::homogeneous(TrafficClass::A, 2, 2, 10.0, &config, 3),
            Slice::homogeneous(TrafficClass::B, 0, 1, 100.0, &config, 3),
        );
        let mut stats = SimulationStats::new();
        let mut log = TraceLog::new();

        queues.a.push_front(Arrival::new(TrafficClass::A, 0.0, 10.0, 1, 1));
        queues.a.push_front(Arrival::new(TrafficClass::A, 0.0, 10.0, 0, 2));
        queues.a.push_front(Arrival::new(TrafficClass::A, 0.5, 10.5, 0, 3));

        let mut frame = Frame::new(1.0, 4, &mut queues, &mut slices, &mut stats, &mut log);
        let flow = drain_per_node(&mut frame, TrafficClass::A);
        let outcome = frame.finish();

        assert_eq!(flow, Flow::Exhausted);
        assert_eq!(outcome.served.a, 2);
        assert_eq!(outcome.pilots_left, 0);
        assert!(log.entries().iter().all(|e| e.requester_id == 0));
        assert_eq!(queues.a.for_requester(1).len(), 1);
    }

    #[test]
    fn test_empty_queue_continues() {
        let config = InterArrivalConfig::default();
        let mut queues = PerClass::<PendingQueue>::default();
        let mut slices = PerClass::new(
            Slice::homogeneous(TrafficClass::A, 3, 1, 10.0, &config, 3),
            Slice::homogeneous(TrafficClass::B, 0, 1, 100.0, &config, 3),
        );
        let mut stats = SimulationStats::new();
        let mut log = TraceLog::new();

        let mut frame = Frame::new(1.0, 4, &mut queues, &mut slices, &mut stats, &mut log);
        assert_eq!(drain_per_node(&mut frame, TrafficClass::A), Flow::Continue);
        assert_eq!(frame.finish().pilots_left, 4);
    }
}
