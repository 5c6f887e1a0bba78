//! Simulation events.
//!
//! Two things can happen on the logical clock:
//! - **Arrival**: a node of one traffic class issues a request for pilots.
//!   The request carries an absolute deadline and is held in its class's
//!   pending queue until it is served or expires.
//! - **FrameBoundary**: the periodic tick at which expired requests are
//!   dropped and one allocation pass runs.
//!
//! Events are immutable once created. An arrival lives either in the event
//! clock (not yet happened) or in a pending queue (waiting for pilots); it is
//! retired exactly once, when served or expired.
//!
//! # Example
//!
//! ```rust
//! use pilot_simulator_core_rs::models::{Arrival, Event, EventKind, TrafficClass};
//!
//! let event = Event::Arrival(Arrival::new(TrafficClass::A, 3.5, 13.5, 7, 42));
//! assert_eq!(event.kind(), EventKind::Arrival(TrafficClass::A));
//! assert_eq!(event.time(), 3.5);
//! assert_eq!(event.deadline(), Some(13.5));
//! assert_eq!(event.requester_id(), Some(7));
//! ```

use crate::core::time::SimTime;
use crate::models::class::TrafficClass;
use serde::{Deserialize, Serialize};

/// Discriminant of an `Event`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Arrival(TrafficClass),
    FrameBoundary,
}

/// A request for pilots issued by one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrival {
    /// Traffic class of the issuing node
    pub class: TrafficClass,
    /// Time the request enters the system
    pub time: SimTime,
    /// Absolute time after which the request is lost
    pub deadline: SimTime,
    /// Index of the issuing node in its class's slice
    pub requester_id: usize,
    /// Per-class sequence number, used only for outcome reporting
    pub sequence: u64,
}

impl Arrival {
    pub fn new(
        class: TrafficClass,
        time: SimTime,
        deadline: SimTime,
        requester_id: usize,
        sequence: u64,
    ) -> Self {
        Self {
            class,
            time,
            deadline,
            requester_id,
            sequence,
        }
    }

    /// True once `now` is strictly past the deadline
    pub fn is_expired_at(&self, now: SimTime) -> bool {
        self.deadline < now
    }
}

/// Scheduled occurrence on the logical clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A node issues a request
    Arrival(Arrival),

    /// Periodic allocation tick
    FrameBoundary {
        time: SimTime,
        /// Index of this frame (0 for the first boundary of a run)
        frame: u64,
    },
}

impl Event {
    /// Create a frame-boundary event
    pub fn frame_boundary(time: SimTime, frame: u64) -> Self {
        Event::FrameBoundary { time, frame }
    }

    /// Scheduled logical time
    pub fn time(&self) -> SimTime {
        match self {
            Event::Arrival(arrival) => arrival.time,
            Event::FrameBoundary { time, .. } => *time,
        }
    }

    /// Kind of event
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Arrival(arrival) => EventKind::Arrival(arrival.class),
            Event::FrameBoundary { .. } => EventKind::FrameBoundary,
        }
    }

    /// Absolute deadline (arrivals only)
    pub fn deadline(&self) -> Option<SimTime> {
        match self {
            Event::Arrival(arrival) => Some(arrival.deadline),
            Event::FrameBoundary { .. } => None,
        }
    }

    /// Issuing node (arrivals only)
    pub fn requester_id(&self) -> Option<usize> {
        match self {
            Event::Arrival(arrival) => Some(arrival.requester_id),
            Event::FrameBoundary { .. } => None,
        }
    }

    /// Per-class sequence for arrivals, frame index for boundaries
    pub fn sequence(&self) -> u64 {
        match self {
            Event::Arrival(arrival) => arrival.sequence,
            Event::FrameBoundary { frame, .. } => *frame,
        }
    }

    pub fn is_frame_boundary(&self) -> bool {
        matches!(self, Event::FrameBoundary { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_boundary_has_no_request_fields() {
        let event = Event::frame_boundary(4.0, 3);
        assert_eq!(event.kind(), EventKind::FrameBoundary);
        assert_eq!(event.deadline(), None);
        assert_eq!(event.requester_id(), None);
        assert_eq!(event.sequence(), 3);
    }

    #[test]
    fn test_expiry_is_strict() {
        let arrival = Arrival::new(TrafficClass::B, 0.0, 5.0, 0, 1);
        assert!(!arrival.is_expired_at(5.0));
        assert!(arrival.is_expired_at(6.0));
    }
}
