//! Event clock: the priority queue of pending simulation events
//!
//! Events are popped in ascending `time`. Events scheduled for the same time
//! pop in the order they were pushed (FIFO), using an insertion counter as
//! the secondary key so that replays are bit-for-bit reproducible.

use crate::core::time::SimTime;
use crate::models::event::Event;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

/// Errors raised by the event clock
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClockError {
    #[error("event clock is empty")]
    EmptyClock,
}

/// An event together with its position in the schedule
#[derive(Debug, Clone)]
struct ScheduledEvent {
    time: SimTime,
    insertion: u64,
    event: Event,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse both keys so the earliest time,
        // then the earliest insertion, sits on top.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.insertion.cmp(&self.insertion))
    }
}

/// Priority queue of future events ordered by logical time
///
/// # Example
/// ```
/// use pilot_simulator_core_rs::core::clock::EventClock;
/// use pilot_simulator_core_rs::models::Event;
///
/// let mut clock = EventClock::new();
/// clock.push(Event::frame_boundary(2.0, 1));
/// clock.push(Event::frame_boundary(1.0, 0));
///
/// assert_eq!(clock.pop().unwrap().time(), 1.0);
/// assert_eq!(clock.pop().unwrap().time(), 2.0);
/// assert!(clock.pop().is_err());
/// ```
#[derive(Debug, Default)]
pub struct EventClock {
    heap: BinaryHeap<ScheduledEvent>,
    next_insertion: u64,
}

impl EventClock {
    /// Create an empty clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at its own `time()`
    pub fn push(&mut self, event: Event) {
        let scheduled = ScheduledEvent {
            time: event.time(),
            insertion: self.next_insertion,
            event,
        };
        self.next_insertion += 1;
        self.heap.push(scheduled);
    }

    /// Remove and return the earliest event
    ///
    /// # Errors
    /// `ClockError::EmptyClock` if nothing is scheduled.
    pub fn pop(&mut self) -> Result<Event, ClockError> {
        self.heap
            .pop()
            .map(|scheduled| scheduled.event)
            .ok_or(ClockError::EmptyClock)
    }

    /// Time of the earliest scheduled event, if any
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|scheduled| scheduled.time)
    }

    /// Number of scheduled events
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of scheduled frame-boundary events
    pub fn frame_boundaries(&self) -> usize {
        self.heap
            .iter()
            .filter(|scheduled| scheduled.event.is_frame_boundary())
            .count()
    }
}
