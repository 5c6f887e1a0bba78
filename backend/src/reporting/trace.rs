//! Outcome trace.
//!
//! Every request that enters a pending queue is reported exactly once when it
//! is retired: `success = true` when it received pilots, `false` when its
//! deadline passed first. Requests still queued when the run stops are never
//! reported.
//!
//! `TraceSink` is the seam for custom writers; `TraceLog` is the in-memory
//! implementation used by default, with queries and per-class statistics.
//!
//! # Example
//!
//! ```rust
//! use pilot_simulator_core_rs::models::TrafficClass;
//! use pilot_simulator_core_rs::reporting::{TraceEntry, TraceLog, TraceSink};
//!
//! let mut log = TraceLog::new();
//! log.report(TraceEntry {
//!     class: TrafficClass::A,
//!     requester_id: 3,
//!     sequence: 17,
//!     arrival_time: 4.0,
//!     service_time: 6.0,
//!     success: true,
//! });
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.summary(TrafficClass::A).wait.mean, 2.0);
//! ```

use crate::core::time::SimTime;
use crate::models::{Arrival, TrafficClass};
use crate::reporting::summary::{ClassSummary, WaitStatistics};
use serde::{Deserialize, Serialize};

/// Outcome of one retired request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub class: TrafficClass,
    pub requester_id: usize,
    pub sequence: u64,
    /// Time the request entered its queue
    pub arrival_time: SimTime,
    /// Clock value when the request was served or dropped
    pub service_time: SimTime,
    pub success: bool,
}

impl TraceEntry {
    /// Build the entry for retiring `request` at `now`
    pub fn retire(request: &Arrival, now: SimTime, success: bool) -> Self {
        Self {
            class: request.class,
            requester_id: request.requester_id,
            sequence: request.sequence,
            arrival_time: request.time,
            service_time: now,
            success,
        }
    }

    /// Time spent waiting in the queue
    pub fn waiting_time(&self) -> SimTime {
        self.service_time - self.arrival_time
    }
}

/// Receiver of request outcomes
pub trait TraceSink {
    fn report(&mut self, entry: TraceEntry);
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn report(&mut self, entry: TraceEntry) {
        (**self).report(entry);
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn report(&mut self, _entry: TraceEntry) {}
}

/// In-memory trace of every retired request
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    entries: Vec<TraceEntry>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Entries of one class
    pub fn for_class(&self, class: TrafficClass) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(move |entry| entry.class == class)
    }

    /// Entries of one node
    pub fn for_requester(&self, class: TrafficClass, requester_id: usize) -> Vec<&TraceEntry> {
        self.for_class(class)
            .filter(|entry| entry.requester_id == requester_id)
            .collect()
    }

    /// Entries of one class with the given outcome
    pub fn with_outcome(&self, class: TrafficClass, success: bool) -> Vec<&TraceEntry> {
        self.for_class(class)
            .filter(|entry| entry.success == success)
            .collect()
    }

    /// Waiting-time statistics and loss rate for one class
    pub fn summary(&self, class: TrafficClass) -> ClassSummary {
        let mut served = 0u64;
        let mut failed = 0u64;
        let mut waits = Vec::new();

        for entry in self.for_class(class) {
            if entry.success {
                served += 1;
                waits.push(entry.waiting_time());
            } else {
                failed += 1;
            }
        }

        let reported = served + failed;
        let loss_rate = if reported == 0 {
            0.0
        } else {
            failed as f64 / reported as f64
        };

        ClassSummary {
            reported,
            served,
            failed,
            loss_rate,
            wait: WaitStatistics::from_samples(&waits),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl TraceSink for TraceLog {
    fn report(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }
}
