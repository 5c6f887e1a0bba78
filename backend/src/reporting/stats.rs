//! Run-level counters
//!
//! Owned by the engine and reset explicitly between runs.

use crate::models::{PerClass, TrafficClass};
use serde::{Deserialize, Serialize};

/// Counters for one traffic class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounters {
    /// Requests that entered the pending queue
    pub arrivals: u64,
    /// Requests dropped because their deadline passed
    pub missed: u64,
    /// Requests that received pilots
    pub served: u64,
}

/// Monotonic counters for a whole run
///
/// # Example
/// ```
/// use pilot_simulator_core_rs::models::TrafficClass;
/// use pilot_simulator_core_rs::reporting::SimulationStats;
///
/// let mut stats = SimulationStats::new();
/// stats.record_arrival(TrafficClass::A);
/// stats.record_miss(TrafficClass::A);
/// assert_eq!(stats.class(TrafficClass::A).missed, 1);
///
/// stats.reset();
/// assert_eq!(stats, SimulationStats::new());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub classes: PerClass<ClassCounters>,
    /// Frame boundaries handled
    pub frames: u64,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self, class: TrafficClass) -> &ClassCounters {
        &self.classes[class]
    }

    pub fn record_arrival(&mut self, class: TrafficClass) {
        self.classes[class].arrivals += 1;
    }

    pub fn record_miss(&mut self, class: TrafficClass) {
        self.classes[class].missed += 1;
    }

    pub fn record_service(&mut self, class: TrafficClass) {
        self.classes[class].served += 1;
    }

    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
