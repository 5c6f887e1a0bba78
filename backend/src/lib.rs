//! Pilot Allocation Simulator Core - Rust Engine
//!
//! Discrete-event simulator of pilot-sequence allocation between two traffic
//! classes sharing a frame-slotted radio resource.
//!
//! # Architecture
//!
//! - **core**: Logical time and the event clock
//! - **models**: Domain types (Event, Node, Slice, PendingQueue)
//! - **arrivals**: Per-node inter-arrival generators
//! - **policy**: The five allocation policies
//! - **orchestrator**: Configuration and the main simulation loop
//! - **reporting**: Outcome trace, counters and summaries
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. One allocation pass never uses more pilots than the frame budget
//! 2. Every request is retired (served or expired) at most once
//! 3. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod arrivals;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod reporting;
pub mod rng;

// Re-exports for convenience
pub use arrivals::{ArrivalGenerator, InterArrivalConfig};
pub use core::{EventClock, SimTime, TimeManager};
pub use models::{Arrival, Event, Node, PendingQueue, PerClass, Slice, TrafficClass};
pub use orchestrator::{
    ConfigError, RunParams, Simulation, SimulationConfig, SimulationError, StepOutcome,
};
pub use policy::{AllocationPolicy, Scheduler};
pub use reporting::{RunSummary, SimulationStats, TraceEntry, TraceLog, TraceSink};
pub use rng::RngManager;
