//! Outcome reporting: the trace sink, run counters and summaries

pub mod stats;
pub mod summary;
pub mod trace;

pub use stats::{ClassCounters, SimulationStats};
pub use summary::{ClassSummary, RunSummary, WaitStatistics};
pub use trace::{NullSink, TraceEntry, TraceLog, TraceSink};
