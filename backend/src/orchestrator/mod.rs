//! Orchestrator - configuration and the discrete-event run loop
//!
//! See `engine.rs` for the loop itself and `config.rs` for validation.

pub mod config;
pub mod engine;
pub mod fingerprint;

// Re-export main types for convenience
pub use config::{
    resolve, ClassConfig, ConfigError, ResolvedClass, ResolvedRun, RunParams, SimulationConfig,
};
pub use engine::{Simulation, SimulationError, StepOutcome};
pub use fingerprint::run_fingerprint;
