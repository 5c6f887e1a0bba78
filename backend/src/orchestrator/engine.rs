//! Simulation Engine
//!
//! Discrete-event loop driving one run:
//!
//! ```text
//! priming: arm every node's first arrival and the first frame boundary
//! loop until clock >= horizon:
//!     pop earliest event, advance clock to its time
//!     Arrival(class, node):
//!         count arrival, queue request at the head, mark node active,
//!         arm the node's next arrival
//!     FrameBoundary:
//!         1. expire requests whose deadline is before now (failed outcome)
//!         2. run one allocation pass with the full pilot budget
//!         3. arm the next frame boundary
//! ```
//!
//! Exactly one frame boundary is live in the clock at any time, so the
//! clock never runs dry before the horizon.
//!
//! # Example
//!
//! ```rust
//! use pilot_simulator_core_rs::orchestrator::{RunParams, Simulation, SimulationConfig};
//!
//! let mut config = SimulationConfig::default();
//! config.horizon = 200.0;
//!
//! let params = RunParams {
//!     class_a_nodes: 5,
//!     class_b_nodes: 20,
//!     policy: Some("RRN_RRQ".to_string()),
//!     seed: 12345,
//!     ..RunParams::default()
//! };
//!
//! let mut sim = Simulation::new(&config, &params).unwrap();
//! let summary = sim.run().unwrap();
//! assert_eq!(summary.policy, "RRN_RRQ");
//! assert!(summary.final_time >= 200.0);
//! ```

use crate::core::clock::{ClockError, EventClock};
use crate::core::time::{SimTime, TimeManager};
use crate::models::{Arrival, Event, PendingQueue, PerClass, Slice, TrafficClass};
use crate::orchestrator::config::{resolve, ConfigError, ResolvedRun, RunParams, SimulationConfig};
use crate::orchestrator::fingerprint::run_fingerprint;
use crate::policy::{AllocationOutcome, AllocationPolicy, Frame, Scheduler};
use crate::reporting::{ClassSummary, RunSummary, SimulationStats, TraceEntry, TraceLog, TraceSink};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Errors that can stop a run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// What a single `step` did
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// A request entered its class's pending queue
    Arrival {
        time: SimTime,
        class: TrafficClass,
        requester_id: usize,
    },

    /// A frame boundary was handled
    Frame {
        time: SimTime,
        frame: u64,
        /// Requests dropped for missing their deadline
        expired: PerClass<u32>,
        allocation: AllocationOutcome,
    },
}

/// One simulation run
///
/// Generic over the trace sink; the default `TraceLog` keeps every outcome
/// in memory and backs `run` / `summary`.
pub struct Simulation<S: TraceSink = TraceLog> {
    run: ResolvedRun,
    config_hash: String,
    time: TimeManager,
    clock: EventClock,
    slices: PerClass<Slice>,
    queues: PerClass<PendingQueue>,
    scheduler: Scheduler,
    stats: SimulationStats,
    /// Next sequence number handed out per class
    next_sequence: PerClass<u64>,
    sink: S,
}

impl Simulation<TraceLog> {
    /// Create a run that records outcomes in a `TraceLog`
    pub fn new(config: &SimulationConfig, params: &RunParams) -> Result<Self, SimulationError> {
        Self::with_sink(config, params, TraceLog::new())
    }

    /// Run to the horizon and summarize
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        self.run_to_horizon()?;
        Ok(self.summary())
    }

    /// Summary of the run so far
    pub fn summary(&self) -> RunSummary {
        let classes = PerClass::from_fn(|class| self.sink.summary(class));
        self.summarize(classes)
    }
}

impl<S: TraceSink> Simulation<S> {
    /// Create a run reporting outcomes to `sink`
    ///
    /// Validates the configuration, builds both slices and primes the clock.
    /// Fails before any event exists if anything is misconfigured.
    pub fn with_sink(
        config: &SimulationConfig,
        params: &RunParams,
        sink: S,
    ) -> Result<Self, SimulationError> {
        let run = resolve(config, params)?;
        let config_hash = run_fingerprint(config, params)?;

        let slices = PerClass::from_fn(|class| {
            let profile = &run.classes[class];
            Slice::homogeneous(
                class,
                profile.population,
                profile.resource_cost,
                profile.deadline_span,
                &profile.arrival,
                run.seed,
            )
        });

        let mut sim = Self {
            time: TimeManager::new(run.frame_length, run.horizon),
            clock: EventClock::new(),
            slices,
            queues: PerClass::default(),
            scheduler: Scheduler::new(run.policy, run.superframe),
            stats: SimulationStats::new(),
            next_sequence: PerClass::new(1, 1),
            sink,
            run,
            config_hash,
        };
        sim.prime();

        info!(
            policy = %sim.run.policy,
            class_a_nodes = sim.run.classes.a.population,
            class_b_nodes = sim.run.classes.b.population,
            pilots = sim.run.pilots_per_frame,
            horizon = sim.run.horizon,
            seed = sim.run.seed,
            "simulation initialized"
        );

        Ok(sim)
    }

    fn prime(&mut self) {
        for class in TrafficClass::ALL {
            for requester_id in 0..self.slices[class].len() {
                let delay = self.slices[class].node_mut(requester_id).next_delay();
                self.arm_arrival(class, requester_id, delay);
            }
        }
        self.clock
            .push(Event::frame_boundary(self.time.next_frame_time(), 0));
    }

    fn arm_arrival(&mut self, class: TrafficClass, requester_id: usize, time: SimTime) {
        let deadline = time + self.slices[class].node(requester_id).deadline_span();
        let sequence = self.next_sequence[class];
        self.next_sequence[class] += 1;
        self.clock.push(Event::Arrival(Arrival::new(
            class,
            time,
            deadline,
            requester_id,
            sequence,
        )));
    }

    // ========================================================================
    // Main Loop
    // ========================================================================

    /// Process the next event
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        let event = self.clock.pop()?;
        self.time.advance_to(event.time());

        let outcome = match event {
            Event::Arrival(arrival) => self.handle_arrival(arrival),
            Event::FrameBoundary { frame, .. } => self.handle_frame(frame),
        };
        Ok(outcome)
    }

    /// Step until the clock reaches the horizon
    ///
    /// The event that crosses the horizon is still handled.
    pub fn run_to_horizon(&mut self) -> Result<(), SimulationError> {
        while !self.time.is_finished() {
            self.step()?;
        }

        info!(
            policy = %self.run.policy,
            final_time = self.time.now(),
            frames = self.stats.frames,
            arrivals_a = self.stats.class(TrafficClass::A).arrivals,
            missed_a = self.stats.class(TrafficClass::A).missed,
            arrivals_b = self.stats.class(TrafficClass::B).arrivals,
            missed_b = self.stats.class(TrafficClass::B).missed,
            "simulation finished"
        );
        Ok(())
    }

    fn handle_arrival(&mut self, arrival: Arrival) -> StepOutcome {
        let now = self.time.now();
        let class = arrival.class;
        let requester_id = arrival.requester_id;

        self.stats.record_arrival(class);
        self.queues[class].push_front(arrival);

        let node = self.slices[class].node_mut(requester_id);
        node.set_active(true);
        let delay = node.next_delay();
        self.arm_arrival(class, requester_id, now + delay);

        trace!(%class, requester_id, time = now, deadline = arrival.deadline, "arrival");

        StepOutcome::Arrival {
            time: now,
            class,
            requester_id,
        }
    }

    fn handle_frame(&mut self, frame_index: u64) -> StepOutcome {
        let now = self.time.now();

        let expired = PerClass::from_fn(|class| self.expire(class, now));
        if expired.a > 0 || expired.b > 0 {
            debug!(time = now, expired_a = expired.a, expired_b = expired.b, "deadlines missed");
        }

        let mut frame = Frame::new(
            now,
            self.run.pilots_per_frame,
            &mut self.queues,
            &mut self.slices,
            &mut self.stats,
            &mut self.sink,
        );
        self.scheduler.allocate(&mut frame);
        let allocation = frame.finish();

        self.time.record_frame();
        self.stats.record_frame();
        self.clock
            .push(Event::frame_boundary(self.time.next_frame_time(), frame_index + 1));

        StepOutcome::Frame {
            time: now,
            frame: frame_index,
            expired,
            allocation,
        }
    }

    /// Drop every request of `class` whose deadline is before `now`
    fn expire(&mut self, class: TrafficClass, now: SimTime) -> u32 {
        let mut dropped = 0;
        for handle in self.queues[class].expired_at(now) {
            let Some(request) = self.queues[class].remove(handle) else {
                continue;
            };
            let still_pending = self.queues[class].has_requester(request.requester_id);
            self.slices[class]
                .node_mut(request.requester_id)
                .set_active(still_pending);

            self.stats.record_miss(class);
            self.sink.report(TraceEntry::retire(&request, now, false));
            dropped += 1;
        }
        dropped
    }

    fn summarize(&self, classes: PerClass<ClassSummary>) -> RunSummary {
        RunSummary {
            policy: self.run.policy.name().to_string(),
            populations: self.run.populations(),
            deadline_profile: self.run.classes.a.deadline_profile.clone(),
            reliability_profile: self.run.classes.a.reliability_profile.clone(),
            seed: self.run.seed,
            config_hash: self.config_hash.clone(),
            final_time: self.time.now(),
            stats: self.stats.clone(),
            classes,
            still_queued: PerClass::new(self.queues.a.len(), self.queues.b.len()),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current logical time
    pub fn now(&self) -> SimTime {
        self.time.now()
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.run.policy
    }

    /// Validated run description
    pub fn run_info(&self) -> &ResolvedRun {
        &self.run
    }

    /// SHA-256 of the configuration and run parameters
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn queue(&self, class: TrafficClass) -> &PendingQueue {
        &self.queues[class]
    }

    pub fn slice(&self, class: TrafficClass) -> &Slice {
        &self.slices[class]
    }

    pub fn clock(&self) -> &EventClock {
        &self.clock
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the run and return its sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::NullSink;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.horizon = 50.0;
        config
    }

    #[test]
    fn test_priming_arms_every_node_and_one_frame() {
        let params = RunParams {
            class_a_nodes: 3,
            class_b_nodes: 4,
            ..RunParams::default()
        };
        let sim = Simulation::new(&small_config(), &params).unwrap();

        assert_eq!(sim.clock().len(), 8);
        assert_eq!(sim.clock().frame_boundaries(), 1);
        assert_eq!(sim.now(), 0.0);
    }

    #[test]
    fn test_unknown_policy_fails_before_run() {
        let params = RunParams {
            policy: Some("EDF".to_string()),
            ..RunParams::default()
        };
        let err = Simulation::new(&small_config(), &params).err().unwrap();
        assert_eq!(
            err,
            SimulationError::Config(ConfigError::UnknownPolicy("EDF".to_string()))
        );
    }

    #[test]
    fn test_frame_boundary_stays_unique() {
        let params = RunParams {
            class_a_nodes: 2,
            class_b_nodes: 2,
            policy: Some("RRQ_FCFS".to_string()),
            ..RunParams::default()
        };
        let mut sim = Simulation::with_sink(&small_config(), &params, NullSink).unwrap();
        for _ in 0..100 {
            sim.step().unwrap();
            assert_eq!(sim.clock().frame_boundaries(), 1);
        }
    }

    #[test]
    fn test_empty_populations_only_tick_frames() {
        let mut sim = Simulation::new(&small_config(), &RunParams::default()).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.stats.frames, 50);
        assert_eq!(summary.final_time, 50.0);
        assert_eq!(summary.classes.a.reported, 0);
    }
}
