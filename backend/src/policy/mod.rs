//! Pilot Allocation Policy Module
//!
//! Once per frame the active policy decides which pending requests receive
//! pilots. The per-frame pilot budget is shared by both classes; class A is
//! always considered first, class B gets whatever is left. Except for the
//! queue-unaware grants, a class-A request that does not fit ends the pass.
//!
//! # Policies
//!
//! Names follow `<class A discipline>_<class B discipline>`:
//!
//! 1. **FCFS_FCFS**: earliest deadline first for both classes
//! 2. **RRQ_RRQ**: round robin over nodes, draining each node's queue
//! 3. **RRQ_FCFS**: round robin for class A, latest deadline first for class B
//! 4. **RRN_FCFS**: round robin *without* queue visibility for class A
//!    (grants go to nodes, not requests), latest deadline first for class B
//! 5. **RRN_RRQ**: queue-unaware round robin for class A, queue-draining
//!    round robin for class B
//!
//! The queue-unaware variants finish with overlap resolution, which turns
//! node grants into served requests (see `no_queue`).
//!
//! # Budget
//!
//! Every pilot taken from the frame budget goes through `Budget::try_take`,
//! which refuses a request that does not fit instead of going negative. A
//! request that does not fit stays queued for a later frame.
//!
//! # Example
//!
//! ```rust
//! use pilot_simulator_core_rs::policy::AllocationPolicy;
//!
//! let policy: AllocationPolicy = "RRN_FCFS".parse().unwrap();
//! assert!(policy.is_queue_unaware());
//! assert!("FCFS_RRQ".parse::<AllocationPolicy>().is_err());
//! ```

pub mod fcfs;
pub mod no_queue;
pub mod round_robin;

use crate::core::time::SimTime;
use crate::models::{DeadlineOrder, PendingQueue, PerClass, RequestHandle, Slice, TrafficClass};
use crate::orchestrator::config::ConfigError;
use crate::reporting::{SimulationStats, TraceEntry, TraceSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub use no_queue::RoundRobinCursor;

/// The five allocation disciplines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllocationPolicy {
    #[serde(rename = "FCFS_FCFS")]
    FcfsFcfs,
    #[serde(rename = "RRQ_RRQ")]
    RrqRrq,
    #[serde(rename = "RRQ_FCFS")]
    RrqFcfs,
    #[serde(rename = "RRN_FCFS")]
    RrnFcfs,
    #[serde(rename = "RRN_RRQ")]
    RrnRrq,
}

impl AllocationPolicy {
    pub const ALL: [AllocationPolicy; 5] = [
        AllocationPolicy::FcfsFcfs,
        AllocationPolicy::RrqRrq,
        AllocationPolicy::RrqFcfs,
        AllocationPolicy::RrnFcfs,
        AllocationPolicy::RrnRrq,
    ];

    /// Configuration name of the policy
    pub fn name(self) -> &'static str {
        match self {
            AllocationPolicy::FcfsFcfs => "FCFS_FCFS",
            AllocationPolicy::RrqRrq => "RRQ_RRQ",
            AllocationPolicy::RrqFcfs => "RRQ_FCFS",
            AllocationPolicy::RrnFcfs => "RRN_FCFS",
            AllocationPolicy::RrnRrq => "RRN_RRQ",
        }
    }

    /// True for the policies that grant pilots to nodes rather than requests
    pub fn is_queue_unaware(self) -> bool {
        matches!(self, AllocationPolicy::RrnFcfs | AllocationPolicy::RrnRrq)
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AllocationPolicy {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        AllocationPolicy::ALL
            .into_iter()
            .find(|policy| policy.name() == name)
            .ok_or_else(|| ConfigError::UnknownPolicy(name.to_string()))
    }
}

/// Pilots still available in the current frame
///
/// Unsigned on purpose: a pass can never leave a negative budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    total: u32,
    remaining: u32,
}

impl Budget {
    /// Fresh budget for one frame
    pub fn new(total: u32) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    /// Take `cost` pilots if they are available
    ///
    /// # Example
    /// ```
    /// use pilot_simulator_core_rs::policy::Budget;
    ///
    /// let mut budget = Budget::new(5);
    /// assert!(budget.try_take(3));
    /// assert!(!budget.try_take(3));
    /// assert_eq!(budget.remaining(), 2);
    /// ```
    pub fn try_take(&mut self, cost: u32) -> bool {
        if cost <= self.remaining {
            self.remaining -= cost;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn used(&self) -> u32 {
        self.total - self.remaining
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining > 0
    }
}

/// Whether a serving loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Every candidate was served
    Continue,
    /// A candidate did not fit in the remaining budget
    Exhausted,
}

/// Result of one allocation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Requests served per class
    pub served: PerClass<u32>,
    /// Sum of the pilot costs of served requests
    pub pilots_served: u32,
    /// Pilots taken from the budget (grants included)
    pub pilots_used: u32,
    /// Pilots left unused at the end of the pass
    pub pilots_left: u32,
}

/// Everything one allocation pass may touch
///
/// Built by the engine at every frame boundary; tests can build one
/// directly to drive a single pass.
pub struct Frame<'a> {
    now: SimTime,
    budget: Budget,
    queues: &'a mut PerClass<PendingQueue>,
    slices: &'a mut PerClass<Slice>,
    stats: &'a mut SimulationStats,
    sink: &'a mut dyn TraceSink,
    outcome: AllocationOutcome,
}

impl<'a> Frame<'a> {
    pub fn new(
        now: SimTime,
        pilots: u32,
        queues: &'a mut PerClass<PendingQueue>,
        slices: &'a mut PerClass<Slice>,
        stats: &'a mut SimulationStats,
        sink: &'a mut dyn TraceSink,
    ) -> Self {
        Self {
            now,
            budget: Budget::new(pilots),
            queues,
            slices,
            stats,
            sink,
            outcome: AllocationOutcome::default(),
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn queue(&self, class: TrafficClass) -> &PendingQueue {
        &self.queues[class]
    }

    pub fn slice(&self, class: TrafficClass) -> &Slice {
        &self.slices[class]
    }

    pub(crate) fn slice_mut(&mut self, class: TrafficClass) -> &mut Slice {
        &mut self.slices[class]
    }

    pub(crate) fn take_pilots(&mut self, cost: u32) -> bool {
        self.budget.try_take(cost)
    }

    /// Pilot cost of a queued request, `None` if it is gone
    pub fn request_cost(&self, class: TrafficClass, handle: RequestHandle) -> Option<u32> {
        self.queues[class]
            .get(handle)
            .map(|request| self.slices[class].node(request.requester_id).resource_cost())
    }

    /// Charge the budget for a request and serve it if it fits
    pub(crate) fn try_serve(&mut self, class: TrafficClass, handle: RequestHandle) -> Flow {
        let Some(cost) = self.request_cost(class, handle) else {
            return Flow::Continue;
        };
        if !self.take_pilots(cost) {
            return Flow::Exhausted;
        }
        self.serve(class, handle);
        Flow::Continue
    }

    /// Retire a request as served without touching the budget
    ///
    /// Used when the pilots were already charged by a node grant.
    pub(crate) fn serve(&mut self, class: TrafficClass, handle: RequestHandle) -> bool {
        let Some(request) = self.queues[class].remove(handle) else {
            return false;
        };
        let still_pending = self.queues[class].has_requester(request.requester_id);
        let node = self.slices[class].node_mut(request.requester_id);
        node.set_active(still_pending);
        let cost = node.resource_cost();

        self.stats.record_service(class);
        self.sink.report(TraceEntry::retire(&request, self.now, true));
        self.outcome.served[class] += 1;
        self.outcome.pilots_served += cost;
        true
    }

    /// Close the pass and return what it did
    pub fn finish(mut self) -> AllocationOutcome {
        self.outcome.pilots_used = self.budget.used();
        self.outcome.pilots_left = self.budget.remaining();
        self.outcome
    }
}

/// Active policy plus the state it carries across frames
#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: AllocationPolicy,
    cursor: RoundRobinCursor,
}

impl Scheduler {
    /// Create a scheduler
    ///
    /// `superframe` is the number of frames after which the queue-unaware
    /// round-robin cursor returns to node 0; other policies ignore it.
    pub fn new(policy: AllocationPolicy, superframe: u64) -> Self {
        Self {
            policy,
            cursor: RoundRobinCursor::new(superframe),
        }
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    pub fn cursor(&self) -> &RoundRobinCursor {
        &self.cursor
    }

    /// Run one allocation pass over `frame`
    pub fn allocate(&mut self, frame: &mut Frame<'_>) {
        use TrafficClass::{A, B};

        match self.policy {
            AllocationPolicy::FcfsFcfs => {
                if fcfs::serve_by_deadline(frame, A, DeadlineOrder::Earliest) == Flow::Exhausted {
                    return;
                }
                if frame.budget().has_remaining() {
                    fcfs::serve_by_deadline(frame, B, DeadlineOrder::Earliest);
                }
            }
            AllocationPolicy::RrqRrq => {
                if round_robin::drain_per_node(frame, A) == Flow::Exhausted {
                    return;
                }
                if frame.budget().has_remaining() {
                    round_robin::drain_per_node(frame, B);
                }
            }
            AllocationPolicy::RrqFcfs => {
                if round_robin::drain_per_node(frame, A) == Flow::Exhausted {
                    return;
                }
                if frame.budget().has_remaining() {
                    fcfs::serve_by_deadline(frame, B, DeadlineOrder::Latest);
                }
            }
            AllocationPolicy::RrnFcfs => {
                self.cursor.grant(frame, A);
                if frame.budget().has_remaining() {
                    fcfs::serve_by_deadline(frame, B, DeadlineOrder::Latest);
                }
                no_queue::resolve_overlaps(frame, A);
            }
            AllocationPolicy::RrnRrq => {
                self.cursor.grant(frame, A);
                if frame.budget().has_remaining() {
                    round_robin::drain_per_node(frame, B);
                }
                no_queue::resolve_overlaps(frame, A);
            }
        }

        debug!(
            policy = %self.policy,
            time = frame.now(),
            pilots_left = frame.budget().remaining(),
            served_a = frame.outcome.served.a,
            served_b = frame.outcome.served.b,
            "allocation pass"
        );
    }
}
