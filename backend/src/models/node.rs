//! Traffic node (a single requester of pilots)
//!
//! A node's profile is fixed for the whole run:
//! - `resource_cost`: pilots consumed per successful service (from its
//!   reliability profile)
//! - `deadline_span`: time from arrival to expiry (from its latency profile)
//!
//! Only the `active` and `assigned` flags change while the run progresses.

use crate::arrivals::ArrivalGenerator;
use crate::core::time::SimTime;

/// A requester belonging to one slice
#[derive(Debug, Clone)]
pub struct Node {
    resource_cost: u32,
    deadline_span: SimTime,
    /// Has at least one unretired pending request
    active: bool,
    /// Granted a pilot slot in the current frame (queue-unaware policies only)
    assigned: bool,
    arrivals: ArrivalGenerator,
}

impl Node {
    /// Create a node
    ///
    /// # Panics
    /// Panics if `resource_cost` is zero or `deadline_span` is not positive.
    pub fn new(resource_cost: u32, deadline_span: SimTime, arrivals: ArrivalGenerator) -> Self {
        assert!(resource_cost > 0, "resource_cost must be positive");
        assert!(deadline_span > 0.0, "deadline_span must be positive");
        Self {
            resource_cost,
            deadline_span,
            active: false,
            assigned: false,
            arrivals,
        }
    }

    /// Pilots needed per successful service
    pub fn resource_cost(&self) -> u32 {
        self.resource_cost
    }

    /// Duration from arrival to expiry
    pub fn deadline_span(&self) -> SimTime {
        self.deadline_span
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    /// Grant this node a slot for the current frame
    pub fn assign(&mut self) {
        self.assigned = true;
    }

    pub fn clear_assignment(&mut self) {
        self.assigned = false;
    }

    /// Next inter-arrival delay from the node's generator
    pub fn next_delay(&mut self) -> SimTime {
        self.arrivals.draw()
    }
}
