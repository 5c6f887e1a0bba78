//! Deadline-ordered serving
//!
//! Serves one class's pending queue in deadline order until a request does
//! not fit in the remaining budget. That request and everything sorted after
//! it stay queued, even if a later, cheaper request would still fit.

use crate::models::{DeadlineOrder, TrafficClass};
use crate::policy::{Flow, Frame};

/// Serve `class` in `order` while the budget allows
pub fn serve_by_deadline(frame: &mut Frame<'_>, class: TrafficClass, order: DeadlineOrder) -> Flow {
    let candidates = frame.queue(class).by_deadline(order);
    for handle in candidates {
        if frame.try_serve(class, handle) == Flow::Exhausted {
            return Flow::Exhausted;
        }
    }
    Flow::Continue
}
