//! Domain models for the pilot allocation simulator

pub mod class;
pub mod event;
pub mod node;
pub mod queue;
pub mod slice;

// Re-exports
pub use class::{PerClass, TrafficClass};
pub use event::{Arrival, Event, EventKind};
pub use node::Node;
pub use queue::{DeadlineOrder, PendingQueue, RequestHandle};
pub use slice::Slice;
