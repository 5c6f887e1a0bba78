//! Logical time and the event clock

pub mod clock;
pub mod time;

pub use clock::{ClockError, EventClock};
pub use time::{SimTime, TimeManager};
