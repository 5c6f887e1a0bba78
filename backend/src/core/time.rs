//! Logical time for the simulation
//!
//! The simulation advances a continuous logical clock. Allocation happens on
//! fixed-length frames; the run ends once the clock reaches the horizon.
//! Nothing here touches wall-clock time.

use serde::{Deserialize, Serialize};

/// Logical simulation time (same unit as `frame_length` and deadline spans)
pub type SimTime = f64;

/// Tracks the logical clock, the frame cadence and the run horizon
///
/// # Example
/// ```
/// use pilot_simulator_core_rs::TimeManager;
///
/// let mut time = TimeManager::new(1.0, 100.0);
/// assert_eq!(time.now(), 0.0);
/// assert_eq!(time.next_frame_time(), 1.0);
///
/// time.advance_to(1.0);
/// time.record_frame();
/// assert_eq!(time.frames_elapsed(), 1);
/// assert!(!time.is_finished());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeManager {
    /// Current logical time
    now: SimTime,
    /// Duration of one allocation frame
    frame_length: SimTime,
    /// Time at which the run stops
    horizon: SimTime,
    /// Number of frame boundaries handled so far
    frames_elapsed: u64,
}

impl TimeManager {
    /// Create a new TimeManager starting at time zero
    ///
    /// # Arguments
    /// * `frame_length` - Duration of one allocation frame
    /// * `horizon` - Logical time at which the run terminates
    ///
    /// # Example
    /// ```
    /// use pilot_simulator_core_rs::TimeManager;
    ///
    /// let time = TimeManager::new(1.0, 10_000.0);
    /// assert_eq!(time.horizon(), 10_000.0);
    /// ```
    pub fn new(frame_length: SimTime, horizon: SimTime) -> Self {
        assert!(frame_length > 0.0, "frame_length must be positive");
        assert!(horizon > 0.0, "horizon must be positive");
        Self {
            now: 0.0,
            frame_length,
            horizon,
            frames_elapsed: 0,
        }
    }

    /// Move the clock forward to `time`
    ///
    /// The event clock only ever yields non-decreasing times, so going
    /// backwards indicates a broken ordering.
    pub fn advance_to(&mut self, time: SimTime) {
        debug_assert!(
            time >= self.now,
            "logical clock moved backwards: {} -> {}",
            self.now,
            time
        );
        self.now = time;
    }

    /// Current logical time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Duration of one frame
    pub fn frame_length(&self) -> SimTime {
        self.frame_length
    }

    /// Time at which the run stops
    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Time of the frame boundary that follows the current time
    ///
    /// # Example
    /// ```
    /// use pilot_simulator_core_rs::TimeManager;
    ///
    /// let mut time = TimeManager::new(2.5, 100.0);
    /// time.advance_to(5.0);
    /// assert_eq!(time.next_frame_time(), 7.5);
    /// ```
    pub fn next_frame_time(&self) -> SimTime {
        self.now + self.frame_length
    }

    /// Count one handled frame boundary
    pub fn record_frame(&mut self) {
        self.frames_elapsed += 1;
    }

    /// Number of frame boundaries handled so far
    pub fn frames_elapsed(&self) -> u64 {
        self.frames_elapsed
    }

    /// True once the clock has reached the horizon
    ///
    /// # Example
    /// ```
    /// use pilot_simulator_core_rs::TimeManager;
    ///
    /// let mut time = TimeManager::new(1.0, 3.0);
    /// time.advance_to(2.9);
    /// assert!(!time.is_finished());
    /// time.advance_to(3.0);
    /// assert!(time.is_finished());
    /// ```
    pub fn is_finished(&self) -> bool {
        self.now >= self.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "frame_length must be positive")]
    fn test_zero_frame_length_panics() {
        TimeManager::new(0.0, 10.0);
    }

    #[test]
    #[should_panic(expected = "horizon must be positive")]
    fn test_negative_horizon_panics() {
        TimeManager::new(1.0, -1.0);
    }
}
