//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG used for every inter-arrival draw.
//!
//! # Streams
//!
//! Each node gets its own generator. Stream seeds are derived from the run
//! seed with a splitmix64 finalizer so neighbouring node indices do not
//! produce correlated sequences.
//!
//! # Determinism
//!
//! Same seed → same sequence. A run is reproducible from its seed and
//! configuration alone.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use pilot_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let gap = rng.exponential(10.0);
/// assert!(gap > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift cannot leave the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create the generator for one sub-stream of a run
    ///
    /// # Example
    /// ```
    /// use pilot_simulator_core_rs::RngManager;
    ///
    /// let mut a = RngManager::for_stream(7, 0);
    /// let mut b = RngManager::for_stream(7, 1);
    /// assert_ne!(a.next(), b.next());
    /// ```
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        Self::new(splitmix64(seed ^ splitmix64(stream.wrapping_add(1))))
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        assert!(min < max, "min must be less than max");
        min + (max - min) * self.next_f64()
    }

    /// Sample an exponentially distributed gap with the given mean
    ///
    /// Always strictly positive.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        // 1 - u lies in (0, 1], so ln is finite
        let u = 1.0 - self.next_f64();
        (-mean * u.ln()).max(f64::MIN_POSITIVE)
    }

    /// Get current RNG state
    pub fn get_state(&self) -> u64 {
        self.state
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
