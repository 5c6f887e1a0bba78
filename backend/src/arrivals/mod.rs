//! Inter-arrival generation for traffic nodes.
//!
//! Every node owns an `ArrivalGenerator`: a lazy, infinite sequence of
//! strictly positive delays. The first value comes from an "initial" draw
//! (time from run start to the node's first request), every later value from
//! a "next" draw (gap between consecutive requests). The engine only ever
//! asks for the next delay; how it is produced is the generator's business.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same config → same delays
//! 2. **Independence**: One RNG stream per node
//! 3. **Positivity**: Delays are never zero or negative
//!
//! # Example
//!
//! ```
//! use pilot_simulator_core_rs::arrivals::{ArrivalGenerator, InterArrivalConfig};
//! use pilot_simulator_core_rs::rng::RngManager;
//!
//! let config = InterArrivalConfig::Periodic { period: Some(10.0), initial_offset: Some(2.0) };
//! let mut generator = ArrivalGenerator::new(&config, 10.0, RngManager::new(42));
//!
//! let delays: Vec<f64> = generator.by_ref().take(3).collect();
//! assert_eq!(delays, vec![2.0, 10.0, 10.0]);
//! ```

use crate::core::time::SimTime;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Inter-arrival distribution for one traffic class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterArrivalConfig {
    /// Fixed gap between requests
    ///
    /// `period` defaults to the node's deadline span, so each node has at
    /// most one request per deadline window at steady state. The first
    /// request lands uniformly in `(0, period]` unless `initial_offset` pins it.
    Periodic {
        #[serde(default)]
        period: Option<SimTime>,
        #[serde(default)]
        initial_offset: Option<SimTime>,
    },

    /// Poisson process: exponential gaps with the given mean
    Exponential { mean: SimTime },

    /// Gaps drawn uniformly from `[min, max)`
    Uniform { min: SimTime, max: SimTime },
}

impl Default for InterArrivalConfig {
    fn default() -> Self {
        InterArrivalConfig::Periodic {
            period: None,
            initial_offset: None,
        }
    }
}

impl InterArrivalConfig {
    /// Check parameters; returns a description of the first problem found
    pub fn validate(&self) -> Result<(), String> {
        match self {
            InterArrivalConfig::Periodic {
                period,
                initial_offset,
            } => {
                if let Some(p) = period {
                    if !(p.is_finite() && *p > 0.0) {
                        return Err(format!("period must be positive, got {}", p));
                    }
                }
                if let Some(offset) = initial_offset {
                    if !(offset.is_finite() && *offset > 0.0) {
                        return Err(format!("initial_offset must be positive, got {}", offset));
                    }
                }
                Ok(())
            }
            InterArrivalConfig::Exponential { mean } => {
                if mean.is_finite() && *mean > 0.0 {
                    Ok(())
                } else {
                    Err(format!("mean must be positive, got {}", mean))
                }
            }
            InterArrivalConfig::Uniform { min, max } => {
                if min.is_finite() && max.is_finite() && *min > 0.0 && min < max {
                    Ok(())
                } else {
                    Err(format!("uniform bounds must satisfy 0 < min < max, got [{}, {})", min, max))
                }
            }
        }
    }
}

/// Resolved sampling rule (periodic default already applied)
#[derive(Debug, Clone)]
enum Sampler {
    Periodic {
        period: SimTime,
        initial_offset: Option<SimTime>,
    },
    Exponential {
        mean: SimTime,
    },
    Uniform {
        min: SimTime,
        max: SimTime,
    },
}

/// Per-node producer of inter-arrival delays
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    sampler: Sampler,
    rng: RngManager,
    started: bool,
}

impl ArrivalGenerator {
    /// Create a generator
    ///
    /// # Arguments
    ///
    /// * `config` - Distribution for the node's class
    /// * `deadline_span` - The node's deadline span (default periodic gap)
    /// * `rng` - The node's own RNG stream
    pub fn new(config: &InterArrivalConfig, deadline_span: SimTime, rng: RngManager) -> Self {
        let sampler = match config {
            InterArrivalConfig::Periodic {
                period,
                initial_offset,
            } => Sampler::Periodic {
                period: period.unwrap_or(deadline_span),
                initial_offset: *initial_offset,
            },
            InterArrivalConfig::Exponential { mean } => Sampler::Exponential { mean: *mean },
            InterArrivalConfig::Uniform { min, max } => Sampler::Uniform {
                min: *min,
                max: *max,
            },
        };

        Self {
            sampler,
            rng,
            started: false,
        }
    }

    /// Produce the next delay (the initial draw on the first call)
    pub fn draw(&mut self) -> SimTime {
        let initial = !self.started;
        self.started = true;

        match &self.sampler {
            Sampler::Periodic {
                period,
                initial_offset,
            } => {
                if !initial {
                    return *period;
                }
                match initial_offset {
                    Some(offset) => *offset,
                    // 1 - u lies in (0, 1], keeping the first request off time zero
                    None => period * (1.0 - self.rng.next_f64()),
                }
            }
            Sampler::Exponential { mean } => self.rng.exponential(*mean),
            Sampler::Uniform { min, max } => self.rng.uniform(*min, *max),
        }
    }
}

impl Iterator for ArrivalGenerator {
    type Item = SimTime;

    fn next(&mut self) -> Option<SimTime> {
        Some(self.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_defaults_to_deadline_span() {
        let config = InterArrivalConfig::default();
        let mut generator = ArrivalGenerator::new(&config, 10.0, RngManager::new(1));

        let first = generator.draw();
        assert!(first > 0.0 && first <= 10.0, "initial draw {} outside (0, 10]", first);
        assert_eq!(generator.draw(), 10.0);
        assert_eq!(generator.draw(), 10.0);
    }

    #[test]
    fn test_uniform_draws_stay_in_bounds() {
        let config = InterArrivalConfig::Uniform { min: 2.0, max: 3.0 };
        let generator = ArrivalGenerator::new(&config, 10.0, RngManager::new(8));

        for delay in generator.take(500) {
            assert!((2.0..3.0).contains(&delay));
        }
    }

    #[test]
    fn test_exponential_draws_positive() {
        let config = InterArrivalConfig::Exponential { mean: 0.5 };
        let generator = ArrivalGenerator::new(&config, 1.0, RngManager::new(3));
        assert!(generator.take(1000).all(|delay| delay > 0.0));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(InterArrivalConfig::Exponential { mean: 0.0 }.validate().is_err());
        assert!(InterArrivalConfig::Uniform { min: 3.0, max: 2.0 }.validate().is_err());
        assert!(InterArrivalConfig::Periodic {
            period: Some(-1.0),
            initial_offset: None
        }
        .validate()
        .is_err());
        assert!(InterArrivalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: InterArrivalConfig =
            serde_json::from_str(r#"{"type": "exponential", "mean": 2.5}"#).unwrap();
        assert_eq!(config, InterArrivalConfig::Exponential { mean: 2.5 });

        let config: InterArrivalConfig = serde_json::from_str(r#"{"type": "periodic"}"#).unwrap();
        assert_eq!(config, InterArrivalConfig::default());
    }
}
