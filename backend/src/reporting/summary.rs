//! Per-class and per-run result summaries

use crate::core::time::SimTime;
use crate::models::PerClass;
use crate::reporting::stats::SimulationStats;
use serde::{Deserialize, Serialize};

/// z-value of a two-sided 95 % normal confidence interval
const Z_95: f64 = 1.96;

/// Waiting-time statistics of served requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitStatistics {
    pub count: u64,
    pub mean: f64,
    /// Unbiased sample variance (0 with fewer than two samples)
    pub variance: f64,
    pub upper_ci: f64,
    pub lower_ci: f64,
}

impl WaitStatistics {
    /// Compute statistics over a set of waiting times
    ///
    /// # Example
    /// ```
    /// use pilot_simulator_core_rs::reporting::WaitStatistics;
    ///
    /// let stats = WaitStatistics::from_samples(&[1.0, 2.0, 3.0]);
    /// assert_eq!(stats.mean, 2.0);
    /// assert_eq!(stats.variance, 1.0);
    /// assert!(stats.lower_ci < 2.0 && stats.upper_ci > 2.0);
    /// ```
    pub fn from_samples(samples: &[SimTime]) -> Self {
        let count = samples.len();
        if count == 0 {
            return Self::default();
        }

        let n = count as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = if count > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let half_width = Z_95 * (variance / n).sqrt();

        Self {
            count: count as u64,
            mean,
            variance,
            upper_ci: mean + half_width,
            lower_ci: mean - half_width,
        }
    }
}

/// Outcome summary of one traffic class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub reported: u64,
    pub served: u64,
    pub failed: u64,
    /// failed / reported (0 when nothing was reported)
    pub loss_rate: f64,
    pub wait: WaitStatistics,
}

/// Everything needed to identify and tabulate one finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub policy: String,
    pub populations: PerClass<usize>,
    /// Class-A latency profile name
    pub deadline_profile: String,
    /// Class-A reliability profile name
    pub reliability_profile: String,
    pub seed: u64,
    /// SHA-256 of the configuration and run parameters
    pub config_hash: String,
    pub final_time: SimTime,
    pub stats: SimulationStats,
    pub classes: PerClass<ClassSummary>,
    /// Requests still waiting when the run stopped
    pub still_queued: PerClass<usize>,
}
