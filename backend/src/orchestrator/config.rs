//! Simulation configuration
//!
//! Two layers, both plain serde structs:
//!
//! - `SimulationConfig`: static parameters shared by every run of an
//!   experiment (pilot budget, frame length, horizon, default policy and the
//!   per-class profile tables). Usually loaded from JSON.
//! - `RunParams`: what varies between runs (populations, policy, class-A
//!   profile names, seed). Unset options fall back to the static config.
//!
//! `resolve` validates both and produces a `ResolvedRun` with every name
//! looked up. Nothing is simulated until this succeeds.
//!
//! # Example
//!
//! ```rust
//! use pilot_simulator_core_rs::orchestrator::{resolve, RunParams, SimulationConfig};
//!
//! let config = SimulationConfig::default();
//! let params = RunParams {
//!     class_a_nodes: 20,
//!     class_b_nodes: 50,
//!     class_a_reliability: Some("high".to_string()),
//!     ..RunParams::default()
//! };
//!
//! let run = resolve(&config, &params).unwrap();
//! assert_eq!(run.classes.a.resource_cost, 3);
//! assert_eq!(run.classes.a.deadline_span, 10.0);
//! ```

use crate::arrivals::InterArrivalConfig;
use crate::core::time::SimTime;
use crate::models::{PerClass, TrafficClass};
use crate::policy::AllocationPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Tolerance when checking that the superframe ratio is a whole number
const SUPERFRAME_EPSILON: f64 = 1e-9;

/// Configuration errors, all fatal before the first event
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown allocation policy: {0}")]
    UnknownPolicy(String),

    #[error("unknown {kind} profile '{name}' for class {class}")]
    UnknownProfile {
        class: TrafficClass,
        kind: &'static str,
        name: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error(
        "class A deadline span {deadline_span} is not a whole number of frames of length {frame_length}"
    )]
    NonIntegralSuperframe {
        deadline_span: SimTime,
        frame_length: SimTime,
    },

    #[error("configuration serialization failed: {0}")]
    Serialization(String),
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Profile tables and arrival process of one traffic class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Latency profile name → deadline span
    pub deadline_profiles: BTreeMap<String, SimTime>,

    /// Reliability profile name → pilots per service
    pub reliability_profiles: BTreeMap<String, u32>,

    /// Default latency profile
    pub deadline: String,

    /// Default reliability profile
    pub reliability: String,

    #[serde(default)]
    pub arrival: InterArrivalConfig,
}

impl ClassConfig {
    fn single(deadline: (&str, SimTime), reliability: (&str, u32)) -> Self {
        Self {
            deadline_profiles: BTreeMap::from([(deadline.0.to_string(), deadline.1)]),
            reliability_profiles: BTreeMap::from([(reliability.0.to_string(), reliability.1)]),
            deadline: deadline.0.to_string(),
            reliability: reliability.0.to_string(),
            arrival: InterArrivalConfig::default(),
        }
    }
}

/// Static simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Pilot sequences available per frame, shared by both classes
    pub pilots_per_frame: u32,

    /// Time between allocation passes
    pub frame_length: SimTime,

    /// The run stops once the clock reaches this time
    pub horizon: SimTime,

    /// Policy used when the run parameters do not name one
    pub default_policy: String,

    /// Low-latency, high-reliability class
    pub class_a: ClassConfig,

    /// Delay-tolerant class
    pub class_b: ClassConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let mut class_a = ClassConfig::single(("long", 10.0), ("low", 1));
        class_a.deadline_profiles.insert("short".to_string(), 1.0);
        class_a.reliability_profiles.insert("high".to_string(), 3);

        Self {
            pilots_per_frame: 10,
            frame_length: 1.0,
            horizon: 10_000.0,
            default_policy: AllocationPolicy::FcfsFcfs.name().to_string(),
            class_a,
            class_b: ClassConfig::single(("relaxed", 100.0), ("low", 1)),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    pub fn class(&self, class: TrafficClass) -> &ClassConfig {
        match class {
            TrafficClass::A => &self.class_a,
            TrafficClass::B => &self.class_b,
        }
    }

    /// Check everything that does not depend on the run parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pilots_per_frame == 0 {
            return Err(ConfigError::invalid("pilots_per_frame", "must be > 0"));
        }
        if !(self.frame_length.is_finite() && self.frame_length > 0.0) {
            return Err(ConfigError::invalid(
                "frame_length",
                format!("must be positive, got {}", self.frame_length),
            ));
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(ConfigError::invalid(
                "horizon",
                format!("must be positive, got {}", self.horizon),
            ));
        }

        for class in TrafficClass::ALL {
            let prefix = match class {
                TrafficClass::A => "class_a",
                TrafficClass::B => "class_b",
            };
            let profiles = self.class(class);

            for (name, span) in &profiles.deadline_profiles {
                if !(span.is_finite() && *span > 0.0) {
                    return Err(ConfigError::invalid(
                        format!("{}.deadline_profiles.{}", prefix, name),
                        format!("must be positive, got {}", span),
                    ));
                }
            }
            for (name, cost) in &profiles.reliability_profiles {
                if *cost == 0 {
                    return Err(ConfigError::invalid(
                        format!("{}.reliability_profiles.{}", prefix, name),
                        "must be > 0",
                    ));
                }
            }
            profiles
                .arrival
                .validate()
                .map_err(|reason| ConfigError::invalid(format!("{}.arrival", prefix), reason))?;
        }

        Ok(())
    }
}

/// Parameters of a single run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub class_a_nodes: usize,
    pub class_b_nodes: usize,

    /// Overrides `SimulationConfig::default_policy`
    #[serde(default)]
    pub policy: Option<String>,

    /// Overrides the class-A default latency profile
    #[serde(default)]
    pub class_a_deadline: Option<String>,

    /// Overrides the class-A default reliability profile
    #[serde(default)]
    pub class_a_reliability: Option<String>,

    /// Seed forwarded to the arrival generators
    pub seed: u64,
}

/// Profile of one class after name lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedClass {
    pub population: usize,
    pub deadline_profile: String,
    pub reliability_profile: String,
    pub deadline_span: SimTime,
    pub resource_cost: u32,
    pub arrival: InterArrivalConfig,
}

/// Fully validated run description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRun {
    pub policy: AllocationPolicy,
    pub pilots_per_frame: u32,
    pub frame_length: SimTime,
    pub horizon: SimTime,
    pub classes: PerClass<ResolvedClass>,
    /// Frames per class-A deadline span (cursor reset period for RRN)
    pub superframe: u64,
    pub seed: u64,
}

impl ResolvedRun {
    pub fn populations(&self) -> PerClass<usize> {
        PerClass::new(self.classes.a.population, self.classes.b.population)
    }
}

fn resolve_class(
    config: &ClassConfig,
    class: TrafficClass,
    population: usize,
    deadline: Option<&str>,
    reliability: Option<&str>,
) -> Result<ResolvedClass, ConfigError> {
    let deadline_profile = deadline.unwrap_or(&config.deadline);
    let reliability_profile = reliability.unwrap_or(&config.reliability);

    let deadline_span = *config
        .deadline_profiles
        .get(deadline_profile)
        .ok_or_else(|| ConfigError::UnknownProfile {
            class,
            kind: "deadline",
            name: deadline_profile.to_string(),
        })?;
    let resource_cost = *config
        .reliability_profiles
        .get(reliability_profile)
        .ok_or_else(|| ConfigError::UnknownProfile {
            class,
            kind: "reliability",
            name: reliability_profile.to_string(),
        })?;

    Ok(ResolvedClass {
        population,
        deadline_profile: deadline_profile.to_string(),
        reliability_profile: reliability_profile.to_string(),
        deadline_span,
        resource_cost,
        arrival: config.arrival.clone(),
    })
}

/// Validate `config` and `params` together and look up every name
pub fn resolve(config: &SimulationConfig, params: &RunParams) -> Result<ResolvedRun, ConfigError> {
    config.validate()?;

    let policy: AllocationPolicy = params
        .policy
        .as_deref()
        .unwrap_or(&config.default_policy)
        .parse()?;

    let classes = PerClass::new(
        resolve_class(
            &config.class_a,
            TrafficClass::A,
            params.class_a_nodes,
            params.class_a_deadline.as_deref(),
            params.class_a_reliability.as_deref(),
        )?,
        resolve_class(
            &config.class_b,
            TrafficClass::B,
            params.class_b_nodes,
            None,
            None,
        )?,
    );

    let ratio = classes.a.deadline_span / config.frame_length;
    let whole = ratio.round();
    if policy.is_queue_unaware()
        && classes.a.population > 0
        && (whole < 1.0 || (ratio - whole).abs() > SUPERFRAME_EPSILON)
    {
        return Err(ConfigError::NonIntegralSuperframe {
            deadline_span: classes.a.deadline_span,
            frame_length: config.frame_length,
        });
    }

    Ok(ResolvedRun {
        policy,
        pilots_per_frame: config.pilots_per_frame,
        frame_length: config.frame_length,
        horizon: config.horizon,
        classes,
        superframe: whole.max(1.0) as u64,
        seed: params.seed,
    })
}
