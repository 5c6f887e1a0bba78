//! Run fingerprinting
//!
//! A run is fully determined by its static configuration and run parameters,
//! so a hash of both identifies the exact setup behind a result row.

use crate::orchestrator::config::{ConfigError, RunParams, SimulationConfig};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Serialize)]
struct Fingerprint<'a> {
    config: &'a SimulationConfig,
    params: &'a RunParams,
}

/// SHA-256 (hex) identifying one run
///
/// Hashes the JSON of the configuration and parameters after a pass through
/// `serde_json::Value`, whose objects keep their keys sorted.
pub fn run_fingerprint(config: &SimulationConfig, params: &RunParams) -> Result<String, ConfigError> {
    let value = serde_json::to_value(Fingerprint { config, params })
        .map_err(|e| ConfigError::Serialization(format!("run fingerprint failed: {}", e)))?;

    let digest = Sha256::digest(value.to_string().as_bytes());
    Ok(format!("{:x}", digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let config = SimulationConfig::default();
        let params = RunParams {
            class_a_nodes: 10,
            seed: 42,
            ..RunParams::default()
        };

        let first = run_fingerprint(&config, &params).unwrap();
        let second = run_fingerprint(&config.clone(), &params.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_seed() {
        let config = SimulationConfig::default();
        let a = RunParams {
            seed: 1,
            ..RunParams::default()
        };
        let b = RunParams {
            seed: 2,
            ..RunParams::default()
        };
        assert_ne!(
            run_fingerprint(&config, &a).unwrap(),
            run_fingerprint(&config, &b).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_ignores_json_key_order() {
        let json = serde_json::to_string(&SimulationConfig::default()).unwrap();
        let mut fields: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&json).unwrap();

        // rebuild the document with its top-level keys in reverse order
        let mut keys: Vec<String> = fields.keys().cloned().collect();
        keys.reverse();
        let reordered = format!(
            "{{{}}}",
            keys.iter()
                .map(|key| format!("{:?}:{}", key, fields.remove(key).unwrap()))
                .collect::<Vec<_>>()
                .join(",")
        );

        let params = RunParams::default();
        let config = SimulationConfig::from_json(&reordered).unwrap();
        assert_eq!(
            run_fingerprint(&config, &params).unwrap(),
            run_fingerprint(&SimulationConfig::default(), &params).unwrap()
        );
    }
}
