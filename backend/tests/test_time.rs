//! Logical time tests
//!
//! The clock only moves forward, frame boundaries land on multiples of the
//! frame length, and the run stops once the horizon is reached.

use pilot_simulator_core_rs::orchestrator::{RunParams, Simulation, SimulationConfig, StepOutcome};
use pilot_simulator_core_rs::reporting::NullSink;
use pilot_simulator_core_rs::TimeManager;

#[test]
fn test_time_manager_starts_at_zero() {
    let time = TimeManager::new(0.5, 20.0);
    assert_eq!(time.now(), 0.0);
    assert_eq!(time.frames_elapsed(), 0);
    assert_eq!(time.next_frame_time(), 0.5);
}

#[test]
fn test_time_manager_horizon_is_inclusive() {
    let mut time = TimeManager::new(1.0, 5.0);
    time.advance_to(4.999);
    assert!(!time.is_finished());
    time.advance_to(5.0);
    assert!(time.is_finished());
}

#[test]
fn test_frame_boundaries_are_evenly_spaced() {
    let mut config = SimulationConfig::default();
    config.frame_length = 2.5;
    config.horizon = 50.0;

    let params = RunParams {
        class_a_nodes: 3,
        class_b_nodes: 3,
        seed: 9,
        ..RunParams::default()
    };
    let mut sim = Simulation::with_sink(&config, &params, NullSink).unwrap();

    let mut frames = Vec::new();
    let mut last = 0.0;
    while sim.now() < 50.0 {
        let outcome = sim.step().unwrap();
        assert!(sim.now() >= last, "clock moved backwards");
        last = sim.now();
        if let StepOutcome::Frame { time, frame, .. } = outcome {
            frames.push((frame, time));
        }
    }

    assert_eq!(frames.len(), 20);
    for (frame, time) in frames {
        assert_eq!(time, 2.5 * (frame + 1) as f64);
    }
}

#[test]
fn test_run_stops_at_horizon() {
    let mut config = SimulationConfig::default();
    config.horizon = 30.0;

    let params = RunParams {
        class_a_nodes: 4,
        class_b_nodes: 10,
        seed: 3,
        ..RunParams::default()
    };
    let mut sim = Simulation::new(&config, &params).unwrap();
    let summary = sim.run().unwrap();

    assert!(summary.final_time >= 30.0);
    // the last frame boundary is at exactly the horizon
    assert_eq!(summary.stats.frames, 30);
}
