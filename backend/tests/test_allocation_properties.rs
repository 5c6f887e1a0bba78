//! Property tests for the allocation invariants
//!
//! - a pass never spends more pilots than the frame budget
//! - every arrival is retired at most once, none is lost
//! - FCFS serves class A in deadline order
//! - overlap resolution serves at most one request per node, the earliest

use pilot_simulator_core_rs::arrivals::InterArrivalConfig;
use pilot_simulator_core_rs::models::{Arrival, PendingQueue, PerClass, Slice, TrafficClass};
use pilot_simulator_core_rs::orchestrator::{RunParams, Simulation, SimulationConfig, StepOutcome};
use pilot_simulator_core_rs::policy::{AllocationPolicy, Frame, Scheduler};
use pilot_simulator_core_rs::reporting::{SimulationStats, TraceLog};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

/// Run one pass of `policy` over class-A requests `(node, deadline)`
fn single_pass(
    policy: AllocationPolicy,
    nodes: usize,
    cost: u32,
    pilots: u32,
    requests: &[(usize, f64)],
) -> (PendingQueue, TraceLog) {
    let arrivals = InterArrivalConfig::default();
    let mut queues = PerClass::<PendingQueue>::default();
    let mut slices = PerClass::new(
        Slice::homogeneous(TrafficClass::A, nodes, cost, 10.0, &arrivals, 0),
        Slice::homogeneous(TrafficClass::B, 0, 1, 100.0, &arrivals, 0),
    );
    let mut stats = SimulationStats::new();
    let mut log = TraceLog::new();

    for (sequence, (node, deadline)) in requests.iter().enumerate() {
        queues.a.push_front(Arrival::new(TrafficClass::A, 0.0, *deadline, *node, sequence as u64));
        slices.a.node_mut(*node).set_active(true);
    }

    let mut scheduler = Scheduler::new(policy, 10);
    let mut frame = Frame::new(0.0, pilots, &mut queues, &mut slices, &mut stats, &mut log);
    scheduler.allocate(&mut frame);
    frame.finish();

    (queues.a, log)
}

fn requests_strategy(nodes: usize) -> impl Strategy<Value = Vec<(usize, f64)>> {
    prop::collection::vec((0..nodes, 1.0f64..50.0), 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_runs_respect_budget_and_retire_once(
        pilots in 1u32..12,
        class_a_nodes in 0usize..10,
        class_b_nodes in 0usize..30,
        policy_index in 0usize..5,
        high_reliability in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut config = SimulationConfig::default();
        config.pilots_per_frame = pilots;
        config.horizon = 60.0;
        config.class_a.arrival = InterArrivalConfig::Exponential { mean: 4.0 };
        config.class_b.arrival = InterArrivalConfig::Exponential { mean: 30.0 };

        let policy = AllocationPolicy::ALL[policy_index];
        let params = RunParams {
            class_a_nodes,
            class_b_nodes,
            policy: Some(policy.name().to_string()),
            class_a_reliability: Some(if high_reliability { "high" } else { "low" }.to_string()),
            seed,
            ..RunParams::default()
        };

        let mut sim = Simulation::new(&config, &params).unwrap();
        while sim.now() < 60.0 {
            if let StepOutcome::Frame { allocation, .. } = sim.step().unwrap() {
                prop_assert!(allocation.pilots_used <= pilots);
                prop_assert!(allocation.pilots_served <= allocation.pilots_used);
                prop_assert_eq!(allocation.pilots_used + allocation.pilots_left, pilots);
            }
        }

        let mut seen = HashSet::new();
        for entry in sim.sink().entries() {
            prop_assert!(seen.insert((entry.class, entry.sequence)));
        }
        let summary = sim.summary();
        for class in TrafficClass::ALL {
            prop_assert_eq!(
                summary.stats.class(class).arrivals,
                summary.classes[class].reported + summary.still_queued[class] as u64
            );
        }
    }

    #[test]
    fn prop_fcfs_is_deadline_monotonic(
        cost in 1u32..4,
        pilots in 0u32..20,
        requests in requests_strategy(5),
    ) {
        let (remaining, log) = single_pass(AllocationPolicy::FcfsFcfs, 5, cost, pilots, &requests);

        let served_deadlines: Vec<f64> = log
            .entries()
            .iter()
            .map(|entry| requests[entry.sequence as usize].1)
            .collect();
        let latest_served = served_deadlines.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let earliest_left = remaining
            .iter()
            .map(|(_, request)| request.deadline)
            .fold(f64::INFINITY, f64::min);

        prop_assert!(latest_served <= earliest_left);
        prop_assert!(served_deadlines.len() as u32 * cost <= pilots);
        prop_assert_eq!(served_deadlines.len() + remaining.len(), requests.len());
    }

    #[test]
    fn prop_overlap_serves_earliest_once_per_node(
        pilots in 0u32..8,
        requests in requests_strategy(4),
    ) {
        let (_, log) = single_pass(AllocationPolicy::RrnFcfs, 4, 1, pilots, &requests);

        let mut served: HashMap<usize, Vec<f64>> = HashMap::new();
        for entry in log.entries() {
            prop_assert!(entry.success);
            served
                .entry(entry.requester_id)
                .or_default()
                .push(requests[entry.sequence as usize].1);
        }

        for (node, deadlines) in served {
            prop_assert_eq!(deadlines.len(), 1);
            prop_assert!((node as u32) < pilots);
            let earliest = requests
                .iter()
                .filter(|(requester, _)| *requester == node)
                .map(|(_, deadline)| *deadline)
                .fold(f64::INFINITY, f64::min);
            prop_assert_eq!(deadlines[0], earliest);
        }
    }
}
