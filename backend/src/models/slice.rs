//! Slice: the fixed pool of nodes belonging to one traffic class
//!
//! Node indices are stable for the lifetime of a run and double as the
//! `requester_id` carried by arrivals.

use crate::arrivals::{ArrivalGenerator, InterArrivalConfig};
use crate::core::time::SimTime;
use crate::models::class::TrafficClass;
use crate::models::node::Node;
use crate::rng::RngManager;

/// Homogeneous pool of nodes of one traffic class
#[derive(Debug, Clone)]
pub struct Slice {
    class: TrafficClass,
    nodes: Vec<Node>,
}

impl Slice {
    /// Build a slice of `population` identical nodes
    ///
    /// Each node draws from its own RNG stream derived from `seed`, the class
    /// and its index.
    ///
    /// # Example
    /// ```
    /// use pilot_simulator_core_rs::arrivals::InterArrivalConfig;
    /// use pilot_simulator_core_rs::models::{Slice, TrafficClass};
    ///
    /// let slice = Slice::homogeneous(TrafficClass::A, 4, 3, 10.0, &InterArrivalConfig::default(), 7);
    /// assert_eq!(slice.len(), 4);
    /// assert_eq!(slice.node(2).resource_cost(), 3);
    /// ```
    pub fn homogeneous(
        class: TrafficClass,
        population: usize,
        resource_cost: u32,
        deadline_span: SimTime,
        arrivals: &InterArrivalConfig,
        seed: u64,
    ) -> Self {
        let class_stream = match class {
            TrafficClass::A => 0u64,
            TrafficClass::B => 1u64 << 32,
        };
        let nodes = (0..population)
            .map(|index| {
                let rng = RngManager::for_stream(seed, class_stream + index as u64);
                Node::new(
                    resource_cost,
                    deadline_span,
                    ArrivalGenerator::new(arrivals, deadline_span, rng),
                )
            })
            .collect();

        Self::from_nodes(class, nodes)
    }

    /// Build a slice from explicitly constructed nodes
    pub fn from_nodes(class: TrafficClass, nodes: Vec<Node>) -> Self {
        Self { class, nodes }
    }

    pub fn class(&self) -> TrafficClass {
        self.class
    }

    /// Node at `index`
    ///
    /// # Panics
    /// Panics if `index` is out of range; requester ids come from this slice,
    /// so that would be an engine bug.
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Reset every node's per-frame grant
    pub fn clear_assignments(&mut self) {
        for node in &mut self.nodes {
            node.clear_assignment();
        }
    }

    /// Number of nodes currently holding at least one pending request
    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_active()).count()
    }
}
