//! Convergence measurement
//!
//! Compares every node's current view against its exact k nearest
//! neighbors over the live population. O(n²) per measurement.

use serde::{Deserialize, Serialize};

use super::metric::DistanceMetric;
use super::network::OverlayNetwork;
use super::node::NodeId;
use super::observer::GossipObserver;
use crate::Result;

/// How close the overlay is to the exact k-NN graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    pub epoch: u64,
    pub population: usize,
    /// Mean distance from a node to the members of its current view
    pub mean_neighbor_distance: f64,
    /// Same, for the exact k-NN views
    pub oracle_mean_distance: f64,
    /// Fraction of exact neighbors present in current views
    pub recall: f64,
    /// Nodes whose view equals their exact k-NN set
    pub exact_nodes: usize,
}

impl ConvergenceReport {
    /// How far the overlay is from the exact graph, in distance units
    pub fn distance_gap(&self) -> f64 {
        self.mean_neighbor_distance - self.oracle_mean_distance
    }

    pub fn is_converged(&self) -> bool {
        self.exact_nodes == self.population
    }
}

/// Measure the network against the exact k-NN oracle
pub fn measure<R, M: DistanceMetric>(network: &OverlayNetwork<R, M>) -> Result<ConvergenceReport> {
    let mut view_total = 0.0;
    let mut oracle_total = 0.0;
    let mut hits = 0usize;
    let mut expected = 0usize;
    let mut exact_nodes = 0usize;

    for node in network.nodes() {
        let oracle = network.exact_neighbors(node.id())?;

        view_total += mean_distance(node.id(), node.neighbors(), network)?;
        oracle_total += mean_distance(node.id(), &oracle, network)?;

        let found = oracle.iter().filter(|id| node.has_neighbor(**id)).count();
        hits += found;
        expected += oracle.len();
        if found == oracle.len() && node.neighbors().len() == oracle.len() {
            exact_nodes += 1;
        }
    }

    let population = network.len();
    let per_node = population.max(1) as f64;

    Ok(ConvergenceReport {
        epoch: network.epoch(),
        population,
        mean_neighbor_distance: view_total / per_node,
        oracle_mean_distance: oracle_total / per_node,
        recall: if expected == 0 { 1.0 } else { hits as f64 / expected as f64 },
        exact_nodes,
    })
}

fn mean_distance<R, M: DistanceMetric>(
    id: NodeId,
    view: &[NodeId],
    network: &OverlayNetwork<R, M>,
) -> Result<f64> {
    if view.is_empty() {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for &other in view {
        total += network
            .selector()
            .distance_between(id, other, network.features())?;
    }
    Ok(total / view.len() as f64)
}

/// Observer that measures convergence after every epoch
#[derive(Debug, Clone, Default)]
pub struct ConvergenceTracker {
    pub reports: Vec<ConvergenceReport>,
}

impl ConvergenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ConvergenceReport> {
        self.reports.last()
    }
}

impl GossipObserver for ConvergenceTracker {
    fn on_epoch_complete<R, M: DistanceMetric>(
        &mut self,
        _epoch: u64,
        network: &OverlayNetwork<R, M>,
    ) -> Result<()> {
        self.reports.push(measure(network)?);
        Ok(())
    }
}
