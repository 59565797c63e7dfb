//! Overlay node
//!
//! A node knows its own identity, where it sits on the ring, its feature
//! vector and its current neighbor view. Neighbors are held as identities
//! into the network arena, never as references to other nodes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::metric::{DistanceMetric, FeatureVector};
use super::selector::NeighborSelector;
use crate::color::{ColorGroup, Rgb};
use crate::{OverlayError, Result};

/// Node identity; doubles as the node's index in the network arena
pub type NodeId = usize;

/// Position on the 2-D plane (ring layout)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the ring center
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Lifecycle of a node's neighbor view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Created, no neighbor view yet
    Uninitialized,
    /// View seeded (exact k-NN, or a random start view)
    Bootstrapped,
    /// Has taken part in at least one rerank since bootstrap
    Gossiping,
}

/// A single overlay participant
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    position: Position,
    features: FeatureVector,
    rgb: Rgb,
    group: ColorGroup,
    /// Current view, nearest first
    neighbors: Vec<NodeId>,
    state: NodeState,
}

impl Node {
    pub fn new(
        id: NodeId,
        position: Position,
        features: FeatureVector,
        rgb: Rgb,
        group: ColorGroup,
    ) -> Self {
        Self {
            id,
            position,
            features,
            rgb,
            group,
            neighbors: Vec::new(),
            state: NodeState::Uninitialized,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    pub fn group(&self) -> ColorGroup {
        self.group
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Current neighbor view, ordered nearest first
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    pub fn has_neighbor(&self, id: NodeId) -> bool {
        self.neighbors.contains(&id)
    }

    /// Move the node to a new ring position. Identity and features are kept.
    pub(crate) fn relocate(&mut self, position: Position) {
        self.position = position;
    }

    /// Pick a gossip partner uniformly from the current view
    pub fn select_random_peer<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NodeId> {
        self.neighbors
            .choose(rng)
            .copied()
            .ok_or(OverlayError::EmptyNeighborSet(self.id))
    }

    /// What this node discloses to a gossip partner: its view plus itself
    pub fn exchange_payload(&self) -> Vec<NodeId> {
        let mut payload = Vec::with_capacity(self.neighbors.len() + 1);
        payload.extend_from_slice(&self.neighbors);
        payload.push(self.id);
        payload
    }

    /// Merge a received payload into the view and keep the `k` nearest
    pub fn merge_and_rerank<M: DistanceMetric>(
        &mut self,
        received: &[NodeId],
        k: usize,
        selector: &NeighborSelector<M>,
        features: &[FeatureVector],
    ) -> Result<()> {
        let candidates = self.neighbors.iter().chain(received.iter()).copied();
        self.neighbors = selector.select_k_nearest(self.id, candidates, k, features)?;
        self.state = NodeState::Gossiping;
        Ok(())
    }

    /// Replace the view with the exact `k` nearest over `population`
    pub fn bootstrap<M, I>(
        &mut self,
        population: I,
        k: usize,
        selector: &NeighborSelector<M>,
        features: &[FeatureVector],
    ) -> Result<()>
    where
        M: DistanceMetric,
        I: IntoIterator<Item = NodeId>,
    {
        self.neighbors = selector.select_k_nearest(self.id, population, k, features)?;
        self.state = NodeState::Bootstrapped;
        Ok(())
    }

    /// Install an arbitrary start view (random-start convergence runs).
    /// Caller guarantees no self entry, no duplicates and nearest-first
    /// order.
    pub(crate) fn seed_view(&mut self, view: Vec<NodeId>) {
        debug_assert!(!view.contains(&self.id));
        self.neighbors = view;
        self.state = NodeState::Bootstrapped;
    }
}
