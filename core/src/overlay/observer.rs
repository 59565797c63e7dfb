//! Instrumentation hooks for a running overlay
//!
//! An observer sees every exchange, every growth event and the network
//! state at the end of each epoch. Tests use it to capture what was
//! disclosed; the CLI uses it to track convergence.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::metric::DistanceMetric;
use super::network::OverlayNetwork;
use super::node::NodeId;
use crate::Result;

/// One gossip exchange, with both payloads as they were before either
/// side merged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub epoch: u64,
    pub initiator: NodeId,
    pub peer: NodeId,
    pub initiator_payload: Vec<NodeId>,
    pub peer_payload: Vec<NodeId>,
}

/// A batch of nodes joining the ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEvent {
    pub epoch: u64,
    pub batch: usize,
    /// Population after the batch joined
    pub population: usize,
    pub radius: f64,
    pub joined: Range<NodeId>,
}

/// Callbacks fired by [`OverlayNetwork::run_epoch_observed`]
pub trait GossipObserver {
    /// An exchange completed
    fn on_exchange(&mut self, _record: &ExchangeRecord) {}

    /// A growth batch joined, before that epoch's gossip pass
    fn on_growth(&mut self, _event: &GrowthEvent) {}

    /// `epoch` finished; `network` reflects its final state
    fn on_epoch_complete<R, M: DistanceMetric>(
        &mut self,
        _epoch: u64,
        _network: &OverlayNetwork<R, M>,
    ) -> Result<()> {
        Ok(())
    }
}

/// No-op observer
impl GossipObserver for () {}

/// Keeps every exchange and growth event in memory
#[derive(Debug, Clone, Default)]
pub struct ExchangeLog {
    pub exchanges: Vec<ExchangeRecord>,
    pub growth: Vec<GrowthEvent>,
}

impl ExchangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchanges recorded during `epoch`
    pub fn for_epoch(&self, epoch: u64) -> impl Iterator<Item = &ExchangeRecord> {
        self.exchanges.iter().filter(move |r| r.epoch == epoch)
    }
}

impl GossipObserver for ExchangeLog {
    fn on_exchange(&mut self, record: &ExchangeRecord) {
        self.exchanges.push(record.clone());
    }

    fn on_growth(&mut self, event: &GrowthEvent) {
        self.growth.push(event.clone());
    }
}
