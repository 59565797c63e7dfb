// TMAN Core: Gossip Overlay Clustering
//
// "Can every node find its k most similar peers by only ever talking to
//  the peers it already knows?"
//
// Nodes on a ring gossip neighbor views and rerank by color distance until
// each view approximates the node's true k nearest neighbors.

pub mod color;
pub mod config;
pub mod export;
pub mod overlay;

use thiserror::Error;

pub use color::{ColorGroup, ColorPolicy, Rgb};
pub use config::{ExchangeMode, GrowthConfig, SimulationConfig, StartView};
pub use export::{ExportError, NetworkSnapshot, TopologyExporter};
pub use overlay::{
    ConvergenceReport, ConvergenceTracker, DistanceMetric, Euclidean, ExchangeLog, ExchangeRecord,
    FeatureVector, GossipObserver, GrowthEvent, GrowthScheduler, NeighborSelector, Node, NodeId,
    NodeState, OverlayNetwork, Position,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Node {0} has an empty neighbor set")]
    EmptyNeighborSet(NodeId),
    #[error("Growth schedule exhausted at epoch {epoch}")]
    ScheduleExhaustion { epoch: u64 },
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
