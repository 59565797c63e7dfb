//! Gossip overlay: T-MAN style epidemic clustering
//!
//! Nodes keep a bounded view of k neighbors and periodically swap views with
//! a random member of it. Each side merges what it heard and keeps the k
//! nearest by feature distance, so views drift toward the true k-NN graph.
//! - Metric: distance in the 3-D feature space
//! - Selector: bounded k-nearest ranking with identity tie-break
//! - Node: view, peer choice, payload, merge-and-rerank
//! - Network: arena of nodes, bootstrap, epochs, exchanges
//! - Growth: scheduled join batches for the dynamic ring
//! - Quality: convergence against the exact k-NN oracle

pub mod growth;
pub mod metric;
pub mod network;
pub mod node;
pub mod observer;
pub mod quality;
pub mod ring;
pub mod selector;

pub use growth::GrowthScheduler;
pub use metric::{distance, DistanceMetric, Euclidean, FeatureVector};
pub use network::OverlayNetwork;
pub use node::{Node, NodeId, NodeState, Position};
pub use observer::{ExchangeLog, ExchangeRecord, GossipObserver, GrowthEvent};
pub use quality::{measure, ConvergenceReport, ConvergenceTracker};
pub use ring::{ring_points, shuffled_ring};
pub use selector::NeighborSelector;
