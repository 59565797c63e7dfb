//! Topology export
//!
//! Flat snapshots of the overlay for offline inspection and plotting:
//! - Text topology, one `id group : n1,n2,...` line per node
//! - Node color listing, one `id group` line per node
//! - JSON snapshot with positions, colors, features and views

pub mod snapshot;
pub mod topology;

use thiserror::Error;

pub use snapshot::{NetworkSnapshot, NodeSnapshot};
pub use topology::{color_lines, topology_lines, TopologyExporter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
