// Text topology files and checkpoint directory layout
//
// Line format: `<id> <group> : <n1>,<n2>,...` with neighbors nearest first.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::snapshot::NetworkSnapshot;
use super::ExportError;
use crate::overlay::OverlayNetwork;

/// One line per node: `id group : n1,n2,...`
pub fn topology_lines<R, M>(network: &OverlayNetwork<R, M>) -> String {
    let mut out = String::new();
    for node in network.nodes() {
        let neighbors: Vec<String> = node.neighbors().iter().map(|n| n.to_string()).collect();
        let _ = writeln!(out, "{} {} : {}", node.id(), node.group(), neighbors.join(","));
    }
    out
}

/// One line per node: `id group`
pub fn color_lines<R, M>(network: &OverlayNetwork<R, M>) -> String {
    let mut out = String::new();
    for node in network.nodes() {
        let _ = writeln!(out, "{} {}", node.id(), node.group());
    }
    out
}

/// Writes checkpoint files into one output directory
#[derive(Debug, Clone)]
pub struct TopologyExporter {
    dir: PathBuf,
}

impl TopologyExporter {
    /// Create the exporter, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_topology<R, M>(
        &self,
        network: &OverlayNetwork<R, M>,
        path: &Path,
    ) -> Result<(), ExportError> {
        fs::write(path, topology_lines(network))?;
        Ok(())
    }

    /// `node_colors.txt`
    pub fn write_colors<R, M>(&self, network: &OverlayNetwork<R, M>) -> Result<PathBuf, ExportError> {
        let path = self.dir.join("node_colors.txt");
        fs::write(&path, color_lines(network))?;
        Ok(path)
    }

    /// `nodes_<epoch>.txt` and `snapshot_<epoch>.json` for the current epoch
    pub fn checkpoint<R, M>(
        &self,
        network: &OverlayNetwork<R, M>,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let epoch = network.epoch();
        let topology = self.dir.join(format!("nodes_{}.txt", epoch));
        let snapshot = self.dir.join(format!("snapshot_{}.json", epoch));

        self.write_topology(network, &topology)?;
        NetworkSnapshot::capture(network).write_json(&snapshot)?;

        debug!(epoch, dir = %self.dir.display(), "Wrote checkpoint");
        Ok(vec![topology, snapshot])
    }
}
