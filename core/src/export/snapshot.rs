// Serializable overlay snapshot
//
// Carries everything an external renderer needs: ring positions, display
// colors and the directed neighbor edges.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ExportError;
use crate::color::{ColorGroup, Rgb};
use crate::overlay::{FeatureVector, NodeId, OverlayNetwork, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub group: ColorGroup,
    pub rgb: Rgb,
    /// `#rrggbb`, ready for plotting
    pub hex: String,
    pub position: Position,
    pub features: FeatureVector,
    pub neighbors: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub epoch: u64,
    pub fanout: usize,
    pub radius: f64,
    pub nodes: Vec<NodeSnapshot>,
}

impl NetworkSnapshot {
    pub fn capture<R, M>(network: &OverlayNetwork<R, M>) -> Self {
        let nodes = network
            .nodes()
            .iter()
            .map(|node| NodeSnapshot {
                id: node.id(),
                group: node.group(),
                rgb: node.rgb(),
                hex: node.rgb().hex(),
                position: node.position(),
                features: *node.features(),
                neighbors: node.neighbors().to_vec(),
            })
            .collect();

        Self {
            epoch: network.epoch(),
            fanout: network.fanout(),
            radius: network.radius(),
            nodes,
        }
    }

    /// Directed `(node, neighbor)` edges
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .flat_map(|n| n.neighbors.iter().map(move |&m| (n.id, m)))
            .collect()
    }

    /// Nodes of one color group plus every node they point at
    pub fn group_view(&self, group: ColorGroup) -> Vec<&NodeSnapshot> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.group == group)
            .flat_map(|n| std::iter::once(n.id).chain(n.neighbors.iter().copied()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.iter().filter_map(|&id| self.nodes.get(id)).collect()
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self, ExportError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    fn sample() -> NetworkSnapshot {
        let mut network =
            OverlayNetwork::build(&SimulationConfig::ring(9, 2).with_seed(4)).unwrap();
        network.initialize().unwrap();
        NetworkSnapshot::capture(&network)
    }

    #[test]
    fn test_capture_mirrors_network() {
        let snapshot = sample();
        assert_eq!(snapshot.epoch, 0);
        assert_eq!(snapshot.fanout, 2);
        assert_eq!(snapshot.nodes.len(), 9);
        assert_eq!(snapshot.edges().len(), 18);
        for (i, node) in snapshot.nodes.iter().enumerate() {
            assert_eq!(node.id, i);
            assert_eq!(node.hex, node.rgb.hex());
        }
    }

    #[test]
    fn test_group_view_includes_targets() {
        let snapshot = sample();
        let reds = snapshot.group_view(ColorGroup::Red);

        for node in snapshot.nodes.iter().filter(|n| n.group == ColorGroup::Red) {
            assert!(reds.iter().any(|r| r.id == node.id));
            for nb in &node.neighbors {
                assert!(reds.iter().any(|r| r.id == *nb));
            }
        }
    }
}
