// Simulation configuration
//
// Everything needed to rebuild a run bit-for-bit: population, fanout, seed,
// color policy, exchange style and (for the dynamic ring) the growth plan.

use serde::{Deserialize, Serialize};

use crate::color::ColorPolicy;
use crate::overlay::GrowthScheduler;
use crate::{OverlayError, Result};

/// Epochs a static ring runs when no count is given
pub const DEFAULT_RING_EPOCHS: u64 = 40;

/// Who updates their view during one gossip exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExchangeMode {
    /// Both initiator and peer merge the other's payload
    #[default]
    PushPull,
    /// Only the peer merges the initiator's payload
    Push,
}

/// How neighbor views are seeded before gossip starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartView {
    /// Exact k-NN over the whole population
    #[default]
    Exact,
    /// k distinct peers drawn uniformly at random
    Random,
}

/// Growth plan for the dynamic ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Join batch sizes, consumed in order
    pub batches: Vec<usize>,

    /// Epochs between growth events
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Colors handed to joining nodes
    #[serde(default = "default_growth_colors")]
    pub color_policy: ColorPolicy,
}

fn default_interval() -> u64 {
    GrowthScheduler::DEFAULT_INTERVAL
}

fn default_growth_colors() -> ColorPolicy {
    ColorPolicy::Uniform
}

impl GrowthConfig {
    pub fn new(batches: Vec<usize>) -> Self {
        Self {
            batches,
            interval: default_interval(),
            color_policy: default_growth_colors(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Initial population
    pub node_count: usize,

    /// Neighbor view size (k)
    pub fanout: usize,

    /// Seed for every random choice in the run
    #[serde(default)]
    pub seed: u64,

    /// Colors for the initial population
    #[serde(default)]
    pub color_policy: ColorPolicy,

    #[serde(default)]
    pub exchange: ExchangeMode,

    #[serde(default)]
    pub start: StartView,

    /// Present for the dynamic ring only
    #[serde(default)]
    pub growth: Option<GrowthConfig>,
}

impl SimulationConfig {
    /// Static ring with partitioned red/green/blue colors
    pub fn ring(node_count: usize, fanout: usize) -> Self {
        Self {
            node_count,
            fanout,
            seed: 0,
            color_policy: ColorPolicy::Partitioned,
            exchange: ExchangeMode::PushPull,
            start: StartView::Exact,
            growth: None,
        }
    }

    /// Dynamic ring with uniform colors, growing by `batches`
    pub fn dynamic(node_count: usize, fanout: usize, batches: Vec<usize>) -> Self {
        Self {
            color_policy: ColorPolicy::Uniform,
            growth: Some(GrowthConfig::new(batches)),
            ..Self::ring(node_count, fanout)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_exchange(mut self, exchange: ExchangeMode) -> Self {
        self.exchange = exchange;
        self
    }

    pub fn with_start(mut self, start: StartView) -> Self {
        self.start = start;
        self
    }

    pub fn with_interval(mut self, interval: u64) -> Self {
        if let Some(growth) = self.growth.as_mut() {
            growth.interval = interval;
        }
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.growth.is_some()
    }

    /// Epoch count matching the configuration: one interval per growth
    /// batch on a dynamic ring, [`DEFAULT_RING_EPOCHS`] otherwise
    pub fn default_epochs(&self) -> u64 {
        match &self.growth {
            Some(g) => g.batches.len() as u64 * g.interval,
            None => DEFAULT_RING_EPOCHS,
        }
    }

    /// Reject configurations that cannot produce a well-formed overlay
    pub fn validate(&self) -> Result<()> {
        if self.fanout == 0 {
            return Err(OverlayError::InvalidParameter(
                "fanout k must be at least 1".into(),
            ));
        }
        if self.node_count <= self.fanout {
            return Err(OverlayError::InvalidParameter(format!(
                "node count {} must exceed fanout {}",
                self.node_count, self.fanout
            )));
        }
        if let Some(growth) = &self.growth {
            GrowthScheduler::new(growth.batches.iter().copied(), growth.interval)?;
        }
        Ok(())
    }
}
