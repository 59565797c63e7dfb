// Run progress: convergence per epoch plus the growth events seen so far

use tman_core::overlay::DistanceMetric;
use tman_core::{
    ConvergenceReport, ConvergenceTracker, GossipObserver, GrowthEvent, OverlayNetwork,
};

#[derive(Debug, Default)]
pub struct RunProgress {
    pub convergence: ConvergenceTracker,
    pub growth: Vec<GrowthEvent>,
    pub exchanges: usize,
}

impl RunProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a batch joined during `epoch`
    pub fn grew_at(&self, epoch: u64) -> bool {
        self.growth.last().is_some_and(|g| g.epoch == epoch)
    }

    pub fn latest(&self) -> Option<&ConvergenceReport> {
        self.convergence.last()
    }
}

impl GossipObserver for RunProgress {
    fn on_exchange(&mut self, _record: &tman_core::ExchangeRecord) {
        self.exchanges += 1;
    }

    fn on_growth(&mut self, event: &GrowthEvent) {
        self.growth.push(event.clone());
    }

    fn on_epoch_complete<R, M: DistanceMetric>(
        &mut self,
        epoch: u64,
        network: &OverlayNetwork<R, M>,
    ) -> tman_core::Result<()> {
        self.convergence.on_epoch_complete(epoch, network)
    }
}

/// Epochs that get a checkpoint: the first, every growth epoch and the last
pub fn is_checkpoint(epoch: u64, last: u64, grew: bool) -> bool {
    epoch == 1 || epoch == last || grew
}
