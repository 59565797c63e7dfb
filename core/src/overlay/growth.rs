//! Scheduled ring growth
//!
//! The dynamic ring grows by batches. A queue of batch sizes is consumed
//! front to back, one batch every `interval` epochs (epochs counted from 1).
//! Each growth widens the ring so that arc spacing between neighbors stays
//! the same as before the batch joined.

use std::collections::VecDeque;

use crate::{OverlayError, Result};

/// Queue of pending join batches plus the current ring radius
#[derive(Debug, Clone)]
pub struct GrowthScheduler {
    pending: VecDeque<usize>,
    interval: u64,
    radius: f64,
    triggered: usize,
}

impl GrowthScheduler {
    pub const DEFAULT_INTERVAL: u64 = 5;
    pub const INITIAL_RADIUS: f64 = 1.0;

    /// Create a scheduler over `batches`, firing every `interval` epochs.
    ///
    /// # Errors
    ///
    /// [`OverlayError::InvalidParameter`] for a zero interval or a zero-size
    /// batch.
    pub fn new<I>(batches: I, interval: u64) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        if interval == 0 {
            return Err(OverlayError::InvalidParameter(
                "growth interval must be at least 1".into(),
            ));
        }
        let pending: VecDeque<usize> = batches.into_iter().collect();
        if let Some(pos) = pending.iter().position(|&b| b == 0) {
            return Err(OverlayError::InvalidParameter(format!(
                "growth batch #{} is empty",
                pos + 1
            )));
        }

        Ok(Self {
            pending,
            interval,
            radius: Self::INITIAL_RADIUS,
            triggered: 0,
        })
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Batches not yet consumed
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Growth events fired so far
    pub fn triggered(&self) -> usize {
        self.triggered
    }

    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().copied()
    }

    /// Run length that consumes exactly the queued batches
    pub fn scheduled_epochs(&self) -> u64 {
        self.pending.len() as u64 * self.interval
    }

    /// Whether growth fires before the gossip pass of `epoch` (1-based)
    pub fn is_due(&self, epoch: u64) -> bool {
        epoch > 0 && epoch % self.interval == 0
    }

    /// Growth events falling in epochs `first..first + epochs`
    pub fn events_between(&self, first: u64, epochs: u64) -> u64 {
        if epochs == 0 {
            return 0;
        }
        let first = first.max(1);
        let last = first + epochs - 1;
        last / self.interval - (first - 1) / self.interval
    }

    /// Check that the queue can feed every growth event in the given window.
    ///
    /// # Errors
    ///
    /// [`OverlayError::ScheduleExhaustion`] naming the first epoch that
    /// would find the queue empty.
    pub fn ensure_covers(&self, first: u64, epochs: u64) -> Result<()> {
        let needed = self.events_between(first, epochs);
        let available = self.pending.len() as u64;
        if needed <= available {
            return Ok(());
        }

        let first_due = first.max(1).div_ceil(self.interval) * self.interval;
        Err(OverlayError::ScheduleExhaustion {
            epoch: first_due + available * self.interval,
        })
    }

    /// Dequeue the batch for `epoch`
    ///
    /// # Errors
    ///
    /// [`OverlayError::ScheduleExhaustion`] if the queue is empty.
    pub fn next_batch(&mut self, epoch: u64) -> Result<usize> {
        let batch = self
            .pending
            .pop_front()
            .ok_or(OverlayError::ScheduleExhaustion { epoch })?;
        self.triggered += 1;
        Ok(batch)
    }

    /// Widen the ring for `population + batch` nodes, keeping arc spacing.
    /// Returns the new radius.
    pub fn widen(&mut self, population: usize, batch: usize) -> f64 {
        if population > 0 {
            self.radius *= (population + batch) as f64 / population as f64;
        }
        self.radius
    }
}
