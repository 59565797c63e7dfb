//! k-nearest neighbor selection
//!
//! Given a subject node and a pool of candidate identities, rank the
//! candidates by feature distance and keep the k nearest. Ties on distance
//! are broken by ascending identity, so selection is fully deterministic.
//!
//! Selection keeps a bounded max-heap of size k: the root is the worst
//! candidate kept so far and is evicted whenever something closer arrives.
//! [`NeighborSelector::rank_all`] is the full-sort equivalent and serves as
//! the reference ordering.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::metric::{DistanceMetric, Euclidean, FeatureVector};
use super::node::NodeId;
use crate::{OverlayError, Result};

/// Heap entry ordered by `(distance, id)`; the heap root is the farthest.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    id: NodeId,
    distance: f64,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

/// Ranks candidate nodes by distance from a subject
#[derive(Debug, Clone, Default)]
pub struct NeighborSelector<M = Euclidean> {
    metric: M,
}

impl NeighborSelector<Euclidean> {
    pub fn new() -> Self {
        Self { metric: Euclidean }
    }
}

impl<M: DistanceMetric> NeighborSelector<M> {
    /// Create a selector over a custom metric
    pub fn with_metric(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Select the `k` candidates nearest to `subject`.
    ///
    /// The subject is excluded and duplicate candidates are collapsed. The
    /// result is sorted ascending by `(distance, id)` and holds
    /// `min(k, |candidates \ {subject}|)` entries; a short pool is returned
    /// whole rather than padded.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnknownNode`] if the subject or any candidate has no
    /// entry in `features`.
    pub fn select_k_nearest<I>(
        &self,
        subject: NodeId,
        candidates: I,
        k: usize,
        features: &[FeatureVector],
    ) -> Result<Vec<NodeId>>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let origin = lookup(features, subject)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut heap: BinaryHeap<Ranked> = BinaryHeap::with_capacity(k + 1);
        let mut seen = HashSet::new();

        for id in candidates {
            if id == subject || !seen.insert(id) {
                continue;
            }
            let entry = Ranked {
                id,
                distance: self.metric.distance(origin, lookup(features, id)?),
            };

            // Heap is full and this one is no better than the worst kept
            if heap.len() >= k {
                if let Some(worst) = heap.peek() {
                    if entry >= *worst {
                        continue;
                    }
                }
            }

            heap.push(entry);
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap.into_sorted_vec().into_iter().map(|r| r.id).collect())
    }

    /// Rank every candidate (minus the subject and duplicates) by
    /// `(distance, id)` ascending, returning the distance alongside each id.
    pub fn rank_all<I>(
        &self,
        subject: NodeId,
        candidates: I,
        features: &[FeatureVector],
    ) -> Result<Vec<(NodeId, f64)>>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let origin = lookup(features, subject)?;
        let mut seen = HashSet::new();
        let mut ranked = Vec::new();

        for id in candidates {
            if id == subject || !seen.insert(id) {
                continue;
            }
            ranked.push(Ranked {
                id,
                distance: self.metric.distance(origin, lookup(features, id)?),
            });
        }

        ranked.sort();
        Ok(ranked.into_iter().map(|r| (r.id, r.distance)).collect())
    }

    /// Distance between two nodes of the arena
    pub fn distance_between(
        &self,
        a: NodeId,
        b: NodeId,
        features: &[FeatureVector],
    ) -> Result<f64> {
        Ok(self
            .metric
            .distance(lookup(features, a)?, lookup(features, b)?))
    }
}

fn lookup(features: &[FeatureVector], id: NodeId) -> Result<&FeatureVector> {
    features.get(id).ok_or(OverlayError::UnknownNode(id))
}
