//! Overlay network: population, bootstrap and epoch-driven gossip
//!
//! The network owns every node in an arena indexed by [`NodeId`]. Nodes
//! refer to each other only by id, and feature vectors are mirrored in a
//! flat table so one node can be reranked while the others are read.
//!
//! An epoch walks the population in identity order. Each node picks a random
//! peer from its view and the two disclose `view + self` to each other; each
//! side merges what it received and keeps its k nearest. A network built
//! with a growth plan is the dynamic ring: every `interval` epochs a batch
//! joins before the gossip pass and the whole ring is laid out again.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::growth::GrowthScheduler;
use super::metric::{DistanceMetric, Euclidean, FeatureVector};
use super::node::{Node, NodeId};
use super::observer::{ExchangeRecord, GossipObserver, GrowthEvent};
use super::ring::shuffled_ring;
use super::selector::NeighborSelector;
use crate::color::{rgb_to_lab, ColorPolicy};
use crate::config::{ExchangeMode, SimulationConfig, StartView};
use crate::{OverlayError, Result};

pub struct OverlayNetwork<R = StdRng, M = Euclidean> {
    nodes: Vec<Node>,
    /// `features[id]` mirrors `nodes[id].features()`
    features: Vec<FeatureVector>,
    fanout: usize,
    /// Completed epochs
    epoch: u64,
    exchange: ExchangeMode,
    start: StartView,
    selector: NeighborSelector<M>,
    growth: Option<GrowthScheduler>,
    growth_colors: ColorPolicy,
    rng: R,
}

impl OverlayNetwork<StdRng> {
    /// Build from a config, seeding the random source from `config.seed`
    pub fn build(config: &SimulationConfig) -> Result<Self> {
        Self::build_with_rng(config, StdRng::seed_from_u64(config.seed))
    }
}

impl<R: Rng> OverlayNetwork<R> {
    /// Build the initial population with an injected random source
    pub fn build_with_rng(config: &SimulationConfig, rng: R) -> Result<Self> {
        Self::build_with_metric(config, rng, Euclidean)
    }

    /// Build from caller-supplied nodes, ranked by Euclidean distance
    pub fn from_nodes(nodes: Vec<Node>, fanout: usize, rng: R) -> Result<Self> {
        Self::from_nodes_with_metric(nodes, fanout, rng, Euclidean)
    }
}

impl<R: Rng, M: DistanceMetric> OverlayNetwork<R, M> {
    /// Build the initial population, ranking neighbors with `metric`.
    ///
    /// Colors come from the config's policy and are converted to Lab
    /// features; ring slots are handed out at random. Views stay empty until
    /// [`initialize`](Self::initialize) (or [`start`](Self::start)).
    pub fn build_with_metric(config: &SimulationConfig, mut rng: R, metric: M) -> Result<Self> {
        config.validate()?;

        let growth = config
            .growth
            .as_ref()
            .map(|g| GrowthScheduler::new(g.batches.iter().copied(), g.interval))
            .transpose()?;
        let growth_colors = config
            .growth
            .as_ref()
            .map_or(ColorPolicy::Uniform, |g| g.color_policy);
        let radius = growth
            .as_ref()
            .map_or(GrowthScheduler::INITIAL_RADIUS, |g| g.radius());

        let colors = config.color_policy.assign(config.node_count, &mut rng);
        let slots = shuffled_ring(config.node_count, radius, &mut rng);

        let mut nodes = Vec::with_capacity(config.node_count);
        let mut features = Vec::with_capacity(config.node_count);
        for (id, ((rgb, group), position)) in colors.into_iter().zip(slots).enumerate() {
            let lab = rgb_to_lab(rgb);
            features.push(lab);
            nodes.push(Node::new(id, position, lab, rgb, group));
        }

        info!(
            nodes = nodes.len(),
            fanout = config.fanout,
            dynamic = growth.is_some(),
            "Built overlay"
        );

        Ok(Self {
            nodes,
            features,
            fanout: config.fanout,
            epoch: 0,
            exchange: config.exchange,
            start: config.start,
            selector: NeighborSelector::with_metric(metric),
            growth,
            growth_colors,
            rng,
        })
    }

    /// Build from caller-supplied nodes (features already assigned).
    ///
    /// Node ids must equal their index. The network runs push-pull with an
    /// exact start and no growth plan.
    pub fn from_nodes_with_metric(
        nodes: Vec<Node>,
        fanout: usize,
        rng: R,
        metric: M,
    ) -> Result<Self> {
        if fanout == 0 {
            return Err(OverlayError::InvalidParameter(
                "fanout k must be at least 1".into(),
            ));
        }
        if nodes.len() <= fanout {
            return Err(OverlayError::InvalidParameter(format!(
                "node count {} must exceed fanout {}",
                nodes.len(),
                fanout
            )));
        }
        if let Some((index, node)) = nodes.iter().enumerate().find(|(i, n)| n.id() != *i) {
            return Err(OverlayError::InvalidParameter(format!(
                "node at index {} has id {}",
                index,
                node.id()
            )));
        }

        let features = nodes.iter().map(|n| *n.features()).collect();
        Ok(Self {
            nodes,
            features,
            fanout,
            epoch: 0,
            exchange: ExchangeMode::PushPull,
            start: StartView::Exact,
            selector: NeighborSelector::with_metric(metric),
            growth: None,
            growth_colors: ColorPolicy::Uniform,
            rng,
        })
    }

    /// Seed views the way the config asks for
    pub fn start(&mut self) -> Result<()> {
        match self.start {
            StartView::Exact => self.initialize(),
            StartView::Random => self.initialize_random(),
        }
    }

    /// Exact k-NN bootstrap for every node. O(n²).
    pub fn initialize(&mut self) -> Result<()> {
        let population = self.nodes.len();
        for node in self.nodes.iter_mut() {
            node.bootstrap(0..population, self.fanout, &self.selector, &self.features)?;
        }
        info!(nodes = population, fanout = self.fanout, "Exact k-NN bootstrap complete");
        Ok(())
    }

    /// Give every node `k` distinct random peers as its starting view,
    /// ordered nearest first
    pub fn initialize_random(&mut self) -> Result<()> {
        let population = self.nodes.len();
        let k = self.fanout.min(population.saturating_sub(1));

        for id in 0..population {
            let others: Vec<NodeId> = (0..population).filter(|&other| other != id).collect();
            let sampled: Vec<NodeId> = others.choose_multiple(&mut self.rng, k).copied().collect();
            let view = self.selector.select_k_nearest(id, sampled, k, &self.features)?;
            self.nodes[id].seed_view(view);
        }
        info!(nodes = population, fanout = self.fanout, "Random start views assigned");
        Ok(())
    }

    /// One gossip exchange initiated by `initiator`.
    ///
    /// Both payloads are captured before either side merges, so the outcome
    /// does not depend on which side is updated first.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnknownNode`] for an id outside the population,
    /// [`OverlayError::EmptyNeighborSet`] if the initiator has no view.
    pub fn communicate(&mut self, initiator: NodeId) -> Result<ExchangeRecord> {
        let node = self
            .nodes
            .get(initiator)
            .ok_or(OverlayError::UnknownNode(initiator))?;
        let peer = node.select_random_peer(&mut self.rng)?;
        let initiator_payload = node.exchange_payload();
        let peer_payload = self
            .nodes
            .get(peer)
            .ok_or(OverlayError::UnknownNode(peer))?
            .exchange_payload();

        if self.exchange == ExchangeMode::PushPull {
            self.nodes[initiator].merge_and_rerank(
                &peer_payload,
                self.fanout,
                &self.selector,
                &self.features,
            )?;
        }
        self.nodes[peer].merge_and_rerank(
            &initiator_payload,
            self.fanout,
            &self.selector,
            &self.features,
        )?;

        debug!(initiator, peer, epoch = self.epoch + 1, "Exchanged views");

        Ok(ExchangeRecord {
            epoch: self.epoch + 1,
            initiator,
            peer,
            initiator_payload,
            peer_payload,
        })
    }

    pub fn run_epoch(&mut self) -> Result<()> {
        self.run_epoch_observed(&mut ())
    }

    /// Run one epoch: growth if due, then one exchange per node in identity
    /// order
    pub fn run_epoch_observed<O: GossipObserver>(&mut self, observer: &mut O) -> Result<()> {
        let epoch = self.epoch + 1;

        if self.growth.as_ref().is_some_and(|g| g.is_due(epoch)) {
            let event = self.trigger_growth()?;
            observer.on_growth(&event);
        }

        for id in 0..self.nodes.len() {
            let record = self.communicate(id)?;
            observer.on_exchange(&record);
        }

        self.epoch = epoch;
        observer.on_epoch_complete(epoch, self)
    }

    pub fn run(&mut self, epochs: u64) -> Result<()> {
        self.run_observed(epochs, &mut ())
    }

    /// Run exactly `epochs` epochs.
    ///
    /// # Errors
    ///
    /// [`OverlayError::InvalidParameter`] for `epochs == 0`;
    /// [`OverlayError::ScheduleExhaustion`] up front if the growth queue
    /// cannot cover every growth epoch in the run.
    pub fn run_observed<O: GossipObserver>(&mut self, epochs: u64, observer: &mut O) -> Result<()> {
        if epochs == 0 {
            return Err(OverlayError::InvalidParameter(
                "epoch count must be at least 1".into(),
            ));
        }
        self.ensure_schedule(epochs)?;

        for _ in 0..epochs {
            self.run_epoch_observed(observer)?;
        }

        info!(epochs, population = self.nodes.len(), "Gossip run complete");
        Ok(())
    }

    /// Check the growth queue covers the next `epochs` epochs
    pub fn ensure_schedule(&self, epochs: u64) -> Result<()> {
        match &self.growth {
            Some(growth) => growth.ensure_covers(self.epoch + 1, epochs),
            None => Ok(()),
        }
    }

    /// Let the next queued batch join.
    ///
    /// New nodes get random ring slots and colors, existing nodes are moved
    /// to the remaining slots of the widened ring, existing views are merged
    /// with the batch and each new node gets an exact k-NN view over the
    /// combined population.
    ///
    /// # Errors
    ///
    /// [`OverlayError::InvalidParameter`] on a static ring;
    /// [`OverlayError::ScheduleExhaustion`] if the queue is empty.
    pub fn trigger_growth(&mut self) -> Result<GrowthEvent> {
        let epoch = self.epoch + 1;
        let existing = self.nodes.len();

        let scheduler = self.growth.as_mut().ok_or_else(|| {
            OverlayError::InvalidParameter("network has no growth schedule".into())
        })?;
        let batch = scheduler.next_batch(epoch)?;
        let radius = scheduler.widen(existing, batch);
        let population = existing + batch;

        let colors = self.growth_colors.assign(batch, &mut self.rng);
        let mut slots = shuffled_ring(population, radius, &mut self.rng);
        let relocated = slots.split_off(batch);

        let mut joined = Vec::with_capacity(batch);
        for (offset, ((rgb, group), position)) in colors.into_iter().zip(slots).enumerate() {
            let lab = rgb_to_lab(rgb);
            self.features.push(lab);
            joined.push(Node::new(existing + offset, position, lab, rgb, group));
        }

        let new_ids: Vec<NodeId> = (existing..population).collect();
        for (node, position) in self.nodes.iter_mut().zip(relocated) {
            node.relocate(position);
            node.merge_and_rerank(&new_ids, self.fanout, &self.selector, &self.features)?;
        }
        for node in joined.iter_mut() {
            node.bootstrap(0..population, self.fanout, &self.selector, &self.features)?;
        }
        self.nodes.extend(joined);

        info!(epoch, batch, population, radius, "Ring grew");

        Ok(GrowthEvent {
            epoch,
            batch,
            population,
            radius,
            joined: existing..population,
        })
    }
}

impl<R, M> OverlayNetwork<R, M> {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Completed epochs
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn exchange_mode(&self) -> ExchangeMode {
        self.exchange
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn selector(&self) -> &NeighborSelector<M> {
        &self.selector
    }

    pub fn growth(&self) -> Option<&GrowthScheduler> {
        self.growth.as_ref()
    }

    /// Current ring radius
    pub fn radius(&self) -> f64 {
        self.growth
            .as_ref()
            .map_or(GrowthScheduler::INITIAL_RADIUS, |g| g.radius())
    }

    /// Directed `(node, neighbor)` edges of the current overlay
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .flat_map(|n| n.neighbors().iter().map(move |&m| (n.id(), m)))
            .collect()
    }
}

impl<R, M: DistanceMetric> OverlayNetwork<R, M> {
    /// The exact k nearest of `id` over the current population
    pub fn exact_neighbors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.selector
            .select_k_nearest(id, 0..self.nodes.len(), self.fanout, &self.features)
    }
}
