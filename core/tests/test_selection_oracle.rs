// k-NN selection against a brute-force sort
//
// Small integer coordinates make distance ties common, so the identity
// tie-break is exercised on nearly every case.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tman_core::overlay::measure;
use tman_core::{
    ColorGroup, DistanceMetric, FeatureVector, NeighborSelector, Node, NodeId, OverlayError,
    OverlayNetwork, Position, Rgb,
};

fn features_strategy() -> impl Strategy<Value = Vec<FeatureVector>> {
    prop::collection::vec((0i8..4, 0i8..4, 0i8..4), 2..24).prop_map(|coords| {
        coords
            .into_iter()
            .map(|(l, a, b)| FeatureVector::new(l as f64, a as f64, b as f64))
            .collect()
    })
}

fn brute_force(
    subject: NodeId,
    candidates: &[NodeId],
    k: usize,
    features: &[FeatureVector],
) -> Vec<NodeId> {
    let mut pool: Vec<NodeId> = candidates.iter().copied().filter(|&c| c != subject).collect();
    pool.sort_unstable();
    pool.dedup();

    let dist = |id: NodeId| tman_core::overlay::distance(&features[subject], &features[id]);
    pool.sort_by(|&x, &y| dist(x).total_cmp(&dist(y)).then(x.cmp(&y)));
    pool.truncate(k);
    pool
}

proptest! {
    #[test]
    fn prop_matches_brute_force(
        (features, subject, candidates) in features_strategy().prop_flat_map(|f| {
            let n = f.len();
            (Just(f), 0..n, prop::collection::vec(0..n, 0..40))
        }),
        k in 0usize..12,
    ) {
        let selector = NeighborSelector::new();
        let selected = selector
            .select_k_nearest(subject, candidates.iter().copied(), k, &features)
            .unwrap();

        prop_assert_eq!(&selected, &brute_force(subject, &candidates, k, &features));
        prop_assert!(!selected.contains(&subject));
    }

    #[test]
    fn prop_selection_is_prefix_of_ranking(
        (features, subject) in features_strategy().prop_flat_map(|f| {
            let n = f.len();
            (Just(f), 0..n)
        }),
        k in 1usize..12,
    ) {
        let selector = NeighborSelector::new();
        let n = features.len();
        let ranked: Vec<NodeId> = selector
            .rank_all(subject, 0..n, &features)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let selected = selector.select_k_nearest(subject, 0..n, k, &features).unwrap();

        prop_assert_eq!(selected.len(), k.min(n - 1));
        prop_assert_eq!(&selected[..], &ranked[..selected.len()]);
    }

    #[test]
    fn prop_candidate_order_does_not_matter(
        (features, subject, candidates) in features_strategy().prop_flat_map(|f| {
            let n = f.len();
            (Just(f), 0..n, prop::collection::vec(0..n, 1..30))
        }),
        k in 1usize..8,
    ) {
        let selector = NeighborSelector::new();
        let forward = selector
            .select_k_nearest(subject, candidates.iter().copied(), k, &features)
            .unwrap();
        let backward = selector
            .select_k_nearest(subject, candidates.iter().rev().copied(), k, &features)
            .unwrap();
        prop_assert_eq!(forward, backward);
    }
}

#[test]
fn test_unknown_candidate_is_an_error() {
    let features = vec![FeatureVector::new(0.0, 0.0, 0.0); 3];
    let selector = NeighborSelector::new();
    assert_eq!(
        selector.select_k_nearest(0, [1, 7], 2, &features),
        Err(OverlayError::UnknownNode(7))
    );
    assert_eq!(
        selector.select_k_nearest(9, [1], 2, &features),
        Err(OverlayError::UnknownNode(9))
    );
}

/// Euclidean distance with a per-axis weight
struct AxisWeighted([f64; 3]);

impl DistanceMetric for AxisWeighted {
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(a.0.iter().zip(b.0.iter()))
            .map(|(w, (x, y))| w * (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
}

fn chroma_heavy_features() -> Vec<FeatureVector> {
    vec![
        FeatureVector::new(50.0, 0.0, 0.0),
        FeatureVector::new(50.0, 4.0, 0.0),
        FeatureVector::new(56.0, 0.0, 0.0),
        FeatureVector::new(53.0, 1.0, 0.0),
        FeatureVector::new(70.0, 0.0, 0.0),
    ]
}

#[test]
fn test_weighted_metric_changes_ranking() {
    let features = chroma_heavy_features();

    let plain = NeighborSelector::new()
        .select_k_nearest(0, 0..5, 4, &features)
        .unwrap();
    assert_eq!(plain, vec![3, 1, 2, 4]);

    // a* weighted 36x: node 1 drops to last
    let weighted = NeighborSelector::with_metric(AxisWeighted([1.0, 36.0, 1.0]))
        .select_k_nearest(0, 0..5, 4, &features)
        .unwrap();
    assert_eq!(weighted, vec![2, 3, 4, 1]);
}

#[test]
fn test_network_ranks_with_custom_metric() {
    let nodes: Vec<Node> = chroma_heavy_features()
        .into_iter()
        .enumerate()
        .map(|(id, f)| {
            Node::new(id, Position::new(0.0, 0.0), f, Rgb::new(0, 0, 0), ColorGroup::Random)
        })
        .collect();

    let mut network = OverlayNetwork::from_nodes_with_metric(
        nodes,
        2,
        StdRng::seed_from_u64(1),
        AxisWeighted([1.0, 36.0, 1.0]),
    )
    .unwrap();
    network.initialize().unwrap();

    assert_eq!(network.node(0).unwrap().neighbors(), &[2, 3]);
    network.run(3).unwrap();
    assert!(measure(&network).unwrap().is_converged());
}
