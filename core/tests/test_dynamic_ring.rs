// Integration tests for the dynamic ring
//
// Scheduled growth: population, relocation, radius, view freshness and
// fail-fast behavior when the batch queue runs dry.

use tman_core::{
    ColorGroup, ExchangeLog, GossipObserver, GrowthEvent, OverlayError, OverlayNetwork,
    SimulationConfig,
};

fn assert_views_exact<R>(network: &OverlayNetwork<R>) {
    for node in network.nodes() {
        let exact = network.exact_neighbors(node.id()).unwrap();
        assert_eq!(node.neighbors(), exact.as_slice(), "node {}", node.id());
    }
}

#[test]
fn test_single_batch_growth() {
    let config = SimulationConfig::dynamic(10, 3, vec![5]).with_seed(21);
    let mut network = OverlayNetwork::build(&config).unwrap();
    network.initialize().unwrap();

    let before: Vec<_> = network.nodes().iter().map(|n| n.position()).collect();
    network.run(5).unwrap();

    assert_eq!(network.len(), 15);
    assert_eq!(network.epoch(), 5);
    assert!((network.radius() - 1.5).abs() < 1e-9);

    for (node, old) in network.nodes().iter().zip(&before) {
        assert_ne!(node.position(), *old, "node {} was not relocated", node.id());
    }
    for node in network.nodes() {
        assert!((node.position().radius() - 1.5).abs() < 1e-9);
        assert!(node.neighbors().iter().all(|&m| m < 15));
        assert_eq!(node.neighbors().len(), 3);
    }

    println!("✓ 10 + 5 nodes on a ring of radius 1.5");
}

#[test]
fn test_growth_keeps_views_exact() {
    let config = SimulationConfig::dynamic(20, 4, vec![6, 9]).with_seed(5);
    let mut network = OverlayNetwork::build(&config).unwrap();
    network.initialize().unwrap();

    let first = network.trigger_growth().unwrap();
    assert_eq!(first.joined, 20..26);
    assert_views_exact(&network);

    let second = network.trigger_growth().unwrap();
    assert_eq!(second.joined, 26..35);
    assert_eq!(second.population, 35);
    assert_views_exact(&network);

    assert_eq!(
        network.trigger_growth().unwrap_err(),
        OverlayError::ScheduleExhaustion { epoch: 1 }
    );
}

#[test]
fn test_joined_nodes_use_random_colors() {
    let config = SimulationConfig::dynamic(12, 3, vec![8]).with_seed(40);
    let mut network = OverlayNetwork::build(&config).unwrap();
    network.initialize().unwrap();
    let event = network.trigger_growth().unwrap();

    for id in event.joined {
        assert_eq!(network.node(id).unwrap().group(), ColorGroup::Random);
    }
}

#[test]
fn test_long_schedule() {
    let config = SimulationConfig::dynamic(45, 4, vec![2, 3, 5, 7, 8]).with_seed(2);
    assert_eq!(config.default_epochs(), 25);

    let mut network = OverlayNetwork::build(&config).unwrap();
    network.initialize().unwrap();

    let mut log = ExchangeLog::new();
    network.run_observed(25, &mut log).unwrap();

    let epochs: Vec<u64> = log.growth.iter().map(|g| g.epoch).collect();
    let populations: Vec<usize> = log.growth.iter().map(|g| g.population).collect();
    assert_eq!(epochs, vec![5, 10, 15, 20, 25]);
    assert_eq!(populations, vec![47, 50, 55, 62, 70]);
    assert_eq!(network.len(), 70);
    assert!((network.radius() - 70.0 / 45.0).abs() < 1e-9);

    // Growth happens before the pass, so every node of a growth epoch
    // initiates an exchange in that same epoch
    assert_eq!(log.for_epoch(25).count(), 70);
    assert_eq!(log.for_epoch(24).count(), 62);

    println!("✓ 45 → 70 nodes across 5 growth events");
}

#[test]
fn test_exhaustion_is_reported_before_running() {
    let config = SimulationConfig::dynamic(10, 3, vec![5, 5]).with_seed(1);
    let mut network = OverlayNetwork::build(&config).unwrap();
    network.initialize().unwrap();

    assert_eq!(
        network.run(15),
        Err(OverlayError::ScheduleExhaustion { epoch: 15 })
    );
    assert_eq!(network.epoch(), 0);
    assert_eq!(network.len(), 10);
}

#[test]
fn test_schedule_checked_across_runs() {
    let config = SimulationConfig::dynamic(10, 3, vec![5, 5]).with_seed(1);
    let mut network = OverlayNetwork::build(&config).unwrap();
    network.initialize().unwrap();

    network.run(5).unwrap();
    network.run(5).unwrap();
    network.run(1).unwrap();
    assert_eq!(network.len(), 20);
    assert_eq!(network.growth().unwrap().remaining(), 0);

    assert_eq!(
        network.run(4),
        Err(OverlayError::ScheduleExhaustion { epoch: 15 })
    );
    assert_eq!(network.epoch(), 11);

    // Stopping short of the next growth epoch is fine
    network.run(3).unwrap();
    assert_eq!(network.epoch(), 14);
}

#[test]
fn test_observer_sees_growth_first() {
    #[derive(Default)]
    struct Order {
        events: Vec<&'static str>,
    }

    impl GossipObserver for Order {
        fn on_exchange(&mut self, _record: &tman_core::ExchangeRecord) {
            if self.events.last() != Some(&"exchange") {
                self.events.push("exchange");
            }
        }

        fn on_growth(&mut self, _event: &GrowthEvent) {
            self.events.push("growth");
        }
    }

    let config = SimulationConfig::dynamic(10, 2, vec![3]).with_interval(2);
    let mut network = OverlayNetwork::build(&config).unwrap();
    network.initialize().unwrap();

    let mut order = Order::default();
    network.run_observed(2, &mut order).unwrap();
    assert_eq!(order.events, vec!["exchange", "growth", "exchange"]);
}
