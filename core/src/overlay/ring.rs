//! Ring layout
//!
//! Nodes sit on evenly spaced points of a circle. Which node lands on which
//! point is random, so ring adjacency carries no information about color.

use std::f64::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;

use super::node::Position;

/// `count` evenly spaced points on a circle of `radius`, starting at angle 0
pub fn ring_points(count: usize, radius: f64) -> Vec<Position> {
    (0..count)
        .map(|i| {
            let theta = TAU / count as f64 * i as f64;
            Position::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// Ring points in random order; callers pop slots off as they place nodes
pub fn shuffled_ring<R: Rng + ?Sized>(count: usize, radius: f64, rng: &mut R) -> Vec<Position> {
    let mut points = ring_points(count, radius);
    points.shuffle(rng);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_points_on_circle() {
        let points = ring_points(12, 3.0);
        assert_eq!(points.len(), 12);
        for p in &points {
            assert!((p.radius() - 3.0).abs() < 1e-9);
        }
        assert!((points[0].x - 3.0).abs() < 1e-12);
        assert!(points[0].y.abs() < 1e-12);
    }

    #[test]
    fn test_points_evenly_spaced() {
        let points = ring_points(8, 1.0);
        let gap = |a: Position, b: Position| (a.x - b.x).hypot(a.y - b.y);
        let first = gap(points[0], points[1]);
        for i in 1..points.len() {
            let next = (i + 1) % points.len();
            assert!((gap(points[i], points[next]) - first).abs() < 1e-9);
        }
    }

    #[test]
    fn test_shuffle_keeps_points() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut shuffled = shuffled_ring(10, 2.0, &mut rng);
        let mut plain = ring_points(10, 2.0);

        let key = |p: &Position| (p.x.to_bits(), p.y.to_bits());
        shuffled.sort_by_key(key);
        plain.sort_by_key(key);
        assert_eq!(shuffled, plain);
    }

    #[test]
    fn test_empty_ring() {
        assert!(ring_points(0, 1.0).is_empty());
    }
}
