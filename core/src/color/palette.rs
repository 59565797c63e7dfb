//! Color assignment policies
//!
//! A policy turns a node count into one display color per node. The
//! partitioned policy splits the population into red, green and blue groups
//! of near-equal size; the uniform policy draws every channel at random.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form, as plotting tools expect it
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Which bucket a node's color was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorGroup {
    Red,
    Green,
    Blue,
    /// Drawn from the full color cube
    Random,
}

impl ColorGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorGroup::Red => "red",
            ColorGroup::Green => "green",
            ColorGroup::Blue => "blue",
            ColorGroup::Random => "random",
        }
    }

    /// Draw a color from this group's range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        let high = |rng: &mut R| -> u8 { rng.gen_range(200..255) };
        let low = |rng: &mut R| -> u8 { rng.gen_range(0..80) };

        match self {
            ColorGroup::Red => {
                let r = high(rng);
                Rgb::new(r, low(rng), low(rng))
            }
            ColorGroup::Green => {
                let r = low(rng);
                let g = high(rng);
                Rgb::new(r, g, low(rng))
            }
            ColorGroup::Blue => {
                let r = low(rng);
                let g = low(rng);
                Rgb::new(r, g, high(rng))
            }
            ColorGroup::Random => Rgb::new(
                rng.gen_range(0..255),
                rng.gen_range(0..255),
                rng.gen_range(0..255),
            ),
        }
    }
}

impl fmt::Display for ColorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How colors are handed out to a batch of nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPolicy {
    /// Red, green and blue groups of near-equal size, in that order
    #[default]
    Partitioned,
    /// Every channel uniformly random
    Uniform,
}

impl ColorPolicy {
    /// Produce `count` colors. Partitioned output is grouped: all reds
    /// first, then greens, then blues.
    pub fn assign<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<(Rgb, ColorGroup)> {
        match self {
            ColorPolicy::Uniform => (0..count)
                .map(|_| (ColorGroup::Random.sample(rng), ColorGroup::Random))
                .collect(),
            ColorPolicy::Partitioned => {
                let groups = [ColorGroup::Red, ColorGroup::Green, ColorGroup::Blue];
                let counts = group_counts(count, groups.len());

                let mut colors = Vec::with_capacity(count);
                for (group, n) in groups.iter().zip(counts) {
                    for _ in 0..n {
                        colors.push((group.sample(rng), *group));
                    }
                }
                colors
            }
        }
    }
}

/// Split `total` into `groups` buckets whose sizes differ by at most one.
/// The first `total % groups` buckets take the extra element.
pub fn group_counts(total: usize, groups: usize) -> Vec<usize> {
    if groups == 0 {
        return Vec::new();
    }
    (0..groups)
        .map(|g| total / groups + usize::from(g < total % groups))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_group_counts_balanced() {
        assert_eq!(group_counts(10, 3), vec![4, 3, 3]);
        assert_eq!(group_counts(11, 3), vec![4, 4, 3]);
        assert_eq!(group_counts(9, 3), vec![3, 3, 3]);
        assert_eq!(group_counts(2, 3), vec![1, 1, 0]);
        assert!(group_counts(5, 0).is_empty());
    }

    #[test]
    fn test_partitioned_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let colors = ColorPolicy::Partitioned.assign(30, &mut rng);
        assert_eq!(colors.len(), 30);

        for (rgb, group) in &colors {
            match group {
                ColorGroup::Red => assert!(rgb.r >= 200 && rgb.g < 80 && rgb.b < 80),
                ColorGroup::Green => assert!(rgb.g >= 200 && rgb.r < 80 && rgb.b < 80),
                ColorGroup::Blue => assert!(rgb.b >= 200 && rgb.r < 80 && rgb.g < 80),
                ColorGroup::Random => panic!("partitioned policy produced a random color"),
            }
        }

        // Grouped in order
        assert!(colors[..10].iter().all(|(_, g)| *g == ColorGroup::Red));
        assert!(colors[10..20].iter().all(|(_, g)| *g == ColorGroup::Green));
        assert!(colors[20..].iter().all(|(_, g)| *g == ColorGroup::Blue));
    }

    #[test]
    fn test_uniform_policy() {
        let mut rng = StdRng::seed_from_u64(7);
        let colors = ColorPolicy::Uniform.assign(12, &mut rng);
        assert_eq!(colors.len(), 12);
        assert!(colors.iter().all(|(_, g)| *g == ColorGroup::Random));
    }

    #[test]
    fn test_assignment_is_seeded() {
        let a = ColorPolicy::Uniform.assign(20, &mut StdRng::seed_from_u64(99));
        let b = ColorPolicy::Uniform.assign(20, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(255, 0, 16).hex(), "#ff0010");
    }

    #[test]
    fn test_group_serde_names() {
        let json = serde_json::to_string(&ColorGroup::Green).unwrap();
        assert_eq!(json, "\"green\"");
        let policy: ColorPolicy = serde_json::from_str("\"uniform\"").unwrap();
        assert_eq!(policy, ColorPolicy::Uniform);
    }
}
