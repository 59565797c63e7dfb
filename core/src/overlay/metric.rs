//! Feature-space distance
//!
//! Nodes are ranked by the distance between their 3-D feature vectors
//! (CIE L*a*b* coordinates). The metric is a trait so a selector can be
//! built over something other than plain Euclidean distance.

use serde::{Deserialize, Serialize};

/// A point in the 3-D perceptual feature space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; 3]);

impl FeatureVector {
    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Self([l, a, b])
    }

    pub fn l(&self) -> f64 {
        self.0[0]
    }

    pub fn a(&self) -> f64 {
        self.0[1]
    }

    pub fn b(&self) -> f64 {
        self.0[2]
    }
}

impl From<[f64; 3]> for FeatureVector {
    fn from(v: [f64; 3]) -> Self {
        Self(v)
    }
}

/// Distance between two feature vectors.
///
/// Implementations must be pure and symmetric, and return zero for identical
/// inputs.
pub trait DistanceMetric {
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> f64;
}

/// Euclidean norm of the componentwise difference (CIE76 delta-E in Lab space)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> f64 {
        a.0.iter()
            .zip(b.0.iter())
            .map(|(x, y)| (y - x) * (y - x))
            .sum::<f64>()
            .sqrt()
    }
}

/// Free-function form of [`Euclidean`]
pub fn distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    Euclidean.distance(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_on_identical() {
        let v = FeatureVector::new(53.2, 80.1, 67.2);
        assert_eq!(distance(&v, &v), 0.0);
    }

    #[test]
    fn test_pythagorean() {
        let a = FeatureVector::new(0.0, 0.0, 0.0);
        let b = FeatureVector::new(3.0, 4.0, 12.0);
        assert!((distance(&a, &b) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let a = FeatureVector::new(12.5, -3.0, 40.0);
        let b = FeatureVector::new(-7.0, 22.0, 1.5);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_accessors() {
        let v = FeatureVector::from([1.0, 2.0, 3.0]);
        assert_eq!((v.l(), v.a(), v.b()), (1.0, 2.0, 3.0));
    }
}
