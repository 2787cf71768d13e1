//! Distance Metrics for Clustering
//!
//! This module provides the distance metrics used by the clustering loop:
//!
//! - **Euclidean**: standard isotropic L2 distance, treating every
//!   dimension as equally scaled and uncorrelated.
//! - **Mahalanobis**: covariance-weighted distance that rescales dimensions
//!   by the inverse of a per-cluster covariance estimate, accounting for
//!   correlation and scale differences between dimensions.
//!
//! The metric is a closed set of variants rather than a trait object: the
//! iteration loop is written once against [`DistanceModel`], which carries
//! the per-cluster whitening matrices when the Mahalanobis metric is
//! active and nothing otherwise.
//!
//! # Example
//!
//! ```
//! use flock::distance::euclidean_distance;
//!
//! let a = vec![0.0, 0.0, 0.0];
//! let b = vec![1.0, 2.0, 2.0];
//! assert!((euclidean_distance(&a, &b) - 3.0).abs() < 1e-12);
//! ```

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Distance metric selector for a clustering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Metric {
    /// Euclidean (L2) distance
    #[default]
    Euclidean,
    /// Covariance-weighted (Mahalanobis) distance
    ///
    /// Each cluster's distances are whitened by the inverse of a covariance
    /// matrix estimated from the points assigned to it on the previous
    /// iteration. On the first iteration, before any assignment exists,
    /// every cluster shares a single covariance pooled over all points.
    Mahalanobis,
}

/// Per-iteration distance state, built once per assignment pass.
///
/// The Euclidean variant is stateless; the Mahalanobis variant holds one
/// whitening (inverse covariance) matrix per cluster.
#[derive(Debug, Clone)]
pub(crate) enum DistanceModel {
    Euclidean,
    Mahalanobis(Vec<DMatrix<f64>>),
}

impl DistanceModel {
    /// Distance from `point` to `centroid`, where `cluster` is the
    /// centroid's index (selects the whitening matrix under Mahalanobis).
    #[inline]
    pub(crate) fn distance(&self, point: &[f64], cluster: usize, centroid: &[f64]) -> f64 {
        match self {
            Self::Euclidean => euclidean_distance(point, centroid),
            Self::Mahalanobis(whitening) => {
                mahalanobis_distance(point, centroid, &whitening[cluster])
            }
        }
    }
}

/// Compute Euclidean (L2) distance
///
/// # Panics
/// Panics if `a` and `b` have different lengths.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Compute squared Euclidean distance (faster, for comparisons)
///
/// # Panics
/// Panics if `a` and `b` have different lengths.
#[inline]
pub fn euclidean_distance_squared(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "vectors must have equal length for euclidean distance"
    );
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Compute Mahalanobis distance `sqrt((x - c)^T W (x - c))` where `W` is a
/// whitening (inverse covariance) matrix.
///
/// The quadratic form is clamped at zero before the square root: a
/// near-singular whitening matrix can produce a slightly negative value
/// through floating-point error.
///
/// # Panics
/// Panics if `point` and `centroid` have different lengths, or if `W` is
/// not square with side `point.len()`.
#[inline]
pub fn mahalanobis_distance(point: &[f64], centroid: &[f64], whitening: &DMatrix<f64>) -> f64 {
    assert_eq!(
        point.len(),
        centroid.len(),
        "vectors must have equal length for mahalanobis distance"
    );
    assert_eq!(
        whitening.nrows(),
        point.len(),
        "whitening matrix must match point dimensionality"
    );
    assert_eq!(
        whitening.ncols(),
        point.len(),
        "whitening matrix must be square"
    );

    let diff = DVector::from_iterator(
        point.len(),
        point.iter().zip(centroid.iter()).map(|(x, c)| x - c),
    );
    let quad = (diff.transpose() * whitening * &diff)[(0, 0)];
    quad.max(0.0).sqrt()
}
