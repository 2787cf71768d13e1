//! Centroid-Based Clustering
//!
//! Lloyd-style iteration: assign every point to its nearest centroid under
//! the configured metric, recompute each centroid as the mean of its
//! assigned points, and stop when the assignment vector repeats exactly or
//! the iteration budget runs out.
//!
//! # Example
//!
//! ```
//! use flock::{KMeans, KMeansConfig};
//!
//! fn main() -> flock::Result<()> {
//!     let data = vec![
//!         vec![0.0, 0.0],
//!         vec![0.1, 0.0],
//!         vec![9.9, 5.0],
//!         vec![10.0, 5.0],
//!     ];
//!
//!     let config = KMeansConfig::default().with_seed(7);
//!     let model = KMeans::fit(&data, 2, config)?;
//!
//!     assert_eq!(model.labels().len(), 4);
//!     assert_eq!(model.centroids().len(), 2);
//!     Ok(())
//! }
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::covariance;
use crate::distance::{DistanceModel, Metric};
use crate::error::{FlockError, Result};

/// Configuration for a clustering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Maximum iterations before the loop gives up on stabilizing.
    ///
    /// Exhausting the budget is not an error; the last computed assignment
    /// is accepted and [`KMeans::converged`] reports `false`.
    pub max_iterations: usize,
    /// Distance metric used for assignment.
    pub metric: Metric,
    /// Seed for centroid initialization.
    ///
    /// Each fit owns a private generator seeded from this value, so
    /// concurrent fits never share random state.
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            metric: Metric::Euclidean,
            seed: 2,
        }
    }
}

impl KMeansConfig {
    /// Set max iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the distance metric
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the initialization seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A fitted clustering model
///
/// Produced by [`KMeans::fit`]; immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
    config: KMeansConfig,
    iterations: usize,
    converged: bool,
}

impl KMeans {
    /// Fit k-means to a dataset.
    ///
    /// Initialization draws `k` row indices uniformly *with replacement*
    /// from the seeded generator; duplicate initial centroids are possible
    /// and not corrected. A cluster that loses all members during an
    /// iteration has its centroid reseeded to a random dataset row.
    ///
    /// # Errors
    ///
    /// - [`FlockError::EmptyDataset`] if `data` has no rows
    /// - [`FlockError::DimensionMismatch`] if rows have unequal lengths
    /// - [`FlockError::InvalidClusterCount`] if `k` is zero or exceeds the
    ///   number of rows
    /// - [`FlockError::SingularCovariance`] if the Mahalanobis metric
    ///   needs a covariance matrix that cannot be inverted
    pub fn fit(data: &[Vec<f64>], k: usize, config: KMeansConfig) -> Result<Self> {
        let dims = validate(data, k)?;
        let n = data.len();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut centroids: Vec<Vec<f64>> = (0..k)
            .map(|_| data[rng.gen_range(0..n)].clone())
            .collect();

        debug!(
            k,
            n,
            dims,
            max_iterations = config.max_iterations,
            metric = ?config.metric,
            "starting k-means fit"
        );

        let mut labels = vec![0usize; n];
        let mut prev: Option<Vec<usize>> = None;
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..config.max_iterations {
            iterations += 1;

            // The metric state comes from the previous iteration's
            // assignment; the very first pass has none.
            let model = build_distance_model(config.metric, data, prev.as_deref(), k, dims)?;

            // Assignment: row-wise argmin, ties to the lowest cluster index.
            for (label, point) in labels.iter_mut().zip(data.iter()) {
                let mut best = 0;
                let mut best_distance = f64::INFINITY;
                for (j, centroid) in centroids.iter().enumerate() {
                    let d = model.distance(point, j, centroid);
                    if d < best_distance {
                        best_distance = d;
                        best = j;
                    }
                }
                *label = best;
            }

            // Update: coordinate-wise mean of each cluster's points.
            let mut sums = vec![vec![0.0; dims]; k];
            let mut counts = vec![0usize; k];
            for (point, &cluster) in data.iter().zip(labels.iter()) {
                counts[cluster] += 1;
                for (s, x) in sums[cluster].iter_mut().zip(point.iter()) {
                    *s += x;
                }
            }
            centroids = sums
                .into_iter()
                .zip(counts.iter())
                .enumerate()
                .map(|(cluster, (mut sum, &count))| {
                    if count > 0 {
                        for s in sum.iter_mut() {
                            *s /= count as f64;
                        }
                        sum
                    } else {
                        debug!(cluster, "reseeding empty cluster");
                        data[rng.gen_range(0..n)].clone()
                    }
                })
                .collect();

            if prev.as_deref() == Some(labels.as_slice()) {
                converged = true;
                break;
            }
            prev = Some(labels.clone());
        }

        debug!(iterations, converged, "k-means fit finished");

        Ok(Self {
            centroids,
            labels,
            config,
            iterations,
            converged,
        })
    }

    /// Cluster assignment per dataset row, values in `[0, k)`
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Final centroid per cluster
    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Number of clusters
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Iterations actually run
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the assignment stabilized before the iteration budget ran out
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Consume the model, returning the assignment vector.
    pub fn into_labels(self) -> Vec<usize> {
        self.labels
    }
}

/// Validate fit preconditions, returning the dataset dimensionality.
pub(crate) fn validate(data: &[Vec<f64>], k: usize) -> Result<usize> {
    let first = data.first().ok_or(FlockError::EmptyDataset)?;
    let dims = first.len();
    for (index, row) in data.iter().enumerate() {
        if row.len() != dims {
            return Err(FlockError::DimensionMismatch {
                expected: dims,
                got: row.len(),
                index,
            });
        }
    }
    if k == 0 || k > data.len() {
        return Err(FlockError::InvalidClusterCount {
            k,
            points: data.len(),
        });
    }
    Ok(dims)
}

/// Build the per-iteration distance state for the configured metric.
fn build_distance_model(
    metric: Metric,
    data: &[Vec<f64>],
    prev: Option<&[usize]>,
    k: usize,
    dims: usize,
) -> Result<DistanceModel> {
    match metric {
        Metric::Euclidean => Ok(DistanceModel::Euclidean),
        Metric::Mahalanobis => {
            let whitening = match prev {
                // No assignment yet: one pooled covariance shared by all.
                None => {
                    let cov = covariance::pooled(data, dims);
                    vec![covariance::whitening(&cov, 0)?; k]
                }
                Some(labels) => covariance::per_cluster(data, labels, k, dims)
                    .iter()
                    .enumerate()
                    .map(|(cluster, cov)| covariance::whitening(cov, cluster))
                    .collect::<Result<Vec<_>>>()?,
            };
            Ok(DistanceModel::Mahalanobis(whitening))
        }
    }
}
