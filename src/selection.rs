//! Model-Order Selection
//!
//! Chooses the number of clusters by sweeping a range of candidate counts,
//! fitting an independent [`KMeans`] per candidate, and scoring every
//! partition with a Davies-Bouldin validity index (lower is better). The
//! probes have no cross-dependencies, so the sweep fans out across rayon
//! workers and reduces into a score table ordered by candidate count.
//!
//! # Example
//!
//! ```
//! use flock::{ModelSelection, SelectionConfig};
//!
//! fn main() -> flock::Result<()> {
//!     let data = vec![
//!         vec![0.0, 0.0],
//!         vec![0.1, 0.1],
//!         vec![5.0, 5.0],
//!         vec![5.1, 5.1],
//!         vec![10.0, 0.0],
//!         vec![10.1, 0.1],
//!     ];
//!
//!     let config = SelectionConfig::default().with_max_probes(4);
//!     let selection = ModelSelection::run(&data, config)?;
//!
//!     // One score per candidate count, in increasing-k order.
//!     assert_eq!(selection.scores().len(), 4);
//!     assert!(selection.best_k() >= 2);
//!     Ok(())
//! }
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance::euclidean_distance;
use crate::error::{FlockError, Result};
use crate::kmeans::{validate, KMeans, KMeansConfig};

/// Configuration for a model-selection sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of candidate cluster counts to probe.
    ///
    /// The sweep covers `k` in `[2, max_probes + 2)`.
    pub max_probes: usize,
    /// Iteration budget handed to every probe's fit.
    pub max_iterations: usize,
    /// Initialization seed handed to every probe's fit.
    pub seed: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_probes: 10,
            max_iterations: 200,
            seed: 2,
        }
    }
}

impl SelectionConfig {
    /// Set the number of candidate counts to probe
    pub fn with_max_probes(mut self, max_probes: usize) -> Self {
        self.max_probes = max_probes;
        self
    }

    /// Set the per-probe iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the per-probe initialization seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Result of a model-selection sweep
///
/// Produced by [`ModelSelection::run`]; immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSelection {
    best_k: usize,
    best_score: f64,
    labels: Vec<usize>,
    scores: Vec<f64>,
}

impl ModelSelection {
    /// Sweep candidate cluster counts and keep the best-scoring partition.
    ///
    /// Every candidate `k` in `[2, max_probes + 2)` gets an independent
    /// Euclidean-metric fit with the configured seed (the metric is a
    /// fixed choice, never searched). A probe whose fit or scoring fails
    /// (an empty cluster, or `k` exceeding the number of points) records a
    /// `f64::INFINITY` score and the sweep continues; the candidate with
    /// the lowest finite score wins, ties going to the lowest `k`.
    ///
    /// # Errors
    ///
    /// - [`FlockError::EmptyDataset`] / [`FlockError::DimensionMismatch`]
    ///   if the dataset is malformed
    /// - [`FlockError::InvalidClusterCount`] if the dataset cannot support
    ///   even the smallest candidate (fewer than two points)
    /// - [`FlockError::NoViableModel`] if every probe degenerates
    pub fn run(data: &[Vec<f64>], config: SelectionConfig) -> Result<Self> {
        validate(data, 2)?;

        let probe_config = KMeansConfig::default()
            .with_max_iterations(config.max_iterations)
            .with_seed(config.seed);
        let candidates: Vec<usize> = (2..config.max_probes + 2).collect();

        let probes: Vec<(f64, Vec<usize>)> = candidates
            .par_iter()
            .map(|&k| {
                let outcome = KMeans::fit(data, k, probe_config).and_then(|model| {
                    let score = davies_bouldin_index(data, model.labels(), model.centroids())?;
                    Ok((score, model.into_labels()))
                });
                match outcome {
                    Ok((score, labels)) => {
                        debug!(k, score, "probe scored");
                        (score, labels)
                    }
                    Err(error) => {
                        debug!(k, %error, "probe degenerate");
                        (f64::INFINITY, Vec::new())
                    }
                }
            })
            .collect();

        let scores: Vec<f64> = probes.iter().map(|(score, _)| *score).collect();
        let best = scores
            .iter()
            .enumerate()
            .filter(|(_, score)| score.is_finite())
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
            .ok_or(FlockError::NoViableModel)?;

        debug!(
            best_k = candidates[best],
            best_score = scores[best],
            probes = candidates.len(),
            "selection sweep finished"
        );

        Ok(Self {
            best_k: candidates[best],
            best_score: scores[best],
            labels: probes[best].1.clone(),
            scores,
        })
    }

    /// The winning cluster count
    pub fn best_k(&self) -> usize {
        self.best_k
    }

    /// The winning candidate's validity score
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Assignment vector of the winning partition
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Validity score per candidate, in increasing-k order
    ///
    /// Degenerate probes hold `f64::INFINITY`.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }
}

/// Compute the Davies-Bouldin validity index of a partition.
///
/// For each cluster `i`, the scatter `D_i` is the mean Euclidean distance
/// of its points to its centroid (zero for a singleton whose centroid is
/// the cluster mean). Every ordered pair gets a within-to-between ratio
/// `R_ij = (D_i + D_j) / dist(c_i, c_j)`; each cluster keeps its
/// worst-case pairing, and the index is the mean of those. Lower is
/// better. Distances here are always Euclidean, whatever metric produced
/// the partition.
///
/// # Errors
///
/// - [`FlockError::EmptyDataset`] if `data` has no rows
/// - [`FlockError::InvalidClusterCount`] if `centroids` has fewer than
///   two entries (the index needs at least one pair)
/// - [`FlockError::EmptyCluster`] if any cluster has no assigned points
///
/// # Panics
///
/// Panics if `labels` and `data` have different lengths, or if a label is
/// out of range for `centroids`.
pub fn davies_bouldin_index(
    data: &[Vec<f64>],
    labels: &[usize],
    centroids: &[Vec<f64>],
) -> Result<f64> {
    assert_eq!(
        labels.len(),
        data.len(),
        "labels must have one entry per data row"
    );
    if data.is_empty() {
        return Err(FlockError::EmptyDataset);
    }
    let k = centroids.len();
    if k < 2 {
        return Err(FlockError::InvalidClusterCount {
            k,
            points: data.len(),
        });
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (index, &label) in labels.iter().enumerate() {
        assert!(label < k, "label {label} out of range for {k} clusters");
        members[label].push(index);
    }

    let scatter: Vec<f64> = members
        .iter()
        .enumerate()
        .map(|(cluster, points)| {
            if points.is_empty() {
                return Err(FlockError::EmptyCluster { cluster });
            }
            let total: f64 = points
                .iter()
                .map(|&i| euclidean_distance(&data[i], &centroids[cluster]))
                .sum();
            Ok(total / points.len() as f64)
        })
        .collect::<Result<_>>()?;

    let mut ratio_sum = 0.0;
    for i in 0..k {
        let mut worst = f64::NEG_INFINITY;
        for j in 0..k {
            if i == j {
                continue;
            }
            let separation = euclidean_distance(&centroids[i], &centroids[j]);
            let ratio = (scatter[i] + scatter[j]) / separation;
            if ratio > worst {
                worst = ratio;
            }
        }
        ratio_sum += worst;
    }

    Ok(ratio_sum / k as f64)
}
