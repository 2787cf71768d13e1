//! Error Types and Handling
//!
//! Error types for clustering and model selection, with structured fields
//! for programmatic handling.
//!
//! # Example
//!
//! ```rust
//! use flock::{FlockError, Result};
//!
//! fn check(k: usize, points: usize) -> Result<()> {
//!     if k == 0 || k > points {
//!         return Err(FlockError::InvalidClusterCount { k, points });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(5, 3).is_err());
//! ```

use thiserror::Error;

/// Error types for clustering operations
#[must_use]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlockError {
    /// The dataset contains no points.
    #[error("dataset is empty")]
    EmptyDataset,

    /// The requested cluster count cannot be satisfied by the dataset.
    #[error("invalid cluster count: k ({k}) must be in 1..={points}")]
    InvalidClusterCount {
        /// Requested number of clusters.
        k: usize,
        /// Number of points in the dataset.
        points: usize,
    },

    /// A dataset row has a different dimensionality than the first row.
    #[error("dimension mismatch at row {index}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality of the first row.
        expected: usize,
        /// Dimensionality of the offending row.
        got: usize,
        /// Index of the offending row.
        index: usize,
    },

    /// A cluster covariance matrix required by the Mahalanobis metric is
    /// not invertible (too few points, or degenerate collinear data).
    #[error("covariance matrix for cluster {cluster} is singular")]
    SingularCovariance {
        /// Index of the cluster whose covariance could not be inverted.
        cluster: usize,
    },

    /// A cluster has no assigned points where a non-empty partition is
    /// required (validity scoring).
    #[error("cluster {cluster} has no assigned points")]
    EmptyCluster {
        /// Index of the empty cluster.
        cluster: usize,
    },

    /// Every candidate cluster count in a selection sweep produced a
    /// degenerate partition.
    #[error("no candidate cluster count produced a finite validity score")]
    NoViableModel,
}

/// Result type alias for clustering operations
pub type Result<T> = std::result::Result<T, FlockError>;
