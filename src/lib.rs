//! # Flock - Partitional Clustering Engine
//!
//! Flock is an unsupervised, centroid-based clustering library: a seeded
//! k-means iteration loop with interchangeable distance metrics, plus a
//! model-order selector that sweeps candidate cluster counts and keeps the
//! partition with the best Davies-Bouldin validity score.
//!
//! ## Quick Start
//!
//! ```rust
//! use flock::{KMeans, KMeansConfig, Metric};
//!
//! fn main() -> flock::Result<()> {
//!     // Two tight blobs in the plane.
//!     let data = vec![
//!         vec![0.0, 0.0],
//!         vec![0.1, 0.1],
//!         vec![9.9, 10.0],
//!         vec![10.0, 10.1],
//!     ];
//!
//!     let config = KMeansConfig::default()
//!         .with_metric(Metric::Euclidean)
//!         .with_seed(42);
//!     let model = KMeans::fit(&data, 2, config)?;
//!
//!     // One label per row, one centroid per cluster.
//!     assert_eq!(model.labels().len(), 4);
//!     assert_eq!(model.centroids().len(), 2);
//!     assert!(model.labels().iter().all(|&label| label < 2));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing the cluster count
//!
//! ```rust
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
//!     let selection = ModelSelection::run(&data, SelectionConfig::default())?;
//!
//!     // One validity score per candidate count, best candidate retained.
//!     assert_eq!(selection.scores().len(), 10);
//!     assert_eq!(selection.labels().len(), data.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two metrics**: isotropic Euclidean distance, or a covariance-weighted
//!   Mahalanobis distance with per-cluster whitening
//! - **Reproducible**: every fit owns a private seeded generator; identical
//!   inputs give bitwise-identical partitions
//! - **Parallel sweep**: model-selection probes fan out across rayon workers
//!   and reduce deterministically, in candidate order
//! - **No hidden recovery**: singular covariances fail the fit loudly; a
//!   degenerate probe records a sentinel score without aborting the sweep

#![warn(missing_docs)]

// ── Core ──────────────────────────────────────────────────────────────────────
// Fundamental types: distance metrics, errors, covariance estimation.
pub mod distance;
pub mod error;
pub(crate) mod covariance;

// ── Clustering ────────────────────────────────────────────────────────────────
// The centroid-assignment iteration loop.
pub mod kmeans;

// ── Model selection ───────────────────────────────────────────────────────────
// Cluster-count search and validity scoring.
pub mod selection;

pub use distance::Metric;
pub use error::{FlockError, Result};
pub use kmeans::{KMeans, KMeansConfig};
pub use selection::{davies_bouldin_index, ModelSelection, SelectionConfig};
