//! Covariance estimation for the Mahalanobis metric.
//!
//! Covariances are sample covariances (denominator `n - 1`), recomputed
//! from scratch every iteration, never incrementally updated. A cluster
//! with fewer than two members yields the zero matrix, which fails at
//! inversion time with [`FlockError::SingularCovariance`].

use nalgebra::DMatrix;

use crate::error::{FlockError, Result};

/// Sample covariance of the given rows, `d x d` for rows of dimension `d`.
///
/// Fewer than two rows cannot define a covariance; the zero matrix is
/// returned and rejected later by [`whitening`].
fn sample_covariance<'a, I>(rows: I, dims: usize) -> DMatrix<f64>
where
    I: Iterator<Item = &'a [f64]> + Clone,
{
    let n = rows.clone().count();
    if n < 2 {
        return DMatrix::zeros(dims, dims);
    }

    let mut mean = vec![0.0; dims];
    for row in rows.clone() {
        for (m, x) in mean.iter_mut().zip(row.iter()) {
            *m += x;
        }
    }
    for m in mean.iter_mut() {
        *m /= n as f64;
    }

    let rows: Vec<&[f64]> = rows.collect();
    let centered = DMatrix::from_fn(n, dims, |i, j| rows[i][j] - mean[j]);
    centered.transpose() * &centered / (n - 1) as f64
}

/// Covariance pooled over the whole dataset.
///
/// Used on the first Mahalanobis iteration, before any assignment exists,
/// where every cluster shares this single estimate.
pub(crate) fn pooled(data: &[Vec<f64>], dims: usize) -> DMatrix<f64> {
    sample_covariance(data.iter().map(Vec::as_slice), dims)
}

/// Per-cluster covariances estimated from each cluster's assigned points.
pub(crate) fn per_cluster(
    data: &[Vec<f64>],
    labels: &[usize],
    k: usize,
    dims: usize,
) -> Vec<DMatrix<f64>> {
    (0..k)
        .map(|cluster| {
            sample_covariance(
                data.iter()
                    .zip(labels.iter())
                    .filter(move |(_, &label)| label == cluster)
                    .map(|(row, _)| row.as_slice()),
                dims,
            )
        })
        .collect()
}

/// Invert a covariance matrix into a whitening matrix.
///
/// A covariance that cannot be inverted is a fatal condition for the fit;
/// no pseudo-inverse is substituted.
pub(crate) fn whitening(covariance: &DMatrix<f64>, cluster: usize) -> Result<DMatrix<f64>> {
    covariance
        .clone()
        .try_inverse()
        .filter(|inv| inv.iter().all(|x| x.is_finite()))
        .ok_or(FlockError::SingularCovariance { cluster })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pooled_covariance_known_values() {
        // Two perfectly anti-correlated dimensions.
        let data = vec![
            vec![1.0, -1.0],
            vec![2.0, -2.0],
            vec![3.0, -3.0],
            vec![4.0, -4.0],
        ];
        let cov = pooled(&data, 2);
        // var(x) = var(y) = 5/3, cov(x, y) = -5/3
        let expected = 5.0 / 3.0;
        assert!((cov[(0, 0)] - expected).abs() < 1e-12);
        assert!((cov[(1, 1)] - expected).abs() < 1e-12);
        assert!((cov[(0, 1)] + expected).abs() < 1e-12);
        assert!((cov[(1, 0)] + expected).abs() < 1e-12);
    }

    #[test]
    fn test_per_cluster_partitions_rows() {
        let data = vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![10.0, 0.0],
            vec![11.0, 1.0],
        ];
        let labels = vec![0, 0, 1, 1];
        let covs = per_cluster(&data, &labels, 2, 2);
        assert_eq!(covs.len(), 2);
        // Both clusters have identical spread, so identical covariance.
        assert!((covs[0][(0, 0)] - covs[1][(0, 0)]).abs() < 1e-12);
        assert!((covs[0][(1, 1)] - covs[1][(1, 1)]).abs() < 1e-12);
    }

    #[test]
    fn test_singleton_cluster_yields_singular_covariance() {
        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]];
        let labels = vec![0, 1, 1];
        let covs = per_cluster(&data, &labels, 2, 2);
        assert!(whitening(&covs[0], 0).is_err());
    }

    #[test]
    fn test_collinear_data_is_singular() {
        // All points on the line y = x: rank-1 covariance.
        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]];
        let cov = pooled(&data, 2);
        let result = whitening(&cov, 0);
        assert_eq!(result, Err(FlockError::SingularCovariance { cluster: 0 }));
    }

    #[test]
    fn test_whitening_inverts_diagonal() {
        let cov = DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 0.0, 0.25]);
        let w = whitening(&cov, 0).unwrap();
        assert!((w[(0, 0)] - 0.25).abs() < 1e-12);
        assert!((w[(1, 1)] - 4.0).abs() < 1e-12);
    }
}
