//! Property-based tests for clustering invariants

use flock::{FlockError, KMeans, KMeansConfig, ModelSelection, SelectionConfig};
use proptest::prelude::*;

/// Generate a dataset of 3-dimensional points together with a valid
/// cluster count for it.
fn arb_dataset_and_k() -> impl Strategy<Value = (Vec<Vec<f64>>, usize)> {
    prop::collection::vec(prop::collection::vec(-100.0f64..100.0, 3), 1..40)
        .prop_flat_map(|data| {
            let n = data.len();
            (Just(data), 1..=n)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: every fit yields exactly k centroids and in-range labels
    #[test]
    fn prop_fit_respects_cluster_count((data, k) in arb_dataset_and_k()) {
        let model = KMeans::fit(&data, k, KMeansConfig::default()).unwrap();

        prop_assert_eq!(model.k(), k);
        prop_assert_eq!(model.centroids().len(), k);
        prop_assert_eq!(model.labels().len(), data.len());
        prop_assert!(model.labels().iter().all(|&label| label < k));
        prop_assert!(model.centroids().iter().all(|c| c.len() == 3));
    }

    /// Property: the loop never exceeds its iteration budget
    #[test]
    fn prop_fit_honors_iteration_cap(
        (data, k) in arb_dataset_and_k(),
        max_iterations in 1usize..8
    ) {
        let config = KMeansConfig::default().with_max_iterations(max_iterations);
        let model = KMeans::fit(&data, k, config).unwrap();

        prop_assert!(model.iterations() <= max_iterations);
        prop_assert!(model.iterations() >= 1);
    }

    /// Property: identical inputs give bitwise-identical fits
    #[test]
    fn prop_fit_deterministic(
        (data, k) in arb_dataset_and_k(),
        seed in any::<u64>()
    ) {
        let config = KMeansConfig::default().with_seed(seed);
        let a = KMeans::fit(&data, k, config).unwrap();
        let b = KMeans::fit(&data, k, config).unwrap();

        prop_assert_eq!(a.labels(), b.labels());
        prop_assert_eq!(a.centroids(), b.centroids());
        prop_assert_eq!(a.iterations(), b.iterations());
    }

    /// Property: a single cluster swallows every point and stabilizes at once
    #[test]
    fn prop_single_cluster_degenerates(
        data in prop::collection::vec(prop::collection::vec(-100.0f64..100.0, 3), 1..40),
        seed in any::<u64>()
    ) {
        let config = KMeansConfig::default().with_seed(seed);
        let model = KMeans::fit(&data, 1, config).unwrap();

        prop_assert!(model.converged());
        prop_assert!(model.iterations() <= 2);
        prop_assert!(model.labels().iter().all(|&label| label == 0));
    }

    /// Property: a sweep reports one score per candidate, in order, and a
    /// winner inside the probed range
    #[test]
    fn prop_selection_scores_indexed_by_candidate(
        data in prop::collection::vec(prop::collection::vec(-100.0f64..100.0, 3), 2..30),
        max_probes in 1usize..6
    ) {
        let config = SelectionConfig::default().with_max_probes(max_probes);
        match ModelSelection::run(&data, config) {
            Ok(selection) => {
                prop_assert_eq!(selection.scores().len(), max_probes);
                prop_assert!(selection.best_k() >= 2);
                prop_assert!(selection.best_k() < max_probes + 2);
                prop_assert!(selection.best_score().is_finite());
                prop_assert_eq!(selection.labels().len(), data.len());
            }
            // Every probe may legitimately degenerate on adversarial data.
            Err(error) => prop_assert_eq!(error, FlockError::NoViableModel),
        }
    }
}
