//! Deterministic train/query split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::benchmark::dataset::FeatureMatrix;
use crate::benchmark::error::BenchmarkError;

/// Number of rows held out as queries for every case.
///
/// A harness constant, not per-case configuration: identical query-set
/// sizes are what keep latency columns comparable across cases.
pub const QUERY_SET_SIZE: usize = 16;

/// Shuffle the matrix with a seeded generator and split off the last
/// [`QUERY_SET_SIZE`] rows as the query set; the remaining `n - 16` rows
/// are the training set.
///
/// Every input row lands in exactly one partition. The seed fully
/// determines the shuffle, so a case re-run with the same seed gets the
/// same split.
///
/// Fails with [`BenchmarkError::DegenerateSplit`] when the matrix does not
/// have strictly more rows than the query set needs.
pub fn split_train_query(
    data: FeatureMatrix,
    seed: u64,
) -> Result<(FeatureMatrix, FeatureMatrix), BenchmarkError> {
    let n = data.rows();
    if n <= QUERY_SET_SIZE {
        return Err(BenchmarkError::DegenerateSplit {
            rows: n,
            query_size: QUERY_SET_SIZE,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    match data {
        FeatureMatrix::Dense(mut rows) => {
            rows.shuffle(&mut rng);
            let queries = rows.split_off(n - QUERY_SET_SIZE);
            Ok((FeatureMatrix::Dense(rows), FeatureMatrix::Dense(queries)))
        }
        FeatureMatrix::Binary(mut rows) => {
            rows.shuffle(&mut rng);
            let queries = rows.split_off(n - QUERY_SET_SIZE);
            Ok((FeatureMatrix::Binary(rows), FeatureMatrix::Binary(queries)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_matrix(n: usize) -> FeatureMatrix {
        FeatureMatrix::Dense((0..n).map(|i| vec![i as f32, 0.0]).collect())
    }

    #[test]
    fn test_split_sizes() {
        let (train, queries) = split_train_query(counting_matrix(100), 1).unwrap();
        assert_eq!(train.rows(), 84);
        assert_eq!(queries.rows(), QUERY_SET_SIZE);
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = split_train_query(counting_matrix(50), 7).unwrap();
        let b = split_train_query(counting_matrix(50), 7).unwrap();
        assert_eq!(a, b);

        let c = split_train_query(counting_matrix(50), 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_degenerate_sizes_rejected() {
        for n in [0, 1, 15, 16] {
            assert!(matches!(
                split_train_query(counting_matrix(n), 1),
                Err(BenchmarkError::DegenerateSplit { rows, query_size: QUERY_SET_SIZE }) if rows == n
            ));
        }
        // 17 rows is the smallest viable dataset: one training row.
        let (train, _) = split_train_query(counting_matrix(17), 1).unwrap();
        assert_eq!(train.rows(), 1);
    }

    #[test]
    fn test_binary_split() {
        let matrix = FeatureMatrix::Binary((0..40u8).map(|i| vec![i, i]).collect());
        let (train, queries) = split_train_query(matrix, 3).unwrap();
        assert_eq!(train.rows(), 24);
        assert_eq!(queries.rows(), 16);
        assert_eq!(train.family(), queries.family());
    }
}
