//! Property tests for the train/query split.

use proptest::prelude::*;

use vantage::benchmark::{split_train_query, FeatureMatrix, QUERY_SET_SIZE};

/// Matrix whose rows are identified by their first column.
fn tagged_matrix(n: usize) -> FeatureMatrix {
    FeatureMatrix::Dense((0..n).map(|i| vec![i as f32, (i * 2) as f32]).collect())
}

fn row_ids(matrix: &FeatureMatrix) -> Vec<usize> {
    match matrix {
        FeatureMatrix::Dense(rows) => rows.iter().map(|r| r[0] as usize).collect(),
        FeatureMatrix::Binary(_) => unreachable!("tests use dense matrices"),
    }
}

proptest! {
    /// Partitions have sizes n-16 and 16, are disjoint, and their union is
    /// exactly the original row set.
    #[test]
    fn split_is_a_partition(n in (QUERY_SET_SIZE + 1)..300usize, seed in any::<u64>()) {
        let (train, queries) = split_train_query(tagged_matrix(n), seed).unwrap();

        prop_assert_eq!(train.rows(), n - QUERY_SET_SIZE);
        prop_assert_eq!(queries.rows(), QUERY_SET_SIZE);

        let mut ids = row_ids(&train);
        ids.extend(row_ids(&queries));
        ids.sort_unstable();
        let expected: Vec<usize> = (0..n).collect();
        prop_assert_eq!(ids, expected);
    }

    /// The seed fully determines the split.
    #[test]
    fn split_is_reproducible(n in (QUERY_SET_SIZE + 1)..200usize, seed in any::<u64>()) {
        let a = split_train_query(tagged_matrix(n), seed).unwrap();
        let b = split_train_query(tagged_matrix(n), seed).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Undersized datasets always error, never produce partitions.
    #[test]
    fn undersized_datasets_rejected(n in 0..=QUERY_SET_SIZE, seed in any::<u64>()) {
        prop_assert!(split_train_query(tagged_matrix(n), seed).is_err());
    }
}
