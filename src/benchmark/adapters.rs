//! Index adapters and the per-family pair builder.
//!
//! The runner never touches a concrete index type: it sees two boxed
//! [`IndexAdapter`]s per case, built by an [`IndexPairBuilder`]. The
//! default builder dispatches on [`IndexFamily`] to construct the baseline
//! and vp-tree implementations from the same training matrix; tests inject
//! counting or instrumented builders through the same seam.

use tracing::debug;

use crate::ann::NearestNeighborIndex;
use crate::benchmark::case::IndexFamily;
use crate::benchmark::dataset::FeatureMatrix;
use crate::benchmark::error::BenchmarkError;
use crate::binary_ivf::BinaryIVFIndex;
use crate::flat::FlatL2Index;
use crate::vptree::{VPTreeBinaryIndex, VPTreeL2Index};

/// Neighbor lists for a query batch: one `(id, distance)` list per query
/// row. The harness discards these; adapters still return them so the
/// search call has a real result to produce.
pub type Neighbors = Vec<Vec<(u32, f32)>>;

/// A built index, ready to answer query batches.
pub trait IndexAdapter {
    /// Short implementation label for log events.
    fn label(&self) -> &'static str;

    /// Search the whole query matrix in one call, k neighbors per row.
    fn search(&self, queries: &FeatureMatrix, k: usize) -> Result<Neighbors, BenchmarkError>;
}

/// Builds the (baseline, vp-tree) adapter pair for one case.
///
/// Both adapters must be populated from the identical training matrix,
/// same rows in the same order, so their search timings are comparable.
pub trait IndexPairBuilder {
    fn build_pair(
        &self,
        family: IndexFamily,
        train: &FeatureMatrix,
    ) -> Result<(Box<dyn IndexAdapter>, Box<dyn IndexAdapter>), BenchmarkError>;
}

/// Adapter over any dense-vector index.
struct DenseAdapter<I> {
    label: &'static str,
    index: I,
}

impl<I> IndexAdapter for DenseAdapter<I>
where
    I: NearestNeighborIndex<Scalar = f32>,
{
    fn label(&self) -> &'static str {
        self.label
    }

    fn search(&self, queries: &FeatureMatrix, k: usize) -> Result<Neighbors, BenchmarkError> {
        match queries {
            FeatureMatrix::Dense(rows) => rows
                .iter()
                .map(|query| self.index.search(query, k).map_err(BenchmarkError::from))
                .collect(),
            FeatureMatrix::Binary(_) => Err(BenchmarkError::FamilyMismatch(format!(
                "binary query matrix handed to dense index '{}'",
                self.label
            ))),
        }
    }
}

/// Adapter over any binary-code index.
struct BinaryAdapter<I> {
    label: &'static str,
    index: I,
}

impl<I> IndexAdapter for BinaryAdapter<I>
where
    I: NearestNeighborIndex<Scalar = u8>,
{
    fn label(&self) -> &'static str {
        self.label
    }

    fn search(&self, queries: &FeatureMatrix, k: usize) -> Result<Neighbors, BenchmarkError> {
        match queries {
            FeatureMatrix::Binary(rows) => rows
                .iter()
                .map(|query| self.index.search(query, k).map_err(BenchmarkError::from))
                .collect(),
            FeatureMatrix::Dense(_) => Err(BenchmarkError::FamilyMismatch(format!(
                "dense query matrix handed to binary index '{}'",
                self.label
            ))),
        }
    }
}

/// Default pair builder: flat-L2 vs L2 vp-tree for continuous data, binary
/// IVF vs Hamming vp-tree for bit-packed data.
pub struct DefaultPairBuilder;

impl IndexPairBuilder for DefaultPairBuilder {
    fn build_pair(
        &self,
        family: IndexFamily,
        train: &FeatureMatrix,
    ) -> Result<(Box<dyn IndexAdapter>, Box<dyn IndexAdapter>), BenchmarkError> {
        match (family, train) {
            (IndexFamily::Continuous, FeatureMatrix::Dense(rows)) => {
                let dimension = train.dimension();

                let mut flat = FlatL2Index::new(dimension)?;
                for (i, row) in rows.iter().enumerate() {
                    flat.add(i as u32, row.clone())?;
                }
                flat.build()?;

                let mut tree = VPTreeL2Index::new(dimension)?;
                for (i, row) in rows.iter().enumerate() {
                    tree.add(i as u32, row.clone())?;
                }
                tree.build()?;

                Ok((
                    Box::new(DenseAdapter { label: "flat-l2", index: flat }),
                    Box::new(DenseAdapter { label: "vptree-l2", index: tree }),
                ))
            }
            (IndexFamily::Binary, FeatureMatrix::Binary(rows)) => {
                let dimension = train.dimension();

                // Cell count follows the usual sqrt(n) heuristic; probe
                // breadth is the code's bit width.
                let nlist = (rows.len() as f64).sqrt() as usize;
                let nprobe = dimension * 8;
                debug!(nlist, nprobe, "configuring binary ivf");

                let mut ivf = BinaryIVFIndex::new(dimension, nlist)?;
                ivf.nprobe = nprobe;
                ivf.train(rows)?;
                for (i, row) in rows.iter().enumerate() {
                    ivf.add(i as u32, row.clone())?;
                }
                ivf.build()?;

                let mut tree = VPTreeBinaryIndex::new(dimension)?;
                for (i, row) in rows.iter().enumerate() {
                    tree.add(i as u32, row.clone())?;
                }
                tree.build()?;

                Ok((
                    Box::new(BinaryAdapter { label: "binary-ivf", index: ivf }),
                    Box::new(BinaryAdapter { label: "vptree-hamming", index: tree }),
                ))
            }
            (family, _) => Err(BenchmarkError::FamilyMismatch(format!(
                "{family:?} dataset produced a {:?} feature matrix",
                train.family()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_matrix(n: usize, dim: usize) -> FeatureMatrix {
        FeatureMatrix::Dense(
            (0..n)
                .map(|i| (0..dim).map(|j| (i * dim + j) as f32).collect())
                .collect(),
        )
    }

    fn binary_matrix(n: usize, dim: usize) -> FeatureMatrix {
        FeatureMatrix::Binary((0..n).map(|i| vec![(i % 256) as u8; dim]).collect())
    }

    #[test]
    fn test_continuous_pair_searches_agree_on_nearest() {
        let train = dense_matrix(120, 4);
        let (baseline, vptree) = DefaultPairBuilder
            .build_pair(IndexFamily::Continuous, &train)
            .unwrap();
        assert_eq!(baseline.label(), "flat-l2");
        assert_eq!(vptree.label(), "vptree-l2");

        // Queries sit slightly off the training grid so every neighbor
        // distance is unique and both exact indexes must agree on ids.
        let FeatureMatrix::Dense(mut query_rows) = dense_matrix(3, 4) else {
            unreachable!();
        };
        for row in &mut query_rows {
            row[0] += 0.3;
        }
        let queries = FeatureMatrix::Dense(query_rows);

        let a = baseline.search(&queries, 2).unwrap();
        let b = vptree.search(&queries, 2).unwrap();
        assert_eq!(a.len(), 3);
        // Both are exact; same training rows, same nearest ids.
        assert_eq!(a, b);
    }

    #[test]
    fn test_binary_pair_builds() {
        let train = binary_matrix(100, 8);
        let (baseline, vptree) = DefaultPairBuilder
            .build_pair(IndexFamily::Binary, &train)
            .unwrap();
        assert_eq!(baseline.label(), "binary-ivf");
        assert_eq!(vptree.label(), "vptree-hamming");

        let queries = binary_matrix(2, 8);
        assert_eq!(baseline.search(&queries, 3).unwrap().len(), 2);
        assert_eq!(vptree.search(&queries, 3).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_training_set_fails_fast() {
        let err = DefaultPairBuilder
            .build_pair(IndexFamily::Continuous, &FeatureMatrix::Dense(Vec::new()))
            .err()
            .unwrap();
        assert!(matches!(err, BenchmarkError::Index(_)));
    }

    #[test]
    fn test_family_matrix_mismatch_rejected() {
        let err = DefaultPairBuilder
            .build_pair(IndexFamily::Binary, &dense_matrix(32, 4))
            .err()
            .unwrap();
        assert!(matches!(err, BenchmarkError::FamilyMismatch(_)));
    }

    #[test]
    fn test_adapter_rejects_wrong_query_family() {
        let train = dense_matrix(64, 4);
        let (baseline, _) = DefaultPairBuilder
            .build_pair(IndexFamily::Continuous, &train)
            .unwrap();
        let err = baseline.search(&binary_matrix(2, 4), 1).unwrap_err();
        assert!(matches!(err, BenchmarkError::FamilyMismatch(_)));
    }
}
