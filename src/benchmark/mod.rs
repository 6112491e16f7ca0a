//! Comparative benchmark harness.
//!
//! Answers, for a given dataset and set of k values, how the vp-tree
//! compares against a baseline index in search latency under identical
//! data splits and identical query loads:
//!
//! 1. Each [`BenchmarkCase`] names a dataset, a k-list, and a split seed.
//! 2. The runner splits the dataset into a training set and a fixed
//!    16-row query set ([`split::QUERY_SET_SIZE`]), seeded by the case.
//! 3. Both indexes of the dataset's [`IndexFamily`] are built once from
//!    the same training rows.
//! 4. For every k, one timed search per implementation runs over the
//!    whole query batch, producing a [`ResultRow`].
//!
//! Timings are wall-clock seconds around the search call only; build time
//! is logged, never recorded. Returned neighbors are discarded: the
//! harness measures speed, not recall.
//!
//! ```no_run
//! use vantage::benchmark::{BenchmarkCase, ComparisonBenchmark, UniformDataset};
//!
//! let dataset = UniformDataset::new("uniform-100k-32d", 100_000, 32, 7);
//! let case = BenchmarkCase::new(Box::new(dataset), vec![1, 4, 8, 16]);
//! let mut bench = ComparisonBenchmark::new(vec![case]);
//! bench.run()?;
//! for row in bench.results() {
//!     println!("k={} baseline={:.4}s vptree={:.4}s", row.k, row.baseline_secs, row.vptree_secs);
//! }
//! # Ok::<(), vantage::benchmark::BenchmarkError>(())
//! ```

pub mod adapters;
pub mod case;
pub mod dataset;
pub mod error;
pub mod results;
pub mod runner;
pub mod split;

pub use adapters::{DefaultPairBuilder, IndexAdapter, IndexPairBuilder, Neighbors};
pub use case::{BenchmarkCase, IndexFamily, DEFAULT_SEED};
pub use dataset::{
    BinaryDataset, ClusteredDataset, DatasetProvider, FeatureMatrix, FileDataset, UniformDataset,
};
pub use error::BenchmarkError;
pub use results::{ResultRow, ResultTable};
pub use runner::ComparisonBenchmark;
pub use split::{split_train_query, QUERY_SET_SIZE};
