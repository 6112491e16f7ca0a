//! Error types for the benchmark harness.

use thiserror::Error;

use crate::error::IndexError;

/// Errors that can abort a benchmark run.
///
/// The harness never retries or recovers internally: a failed case should
/// surface loudly rather than produce misleading partial data. Rows
/// recorded before the failure remain readable from the result table.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// The runner was handed an empty case list.
    #[error("no benchmark cases to run")]
    NoCases,

    /// A case was configured with no k values.
    #[error("case {case}: no k values configured")]
    EmptyKs { case: String },

    /// The dataset is too small to carve out the fixed-size query set.
    #[error("dataset has {rows} rows; need more than {query_size} to split off a query set")]
    DegenerateSplit { rows: usize, query_size: usize },

    /// A feature matrix reached an adapter or builder of the other family.
    #[error("feature matrix family mismatch: {0}")]
    FamilyMismatch(String),

    /// An index failed to build or search.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// I/O failure while loading a file-backed dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file-backed dataset had an invalid on-disk layout.
    #[error("dataset format error: {0}")]
    Format(String),
}
