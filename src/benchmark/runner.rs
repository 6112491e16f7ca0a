//! Benchmark orchestration.
//!
//! [`ComparisonBenchmark`] executes an ordered list of cases, strictly
//! sequentially: cases one after another, k values within a case one after
//! another, and the two implementations' searches one after the other. The
//! timing model requires every measured interval to be isolated from all
//! other work, so nothing here is concurrent.
//!
//! Per case: split the dataset into train/query sets, build both indexes
//! once from the training rows, then time one search call per
//! implementation for each k. Build cost is amortized across the whole
//! k-list and is logged but never recorded in result rows; only search
//! time is measured. The case's dataset storage is released after its last
//! search, on success and failure alike, so peak memory stays bounded to
//! one case when a long list runs.

use std::time::Instant;

use tracing::info;

use crate::benchmark::adapters::{DefaultPairBuilder, IndexAdapter, IndexPairBuilder};
use crate::benchmark::case::BenchmarkCase;
use crate::benchmark::dataset::FeatureMatrix;
use crate::benchmark::error::BenchmarkError;
use crate::benchmark::results::{ResultRow, ResultTable};
use crate::benchmark::split::split_train_query;

/// Runs benchmark cases and accumulates one result row per (case, k).
pub struct ComparisonBenchmark {
    cases: Vec<BenchmarkCase>,
    builder: Box<dyn IndexPairBuilder>,
    results: ResultTable,
}

impl ComparisonBenchmark {
    /// Create a runner over the given cases with the default index pair
    /// (flat-L2 / binary-IVF baseline against the vp-tree).
    pub fn new(cases: Vec<BenchmarkCase>) -> Self {
        Self::with_builder(cases, Box::new(DefaultPairBuilder))
    }

    /// Create a runner with a custom pair builder.
    pub fn with_builder(cases: Vec<BenchmarkCase>, builder: Box<dyn IndexPairBuilder>) -> Self {
        Self {
            cases,
            builder,
            results: ResultTable::default(),
        }
    }

    /// Execute every case in order.
    ///
    /// Aborts on the first failure; rows produced before the failure stay
    /// in the table. The failing case's dataset is still unloaded before
    /// the error propagates.
    pub fn run(&mut self) -> Result<(), BenchmarkError> {
        if self.cases.is_empty() {
            return Err(BenchmarkError::NoCases);
        }

        info!(cases = self.cases.len(), "starting benchmark run");
        for case in &mut self.cases {
            let case_start = Instant::now();
            let outcome = run_case(case, self.builder.as_ref(), &mut self.results);
            // Unload runs on every exit path, not only on success.
            case.dataset_mut().unload_data();
            info!(
                case = %case,
                elapsed_secs = case_start.elapsed().as_secs_f64(),
                ok = outcome.is_ok(),
                "case finished"
            );
            outcome?;
        }
        Ok(())
    }

    /// Accumulated rows, in production order.
    pub fn results(&self) -> &ResultTable {
        &self.results
    }

    /// Consume the runner, keeping only the result table.
    pub fn into_results(self) -> ResultTable {
        self.results
    }
}

/// Run one case: split, build the pair once, time searches for every k.
fn run_case(
    case: &mut BenchmarkCase,
    builder: &dyn IndexPairBuilder,
    results: &mut ResultTable,
) -> Result<(), BenchmarkError> {
    info!(case = %case, "starting case");
    if case.ks().is_empty() {
        return Err(BenchmarkError::EmptyKs {
            case: case.to_string(),
        });
    }

    // Captured before the split; rows report the full dataset shape.
    let dimension = case.dataset().dimension();
    let size = case.dataset().size();
    let family = case.dataset().family();

    info!("splitting dataset into train / query sets");
    let data = case.dataset_mut().data()?;
    let (train, queries) = split_train_query(data, case.seed())?;
    info!(train = train.rows(), queries = queries.rows(), "split done");

    let build_start = Instant::now();
    let (baseline, vptree) = builder.build_pair(family, &train)?;
    info!(
        baseline = baseline.label(),
        vptree = vptree.label(),
        elapsed_secs = build_start.elapsed().as_secs_f64(),
        "built index pair"
    );

    for &k in case.ks() {
        let baseline_secs = timed_search(baseline.as_ref(), &queries, k)?;
        info!(k, index = baseline.label(), secs = baseline_secs, "search done");

        let vptree_secs = timed_search(vptree.as_ref(), &queries, k)?;
        info!(k, index = vptree.label(), secs = vptree_secs, "search done");

        results.push(ResultRow {
            k,
            dimension,
            size,
            query_size: queries.rows(),
            baseline_secs,
            vptree_secs,
        });
    }

    Ok(())
}

/// Time a single batched search call.
///
/// The interval spans exactly the adapter's `search` call; neighbor output
/// is discarded after the clock stops. No timeout applies: a hanging index
/// blocks the harness.
fn timed_search(
    adapter: &dyn IndexAdapter,
    queries: &FeatureMatrix,
    k: usize,
) -> Result<f64, BenchmarkError> {
    let start = Instant::now();
    let neighbors = adapter.search(queries, k)?;
    let elapsed = start.elapsed().as_secs_f64();
    drop(neighbors);
    Ok(elapsed)
}
