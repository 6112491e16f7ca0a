//! Accumulated benchmark results.

use serde::Serialize;

/// One measured observation: a single (case, k) pair with both
/// implementations' search durations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    /// Neighbor count requested per query.
    pub k: usize,
    /// Feature vector length of the case's dataset.
    pub dimension: usize,
    /// Original dataset row count (train + query).
    pub size: usize,
    /// Number of query rows (the fixed query-set size).
    pub query_size: usize,
    /// Baseline index search duration in seconds.
    pub baseline_secs: f64,
    /// Vp-tree search duration in seconds.
    pub vptree_secs: f64,
}

/// Append-only table of result rows, in production order: case order, then
/// k order within a case.
///
/// Rows recorded before a failed case abort remain readable here, so a
/// partial run still yields its completed measurements.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub(crate) fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    /// All rows, in production order.
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in production order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a ResultRow;
    type IntoIter = std::slice::Iter<'a, ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
