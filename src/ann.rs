//! Unified trait for nearest neighbor index implementations.

use crate::error::Result;

/// Uniform add/build/search shape shared by every index in the crate.
///
/// The lifecycle is: construct, `add` every vector, `build` once, then
/// `search` any number of times. Implementations reject `add` after `build`
/// and `search` before it.
pub trait NearestNeighborIndex {
    /// Element type of stored vectors (`f32` for dense, `u8` for bit-packed).
    type Scalar: Copy;

    /// Add a vector to the index.
    ///
    /// `doc_id` is the caller's identifier for the row. Indexes in this
    /// crate store rows in insertion order and report positional ids from
    /// `search`, so callers that add rows as `0..n` get their own ids back.
    fn add(&mut self, doc_id: u32, vector: Vec<Self::Scalar>) -> Result<()>;

    /// Build the index (required before search).
    fn build(&mut self) -> Result<()>;

    /// Search for the k nearest neighbors of `query`.
    ///
    /// Returns `(id, distance)` pairs sorted by ascending distance. Fewer
    /// than `k` results are returned when the index holds fewer vectors.
    fn search(&self, query: &[Self::Scalar], k: usize) -> Result<Vec<(u32, f32)>>;

    /// Get vector dimension.
    fn dimension(&self) -> usize;

    /// Get number of vectors.
    fn num_vectors(&self) -> usize;
}
