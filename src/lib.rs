//! vantage: vantage-point tree nearest neighbor search, with a comparative
//! benchmarking harness.
//!
//! The crate has two halves:
//!
//! - Index implementations, all exposing the same [`NearestNeighborIndex`]
//!   add/build/search shape:
//!   - [`flat::FlatL2Index`]: exact brute-force scan over raw `f32` vectors.
//!     The baseline every other index is compared against.
//!   - [`vptree::VPTreeIndex`]: a vantage-point tree, exact metric-tree
//!     search. Instantiated as [`vptree::VPTreeL2Index`] for real-valued
//!     vectors and [`vptree::VPTreeBinaryIndex`] for bit-packed codes under
//!     Hamming distance.
//!   - [`binary_ivf::BinaryIVFIndex`]: an inverted-file index over binary
//!     codes, approximate, requiring a clustering pass before points can be
//!     added.
//! - The [`benchmark`] module: a harness that runs both implementations of a
//!   family over identical train/query splits and records per-k search
//!   latencies side by side.
//!
//! # Which index family applies
//!
//! Real-valued (`Continuous`) datasets pair the flat baseline with the L2
//! vp-tree. Bit-packed (`Binary`) datasets pair the IVF baseline with the
//! Hamming vp-tree. The harness picks the pair from the dataset's declared
//! [`benchmark::IndexFamily`].
//!
//! # A note on exactness
//!
//! The vp-tree is an *exact* structure: its pruning rule (triangle
//! inequality on the vantage distance) never discards a true neighbor. The
//! binary IVF baseline is approximate, scanning only the `nprobe` nearest
//! posting lists. The harness measures wall-clock time only and never
//! compares returned neighbor sets.

pub mod ann;
pub mod binary_ivf;
pub mod distance;
pub mod error;
pub mod flat;
pub mod vptree;

pub mod benchmark;

pub use ann::NearestNeighborIndex;
pub use error::{IndexError, Result};
