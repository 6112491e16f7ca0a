//! Exact brute-force L2 index.
//!
//! Scans every stored vector per query. O(n·d) per search, no construction
//! cost beyond copying vectors in. This is the reference implementation the
//! benchmark harness times other continuous-family indexes against: for
//! small datasets (< 10K vectors) it is often the fastest option outright.

use crate::ann::NearestNeighborIndex;
use crate::distance;
use crate::error::{IndexError, Result};

/// Exact flat L2 index.
///
/// Vectors are stored contiguously (SoA layout). `build()` only seals the
/// index; there is no structure to construct.
pub struct FlatL2Index {
    vectors: Vec<f32>,
    dimension: usize,
    num_vectors: usize,
    built: bool,
}

impl FlatL2Index {
    /// Create a new flat index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            vectors: Vec::new(),
            dimension,
            num_vectors: 0,
            built: false,
        })
    }

    /// Get vector from SoA storage.
    fn get_vector(&self, idx: usize) -> &[f32] {
        let start = idx * self.dimension;
        &self.vectors[start..start + self.dimension]
    }
}

impl NearestNeighborIndex for FlatL2Index {
    type Scalar = f32;

    fn add(&mut self, _doc_id: u32, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if self.built {
            return Err(IndexError::AlreadyBuilt);
        }

        self.vectors.extend_from_slice(&vector);
        self.num_vectors += 1;
        Ok(())
    }

    fn build(&mut self) -> Result<()> {
        if self.num_vectors == 0 {
            return Err(IndexError::EmptyIndex);
        }
        self.built = true;
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        if !self.built {
            return Err(IndexError::NotBuilt);
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Err(IndexError::InvalidParameter("k must be greater than 0".to_string()));
        }

        // Rank by squared distance, take the square root only for the top k.
        let mut distances: Vec<(u32, f32)> = (0..self.num_vectors)
            .map(|i| {
                (
                    i as u32,
                    distance::l2_distance_squared(query, self.get_vector(i)),
                )
            })
            .collect();

        let k = k.min(distances.len());
        distances.select_nth_unstable_by(k - 1, |a, b| a.1.total_cmp(&b.1));
        distances.truncate(k);
        distances.sort_unstable_by(|a, b| a.1.total_cmp(&b.1));

        Ok(distances.into_iter().map(|(id, d)| (id, d.sqrt())).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn num_vectors(&self) -> usize {
        self.num_vectors
    }
}
