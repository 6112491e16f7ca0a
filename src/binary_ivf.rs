//! Inverted-file index over binary codes.
//!
//! Approximate nearest neighbor search for bit-packed vectors under Hamming
//! distance. Codes are clustered into `nlist` cells; a search ranks cell
//! centroids by Hamming distance to the query and scans only the `nprobe`
//! nearest posting lists exhaustively.
//!
//! Unlike the other indexes in this crate, the IVF requires an explicit
//! [`train`](BinaryIVFIndex::train) pass over representative codes before
//! any can be added: training runs k-majority clustering (the Hamming-space
//! analogue of k-means, with per-bit majority vote as the centroid update)
//! to place the cells.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::ann::NearestNeighborIndex;
use crate::distance::hamming_distance;
use crate::error::{IndexError, Result};

/// Maximum k-majority refinement rounds. Binary centroids converge fast;
/// the loop usually exits well before this.
const MAX_TRAIN_ITERATIONS: usize = 25;

/// Inverted-file index over bit-packed codes with Hamming distance.
pub struct BinaryIVFIndex {
    /// Code width in bytes (8 packed dimensions per byte).
    dimension: usize,
    nlist: usize,
    /// Number of posting lists scanned per query, clamped to `nlist`.
    pub nprobe: usize,
    seed: u64,

    /// Cell centroids, one code per cell (nlist x dimension).
    centroids: Vec<Vec<u8>>,
    /// Posting lists: ids of the codes assigned to each cell.
    lists: Vec<Vec<u32>>,
    /// Stored codes (SoA layout).
    codes: Vec<u8>,
    num_vectors: usize,

    trained: bool,
    built: bool,
}

impl BinaryIVFIndex {
    /// Create a new binary IVF index.
    ///
    /// `dimension` is the code width in bytes; `nlist` the number of cells.
    pub fn new(dimension: usize, nlist: usize) -> Result<Self> {
        if dimension == 0 || nlist == 0 {
            return Err(IndexError::InvalidParameter(
                "dimension and nlist must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            dimension,
            nlist,
            nprobe: 1,
            seed: 0,
            centroids: Vec::new(),
            lists: Vec::new(),
            codes: Vec::new(),
            num_vectors: 0,
            trained: false,
            built: false,
        })
    }

    /// Configure a deterministic seed for centroid initialization.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of cells.
    pub fn nlist(&self) -> usize {
        self.nlist
    }

    /// Whether the clustering pass has run.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Train the coarse quantizer on representative codes.
    ///
    /// Must be called before [`add`](NearestNeighborIndex::add). Fails when
    /// the training set is smaller than `nlist` (each cell needs at least
    /// one seed code).
    pub fn train(&mut self, training_codes: &[Vec<u8>]) -> Result<()> {
        if self.trained {
            return Err(IndexError::InvalidParameter("index already trained".to_string()));
        }
        if training_codes.len() < self.nlist {
            return Err(IndexError::InvalidParameter(format!(
                "training set of {} codes cannot form {} clusters",
                training_codes.len(),
                self.nlist
            )));
        }
        for code in training_codes {
            if code.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: code.len(),
                });
            }
        }

        // Seed centroids with a random sample of the training codes.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut sample: Vec<usize> = (0..training_codes.len()).collect();
        sample.shuffle(&mut rng);
        self.centroids = sample[..self.nlist]
            .iter()
            .map(|&i| training_codes[i].clone())
            .collect();

        // k-majority refinement: assign by Hamming, update by bit majority.
        for _iteration in 0..MAX_TRAIN_ITERATIONS {
            let assignments: Vec<usize> = training_codes
                .iter()
                .map(|code| self.nearest_centroid(code))
                .collect();

            let new_centroids = self.majority_centroids(training_codes, &assignments);

            let converged = self
                .centroids
                .iter()
                .zip(new_centroids.iter())
                .all(|(old, new)| old == new);

            self.centroids = new_centroids;
            if converged {
                break;
            }
        }

        self.lists = vec![Vec::new(); self.nlist];
        self.trained = true;
        Ok(())
    }

    /// Index of the centroid nearest to `code`.
    fn nearest_centroid(&self, code: &[u8]) -> usize {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, centroid) in self.centroids.iter().enumerate() {
            let dist = hamming_distance(code, centroid);
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }

    /// Recompute each centroid as the per-bit majority of its members.
    ///
    /// A cell that lost all members keeps its previous centroid.
    fn majority_centroids(&self, codes: &[Vec<u8>], assignments: &[usize]) -> Vec<Vec<u8>> {
        let bits = self.dimension * 8;
        let mut ones = vec![vec![0usize; bits]; self.nlist];
        let mut counts = vec![0usize; self.nlist];

        for (code, &cell) in codes.iter().zip(assignments.iter()) {
            counts[cell] += 1;
            for (byte_idx, &byte) in code.iter().enumerate() {
                for bit in 0..8 {
                    if byte & (1 << bit) != 0 {
                        ones[cell][byte_idx * 8 + bit] += 1;
                    }
                }
            }
        }

        (0..self.nlist)
            .map(|cell| {
                if counts[cell] == 0 {
                    return self.centroids[cell].clone();
                }
                let mut centroid = vec![0u8; self.dimension];
                for bit_idx in 0..bits {
                    // Set the bit when more than half the members have it.
                    if ones[cell][bit_idx] * 2 > counts[cell] {
                        centroid[bit_idx / 8] |= 1 << (bit_idx % 8);
                    }
                }
                centroid
            })
            .collect()
    }

    /// Get code from SoA storage.
    fn get_code(&self, idx: usize) -> &[u8] {
        let start = idx * self.dimension;
        &self.codes[start..start + self.dimension]
    }
}

impl NearestNeighborIndex for BinaryIVFIndex {
    type Scalar = u8;

    fn add(&mut self, _doc_id: u32, vector: Vec<u8>) -> Result<()> {
        if !self.trained {
            return Err(IndexError::InvalidParameter(
                "train() must run before codes can be added".to_string(),
            ));
        }
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if self.built {
            return Err(IndexError::AlreadyBuilt);
        }

        let cell = self.nearest_centroid(&vector);
        self.lists[cell].push(self.num_vectors as u32);
        self.codes.extend_from_slice(&vector);
        self.num_vectors += 1;
        Ok(())
    }

    fn build(&mut self) -> Result<()> {
        if !self.trained {
            return Err(IndexError::InvalidParameter(
                "train() must run before build".to_string(),
            ));
        }
        if self.num_vectors == 0 {
            return Err(IndexError::EmptyIndex);
        }
        self.built = true;
        Ok(())
    }

    fn search(&self, query: &[u8], k: usize) -> Result<Vec<(u32, f32)>> {
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

        // Rank cells by centroid distance, probe the nearest nprobe.
        let mut cell_dists: Vec<(u32, usize)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (hamming_distance(query, c), i))
            .collect();
        cell_dists.sort_unstable();

        let nprobe = self.nprobe.clamp(1, self.nlist);

        let mut candidates: Vec<(u32, f32)> = Vec::new();
        for &(_, cell) in cell_dists.iter().take(nprobe) {
            for &id in &self.lists[cell] {
                let dist = hamming_distance(query, self.get_code(id as usize));
                candidates.push((id, dist as f32));
            }
        }

        candidates.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        candidates.truncate(k);
        Ok(candidates)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn num_vectors(&self) -> usize {
        self.num_vectors
    }
}
