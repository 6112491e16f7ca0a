//! Vantage-point tree implementation.
//!
//! A metric tree: each internal node holds a *vantage point* and a distance
//! threshold (the median distance from the vantage point to the node's
//! remaining points). Points closer than the threshold go to the inner
//! child, the rest to the outer child. Search prunes a child whenever the
//! triangle inequality proves it cannot contain a closer neighbor than the
//! current k-th best, which makes the search exact for any true metric.
//!
//! Works for any [`Metric`]; the two instantiations used by the benchmark
//! harness are [`VPTreeL2Index`] (real-valued vectors, Euclidean distance)
//! and [`VPTreeBinaryIndex`] (bit-packed codes, Hamming distance).
//!
//! # References
//!
//! - Yianilos (1993): "Data structures and algorithms for nearest neighbor
//!   search in general metric spaces"
//! - Uhlmann (1991): "Satisfying general proximity/similarity queries with
//!   metric trees"

use smallvec::SmallVec;

use crate::ann::NearestNeighborIndex;
use crate::distance::{Hamming, Metric, L2};
use crate::error::{IndexError, Result};

/// Vantage-point tree over real-valued vectors with L2 distance.
pub type VPTreeL2Index = VPTreeIndex<L2>;

/// Vantage-point tree over bit-packed codes with Hamming distance.
pub type VPTreeBinaryIndex = VPTreeIndex<Hamming>;

/// Vantage-point tree parameters.
#[derive(Clone, Debug)]
pub struct VPTreeParams {
    /// Maximum number of points in a leaf before it is split.
    pub max_leaf_size: usize,
}

impl Default for VPTreeParams {
    fn default() -> Self {
        Self { max_leaf_size: 16 }
    }
}

/// Vantage-point tree index, generic over the distance metric.
pub struct VPTreeIndex<M: Metric> {
    vectors: Vec<M::Scalar>,
    dimension: usize,
    num_vectors: usize,
    params: VPTreeParams,
    built: bool,
    root: Option<VPNode>,
}

/// Tree node.
enum VPNode {
    /// Internal node: vantage point, median threshold, and two children.
    /// Points at distance <= threshold from the vantage point live in the
    /// inner child, the rest in the outer child. The vantage point itself
    /// belongs to neither child.
    Internal {
        vantage: u32,
        threshold: f32,
        inner: Box<VPNode>,
        outer: Box<VPNode>,
    },
    /// Leaf node: a small set of point indices, scanned exhaustively.
    Leaf { indices: Vec<u32> },
}

/// Per-query k-best buffer. Stays on the stack for typical k.
type BestK = SmallVec<[(f32, u32); 16]>;

impl<M: Metric> VPTreeIndex<M> {
    /// Create a new vp-tree index with default parameters.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_params(dimension, VPTreeParams::default())
    }

    /// Create a new vp-tree index with explicit parameters.
    pub fn with_params(dimension: usize, params: VPTreeParams) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }
        if params.max_leaf_size == 0 {
            return Err(IndexError::InvalidParameter(
                "max_leaf_size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            vectors: Vec::new(),
            dimension,
            num_vectors: 0,
            params,
            built: false,
            root: None,
        })
    }

    /// Get vector from SoA storage.
    fn get_vector(&self, idx: usize) -> &[M::Scalar] {
        let start = idx * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    /// Build tree recursively over a partition of point indices.
    fn build_tree(&self, mut indices: Vec<u32>) -> VPNode {
        if indices.len() <= self.params.max_leaf_size {
            return VPNode::Leaf { indices };
        }

        // The partition order is deterministic given insertion order, so
        // taking the last point keeps builds reproducible.
        let vantage = indices.pop().expect("partition larger than leaf size");
        let vantage_vec = self.get_vector(vantage as usize);

        let mut dists: Vec<(f32, u32)> = indices
            .iter()
            .map(|&idx| (M::distance(vantage_vec, self.get_vector(idx as usize)), idx))
            .collect();

        // Median split: everything at or below the median distance goes
        // inner, the rest outer.
        let mid = dists.len() / 2;
        dists.select_nth_unstable_by(mid, |a, b| a.0.total_cmp(&b.0));
        let threshold = dists[mid].0;

        let inner_indices: Vec<u32> = dists[..=mid].iter().map(|&(_, idx)| idx).collect();
        let outer_indices: Vec<u32> = dists[mid + 1..].iter().map(|&(_, idx)| idx).collect();

        // Ties at the median can leave the outer side empty; a leaf avoids
        // recursing on a partition that no longer shrinks.
        if outer_indices.is_empty() {
            let mut indices = inner_indices;
            indices.push(vantage);
            return VPNode::Leaf { indices };
        }

        VPNode::Internal {
            vantage,
            threshold,
            inner: Box::new(self.build_tree(inner_indices)),
            outer: Box::new(self.build_tree(outer_indices)),
        }
    }

    /// Offer a candidate to the k-best buffer.
    ///
    /// `tau` is the current k-th best distance (the pruning radius),
    /// infinity until the buffer holds k entries.
    fn push_candidate(best_k: &mut BestK, tau: &mut f32, k: usize, dist: f32, idx: u32) {
        if best_k.len() < k {
            best_k.push((dist, idx));
            if best_k.len() == k {
                *tau = best_k.iter().map(|&(d, _)| d).fold(f32::NEG_INFINITY, f32::max);
            }
        } else if dist < *tau {
            if let Some(worst) = best_k
                .iter()
                .enumerate()
                .max_by(|a, b| a.1 .0.total_cmp(&b.1 .0))
                .map(|(i, _)| i)
            {
                best_k[worst] = (dist, idx);
                *tau = best_k.iter().map(|&(d, _)| d).fold(f32::NEG_INFINITY, f32::max);
            }
        }
    }

    /// Recursive branch-and-bound search.
    fn search_node(&self, node: &VPNode, query: &[M::Scalar], k: usize, best_k: &mut BestK, tau: &mut f32) {
        match node {
            VPNode::Leaf { indices } => {
                for &idx in indices {
                    let dist = M::distance(query, self.get_vector(idx as usize));
                    Self::push_candidate(best_k, tau, k, dist, idx);
                }
            }
            VPNode::Internal {
                vantage,
                threshold,
                inner,
                outer,
            } => {
                let dist = M::distance(query, self.get_vector(*vantage as usize));
                Self::push_candidate(best_k, tau, k, dist, *vantage);

                // Visit the side the query falls in first; the other side
                // can only contain a closer point if the query's distance
                // to the vantage point is within tau of the threshold.
                let (near, far) = if dist <= *threshold {
                    (inner, outer)
                } else {
                    (outer, inner)
                };

                self.search_node(near, query, k, best_k, tau);
                if best_k.len() < k || (dist - threshold).abs() <= *tau {
                    self.search_node(far, query, k, best_k, tau);
                }
            }
        }
    }
}

impl<M: Metric> NearestNeighborIndex for VPTreeIndex<M> {
    type Scalar = M::Scalar;

    fn add(&mut self, _doc_id: u32, vector: Vec<M::Scalar>) -> Result<()> {
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
        if self.built {
            return Ok(());
        }
        if self.num_vectors == 0 {
            return Err(IndexError::EmptyIndex);
        }

        let indices: Vec<u32> = (0..self.num_vectors as u32).collect();
        self.root = Some(self.build_tree(indices));
        self.built = true;
        Ok(())
    }

    fn search(&self, query: &[M::Scalar], k: usize) -> Result<Vec<(u32, f32)>> {
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

        let root = self.root.as_ref().ok_or(IndexError::NotBuilt)?;

        let mut best_k = BestK::new();
        let mut tau = f32::INFINITY;
        self.search_node(root, query, k, &mut best_k, &mut tau);

        let mut results: Vec<(u32, f32)> = best_k.iter().map(|&(d, idx)| (idx, d)).collect();
        results.sort_unstable_by(|a, b| a.1.total_cmp(&b.1));
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn num_vectors(&self) -> usize {
        self.num_vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..dim).map(|_| rng.random::<f32>()).collect())
            .collect()
    }

    /// Brute-force k-nn for cross-checking tree results.
    fn exact_knn<M: Metric>(data: &[Vec<M::Scalar>], query: &[M::Scalar], k: usize) -> Vec<u32> {
        let mut dists: Vec<(f32, u32)> = data
            .iter()
            .enumerate()
            .map(|(i, v)| (M::distance(query, v), i as u32))
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0));
        dists.into_iter().take(k).map(|(_, i)| i).collect()
    }

    #[test]
    fn test_l2_matches_brute_force() {
        let data = random_vectors(300, 8, 7);
        let queries = random_vectors(10, 8, 8);

        let mut tree = VPTreeL2Index::new(8).unwrap();
        for (i, v) in data.iter().enumerate() {
            tree.add(i as u32, v.clone()).unwrap();
        }
        tree.build().unwrap();

        for query in &queries {
            let got: Vec<u32> = tree.search(query, 5).unwrap().iter().map(|r| r.0).collect();
            let expected = exact_knn::<L2>(&data, query, 5);
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_binary_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let data: Vec<Vec<u8>> = (0..200)
            .map(|_| (0..16).map(|_| rng.random::<u8>()).collect())
            .collect();
        let queries: Vec<Vec<u8>> = (0..8)
            .map(|_| (0..16).map(|_| rng.random::<u8>()).collect())
            .collect();

        let mut tree = VPTreeBinaryIndex::new(16).unwrap();
        for (i, v) in data.iter().enumerate() {
            tree.add(i as u32, v.clone()).unwrap();
        }
        tree.build().unwrap();

        for query in &queries {
            let got = tree.search(query, 4).unwrap();
            let expected = exact_knn::<Hamming>(&data, query, 4);
            // Hamming ties are common; compare distances, not ids.
            let got_dists: Vec<f32> = got.iter().map(|r| r.1).collect();
            let expected_dists: Vec<f32> = expected
                .iter()
                .map(|&i| Hamming::distance(query, &data[i as usize]))
                .collect();
            assert_eq!(got_dists, expected_dists);
        }
    }

    #[test]
    fn test_results_sorted_ascending() {
        let data = random_vectors(100, 4, 3);
        let mut tree = VPTreeL2Index::new(4).unwrap();
        for (i, v) in data.iter().enumerate() {
            tree.add(i as u32, v.clone()).unwrap();
        }
        tree.build().unwrap();

        let results = tree.search(&data[0], 10).unwrap();
        assert_eq!(results.len(), 10);
        for pair in results.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
        // The query is a stored point; it must come back first at distance 0.
        assert_eq!(results[0].0, 0);
        assert_eq!(results[0].1, 0.0);
    }

    #[test]
    fn test_small_partition_stays_leaf() {
        // Fewer points than max_leaf_size: the whole tree is one leaf.
        let mut tree = VPTreeL2Index::new(2).unwrap();
        for i in 0..5u32 {
            tree.add(i, vec![i as f32, 0.0]).unwrap();
        }
        tree.build().unwrap();

        let results = tree.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(results.iter().map(|r| r.0).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_identical_points() {
        // All-equal points force median ties; build must terminate.
        let mut tree = VPTreeL2Index::with_params(2, VPTreeParams { max_leaf_size: 1 }).unwrap();
        for i in 0..50u32 {
            tree.add(i, vec![1.0, 1.0]).unwrap();
        }
        tree.build().unwrap();

        let results = tree.search(&[1.0, 1.0], 5).unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.1 == 0.0));
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut tree = VPTreeL2Index::new(2).unwrap();
        assert_eq!(tree.search(&[0.0, 0.0], 1), Err(IndexError::NotBuilt));
        assert_eq!(tree.build(), Err(IndexError::EmptyIndex));

        tree.add(0, vec![0.0, 0.0]).unwrap();
        tree.build().unwrap();
        assert_eq!(tree.add(1, vec![1.0, 1.0]), Err(IndexError::AlreadyBuilt));
        assert_eq!(
            tree.search(&[0.0], 1),
            Err(IndexError::DimensionMismatch { expected: 2, actual: 1 })
        );
    }
}
