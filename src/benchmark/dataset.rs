//! Dataset providers for benchmarking.
//!
//! A [`DatasetProvider`] describes a feature matrix without necessarily
//! holding it: `size()` and `dimension()` are always cheap, while `data()`
//! materializes the matrix (generating or reading it on first call and
//! caching it) and `unload_data()` drops the cache again. The harness
//! issues one `data()` and one `unload_data()` per case, which bounds peak
//! memory to a single case's matrices when many cases run in sequence.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::benchmark::case::IndexFamily;
use crate::benchmark::error::BenchmarkError;

/// A loaded feature matrix, tagged with its index family.
///
/// The tag makes family dispatch a closed `match`: harness code never
/// inspects element types to decide which index pair to build.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    /// Real-valued vectors, one row per point.
    Dense(Vec<Vec<f32>>),
    /// Bit-packed codes, one row per point, 8 dimensions per byte.
    Binary(Vec<Vec<u8>>),
}

impl FeatureMatrix {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        match self {
            FeatureMatrix::Dense(rows) => rows.len(),
            FeatureMatrix::Binary(rows) => rows.len(),
        }
    }

    /// Row width: scalar count for dense rows, byte count for binary rows.
    /// Zero when the matrix has no rows.
    pub fn dimension(&self) -> usize {
        match self {
            FeatureMatrix::Dense(rows) => rows.first().map_or(0, Vec::len),
            FeatureMatrix::Binary(rows) => rows.first().map_or(0, Vec::len),
        }
    }

    /// Family this matrix belongs to.
    pub fn family(&self) -> IndexFamily {
        match self {
            FeatureMatrix::Dense(_) => IndexFamily::Continuous,
            FeatureMatrix::Binary(_) => IndexFamily::Binary,
        }
    }
}

/// Contract between the harness and a dataset.
///
/// `data()` may be called more than once but the harness calls it once per
/// case; `unload_data()` must be idempotent.
pub trait DatasetProvider {
    /// Stable dataset name, used in case labels and log events.
    fn name(&self) -> &str;

    /// Index family of the feature matrix this provider yields.
    fn family(&self) -> IndexFamily;

    /// Feature vector length (scalars for continuous data, bytes for
    /// binary codes).
    fn dimension(&self) -> usize;

    /// Total row count.
    fn size(&self) -> usize;

    /// Materialize the full feature matrix.
    fn data(&mut self) -> Result<FeatureMatrix, BenchmarkError>;

    /// Release any cached storage. Idempotent.
    fn unload_data(&mut self);
}

/// Synthetic dataset of uniform random vectors in `[0, 1)^d`.
pub struct UniformDataset {
    name: String,
    size: usize,
    dimension: usize,
    seed: u64,
    cache: Option<Vec<Vec<f32>>>,
}

impl UniformDataset {
    pub fn new(name: impl Into<String>, size: usize, dimension: usize, seed: u64) -> Self {
        Self {
            name: name.into(),
            size,
            dimension,
            seed,
            cache: None,
        }
    }
}

impl DatasetProvider for UniformDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> IndexFamily {
        IndexFamily::Continuous
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn size(&self) -> usize {
        self.size
    }

    fn data(&mut self) -> Result<FeatureMatrix, BenchmarkError> {
        match &self.cache {
            Some(rows) => Ok(FeatureMatrix::Dense(rows.clone())),
            None => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                let rows: Vec<Vec<f32>> = (0..self.size)
                    .map(|_| (0..self.dimension).map(|_| rng.random::<f32>()).collect())
                    .collect();
                self.cache = Some(rows.clone());
                Ok(FeatureMatrix::Dense(rows))
            }
        }
    }

    fn unload_data(&mut self) {
        self.cache = None;
    }
}

/// Synthetic clustered dataset: Gaussian blobs around random centers.
///
/// More realistic than uniform noise; real embedding data concentrates on
/// clusters and manifolds, which is what gives tree indexes something to
/// prune against.
pub struct ClusteredDataset {
    name: String,
    size: usize,
    dimension: usize,
    n_clusters: usize,
    cluster_std: f32,
    seed: u64,
    cache: Option<Vec<Vec<f32>>>,
}

impl ClusteredDataset {
    pub fn new(
        name: impl Into<String>,
        size: usize,
        dimension: usize,
        n_clusters: usize,
        cluster_std: f32,
        seed: u64,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            dimension,
            n_clusters: n_clusters.max(1),
            cluster_std,
            seed,
            cache: None,
        }
    }

    fn generate(&self) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let centers: Vec<Vec<f32>> = (0..self.n_clusters)
            .map(|_| (0..self.dimension).map(|_| rng.random::<f32>()).collect())
            .collect();

        // Box-Muller for Gaussian noise around each center.
        let mut sample_near = |rng: &mut StdRng, center: &[f32]| -> Vec<f32> {
            center
                .iter()
                .map(|&c| {
                    let u1: f32 = rng.random();
                    let u2: f32 = rng.random();
                    let z = (-2.0 * u1.max(f32::MIN_POSITIVE).ln()).sqrt()
                        * (2.0 * std::f32::consts::PI * u2).cos();
                    (c + z * self.cluster_std).clamp(0.0, 1.0)
                })
                .collect()
        };

        (0..self.size)
            .map(|_| {
                let idx = rng.random_range(0..self.n_clusters);
                sample_near(&mut rng, &centers[idx])
            })
            .collect()
    }
}

impl DatasetProvider for ClusteredDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> IndexFamily {
        IndexFamily::Continuous
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn size(&self) -> usize {
        self.size
    }

    fn data(&mut self) -> Result<FeatureMatrix, BenchmarkError> {
        match &self.cache {
            Some(rows) => Ok(FeatureMatrix::Dense(rows.clone())),
            None => {
                let rows = self.generate();
                self.cache = Some(rows.clone());
                Ok(FeatureMatrix::Dense(rows))
            }
        }
    }

    fn unload_data(&mut self) {
        self.cache = None;
    }
}

/// Synthetic dataset of random bit-packed codes.
///
/// `dimension` is the code width in bytes; each byte packs 8 binary
/// dimensions.
pub struct BinaryDataset {
    name: String,
    size: usize,
    dimension: usize,
    seed: u64,
    cache: Option<Vec<Vec<u8>>>,
}

impl BinaryDataset {
    pub fn new(name: impl Into<String>, size: usize, dimension: usize, seed: u64) -> Self {
        Self {
            name: name.into(),
            size,
            dimension,
            seed,
            cache: None,
        }
    }
}

impl DatasetProvider for BinaryDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> IndexFamily {
        IndexFamily::Binary
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn size(&self) -> usize {
        self.size
    }

    fn data(&mut self) -> Result<FeatureMatrix, BenchmarkError> {
        match &self.cache {
            Some(rows) => Ok(FeatureMatrix::Binary(rows.clone())),
            None => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                let rows: Vec<Vec<u8>> = (0..self.size)
                    .map(|_| (0..self.dimension).map(|_| rng.random::<u8>()).collect())
                    .collect();
                self.cache = Some(rows.clone());
                Ok(FeatureMatrix::Binary(rows))
            }
        }
    }

    fn unload_data(&mut self) {
        self.cache = None;
    }
}

/// Magic bytes of the on-disk dense vector format.
const VEC_MAGIC: &[u8; 4] = b"VEC1";

/// File-backed continuous dataset.
///
/// On-disk layout, little-endian: `b"VEC1"`, `u32` row count, `u32`
/// dimension, then `rows * dimension` `f32` values in row-major order.
/// The header is read at construction so `size()`/`dimension()` never
/// touch the payload; rows are read and cached on the first `data()` call.
pub struct FileDataset {
    name: String,
    path: PathBuf,
    size: usize,
    dimension: usize,
    cache: Option<Vec<Vec<f32>>>,
}

impl FileDataset {
    /// Open a vector file and read its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BenchmarkError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = BufReader::new(File::open(&path)?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != VEC_MAGIC {
            return Err(BenchmarkError::Format(format!(
                "{}: bad magic {magic:?}, expected {VEC_MAGIC:?}",
                path.display()
            )));
        }

        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        let size = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let dimension = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;

        if dimension == 0 {
            return Err(BenchmarkError::Format(format!(
                "{}: zero dimension in header",
                path.display()
            )));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self {
            name,
            path,
            size,
            dimension,
            cache: None,
        })
    }

    fn read_rows(&self) -> Result<Vec<Vec<f32>>, BenchmarkError> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        reader.seek(SeekFrom::Start(12))?;

        let mut payload = vec![0u8; self.size * self.dimension * 4];
        reader.read_exact(&mut payload)?;

        let rows = (0..self.size)
            .map(|i| {
                (0..self.dimension)
                    .map(|j| {
                        let offset = (i * self.dimension + j) * 4;
                        f32::from_le_bytes([
                            payload[offset],
                            payload[offset + 1],
                            payload[offset + 2],
                            payload[offset + 3],
                        ])
                    })
                    .collect()
            })
            .collect();
        Ok(rows)
    }
}

impl DatasetProvider for FileDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> IndexFamily {
        IndexFamily::Continuous
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn size(&self) -> usize {
        self.size
    }

    fn data(&mut self) -> Result<FeatureMatrix, BenchmarkError> {
        match &self.cache {
            Some(rows) => Ok(FeatureMatrix::Dense(rows.clone())),
            None => {
                let rows = self.read_rows()?;
                self.cache = Some(rows.clone());
                Ok(FeatureMatrix::Dense(rows))
            }
        }
    }

    fn unload_data(&mut self) {
        self.cache = None;
    }
}
