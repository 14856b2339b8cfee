//! Store configuration.
//!
//! A `VectorConfig` is built once, validated at store construction, and
//! immutable afterwards. The dimension is fixed for the lifetime of a store;
//! every vector that enters or queries the store must match it exactly.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorError};

/// Where vector rows live.
///
/// The two modes differ only in whether a file backs the engine; the scan
/// and transaction behavior is identical. Resolved once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// No file. Contents are lost when the store is dropped.
    InMemory,
    /// Backed by a single SQLite file; requires `VectorStore::open`.
    Persistent,
}

/// Engine parameters.
///
/// `dimension` is required and has no default. Everything else is a tuning
/// knob that affects I/O and throughput but not correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Vector dimension; all stored and query vectors must match exactly.
    pub dimension: usize,

    /// In-memory or file-backed.
    pub storage_mode: StorageMode,

    /// Enable write-ahead logging. Trades some write latency for
    /// crash-safety and readers that do not block on a writer in progress.
    pub wal_mode: bool,

    /// SQLite page cache budget. Negative values are KiB, per the
    /// `cache_size` pragma convention.
    pub cache_size: i32,

    /// Memory-mapped I/O window in bytes, if any.
    pub mmap_size: Option<usize>,

    /// Rows per transaction for `insert_batch`. Larger batches are chunked
    /// into multiple transactions of this size to bound memory.
    pub batch_size: usize,

    /// Advisory only: the kernel is written so auto-vectorization is
    /// eligible; results are identical whether or not it happens.
    pub enable_simd: bool,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            dimension: 0,
            storage_mode: StorageMode::InMemory,
            wal_mode: true,
            cache_size: -2000, // 2 MiB
            mmap_size: Some(64 * 1024 * 1024),
            batch_size: 1000,
            enable_simd: cfg!(any(target_arch = "x86_64", target_arch = "aarch64")),
        }
    }
}

impl VectorConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Default::default()
        }
    }

    pub fn with_storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    pub fn with_wal(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    pub fn with_cache_size(mut self, size: i32) -> Self {
        self.cache_size = size;
        self
    }

    pub fn with_mmap_size(mut self, size: Option<usize>) -> Self {
        self.mmap_size = size;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_simd(mut self, enabled: bool) -> Self {
        self.enable_simd = enabled;
        self
    }

    /// Check the parameters before any I/O happens.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VectorError::Config(
                "dimension must be greater than zero".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(VectorError::Config(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
