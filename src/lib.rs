//! Resona – embedded SQLite-backed vector storage with exact cosine
//! similarity search.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        VectorStore (insert · search · maintenance)      │
//! ├─────────────────────────────────────────────────────────┤
//! │   Similarity kernel (dot / norm / cosine, chunked f32)  │
//! ├─────────────────────────────────────────────────────────┤
//! │      SQLite (WAL · covering index · mmap/page cache)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Vectors are stored as little-endian f32 blobs with their L2 norm
//! precomputed at write time; queries run an exact brute-force scan that
//! reuses the stored norms and keeps a bounded top-k heap. No approximate
//! indexing: results are exact, deterministic, and tie-broken by id.
//!
//! # Example
//!
//! ```
//! use resona::{VectorConfig, VectorStore};
//!
//! # fn main() -> resona::Result<()> {
//! let store = VectorStore::new(VectorConfig::new(4))?;
//!
//! store.insert(&[1.0, 0.0, 0.0, 0.0], Some("first"))?;
//! store.insert(&[0.0, 1.0, 0.0, 0.0], None)?;
//!
//! let hits = store.search(&[1.0, 0.0, 0.0, 0.0], 1)?;
//! assert_eq!(hits[0].id, 1);
//! assert!((hits[0].similarity - 1.0).abs() < 1e-6);
//! # Ok(())
//! # }
//! ```
//!
//! # Scale
//!
//! Built for single-process collections up to roughly 10⁵–10⁶ vectors.
//! The scan is O(n) per query by design; callers needing sub-linear
//! search at larger scale want an ANN index, which changes result
//! semantics and is out of scope here.

pub mod config;
pub mod error;
pub mod simd;
pub mod store;

mod indexes;

pub use config::{StorageMode, VectorConfig};
pub use error::{Result, VectorError};
pub use store::{SearchResult, StorageStats, VectorStore};

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        let config = VectorConfig::new(128).with_wal(true).with_cache_size(-2000);
        let store = VectorStore::new(config).unwrap();

        let vectors: Vec<Vec<f32>> = (0..100)
            .map(|i| {
                let mut v = vec![0.0; 128];
                v[i % 128] = 1.0;
                v
            })
            .collect();
        let metadata: Vec<Option<&str>> = vec![None; 100];

        let ids = store.insert_batch(&vectors, &metadata).unwrap();
        assert_eq!(ids.len(), 100);
        assert_eq!(store.count().unwrap(), 100);

        let query = vec![1.0; 128];
        let results = store.search(&query, 10).unwrap();
        assert_eq!(results.len(), 10);
        assert!(results[0].similarity > 0.0);

        store.create_indexes().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.vector_count, 100);
        assert_eq!(stats.dimension, 128);
        assert!(stats.size_bytes > 0);
    }
}
