//! Vector storage engine and brute-force similarity scan.
//!
//! One `VectorStore` owns one SQLite connection (in-memory or file-backed)
//! and a single `vectors` table:
//!
//! ```text
//! id        INTEGER PRIMARY KEY AUTOINCREMENT
//! vector    BLOB NOT NULL     -- 4 * dimension bytes, little-endian f32
//! norm      REAL NOT NULL     -- L2 norm, computed once at insert
//! metadata  TEXT              -- opaque, never interpreted
//! ```
//!
//! Norms are precomputed at write time and reused by every query, so the
//! scan path pays one dot product per candidate and no square roots.
//!
//! # Concurrency
//!
//! All calls are synchronous and run to completion on the calling thread.
//! With WAL enabled, one writer and many readers can proceed concurrently
//! across store instances; a reader observes a consistent snapshot and
//! never a partially committed batch. Two live stores must not point at
//! the same file path without external coordination.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::config::{StorageMode, VectorConfig};
use crate::error::{Result, VectorError};
use crate::indexes;
use crate::simd::{cosine_from_norms, deserialize_vector, serialize_vector, vector_norm};

const TABLE: &str = "vectors";

/// One search hit: row id and cosine similarity in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub similarity: f32,
}

/// Storage footprint snapshot for monitoring and capacity planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStats {
    pub vector_count: i64,
    /// On-disk/in-memory bytes including indexes, excluding free pages.
    pub size_bytes: i64,
    pub dimension: usize,
}

/// Embedded vector store.
///
/// Construction validates the configuration before touching storage.
/// Dropping the store releases the connection and, for in-memory mode,
/// the contents.
#[derive(Debug)]
pub struct VectorStore {
    conn: Connection,
    config: VectorConfig,
}

/// Heap entry ordered worst-first for bounded top-k selection.
///
/// Lower similarity ranks lower; on equal similarity the larger id ranks
/// lower, so ties keep the smaller id and results are deterministic.
#[derive(Debug)]
struct Candidate {
    similarity: f32,
    id: i64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.similarity
            .total_cmp(&other.similarity)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl VectorStore {
    /// Create an in-memory store.
    pub fn new(config: VectorConfig) -> Result<Self> {
        config.validate()?;
        if config.storage_mode == StorageMode::Persistent {
            return Err(VectorError::Config(
                "persistent mode requires a path; use new_persistent()".to_string(),
            ));
        }
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn, config)
    }

    /// Create or open a file-backed store at `path`.
    pub fn new_persistent<P: AsRef<Path>>(path: P, config: VectorConfig) -> Result<Self> {
        config.validate()?;
        let config = config.with_storage_mode(StorageMode::Persistent);
        let conn = Connection::open(path)?;
        Self::initialize(conn, config)
    }

    fn initialize(conn: Connection, config: VectorConfig) -> Result<Self> {
        Self::configure_connection(&conn, &config)?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {TABLE} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    vector BLOB NOT NULL,
                    norm REAL NOT NULL,
                    metadata TEXT
                )"
            ),
            [],
        )?;

        indexes::create_indexes(&conn, TABLE)?;

        tracing::debug!(
            dimension = config.dimension,
            wal = config.wal_mode,
            mode = ?config.storage_mode,
            "opened vector store"
        );

        Ok(Self { conn, config })
    }

    fn configure_connection(conn: &Connection, config: &VectorConfig) -> Result<()> {
        if config.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.pragma_update(None, "cache_size", config.cache_size)?;
        if let Some(mmap_size) = config.mmap_size {
            conn.pragma_update(None, "mmap_size", mmap_size as i64)?;
        }
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        Ok(())
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &VectorConfig {
        &self.config
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.config.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Insert a single vector; returns the engine-assigned id.
    ///
    /// The norm is computed here, once, and stored next to the serialized
    /// components. Replacing a vector's content is delete + insert; ids
    /// are never reused within a store's lifetime.
    pub fn insert(&self, vector: &[f32], metadata: Option<&str>) -> Result<i64> {
        self.check_dimension(vector)?;

        let vector_bytes = serialize_vector(vector);
        let norm = vector_norm(vector);

        self.conn.execute(
            &format!("INSERT INTO {TABLE} (vector, norm, metadata) VALUES (?1, ?2, ?3)"),
            params![vector_bytes, norm, metadata],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Insert many vectors, all-or-nothing per transaction chunk.
    ///
    /// Every vector's dimension is validated before any row is written.
    /// Rows are committed in chunks of `batch_size`; a failure mid-batch
    /// leaves only fully committed chunks persisted and the rest not
    /// attempted.
    pub fn insert_batch(
        &self,
        vectors: &[Vec<f32>],
        metadata: &[Option<&str>],
    ) -> Result<Vec<i64>> {
        if vectors.len() != metadata.len() {
            return Err(VectorError::InvalidVector(format!(
                "vectors and metadata length mismatch: {} vs {}",
                vectors.len(),
                metadata.len()
            )));
        }

        // Fail fast before any I/O
        for vector in vectors {
            self.check_dimension(vector)?;
        }

        let mut ids = Vec::with_capacity(vectors.len());
        let chunk_size = self.config.batch_size;

        for (chunk_idx, chunk) in vectors.chunks(chunk_size).enumerate() {
            let meta_chunk = &metadata[chunk_idx * chunk_size..chunk_idx * chunk_size + chunk.len()];

            let tx = self.conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare_cached(&format!(
                    "INSERT INTO {TABLE} (vector, norm, metadata) VALUES (?1, ?2, ?3)"
                ))?;

                for (vector, meta) in chunk.iter().zip(meta_chunk) {
                    let vector_bytes = serialize_vector(vector);
                    let norm = vector_norm(vector);
                    stmt.execute(params![vector_bytes, norm, meta])?;
                    ids.push(tx.last_insert_rowid());
                }
            }
            tx.commit()?;

            tracing::debug!(chunk = chunk_idx, rows = chunk.len(), "batch chunk committed");
        }

        Ok(ids)
    }

    /// Point lookup of the stored components. `None` if the id does not
    /// exist or was deleted.
    pub fn get(&self, id: i64) -> Result<Option<Vec<f32>>> {
        let bytes: Option<Vec<u8>> = self
            .conn
            .query_row(
                &format!("SELECT vector FROM {TABLE} WHERE id = ?1"),
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match bytes {
            Some(bytes) => Ok(Some(deserialize_vector(&bytes, self.config.dimension)?)),
            None => Ok(None),
        }
    }

    /// Point lookup of the opaque metadata stored with a vector.
    pub fn get_metadata(&self, id: i64) -> Result<Option<String>> {
        let row: Option<Option<String>> = self
            .conn
            .query_row(
                &format!("SELECT metadata FROM {TABLE} WHERE id = ?1"),
                [id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(row.flatten())
    }

    /// Remove a row if present. Idempotent: deleting a missing id returns
    /// `false`, not an error.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute(&format!("DELETE FROM {TABLE} WHERE id = ?1"), [id])?;
        Ok(deleted > 0)
    }

    /// Number of live records.
    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// Storage footprint including indexes.
    pub fn stats(&self) -> Result<StorageStats> {
        let vector_count = self.count()?;

        let page_count: i64 = self
            .conn
            .query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = self
            .conn
            .query_row("PRAGMA page_size", [], |row| row.get(0))?;
        let freelist_count: i64 = self
            .conn
            .query_row("PRAGMA freelist_count", [], |row| row.get(0))?;

        Ok(StorageStats {
            vector_count,
            size_bytes: (page_count - freelist_count) * page_size,
            dimension: self.config.dimension,
        })
    }

    /// Rebuild the covering index if missing and refresh planner
    /// statistics. Safe to call repeatedly; intended after large batch
    /// loads and periodically thereafter.
    pub fn create_indexes(&self) -> Result<()> {
        indexes::create_indexes(&self.conn, TABLE)?;
        indexes::refresh_statistics(&self.conn)?;
        tracing::debug!("index maintenance complete");
        Ok(())
    }

    /// Index names currently defined on the vector table.
    pub fn index_names(&self) -> Result<Vec<String>> {
        indexes::list_indexes(&self.conn, TABLE)
    }

    /// Exact k-nearest-neighbor search by cosine similarity.
    ///
    /// Streams every live row, scores it against the query with the
    /// candidate's precomputed norm, and keeps the best k in a bounded
    /// min-heap, so auxiliary memory is O(k) regardless of collection
    /// size. Results are sorted by descending similarity; equal scores
    /// tie-break by ascending id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.scan_top_k(query, k, None)
    }

    /// Like [`search`](Self::search), but candidates scoring below
    /// `min_similarity` never enter the result set.
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchResult>> {
        self.scan_top_k(query, k, Some(min_similarity))
    }

    fn scan_top_k(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: Option<f32>,
    ) -> Result<Vec<SearchResult>> {
        self.check_dimension(query)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_norm = vector_norm(query);
        let dimension = self.config.dimension;

        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT id, vector, norm FROM {TABLE}"))?;
        let mut rows = stmt.query([])?;

        // Worst candidate sits at the top of the reversed heap
        let mut heap: BinaryHeap<std::cmp::Reverse<Candidate>> =
            BinaryHeap::with_capacity(k.min(4096) + 1);

        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let bytes = row.get_ref(1)?.as_blob().map_err(rusqlite::Error::from)?;
            let norm: f32 = row.get(2)?;

            let candidate = deserialize_vector(bytes, dimension)?;
            let similarity = cosine_from_norms(query, query_norm, &candidate, norm)?;

            if let Some(threshold) = min_similarity {
                if similarity < threshold {
                    continue;
                }
            }

            let entry = Candidate { similarity, id };
            if heap.len() < k {
                heap.push(std::cmp::Reverse(entry));
            } else if let Some(worst) = heap.peek() {
                if entry > worst.0 {
                    heap.pop();
                    heap.push(std::cmp::Reverse(entry));
                }
            }
        }

        let mut results: Vec<SearchResult> = heap
            .into_iter()
            .map(|rev| SearchResult {
                id: rev.0.id,
                similarity: rev.0.similarity,
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(results)
    }
}
