//! Similarity kernel: pure numeric functions over flat f32 slices.
//!
//! The hot loops are written over fixed-size chunks of 8 lanes with
//! independent accumulators, which is the access pattern LLVM's
//! auto-vectorizer turns into AVX2/NEON code when the target supports it.
//! Vectorization is advisory only: the chunking never changes the result,
//! and summation order is fixed for a given build, so the kernel produces
//! identical scores whether or not the loop actually vectorizes.
//!
//! # Precomputed norms
//!
//! `cosine_from_norms` takes both norms as arguments so the store can pay
//! the norm cost once at write time and reuse it for every query:
//! ```text
//! cos(θ) = dot(a, b) / (||a|| · ||b||)
//! ```
//! A zero-norm vector is defined as maximally dissimilar to everything,
//! including itself: the similarity is exactly `0.0`, never NaN.

use crate::error::{Result, VectorError};

/// Lanes per accumulator chunk. 8×f32 fills one AVX2 register and two
/// NEON registers.
const LANES: usize = 8;

#[inline(always)]
fn dot_unchecked(a: &[f32], b: &[f32]) -> f32 {
    let chunks = a.len() / LANES;
    let mut acc = [0.0f32; LANES];

    for i in 0..chunks {
        let off = i * LANES;
        for lane in 0..LANES {
            acc[lane] += a[off + lane] * b[off + lane];
        }
    }

    let mut sum = 0.0f32;
    for lane in 0..LANES {
        sum += acc[lane];
    }

    // Tail elements past the last full chunk
    for i in chunks * LANES..a.len() {
        sum += a[i] * b[i];
    }

    sum
}

/// Dot product of two equal-length vectors.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(dot_unchecked(a, b))
}

/// L2 (Euclidean) norm: `sqrt(Σ vᵢ²)`. The all-zero vector has norm `0.0`.
#[inline]
pub fn vector_norm(v: &[f32]) -> f32 {
    dot_unchecked(v, v).sqrt()
}

/// Cosine similarity from raw components and precomputed norms.
///
/// Returns `0.0` when either norm is zero.
#[inline]
pub fn cosine_from_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> Result<f32> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot_unchecked(a, b) / (norm_a * norm_b))
}

/// Cosine similarity computing both norms on the spot.
///
/// Convenience for callers without stored norms; the store's scan path
/// uses `cosine_from_norms` with the write-time norm instead.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    cosine_from_norms(a, vector_norm(a), b, vector_norm(b))
}

/// L2-normalize a vector, returning a new unit-length vector.
///
/// The zero vector is returned unchanged.
pub fn l2_normalized(v: &[f32]) -> Vec<f32> {
    let norm = vector_norm(v);
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Serialize a vector to `4 * len` bytes, little-endian, no header.
///
/// The layout is fixed regardless of host endianness so persistent files
/// are portable.
pub fn serialize_vector(v: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(v.len() * 4);
    for &x in v {
        bytes.extend_from_slice(&x.to_le_bytes());
    }
    bytes
}

/// Deserialize a vector of exactly `dimension` f32 values.
///
/// Round-trip with `serialize_vector` is exact.
pub fn deserialize_vector(bytes: &[u8], dimension: usize) -> Result<Vec<f32>> {
    if bytes.len() != dimension * 4 {
        return Err(VectorError::InvalidVector(format!(
            "expected {} bytes for dimension {}, got {}",
            dimension * 4,
            dimension,
            bytes.len()
        )));
    }

    let mut v = Vec::with_capacity(dimension);
    for chunk in bytes.chunks_exact(4) {
        v.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(v)
}
