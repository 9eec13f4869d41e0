//! Cosine similarity and vector normalization.

use ndarray::ArrayView1;

use crate::error::{Result, StoreError};

/// Accumulates in `f64` so large finite components do not overflow.
fn dot(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

fn norm64(v: ArrayView1<'_, f32>) -> f64 {
    dot(v, v).sqrt()
}

/// Euclidean (L2) norm.
pub fn l2_norm(v: ArrayView1<'_, f32>) -> f32 {
    norm64(v) as f32
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns `None` when either vector has zero (or non-finite) norm: similarity
/// is undefined and the caller must skip that candidate rather than score it
/// as zero.
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> Option<f32> {
    debug_assert_eq!(a.len(), b.len());
    let norm_a = norm64(a);
    let norm_b = norm64(b);
    if !is_usable_norm(norm_a) || !is_usable_norm(norm_b) {
        return None;
    }
    let sim = (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32;
    sim.is_finite().then_some(sim)
}

fn is_usable_norm(norm: f64) -> bool {
    norm.is_finite() && norm > 0.0
}

/// Rescale `v` to unit length in place.
///
/// A zero vector is left unchanged and reported as [`StoreError::ZeroVector`].
pub fn normalize(v: &mut [f32]) -> Result<()> {
    let norm = norm64(ArrayView1::from(&*v));
    if norm == 0.0 {
        return Err(StoreError::ZeroVector);
    }
    v.iter_mut().for_each(|x| *x = (f64::from(*x) / norm) as f32);
    Ok(())
}
