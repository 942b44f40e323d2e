//! Inner product used by every forward pass.
//!
//! This module provides a single abstraction over the dot product:
//! - default: a simple, safe accumulation loop
//! - x86_64 with AVX2 available at runtime: an 8-lane vector loop with a scalar tail

/// Width of the vector fast path, in `f32` lanes.
pub const SIMD_LANES: usize = 8;

/// `sum(a[i] * b[i])` for `i` in `0..count`.
///
/// This is called once per neuron per layer per sample. Both slices are cut to
/// `count` once up front; panics if either is shorter than `count`.
#[inline]
pub fn dot(a: &[f32], b: &[f32], count: usize) -> f32 {
    dot_simd(a, b, count)
}

/// Portable scalar dot product.
#[inline]
pub fn dot_scalar(a: &[f32], b: &[f32], count: usize) -> f32 {
    let (a, b) = (&a[..count], &b[..count]);
    let mut sum = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        sum += x * y;
    }
    sum
}

/// Dot product using the widest vector path the CPU supports.
///
/// Falls back to [`dot_scalar`] when no vector path is available.
#[inline]
pub fn dot_simd(a: &[f32], b: &[f32], count: usize) -> f32 {
    let (a, b) = (&a[..count], &b[..count]);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: AVX2 support was just checked and both slices hold `count` elements.
            return unsafe { dot_avx2(a, b) };
        }
    }

    dot_scalar(a, b, count)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn dot_avx2(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    debug_assert_eq!(a.len(), b.len());
    let count = a.len();
    let simd_len = count / SIMD_LANES * SIMD_LANES;

    let mut sum = unsafe {
        let mut acc = _mm256_setzero_ps();
        let mut i = 0;
        while i < simd_len {
            let va = _mm256_loadu_ps(a.as_ptr().add(i));
            let vb = _mm256_loadu_ps(b.as_ptr().add(i));
            acc = _mm256_add_ps(acc, _mm256_mul_ps(va, vb));
            i += SIMD_LANES;
        }

        let mut lanes = [0.0_f32; SIMD_LANES];
        _mm256_storeu_ps(lanes.as_mut_ptr(), acc);
        lanes.iter().sum::<f32>()
    };

    // Tail.
    for i in simd_len..count {
        sum += a[i] * b[i];
    }
    sum
}
