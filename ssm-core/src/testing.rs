//! Tolerance and fixture helpers for numeric tests
#![allow(dead_code)]

use ndarray::Array2;
use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum acceptable error between two values given fixed and relative
/// tolerances.
pub fn max_error<T: Float>(a: T, b: T, rtol: T, atol: T) -> T {
    rtol * a.abs().max(b.abs()) + atol
}

/// Whether two numbers are within absolute plus relative tolerance.
pub fn isclose<T: Float>(a: T, b: T, rtol: T, atol: T) -> bool {
    (a - b).abs() <= max_error(a, b, rtol, atol)
}

/// Whether all values are close.
pub fn allclose<T: Float>(a: &[T], b: &[T], rtol: T, atol: T) -> bool {
    a.iter().zip(b).all(|(a, b)| isclose(*a, *b, rtol, atol))
}

/// Frobenius norm of a sample buffer.
pub fn output_norm(a: &Array2<f64>) -> f64 {
    a.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// A stable seeded realization: A = 0.8·I, B and C uniform in [-1, 1).
pub fn random_realization(
    n: usize,
    m: usize,
    p: usize,
    seed: u64,
) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = Array2::<f64>::eye(n) * 0.8;
    let b = Array2::from_shape_fn((n, m), |_| rng.gen_range(-1.0..1.0));
    let c = Array2::from_shape_fn((p, n), |_| rng.gen_range(-1.0..1.0));
    (a, b, c)
}

/// Seeded multi-channel samples uniform in [-1, 1).
pub fn random_samples(channels: usize, samples: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((channels, samples), |_| rng.gen_range(-1.0..1.0))
}
