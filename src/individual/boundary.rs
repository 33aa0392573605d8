//! Wraparound of parameter vectors into `[0, 1 + ε)`.
//!
//! Used as the post-process hook handed to `ask`, so every population that
//! reaches the evaluator (and later `tell`) lies inside the unit box.

use ndarray::Array2;

use crate::config::BOUNDARY_MODULUS;

#[inline]
fn wrap(x: f64) -> f64 {
    x.rem_euclid(BOUNDARY_MODULUS)
}

/// Wrap every coordinate of a population.
pub fn boundary(population: Array2<f64>) -> Array2<f64> {
    population.mapv_into(wrap)
}
