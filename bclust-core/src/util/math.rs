//! Mathematical utility functions.

use std::f64::consts::PI;

use statrs::function::gamma::ln_gamma;

/// ln(2π).
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Centered sum of squares around `center`.
pub fn sum_sq_dev(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).powi(2)).sum()
}

/// Multivariate log-gamma: ln Γ_d(a) = d(d-1)/4 ln π + Σ_{j=1..d} ln Γ(a + (1-j)/2).
pub fn ln_multivariate_gamma(d: usize, a: f64) -> f64 {
    let df = d as f64;
    let base = df * (df - 1.0) / 4.0 * PI.ln();
    (1..=d).fold(base, |acc, j| acc + ln_gamma(a + (1.0 - j as f64) / 2.0))
}
