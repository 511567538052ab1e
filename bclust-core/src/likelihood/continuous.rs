//! Continuous-only evidence: Normal-Inverse-Gamma for one trait,
//! Normal-Inverse-Wishart for several.
//!
//! Prior for d traits: mean mu0 * 1_d with kappa0 pseudo-observations,
//! scale Psi0 = nu0 * sigma0^2 * I_d with nu0 degrees of freedom. With
//! d = 1 the Wishart form reduces exactly to the univariate one.

use std::f64::consts::PI;

use statrs::function::gamma::ln_gamma;
use tracing::trace;

use bclust_linalg::{log_det_spd, DenseMatrix};

use super::MultivariateMode;
use crate::dataset::Hyperparameters;
use crate::error::{ClusterError, Result};
use crate::util::math::{ln_multivariate_gamma, mean, sum_sq_dev, LN_2PI};

/// Log marginal likelihood of the selected trait rows (all of equal length).
pub fn log_like_cont(
    rows: &[&[f64]],
    hyper: &Hyperparameters,
    mode: MultivariateMode,
) -> Result<f64> {
    match rows.len() {
        0 => Ok(0.0),
        1 => log_like_univariate(rows[0], hyper),
        _ => match mode {
            MultivariateMode::Full => log_like_multivariate(rows, hyper),
            MultivariateMode::Ignore => Ok(0.0),
        },
    }
}

/// Normal-Inverse-Gamma evidence for n draws of a Gaussian with unknown mean and variance.
pub fn log_like_univariate(x: &[f64], hyper: &Hyperparameters) -> Result<f64> {
    let n = x.len() as f64;
    if x.is_empty() {
        return Ok(0.0);
    }
    let Hyperparameters {
        kappa0,
        nu0,
        mu0,
        sigma0,
        ..
    } = *hyper;

    let xbar = mean(x);
    let ss = sum_sq_dev(x, xbar);
    let kappa_n = kappa0 + n;
    let nu_n = nu0 + n;
    let nu_var = nu0 * sigma0 * sigma0 + ss + kappa0 * n / kappa_n * (xbar - mu0).powi(2);

    if !(nu_var > 0.0) || !nu_var.is_finite() {
        return Err(ClusterError::Numerical(format!(
            "posterior variance sum is {} for {} observations",
            nu_var, n
        )));
    }

    Ok(-n / 2.0 * LN_2PI + 0.5 * (kappa0 / kappa_n).ln() + ln_gamma(nu_n / 2.0)
        - ln_gamma(nu0 / 2.0)
        + nu0 / 2.0 * (nu0 * sigma0 * sigma0 / 2.0).ln()
        - nu_n / 2.0 * (nu_var / 2.0).ln())
}

/// Normal-Inverse-Wishart evidence for n draws of a d-dimensional Gaussian.
pub fn log_like_multivariate(rows: &[&[f64]], hyper: &Hyperparameters) -> Result<f64> {
    let d = rows.len();
    let n_obs = rows[0].len();
    if n_obs == 0 {
        return Ok(0.0);
    }
    let n = n_obs as f64;
    let df = d as f64;
    let Hyperparameters {
        kappa0,
        nu0,
        mu0,
        sigma0,
        ..
    } = *hyper;

    let means: Vec<f64> = rows.iter().map(|r| mean(r)).collect();
    let psi0 = DenseMatrix::scaled_identity(d, nu0 * sigma0 * sigma0);

    // Scatter matrix S = Σ_t (x_t - x̄)(x_t - x̄)'.
    let mut scatter = DenseMatrix::zeros(d, d);
    let mut centered = vec![0.0; d];
    for t in 0..n_obs {
        for (k, row) in rows.iter().enumerate() {
            centered[k] = row[t] - means[k];
        }
        scatter.add_outer(&centered, 1.0);
    }

    let kappa_n = kappa0 + n;
    let nu_n = nu0 + n;
    let shift: Vec<f64> = means.iter().map(|m| m - mu0).collect();
    let mut psi_n = psi0.add(&scatter);
    psi_n.add_outer(&shift, kappa0 * n / kappa_n);

    let log_det0 = log_det_spd(&psi0)
        .map_err(|e| ClusterError::Numerical(format!("prior scale matrix: {}", e)))?;
    let log_det_n = log_det_spd(&psi_n)
        .map_err(|e| ClusterError::Numerical(format!("posterior scale matrix: {}", e)))?;

    let value = -n * df / 2.0 * PI.ln() + df / 2.0 * (kappa0 / kappa_n).ln()
        + ln_multivariate_gamma(d, nu_n / 2.0)
        - ln_multivariate_gamma(d, nu0 / 2.0)
        + nu0 / 2.0 * log_det0
        - nu_n / 2.0 * log_det_n;
    trace!("NIW evidence: d = {}, n = {}, value = {:.6}", d, n_obs, value);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::genotype_odds;

    fn hyper(n_traits: usize, mu0: f64) -> Hyperparameters {
        Hyperparameters {
            kappa0: 1.0,
            nu0: n_traits as f64 + 1.0,
            mu0,
            sigma0: 1.0,
            maf: 0.3,
            genotype_odds: genotype_odds(0.3),
        }
    }

    #[test]
    fn test_no_rows_is_neutral() {
        let h = hyper(1, 2.0);
        assert_eq!(log_like_cont(&[], &h, MultivariateMode::Full).unwrap(), 0.0);
    }

    #[test]
    fn test_single_observation_closed_form() {
        // n = 1, x = mu0: ss = 0 and the mean-shift term vanishes, so
        // nu_var = nu0 * sigma0^2 = 2 with nu0 = 2.
        let h = hyper(1, 2.0);
        let got = log_like_univariate(&[2.0], &h).unwrap();
        let expected = -0.5 * LN_2PI + 0.5 * (0.5f64).ln() + ln_gamma(1.5) - ln_gamma(1.0)
            + 1.0 * (1.0f64).ln()
            - 1.5 * (1.0f64).ln();
        assert!((got - expected).abs() < 1e-12, "got {}, expected {}", got, expected);
    }

    #[test]
    fn test_constant_row_has_zero_scatter() {
        // Identical values: only the prior and mean-shift terms remain.
        let h = hyper(1, 5.0);
        let x = vec![3.0; 8];
        let n = 8.0;
        let nu_var = 2.0 + 1.0 * n / (1.0 + n) * 4.0;
        let expected = -n / 2.0 * LN_2PI + 0.5 * (1.0 / (1.0 + n)).ln()
            + ln_gamma((2.0 + n) / 2.0)
            - ln_gamma(1.0)
            + 1.0 * (1.0f64).ln()
            - (2.0 + n) / 2.0 * (nu_var / 2.0).ln();
        let got = log_like_univariate(&x, &h).unwrap();
        assert!((got - expected).abs() < 1e-10);
    }

    #[test]
    fn test_data_near_prior_mean_scores_higher() {
        let h = hyper(1, 0.0);
        let near = vec![0.1, -0.2, 0.05, 0.3, -0.1];
        let far = vec![10.1, 9.8, 10.05, 10.3, 9.9];
        let a = log_like_univariate(&near, &h).unwrap();
        let b = log_like_univariate(&far, &h).unwrap();
        assert!(a > b);
    }

    #[test]
    fn test_multivariate_reduces_to_univariate_at_d1() {
        let h = hyper(1, 2.5);
        let x = vec![0.3, 1.9, 2.2, -0.7, 4.1, 3.3];
        let uni = log_like_univariate(&x, &h).unwrap();
        let multi = log_like_multivariate(&[&x], &h).unwrap();
        assert!((uni - multi).abs() < 1e-10, "uni {} vs multi {}", uni, multi);
    }

    #[test]
    fn test_multivariate_two_traits_is_finite() {
        let h = hyper(2, 1.0);
        let a = vec![0.1, 0.5, -0.3, 1.2, 0.8];
        let b = vec![2.0, 1.1, 0.4, -0.6, 0.9];
        let v = log_like_cont(&[&a, &b], &h, MultivariateMode::Full).unwrap();
        assert!(v.is_finite());
        assert!(v < 0.0);
    }

    #[test]
    fn test_multivariate_ignore_mode_contributes_zero() {
        let h = hyper(2, 1.0);
        let a = vec![0.1, 0.5, -0.3];
        let b = vec![2.0, 1.1, 0.4];
        assert_eq!(
            log_like_cont(&[&a, &b], &h, MultivariateMode::Ignore).unwrap(),
            0.0
        );
        // A single trait is scored identically in both modes.
        assert_eq!(
            log_like_cont(&[&a], &h, MultivariateMode::Ignore).unwrap(),
            log_like_cont(&[&a], &h, MultivariateMode::Full).unwrap()
        );
    }

    #[test]
    fn test_multivariate_row_order_invariant() {
        let h = hyper(3, 1.0);
        let a = vec![0.1, 0.5, -0.3, 1.2];
        let b = vec![2.0, 1.1, 0.4, -0.6];
        let c = vec![0.0, 0.2, 0.9, 1.4];
        let abc = log_like_multivariate(&[&a, &b, &c], &h).unwrap();
        let cab = log_like_multivariate(&[&c, &a, &b], &h).unwrap();
        assert!((abc - cab).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_prior_scale_is_fatal() {
        let mut h = hyper(1, 0.0);
        h.sigma0 = 0.0;
        let x = vec![0.0; 4];
        assert!(matches!(
            log_like_univariate(&x, &h),
            Err(ClusterError::Numerical(_))
        ));
        assert!(matches!(
            log_like_multivariate(&[&x, &x], &h),
            Err(ClusterError::Numerical(_))
        ));
    }
}
