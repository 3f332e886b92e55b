//! Discrete probability helpers.
//!
//! Distributions are plain `f64` slices over a fixed support. Every function
//! that normalizes refuses to divide by a zero or non-finite mass instead of
//! producing NaN.

use std::f64::consts::PI;

use crate::simulation::error::InferenceError;

/// Normal density of `x` under N(`mu`, `sigma`²).
#[inline]
fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Rescales `values` in place so they sum to one.
fn normalize(values: &mut [f64]) -> Result<(), InferenceError> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(InferenceError::DegenerateNormalization { total });
    }
    for v in values.iter_mut() {
        *v /= total;
    }
    Ok(())
}

/// Gaussian likelihood over `space`, normalized to sum to one.
///
/// This is a discrete approximation of N(`mu`, `sigma`²) restricted to the
/// points of `space`.
///
/// # Errors
///
/// `DegenerateSigma` if `sigma` is not a positive finite number, and
/// `DegenerateNormalization` if every density underflows to zero (e.g. `mu`
/// lies far outside `space`).
pub fn likelihood_gaussian(space: &[f64], mu: f64, sigma: f64) -> Result<Vec<f64>, InferenceError> {
    if sigma <= 0.0 || !sigma.is_finite() {
        return Err(InferenceError::DegenerateSigma { sigma });
    }
    let mut likelihood: Vec<f64> = space.iter().map(|&x| normal_pdf(x, mu, sigma)).collect();
    normalize(&mut likelihood)?;
    Ok(likelihood)
}

/// Posterior ∝ prior × likelihood, normalized.
///
/// # Errors
///
/// `SupportMismatch` if the two sequences differ in length and
/// `DegenerateNormalization` if their product carries no mass.
pub fn bayes_update(prior: &[f64], likelihood: &[f64]) -> Result<Vec<f64>, InferenceError> {
    if prior.len() != likelihood.len() {
        return Err(InferenceError::SupportMismatch {
            prior: prior.len(),
            likelihood: likelihood.len(),
        });
    }
    let mut posterior: Vec<f64> = prior.iter().zip(likelihood).map(|(p, l)| p * l).collect();
    normalize(&mut posterior)?;
    Ok(posterior)
}

/// Saturates `value` to `[low, high]`.
#[inline]
#[must_use]
pub fn bound(low: f64, high: f64, value: f64) -> f64 {
    low.max(high.min(value))
}

/// Shannon entropy (nats) of `p` after normalization. Zero entries contribute nothing.
#[must_use]
pub fn entropy(p: &[f64]) -> f64 {
    let total: f64 = p.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    p.iter()
        .map(|&x| x / total)
        .filter(|&x| x > 0.0)
        .map(|x| -x * x.ln())
        .sum()
}

/// First-order Wasserstein distance between the values of `u` and `v`,
/// each treated as an equally weighted sample.
///
/// The entries are the samples; their positions on the support are ignored.
/// For two samples of equal size this reduces to the mean absolute difference
/// of the sorted values.
#[must_use]
pub fn wasserstein_values(u: &[f64], v: &[f64]) -> f64 {
    if u.is_empty() || v.is_empty() {
        return 0.0;
    }
    let mut u_sorted = u.to_vec();
    let mut v_sorted = v.to_vec();
    u_sorted.sort_by(f64::total_cmp);
    v_sorted.sort_by(f64::total_cmp);

    if u_sorted.len() == v_sorted.len() {
        let n = u_sorted.len() as f64;
        return u_sorted
            .iter()
            .zip(&v_sorted)
            .map(|(a, b)| (a - b).abs())
            .sum::<f64>()
            / n;
    }

    // Unequal sample sizes: integrate |F_u - F_v| over the merged breakpoints.
    let mut all: Vec<f64> = u_sorted.iter().chain(&v_sorted).copied().collect();
    all.sort_by(f64::total_cmp);
    let cdf = |sorted: &[f64], x: f64| sorted.partition_point(|&s| s <= x) as f64 / sorted.len() as f64;
    all.windows(2)
        .map(|w| (cdf(&u_sorted, w[0]) - cdf(&v_sorted, w[0])).abs() * (w[1] - w[0]))
        .sum()
}

/// Index of the first maximum of `values`, or `None` if empty.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
