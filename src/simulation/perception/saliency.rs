//! Bottom-up saliency: where free space concentrates along each screen axis.
//!
//! Each axis gets a one-dimensional Gaussian kernel density estimate over the
//! coordinates of all free pixels, using Scott's rule for the bandwidth:
//!
//! ```text
//! h = σ̂ · n^(-1/5)
//! ```
//!
//! Pixel coordinates are integers, so the estimate is computed from a
//! histogram of coordinates rather than from every pixel.

use std::f64::consts::PI;

use rayon::prelude::*;

use super::convolution::OccupancyGrid;

/// Saliency over the horizontal and vertical pixel axes.
#[derive(Clone, Debug, PartialEq)]
pub struct SaliencyMap {
    /// Density at every x in `0..width`.
    pub horizontal: Vec<f64>,
    /// Density at every y in `0..height`.
    pub vertical: Vec<f64>,
}

impl SaliencyMap {
    /// Estimates the saliency of the free space in `grid`.
    #[must_use]
    pub fn from_free_space(grid: &OccupancyGrid) -> Self {
        let mut x_counts = vec![0usize; grid.width()];
        let mut y_counts = vec![0usize; grid.height()];
        for (row, col) in grid.free_pixels() {
            x_counts[col] += 1;
            y_counts[row] += 1;
        }
        Self {
            horizontal: kernel_density(&x_counts),
            vertical: kernel_density(&y_counts),
        }
    }
}

/// Gaussian KDE of integer samples given as a histogram, evaluated at every bin.
///
/// Fewer than two samples or zero spread leave nothing to estimate; the result
/// is then flat so it carries no preference.
fn kernel_density(counts: &[usize]) -> Vec<f64> {
    let len = counts.len();
    let n: usize = counts.iter().sum();
    let flat = || vec![1.0 / len as f64; len];
    if n < 2 {
        return flat();
    }

    let n_f = n as f64;
    let mean = counts
        .iter()
        .enumerate()
        .map(|(x, &c)| x as f64 * c as f64)
        .sum::<f64>()
        / n_f;
    let variance = counts
        .iter()
        .enumerate()
        .map(|(x, &c)| c as f64 * (x as f64 - mean).powi(2))
        .sum::<f64>()
        / (n_f - 1.0);
    if variance <= 0.0 || !variance.is_finite() {
        return flat();
    }

    let bandwidth = variance.sqrt() * n_f.powf(-0.2);
    let norm = 1.0 / (n_f * bandwidth * (2.0 * PI).sqrt());
    let occupied_bins: Vec<(f64, f64)> = counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c > 0)
        .map(|(x, &c)| (x as f64, c as f64))
        .collect();

    (0..len)
        .into_par_iter()
        .map(|x| {
            let x = x as f64;
            occupied_bins
                .iter()
                .map(|&(xi, c)| {
                    let z = (x - xi) / bandwidth;
                    c * (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm
        })
        .collect()
}
