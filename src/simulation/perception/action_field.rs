//! Thresholding of kernels into reachable and rejected action possibilities.

use rand::Rng;

use super::convolution::{KernelCell, KernelGrid};
use crate::simulation::params::{BROADCAST_TIME_MAX, BROADCAST_TIME_MIN};

/// Kernels that are free and reachable, plus the ones that were rejected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionField {
    /// Free kernels not hidden behind an obstacle in their column, row-major.
    pub candidates: Vec<KernelCell>,
    /// Kernels whose mean activation exceeds the rejection threshold, row-major.
    pub rejected: Vec<KernelCell>,
    /// Latency (ms) of the conscious broadcast that made the field available.
    pub broadcast_time: f64,
}

impl ActionField {
    /// Splits kernels by `threshold` and removes occluded candidates.
    ///
    /// A candidate survives only if every rejected kernel in its column lies
    /// strictly further away (larger row index). Kernels exactly at the
    /// threshold are neither candidates nor rejected.
    #[must_use]
    pub fn classify(kernels: &KernelGrid, threshold: f64) -> Self {
        let mut rejected = Vec::new();
        let mut free = Vec::new();
        for (cell, activation) in kernels.cells() {
            if activation > threshold {
                rejected.push(cell);
            } else if activation < threshold {
                free.push(cell);
            }
        }

        // Nearest obstacle row per column.
        let mut nearest_obstacle = vec![usize::MAX; kernels.cols()];
        for cell in &rejected {
            nearest_obstacle[cell.col] = nearest_obstacle[cell.col].min(cell.row);
        }
        let candidates = free
            .into_iter()
            .filter(|cell| cell.row <= nearest_obstacle[cell.col])
            .collect();

        Self {
            candidates,
            rejected,
            broadcast_time: 0.0,
        }
    }

    /// Candidates lying in kernel row `row`, ordered by column.
    pub fn candidates_in_row(&self, row: usize) -> impl Iterator<Item = KernelCell> + '_ {
        self.candidates.iter().copied().filter(move |c| c.row == row)
    }

    /// True if any rejected kernel lies in column `col`.
    #[must_use]
    pub fn column_blocked(&self, col: usize) -> bool {
        self.rejected.iter().any(|c| c.col == col)
    }
}

/// Builds the action field and samples the broadcast latency.
pub fn generate_action_field<R: Rng>(
    kernels: &KernelGrid,
    threshold: f64,
    rng: &mut R,
) -> ActionField {
    let mut field = ActionField::classify(kernels, threshold);
    field.broadcast_time = rng.random_range(BROADCAST_TIME_MIN..BROADCAST_TIME_MAX);
    field
}
