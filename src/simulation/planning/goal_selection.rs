//! Two-stage action goal selection.
//!
//! 1. Top-down: commit to a decision row biased by `HL_SoC`, then take the
//!    reachable kernel in that row needing the least lateral travel.
//! 2. Bottom-up: fuse that pick with the saliency of free space per axis,
//!    `posterior ∝ saliency × N(top_down, kernel_size / 4)`, and take the
//!    posterior mode.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::config::Parameters;
use crate::simulation::inference::{argmax, bayes_update, bound, likelihood_gaussian};
use crate::simulation::params::{
    GOAL_PRECISION_FRACTION, ROW_BIAS_SIGMA, SELECTION_TIME_MAX, SELECTION_TIME_MIN,
};
use crate::simulation::perception::{
    convolve, generate_action_field, ActionField, KernelCell, OccupancyGrid, SaliencyMap,
};

/// Target location in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionGoal {
    pub x: f64,
    pub y: f64,
}

/// Everything produced by one goal selection.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalSelection {
    /// Integrated (top-down + bottom-up) goal in screen pixels.
    pub goal: ActionGoal,
    /// Kernel column of the top-down pick, kept for invalidation checks.
    pub column: usize,
    /// Kernel row the goal was finally taken from.
    pub row: usize,
    /// Top-down pick in observation pixels, before fusion.
    pub top_down: (f64, f64),
    /// Broadcast plus selection latency (ms).
    pub time: f64,
    /// `HL_SoC` after the selection boost.
    pub hl_soc: f64,
}

/// Draws the decision row. Higher confidence reaches for farther rows.
///
/// Weights are a discrete Gaussian over `0..ceil(decision_rows)` centred on
/// `trunc(hl_soc * decision_rows)`.
pub fn draw_decision_row<R: Rng>(hl_soc: f64, decision_rows: f64, rng: &mut R) -> usize {
    let n = (decision_rows.ceil() as usize).max(1);
    let loc = (hl_soc * decision_rows).trunc();
    let fallback = (loc.max(0.0) as usize).min(n - 1);

    let space: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let drawn = likelihood_gaussian(&space, loc, ROW_BIAS_SIGMA)
        .ok()
        .and_then(|weights| WeightedIndex::new(&weights).ok())
        .map(|dist| dist.sample(rng));

    tracing::debug!(loc, rows = n, ?drawn, "decision row drawn");
    drawn.unwrap_or(fallback)
}

/// Nearest row to `row` holding at least one candidate. Nearer rows win ties.
fn nearest_populated_row(field: &ActionField, row: usize) -> Option<usize> {
    field
        .candidates
        .iter()
        .map(|c| c.row)
        .min_by_key(|&r| (r.abs_diff(row), r))
}

/// Posterior mode along one axis; falls back to `top_down` if the fusion is degenerate.
fn fuse_axis(saliency: &[f64], top_down: f64, sigma: f64) -> f64 {
    let axis: Vec<f64> = (0..saliency.len()).map(|i| i as f64).collect();
    let fused = likelihood_gaussian(&axis, top_down, sigma)
        .and_then(|likelihood| bayes_update(saliency, &likelihood));
    match fused {
        Ok(posterior) => argmax(&posterior).map_or(top_down, |i| i as f64),
        Err(err) => {
            tracing::warn!(%err, top_down, "saliency fusion degenerate, keeping top-down goal");
            top_down
        }
    }
}

/// Selects a new action goal from the current observation.
///
/// `reference` is the screen position of the observation's origin and
/// `agent_x` the agent's fixed horizontal screen position. Returns `None`
/// only when no reachable kernel exists at all.
pub fn select_action_goal<R: Rng>(
    grid: &OccupancyGrid,
    params: &Parameters,
    hl_soc: f64,
    reference: (f64, f64),
    agent_x: f64,
    rng: &mut R,
) -> Option<GoalSelection> {
    let kernels = convolve(grid, params.granularity);
    let field = generate_action_field(&kernels, params.granularity.rejection_threshold(), rng);

    let drawn = draw_decision_row(hl_soc, kernels.decision_rows, rng);
    let Some(row) = nearest_populated_row(&field, drawn) else {
        tracing::warn!(
            rejected = field.rejected.len(),
            "action field empty, no goal selected"
        );
        return None;
    };
    if row != drawn {
        tracing::debug!(drawn, row, "decision row empty, widened search");
    }

    let local_agent_x = agent_x - reference.0;
    let (cell, top_down) = field
        .candidates_in_row(row)
        .map(|c: KernelCell| (c, kernels.pixel_center(c)))
        .min_by(|(_, a), (_, b)| {
            (a.0 - local_agent_x)
                .abs()
                .total_cmp(&(b.0 - local_agent_x).abs())
        })?;

    let saliency = SaliencyMap::from_free_space(grid);
    let x = fuse_axis(
        &saliency.horizontal,
        top_down.0,
        kernels.kernel_width as f64 * GOAL_PRECISION_FRACTION,
    );
    let y = fuse_axis(
        &saliency.vertical,
        top_down.1,
        kernels.kernel_height as f64 * GOAL_PRECISION_FRACTION,
    );

    let time = field.broadcast_time + rng.random_range(SELECTION_TIME_MIN..SELECTION_TIME_MAX);
    let hl_soc = bound(0.0, 1.0, hl_soc + params.soc_boost);

    let goal = ActionGoal {
        x: x + reference.0,
        y: y + reference.1,
    };
    tracing::debug!(?goal, ?top_down, column = cell.col, row, time, "action goal selected");

    Some(GoalSelection {
        goal,
        column: cell.col,
        row,
        top_down,
        time,
        hl_soc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::Granularity;
    use crate::simulation::params::{BROADCAST_TIME_MIN, SELECTION_TIME_MIN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(granularity: Granularity) -> Parameters {
        Parameters {
            granularity,
            ..Parameters::default()
        }
    }

    #[test]
    fn test_full_confidence_reaches_farthest_row() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut counts = [0usize; 6];
        for _ in 0..500 {
            counts[draw_decision_row(1.0, 6.0, &mut rng)] += 1;
        }
        let max = counts.iter().copied().max().unwrap();
        assert_eq!(counts[5], max, "counts = {counts:?}");
        assert!(counts[5] > 250);
        assert_eq!(counts[0] + counts[1], 0);
    }

    #[test]
    fn test_zero_confidence_stays_near() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut counts = [0usize; 6];
        for _ in 0..500 {
            counts[draw_decision_row(0.0, 6.0, &mut rng)] += 1;
        }
        assert!(counts[0] > counts[2]);
        assert_eq!(counts[5], 0);
    }

    #[test]
    fn test_nearest_populated_row_prefers_nearer_on_tie() {
        let field = ActionField {
            candidates: vec![KernelCell::new(1, 0), KernelCell::new(3, 2)],
            ..ActionField::default()
        };
        assert_eq!(nearest_populated_row(&field, 2), Some(1));
        assert_eq!(nearest_populated_row(&field, 3), Some(3));
        assert_eq!(nearest_populated_row(&ActionField::default(), 0), None);
    }

    #[test]
    fn test_fuse_axis_pulls_toward_saliency() {
        // Saliency increasing to the right shifts the mode right of the top-down pick.
        let saliency: Vec<f64> = (0..100).map(|i| f64::from(i) + 1.0).collect();
        let fused = fuse_axis(&saliency, 50.0, 5.0);
        assert!(fused >= 50.0);
        let flat = vec![1.0; 100];
        assert!((fuse_axis(&flat, 42.0, 5.0) - 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_fuse_axis_falls_back_on_degenerate_posterior() {
        let mut saliency = vec![0.0; 100];
        saliency[0] = 1.0;
        // Likelihood mass at 0 underflows for a goal at 99 with sigma 1.
        assert!((fuse_axis(&saliency, 99.0, 1.0) - 99.0).abs() < 1e-12);
    }

    #[test]
    fn test_selects_nearest_free_kernel_to_agent() {
        // 60x50 at granularity 30: 6x5 grid of 10px kernels.
        let mut grid = OccupancyGrid::new(60, 50).unwrap();
        // Block every column except 1 and 4 from row 0 down.
        for col in [0, 2, 3, 5] {
            grid.fill_rect(0, col * 10, 10, 10);
        }
        let mut rng = StdRng::seed_from_u64(3);
        let selection =
            select_action_goal(&grid, &params(Granularity::G30), 1.0, (100.0, 250.0), 150.0, &mut rng)
                .unwrap();
        // Agent sits at local x = 50; column 4 (centre 45) is nearer than column 1 (centre 15).
        assert_eq!(selection.column, 4);
        assert_eq!(selection.top_down.0, 45.0);
        assert!(selection.goal.x >= 100.0 && selection.goal.x < 160.0);
        assert!(selection.goal.y >= 250.0 && selection.goal.y < 300.0);
        assert!(selection.time >= BROADCAST_TIME_MIN + SELECTION_TIME_MIN);
    }

    #[test]
    fn test_selection_boosts_and_clamps_hl_soc() {
        let grid = OccupancyGrid::new(60, 50).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let p = Parameters {
            soc_boost: 0.3,
            ..params(Granularity::G30)
        };
        let selection = select_action_goal(&grid, &p, 0.9, (0.0, 0.0), 30.0, &mut rng).unwrap();
        assert_eq!(selection.hl_soc, 1.0);
        let selection = select_action_goal(&grid, &p, 0.2, (0.0, 0.0), 30.0, &mut rng).unwrap();
        assert!((selection.hl_soc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_goal_when_everything_blocked() {
        let mut grid = OccupancyGrid::new(60, 50).unwrap();
        grid.fill_rect(0, 0, 10, 60);
        let mut rng = StdRng::seed_from_u64(5);
        let p = params(Granularity::G30);
        assert!(select_action_goal(&grid, &p, 0.5, (0.0, 0.0), 30.0, &mut rng).is_none());
    }
}
