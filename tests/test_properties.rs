use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sense_of_control::simulation::inference::{bound, StepSizeBelief};
use sense_of_control::simulation::params::{GOAL_RADIUS, VISUAL_ACUITY};
use sense_of_control::simulation::perception::{convolve, ActionField, OccupancyGrid};
use sense_of_control::simulation::{ActionPlanner, Granularity, Parameters};

fn granularity() -> impl Strategy<Value = Granularity> {
    prop::sample::select(Granularity::ALL.to_vec())
}

/// Up to eight rectangles `(row, col, height, width)` on a 120x80 screen.
fn obstacles() -> impl Strategy<Value = Vec<(usize, usize, usize, usize)>> {
    prop::collection::vec((0usize..80, 0usize..120, 1usize..30, 1usize..30), 0..8)
}

fn grid_with(rects: &[(usize, usize, usize, usize)]) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new(120, 80).unwrap();
    for &(row, col, height, width) in rects {
        grid.fill_rect(row, col, height, width);
    }
    grid
}

proptest! {
    #[test]
    fn test_bound_saturates(low in -10.0f64..0.0, span in 0.0f64..10.0, value in -100.0f64..100.0) {
        let high = low + span;
        let clamped = bound(low, high, value);
        prop_assert!(clamped >= low && clamped <= high);
        if value >= low && value <= high {
            prop_assert_eq!(clamped, value);
        }
    }

    #[test]
    fn test_no_candidate_behind_an_obstacle(rects in obstacles(), g in granularity()) {
        let grid = grid_with(&rects);
        let kernels = convolve(&grid, g);
        let field = ActionField::classify(&kernels, g.rejection_threshold());
        for candidate in &field.candidates {
            prop_assert!(kernels.activation(*candidate) < g.rejection_threshold());
            prop_assert!(!field
                .rejected
                .iter()
                .any(|r| r.col == candidate.col && r.row < candidate.row));
        }
        for rejected in &field.rejected {
            prop_assert!(kernels.activation(*rejected) > g.rejection_threshold());
        }
    }

    #[test]
    fn test_convolution_activations_are_shares(rects in obstacles(), g in granularity()) {
        let grid = grid_with(&rects);
        let kernels = convolve(&grid, g);
        prop_assert_eq!(&kernels, &convolve(&grid, g));
        for (_, activation) in kernels.cells() {
            prop_assert!((0.0..=1.0).contains(&activation));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_belief_stays_normalized(steps in prop::collection::vec(0.0f64..20.0, 1..40)) {
        let mut belief = StepSizeBelief::new(100).unwrap();
        for step in steps {
            let update = belief.observe(step, VISUAL_ACUITY).unwrap();
            prop_assert!(update.divergence.is_finite() && update.divergence >= 0.0);
            prop_assert!(update.prior_entropy >= 0.0);
            let total: f64 = belief.distribution().iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
            prop_assert!(belief.distribution().iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn test_soc_stays_in_unit_interval(
        seed in any::<u64>(),
        ccl in 0.0f64..=1.0,
        boost in -2.0f64..2.0,
        steps in prop::collection::vec(0.0f64..40.0, 1..30),
        rects in obstacles(),
        g in granularity(),
    ) {
        let params = Parameters {
            granularity: g,
            ccl_threshold: ccl,
            soc_boost: boost,
            ..Parameters::default()
        };
        let mut planner = ActionPlanner::new(params, 60.0, 120).unwrap();
        let grid = grid_with(&rects);
        let mut rng = StdRng::seed_from_u64(seed);
        for step in steps {
            planner.select_goal(&grid, (0.0, 250.0), &mut rng);
            planner.update_action_goal(2.0, 1.0, 0.0, &mut rng);
            planner.assess_action_goal(&grid, GOAL_RADIUS);
            planner.apply_motor_control();
            let _ = planner.prediction_error(step);
            prop_assert!((0.0..=1.0).contains(&planner.ll_soc()));
            prop_assert!((0.0..=1.0).contains(&planner.hl_soc()));
        }
    }
}
