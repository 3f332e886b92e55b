//! Action planner: goal lifecycle, motor decisions and sense of control.
//!
//! The planner owns two confidence scalars:
//! - `LL_SoC`: sensorimotor confidence, driven by prediction errors on the
//!   environment's step size.
//! - `HL_SoC`: cognitive confidence, driven by scene complexity, new goals,
//!   and sustained sensorimotor failure.
//!
//! Both start at 1.0 and are clamped to [0, 1] after every change.

use rand::Rng;
use serde::Serialize;

use super::goal_selection::{select_action_goal, ActionGoal};
use crate::simulation::config::Parameters;
use crate::simulation::error::{ConfigError, InferenceError};
use crate::simulation::inference::{bound, DriftBelief, StepSizeBelief};
use crate::simulation::params::{
    ARRIVAL_LINE, GOAL_RADIUS, HL_SOC_EROSION_DIVISOR, INITIAL_SOC, LL_SOC_LOSS_GAIN,
    PE_THRESHOLD, TARGET_RADIUS, VISUAL_ACUITY,
};
use crate::simulation::perception::{convolve, ActionField, OccupancyGrid};

/// Key the sensorimotor layer presses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum MotorCommand {
    Left,
    Right,
    /// No key pressed.
    #[default]
    Idle,
}

impl MotorCommand {
    /// Sideways world movement caused by the command. The agent stays centred,
    /// so steering left shifts the world right.
    #[must_use]
    pub const fn horizontal_movement(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
            Self::Idle => 0.0,
        }
    }
}

/// Result of assessing the current goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GoalAssessment {
    /// No goal to assess.
    NoGoal,
    /// Goal still active.
    Pending,
    /// Goal entered the fovea and was cleared.
    Reached,
    /// An obstacle appeared in the goal's column; goal cleared for replanning.
    Invalidated,
}

/// Scroll state of the world during one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scroll {
    pub speed: f64,
    pub scaling: f64,
    /// Sideways component: -1, 0 or 1 for steering, plus any drift.
    pub horizontal_movement: f64,
}

/// Inputs of one decision step.
#[derive(Clone, Debug)]
pub struct DecisionStep<'a> {
    pub grid: &'a OccupancyGrid,
    /// Ground-truth sideways displacement of the environment this step.
    pub true_step_size: f64,
    /// Screen position of the observation's origin.
    pub reference: (f64, f64),
    pub scroll: Scroll,
}

/// Telemetry of one decision step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepReport {
    pub action_goal: Option<ActionGoal>,
    pub motor_command: MotorCommand,
    pub assessment: GoalAssessment,
    pub ll_soc: f64,
    pub hl_soc: f64,
    /// `None` if the observation could not be folded into the belief.
    pub prediction_error: Option<f64>,
    pub instance_complexity: f64,
    /// Latency (ms) spent on goal selection this step; 0 when no selection ran.
    pub selection_time: f64,
}

/// Owns every piece of mutable planner state.
#[derive(Clone, Debug)]
pub struct ActionPlanner {
    params: Parameters,
    /// Fixed horizontal screen position of the agent.
    agent_x: f64,
    ll_soc: f64,
    hl_soc: f64,
    instance_complexity: f64,
    step_size_belief: StepSizeBelief,
    drift_belief: DriftBelief,
    prediction_errors: Vec<f64>,
    action_goal: Option<ActionGoal>,
    action_goal_col: Option<usize>,
    action_goal_reached: bool,
    target_radius: f64,
    action: MotorCommand,
    selection_time: f64,
}

impl ActionPlanner {
    /// Creates a planner for an observation `observation_width` pixels wide.
    ///
    /// # Errors
    ///
    /// Any parameter validation error, or `EmptyObservation` for a zero width.
    pub fn new(params: Parameters, agent_x: f64, observation_width: usize) -> Result<Self, ConfigError> {
        params.validate()?;
        let step_size_belief = StepSizeBelief::new(observation_width)?;
        let drift_belief = DriftBelief::from_prior(&step_size_belief);
        tracing::info!(
            granularity = %params.granularity,
            ccl_threshold = params.ccl_threshold,
            soc_boost = params.soc_boost,
            agent_x,
            "action planner ready"
        );
        Ok(Self {
            params,
            agent_x,
            ll_soc: INITIAL_SOC,
            hl_soc: INITIAL_SOC,
            instance_complexity: 0.0,
            step_size_belief,
            drift_belief,
            prediction_errors: Vec::new(),
            action_goal: None,
            action_goal_col: None,
            action_goal_reached: false,
            target_radius: TARGET_RADIUS,
            action: MotorCommand::Idle,
            selection_time: 0.0,
        })
    }

    #[must_use]
    pub const fn params(&self) -> &Parameters {
        &self.params
    }

    #[must_use]
    pub const fn agent_x(&self) -> f64 {
        self.agent_x
    }

    #[must_use]
    pub const fn ll_soc(&self) -> f64 {
        self.ll_soc
    }

    #[must_use]
    pub const fn hl_soc(&self) -> f64 {
        self.hl_soc
    }

    #[must_use]
    pub const fn instance_complexity(&self) -> f64 {
        self.instance_complexity
    }

    #[must_use]
    pub const fn step_size_belief(&self) -> &StepSizeBelief {
        &self.step_size_belief
    }

    #[must_use]
    pub const fn drift_belief(&self) -> &DriftBelief {
        &self.drift_belief
    }

    /// Every divergence computed so far, oldest first.
    #[must_use]
    pub fn prediction_errors(&self) -> &[f64] {
        &self.prediction_errors
    }

    #[must_use]
    pub const fn action_goal(&self) -> Option<ActionGoal> {
        self.action_goal
    }

    #[must_use]
    pub const fn action_goal_col(&self) -> Option<usize> {
        self.action_goal_col
    }

    /// Whether the last cleared goal was cleared because it was reached.
    #[must_use]
    pub const fn action_goal_reached(&self) -> bool {
        self.action_goal_reached
    }

    #[must_use]
    pub const fn motor_command(&self) -> MotorCommand {
        self.action
    }

    /// Total latency (ms) of all goal selections so far.
    #[must_use]
    pub const fn selection_time(&self) -> f64 {
        self.selection_time
    }

    /// Overrides `HL_SoC`, clamped to [0, 1].
    pub fn set_hl_soc(&mut self, value: f64) {
        self.hl_soc = bound(0.0, 1.0, value);
    }

    /// Overrides `LL_SoC`, clamped to [0, 1].
    pub fn set_ll_soc(&mut self, value: f64) {
        self.ll_soc = bound(0.0, 1.0, value);
    }

    /// Installs a goal directly, e.g. one chosen by an external model.
    pub fn set_action_goal(&mut self, goal: ActionGoal, column: usize) {
        self.action_goal = Some(goal);
        self.action_goal_col = Some(column);
        self.action_goal_reached = false;
    }

    /// Selects a new goal from `grid` if none is active.
    ///
    /// Returns the selection latency (ms), or `None` if a goal was already
    /// active or the scene offers no reachable kernel.
    pub fn select_goal<R: Rng>(
        &mut self,
        grid: &OccupancyGrid,
        reference: (f64, f64),
        rng: &mut R,
    ) -> Option<f64> {
        if self.action_goal.is_some() {
            return None;
        }
        let selection =
            select_action_goal(grid, &self.params, self.hl_soc, reference, self.agent_x, rng)?;
        self.set_action_goal(selection.goal, selection.column);
        self.hl_soc = selection.hl_soc;
        self.selection_time += selection.time;
        Some(selection.time)
    }

    /// Moves the goal with the scrolling world, plus oculomotor jitter of one pixel.
    pub fn update_action_goal<R: Rng>(
        &mut self,
        speed: f64,
        scaling: f64,
        horizontal_movement: f64,
        rng: &mut R,
    ) {
        let Some(goal) = self.action_goal.as_mut() else {
            return;
        };
        let offset_x = f64::from(rng.random_range(-1i32..=1));
        let offset_y = f64::from(rng.random_range(-1i32..=1));
        goal.y -= scaling * speed + offset_y;
        goal.x += horizontal_movement * scaling * speed + offset_x;
    }

    /// Assesses scene complexity and the fate of the current goal.
    ///
    /// A change in complexity (share of rejected kernels) is subtracted from
    /// `HL_SoC`. The goal counts as reached once it lies within `radius` of the
    /// agent horizontally and has crossed the arrival line; otherwise it is
    /// dropped if an obstacle shows up in its column.
    pub fn assess_action_goal(&mut self, grid: &OccupancyGrid, radius: f64) -> GoalAssessment {
        let kernels = convolve(grid, self.params.granularity);
        let field = ActionField::classify(&kernels, self.params.granularity.rejection_threshold());

        let new_complexity = field.rejected.len() as f64 / f64::from(self.params.granularity.count());
        self.hl_soc = bound(0.0, 1.0, self.hl_soc - (new_complexity - self.instance_complexity));
        self.instance_complexity = new_complexity;

        let Some(goal) = self.action_goal else {
            return GoalAssessment::NoGoal;
        };

        let within_reach = (goal.x - self.agent_x).abs() <= radius;
        if within_reach && goal.y <= ARRIVAL_LINE + radius {
            tracing::info!(?goal, hl_soc = self.hl_soc, "action goal reached");
            self.action_goal = None;
            self.action_goal_col = None;
            self.action_goal_reached = true;
            return GoalAssessment::Reached;
        }

        if self.action_goal_col.is_some_and(|col| field.column_blocked(col)) {
            tracing::info!(?goal, column = ?self.action_goal_col, "action goal invalidated by obstacle");
            self.action_goal = None;
            self.action_goal_col = None;
            return GoalAssessment::Invalidated;
        }

        GoalAssessment::Pending
    }

    /// Chooses the key to press so the agent closes in on the goal.
    ///
    /// Inside the dead zone of `target_radius` around the goal, and whenever
    /// there is no goal, no key is pressed.
    pub fn apply_motor_control(&mut self) -> MotorCommand {
        self.action = match self.action_goal {
            Some(goal) if self.agent_x > goal.x + self.target_radius => MotorCommand::Left,
            Some(goal) if self.agent_x < goal.x - self.target_radius => MotorCommand::Right,
            _ => MotorCommand::Idle,
        };
        self.action
    }

    /// Folds the observed environment step size into the belief and updates
    /// the confidence scalars.
    ///
    /// A surprising divergence costs `LL_SoC`; an `LL_SoC` under the CCL
    /// threshold then erodes a fifth of `HL_SoC`. An unsurprising step rewards
    /// `LL_SoC` with the entropy of the prior.
    ///
    /// # Errors
    ///
    /// If the observation cannot be expressed on the belief's support; no
    /// state changes in that case.
    pub fn prediction_error(&mut self, true_step_size: f64) -> Result<f64, InferenceError> {
        let update = self.step_size_belief.observe(true_step_size, VISUAL_ACUITY)?;
        let divergence = update.divergence;

        if divergence > PE_THRESHOLD {
            let loss = divergence * LL_SOC_LOSS_GAIN;
            self.ll_soc = bound(0.0, 1.0, self.ll_soc - loss);
            if self.ll_soc < self.params.ccl_threshold {
                self.hl_soc = bound(0.0, 1.0, self.hl_soc - self.hl_soc / HL_SOC_EROSION_DIVISOR);
            }
            tracing::debug!(divergence, loss, ll_soc = self.ll_soc, hl_soc = self.hl_soc, "surprising step");
        } else {
            // Rewards on the pre-update prior: flatter priors earn more.
            self.ll_soc = bound(0.0, 1.0, self.ll_soc + update.prior_entropy);
        }

        self.prediction_errors.push(divergence);
        Ok(divergence)
    }

    /// Runs one full decision step.
    ///
    /// Order: move the goal with the world, select a goal if none is active,
    /// assess it, choose a motor command, then update the step-size belief.
    pub fn step<R: Rng>(&mut self, input: &DecisionStep<'_>, rng: &mut R) -> StepReport {
        let Scroll {
            speed,
            scaling,
            horizontal_movement,
        } = input.scroll;
        self.update_action_goal(speed, scaling, horizontal_movement, rng);

        let selection_time = self.select_goal(input.grid, input.reference, rng).unwrap_or(0.0);
        let assessment = self.assess_action_goal(input.grid, GOAL_RADIUS);
        let motor_command = self.apply_motor_control();

        let prediction_error = match self.prediction_error(input.true_step_size) {
            Ok(divergence) => Some(divergence),
            Err(err) => {
                tracing::warn!(%err, step_size = input.true_step_size, "step size not inferable, belief kept");
                None
            }
        };

        StepReport {
            action_goal: self.action_goal,
            motor_command,
            assessment,
            ll_soc: self.ll_soc,
            hl_soc: self.hl_soc,
            prediction_error,
            instance_complexity: self.instance_complexity,
            selection_time,
        }
    }
}
