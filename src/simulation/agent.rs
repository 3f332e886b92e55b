use crate::simulation::config::Parameters;
use crate::simulation::environment::ObstacleField;
use crate::simulation::error::{ConfigError, GridError};
use crate::simulation::params::{AGENT_X, SCREEN_WIDTH};
use crate::simulation::planning::{ActionPlanner, DecisionStep, MotorCommand, Scroll, StepReport};
use rand::Rng;

/// The agent steering through the obstacle field.
///
/// It stays fixed at the horizontal screen centre; its key presses shift the
/// world sideways instead. Each tick it applies last tick's command, observes
/// the field and lets the planner decide.
#[derive(Debug, Clone)]
pub struct Pilot {
    pub planner: ActionPlanner,
    pub command: MotorCommand,
    pub tick_count: u64,
}

impl Pilot {
    /// Creates a pilot at the default screen position.
    ///
    /// # Errors
    ///
    /// Any configuration error raised by the planner.
    pub fn new(params: Parameters) -> Result<Self, ConfigError> {
        Ok(Self {
            planner: ActionPlanner::new(params, AGENT_X, SCREEN_WIDTH)?,
            command: MotorCommand::Idle,
            tick_count: 0,
        })
    }

    /// Advances the field by one tick and runs one decision step.
    ///
    /// # Errors
    ///
    /// `GridError` if the field's window cannot be rasterized.
    pub fn update_state<R: Rng>(
        &mut self,
        field: &mut ObstacleField,
        rng: &mut R,
    ) -> Result<StepReport, GridError> {
        // 1. Act
        let horizontal_movement = self.command.horizontal_movement() + field.drift;
        let displacement = field.update(horizontal_movement, rng);

        // 2. Sense
        let grid = field.observe()?;
        let input = DecisionStep {
            grid: &grid,
            true_step_size: displacement.abs(),
            reference: field.reference(),
            scroll: Scroll {
                speed: field.speed,
                scaling: field.scaling,
                horizontal_movement,
            },
        };

        // 3. Decide
        let report = self.planner.step(&input, rng);
        self.command = report.motor_command;
        self.tick_count += 1;
        Ok(report)
    }
}
