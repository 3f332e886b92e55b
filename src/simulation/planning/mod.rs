//! Planning systems for the sense-of-control agent.
//!
//! This module provides:
//! - Two-stage (top-down, bottom-up) action goal selection
//! - The action planner owning goal lifecycle, motor control and confidence

mod goal_selection;
mod planner;

pub use goal_selection::{draw_decision_row, select_action_goal, ActionGoal, GoalSelection};
pub use planner::{
    ActionPlanner, DecisionStep, GoalAssessment, MotorCommand, Scroll, StepReport,
};
