//! Probabilistic inference for the planner.
//!
//! # Bayesian update
//!
//! ```text
//! p(s | o) ∝ p(o | s) · p(s)
//! ```
//!
//! The step-size belief is a discrete distribution; each observation is turned
//! into a Gaussian likelihood whose width is the agent's visual acuity.

mod beliefs;
pub mod probability;

pub use beliefs::{BeliefUpdate, DriftBelief, StepSizeBelief};
pub use probability::{
    argmax, bayes_update, bound, entropy, likelihood_gaussian, wasserstein_values,
};
