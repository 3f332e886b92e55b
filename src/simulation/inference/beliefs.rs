//! Discrete beliefs over the horizontal displacement of the environment.
//!
//! The agent never moves on screen, so what it has to infer is how far the
//! world shifts sideways per step. The belief is a probability mass function
//! over a fixed pixel axis `linspace(0, width, width)`.

use super::probability::{bayes_update, entropy, likelihood_gaussian, wasserstein_values};
use crate::simulation::error::{ConfigError, InferenceError};

/// Standard uniform density on [0, 1].
#[inline]
fn unit_uniform_pdf(x: f64) -> f64 {
    if (0.0..=1.0).contains(&x) {
        1.0
    } else {
        0.0
    }
}

/// `n` evenly spaced points from 0 to `end`, both inclusive.
fn linspace(end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = end / (n - 1) as f64;
            (0..n).map(|i| i as f64 * step).collect()
        }
    }
}

/// Outcome of folding one observed step size into the belief.
#[derive(Clone, Debug, PartialEq)]
pub struct BeliefUpdate {
    /// Distance between the pre- and post-update distributions.
    pub divergence: f64,
    /// Shannon entropy of the pre-update distribution.
    pub prior_entropy: f64,
    /// True if the posterior was degenerate and the likelihood was adopted instead.
    pub reset_to_evidence: bool,
}

/// Belief about the environment's horizontal step size.
#[derive(Clone, Debug)]
pub struct StepSizeBelief {
    support: Vec<f64>,
    distribution: Vec<f64>,
}

impl StepSizeBelief {
    /// Initial belief over an observation `width` pixels wide.
    ///
    /// The mass is the standard uniform density on the axis plus one,
    /// normalized: nearly flat, with the origin weighted double.
    ///
    /// # Errors
    ///
    /// `EmptyObservation` if `width` is zero.
    pub fn new(width: usize) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::EmptyObservation);
        }
        let support = linspace(width as f64, width);
        let raw: Vec<f64> = support.iter().map(|&x| unit_uniform_pdf(x) + 1.0).collect();
        let total: f64 = raw.iter().sum();
        let distribution = raw.into_iter().map(|v| v / total).collect();
        Ok(Self {
            support,
            distribution,
        })
    }

    /// Pixel axis the belief is defined over.
    #[must_use]
    pub fn support(&self) -> &[f64] {
        &self.support
    }

    /// Current probability mass per support point.
    #[must_use]
    pub fn distribution(&self) -> &[f64] {
        &self.distribution
    }

    /// Shannon entropy (nats) of the current belief.
    #[must_use]
    pub fn entropy(&self) -> f64 {
        entropy(&self.distribution)
    }

    /// Expected step size under the current belief.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.support
            .iter()
            .zip(&self.distribution)
            .map(|(x, p)| x * p)
            .sum()
    }

    /// Updates the belief with an observed step size seen at `acuity` precision.
    ///
    /// The posterior replaces the belief. If prior and evidence share no mass
    /// the normalized likelihood is adopted as the new belief.
    ///
    /// # Errors
    ///
    /// Returns the likelihood error, leaving the belief untouched, when the
    /// observation cannot be expressed on the support at all.
    pub fn observe(&mut self, step_size: f64, acuity: f64) -> Result<BeliefUpdate, InferenceError> {
        let likelihood = likelihood_gaussian(&self.support, step_size, acuity)?;
        let (posterior, reset_to_evidence) = match bayes_update(&self.distribution, &likelihood) {
            Ok(posterior) => (posterior, false),
            Err(err) => {
                tracing::warn!(%err, step_size, "step-size posterior degenerate, adopting evidence");
                (likelihood, true)
            }
        };

        let update = BeliefUpdate {
            divergence: wasserstein_values(&self.distribution, &posterior),
            prior_entropy: self.entropy(),
            reset_to_evidence,
        };
        self.distribution = posterior;
        Ok(update)
    }
}

/// Belief about whether a sideways drift is acting on the agent.
///
/// Shares the step-size support and starts from the same prior. It is carried
/// alongside the step-size belief but not updated yet.
#[derive(Clone, Debug)]
pub struct DriftBelief {
    pub prior: StepSizeBelief,
    /// Inferred presence of drift.
    pub drift_present: bool,
}

impl DriftBelief {
    #[must_use]
    pub fn from_prior(prior: &StepSizeBelief) -> Self {
        Self {
            prior: prior.clone(),
            drift_present: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::VISUAL_ACUITY;

    #[test]
    fn test_initial_belief_is_normalized() {
        let belief = StepSizeBelief::new(100).unwrap();
        let total: f64 = belief.distribution().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(belief.support().len(), 100);
        assert!((belief.support()[99] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_initial_belief_doubles_origin() {
        let belief = StepSizeBelief::new(10).unwrap();
        let d = belief.distribution();
        assert!((d[0] - 2.0 * d[1]).abs() < 1e-12);
        assert!((d[1] - d[9]).abs() < 1e-12);
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            StepSizeBelief::new(0),
            Err(ConfigError::EmptyObservation)
        ));
    }

    #[test]
    fn test_observe_moves_mean_toward_observation() {
        let mut belief = StepSizeBelief::new(100).unwrap();
        let before = belief.mean();
        let update = belief.observe(10.0, VISUAL_ACUITY).unwrap();
        assert!(update.divergence > 0.0);
        assert!(!update.reset_to_evidence);
        assert!((belief.mean() - 10.0).abs() < (before - 10.0).abs());
        assert!((belief.distribution().iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_observe_reports_prior_entropy() {
        let mut belief = StepSizeBelief::new(50).unwrap();
        let expected = belief.entropy();
        let update = belief.observe(5.0, VISUAL_ACUITY).unwrap();
        assert!((update.prior_entropy - expected).abs() < 1e-12);
        assert!(belief.entropy() < expected);
    }

    #[test]
    fn test_far_observation_leaves_belief_untouched() {
        let mut belief = StepSizeBelief::new(20).unwrap();
        let before = belief.distribution().to_vec();
        assert!(belief.observe(1.0e7, VISUAL_ACUITY).is_err());
        assert_eq!(belief.distribution(), before.as_slice());
    }

    #[test]
    fn test_drift_belief_starts_from_step_prior() {
        let belief = StepSizeBelief::new(30).unwrap();
        let drift = DriftBelief::from_prior(&belief);
        assert!(!drift.drift_present);
        assert_eq!(drift.prior.distribution(), belief.distribution());
    }
}
