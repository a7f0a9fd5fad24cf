//! Beta distribution over probabilities.

use rand_pcg::Pcg64;

use crate::errors::DistError;
use crate::family::Distribution;
use crate::math::{draw_gamma, ln_beta};
use crate::value::{AtomicType, Value};

/// Beta(alpha, beta) on the open unit interval.
///
/// Sampling uses the gamma-ratio construction X / (X + Y) with
/// X ~ Gamma(alpha, 1), Y ~ Gamma(beta, 1).
#[derive(Debug, Clone)]
pub struct Beta {
    alpha: f64,
    beta: f64,
    ln_norm: f64,
}

impl Beta {
    pub fn new(alpha: f64, beta: f64) -> Result<Self, DistError> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(DistError::InvalidParam(format!(
                "beta alpha must be finite and > 0, got {}",
                alpha
            )));
        }
        if !beta.is_finite() || beta <= 0.0 {
            return Err(DistError::InvalidParam(format!(
                "beta beta must be finite and > 0, got {}",
                beta
            )));
        }
        Ok(Self {
            alpha,
            beta,
            ln_norm: ln_beta(alpha, beta),
        })
    }
}

impl Distribution for Beta {
    fn sample_type(&self) -> AtomicType {
        AtomicType::Probability
    }

    fn sample(&self, rng: &mut Pcg64) -> Value {
        let x = draw_gamma(rng, self.alpha);
        let y = draw_gamma(rng, self.beta);
        let p = if x + y == 0.0 { 0.5 } else { x / (x + y) };
        Value::Probability(p)
    }

    fn log_prob(&self, value: &Value) -> f64 {
        match value {
            Value::Probability(p) if *p > 0.0 && *p < 1.0 => {
                (self.alpha - 1.0) * p.ln() + (self.beta - 1.0) * (1.0 - p).ln() - self.ln_norm
            }
            _ => f64::NEG_INFINITY,
        }
    }

    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::Probability(p) if *p > 0.0 && *p < 1.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn log_density_matches_closed_form() {
        // Beta(2, 3) density at 0.5: 12 * 0.5 * 0.25 = 1.5
        let d = Beta::new(2.0, 3.0).unwrap();
        let lp = d.log_prob(&Value::Probability(0.5));
        assert!((lp - 1.5_f64.ln()).abs() < 1e-10, "got {}", lp);
        // Uniform case: density 1 everywhere on (0, 1)
        let uniform = Beta::new(1.0, 1.0).unwrap();
        assert!(uniform.log_prob(&Value::Probability(0.123)).abs() < 1e-10);
    }

    #[test]
    fn endpoints_fall_outside_support() {
        let d = Beta::new(2.0, 3.0).unwrap();
        assert_eq!(d.log_prob(&Value::Probability(0.0)), f64::NEG_INFINITY);
        assert_eq!(d.log_prob(&Value::Probability(1.0)), f64::NEG_INFINITY);
        assert!(!d.supports(&Value::Probability(0.0)));
        assert!(d.supports(&Value::Probability(0.999)));
        assert!(!d.supports(&Value::Real(0.5)));
    }

    #[test]
    fn rejects_non_positive_shape_params() {
        assert!(Beta::new(0.0, 1.0).is_err());
        assert!(Beta::new(1.0, -2.0).is_err());
        assert!(Beta::new(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn sample_mean_tracks_alpha_over_sum() {
        let d = Beta::new(4.0, 6.0).unwrap();
        let mut rng = Pcg64::seed_from_u64(9);
        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            match d.sample(&mut rng) {
                Value::Probability(p) => {
                    assert!((0.0..=1.0).contains(&p));
                    sum += p;
                }
                other => panic!("expected probability, got {:?}", other),
            }
        }
        let mean = sum / n as f64;
        assert!((mean - 0.4).abs() < 0.01, "mean {}", mean);
    }
}
