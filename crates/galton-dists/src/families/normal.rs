//! Normal distribution over reals.

use rand_pcg::Pcg64;

use crate::errors::DistError;
use crate::family::Distribution;
use crate::math::draw_standard_normal;
use crate::value::{AtomicType, Value};

/// Normal(mean, sd), parameterized by standard deviation.
#[derive(Debug, Clone)]
pub struct Normal {
    mean: f64,
    sd: f64,
}

impl Normal {
    pub fn new(mean: f64, sd: f64) -> Result<Self, DistError> {
        if !mean.is_finite() {
            return Err(DistError::InvalidParam(format!(
                "normal mean must be finite, got {}",
                mean
            )));
        }
        if !sd.is_finite() || sd <= 0.0 {
            return Err(DistError::InvalidParam(format!(
                "normal standard deviation must be finite and > 0, got {}",
                sd
            )));
        }
        Ok(Self { mean, sd })
    }
}

impl Distribution for Normal {
    fn sample_type(&self) -> AtomicType {
        AtomicType::Real
    }

    fn sample(&self, rng: &mut Pcg64) -> Value {
        Value::Real(self.mean + self.sd * draw_standard_normal(rng))
    }

    fn log_prob(&self, value: &Value) -> f64 {
        match value {
            Value::Real(x) if x.is_finite() => {
                let z = (x - self.mean) / self.sd;
                -0.5 * z * z - self.sd.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln()
            }
            _ => f64::NEG_INFINITY,
        }
    }

    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::Real(x) if x.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn standard_normal_log_density_at_zero() {
        let d = Normal::new(0.0, 1.0).unwrap();
        let expected = -0.5 * (2.0 * std::f64::consts::PI).ln();
        let got = d.log_prob(&Value::Real(0.0));
        assert!((got - expected).abs() < 1e-12, "got {}", got);
    }

    #[test]
    fn log_density_is_symmetric_about_the_mean() {
        let d = Normal::new(2.0, 1.5).unwrap();
        for dx in [0.5, 1.0, 3.0] {
            let lo = d.log_prob(&Value::Real(2.0 - dx));
            let hi = d.log_prob(&Value::Real(2.0 + dx));
            assert!((lo - hi).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_bad_params() {
        assert!(Normal::new(f64::NAN, 1.0).is_err());
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
        assert!(Normal::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn sample_moments_track_params() {
        let d = Normal::new(-3.0, 2.0).unwrap();
        let mut rng = Pcg64::seed_from_u64(17);
        let n = 20_000;
        let samples: Vec<f64> = (0..n)
            .map(|_| match d.sample(&mut rng) {
                Value::Real(x) => x,
                other => panic!("expected real, got {:?}", other),
            })
            .collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        assert!((mean + 3.0).abs() < 0.05, "mean {}", mean);
        assert!((var - 4.0).abs() < 0.15, "var {}", var);
    }
}
