//! Gamma distribution over positive reals.

use rand_pcg::Pcg64;

use crate::errors::DistError;
use crate::family::Distribution;
use crate::math::{draw_gamma, ln_gamma};
use crate::value::{AtomicType, Value};

/// Gamma(shape, rate) with density rate^shape x^(shape-1) e^(-rate x) / Gamma(shape).
#[derive(Debug, Clone)]
pub struct Gamma {
    shape: f64,
    rate: f64,
}

impl Gamma {
    pub fn new(shape: f64, rate: f64) -> Result<Self, DistError> {
        if !shape.is_finite() || shape <= 0.0 {
            return Err(DistError::InvalidParam(format!(
                "gamma shape must be finite and > 0, got {}",
                shape
            )));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DistError::InvalidParam(format!(
                "gamma rate must be finite and > 0, got {}",
                rate
            )));
        }
        Ok(Self { shape, rate })
    }
}

impl Distribution for Gamma {
    fn sample_type(&self) -> AtomicType {
        AtomicType::PosReal
    }

    fn sample(&self, rng: &mut Pcg64) -> Value {
        Value::PosReal(draw_gamma(rng, self.shape) / self.rate)
    }

    fn log_prob(&self, value: &Value) -> f64 {
        match value {
            Value::PosReal(x) if *x > 0.0 && x.is_finite() => {
                self.shape * self.rate.ln() - ln_gamma(self.shape)
                    + (self.shape - 1.0) * x.ln()
                    - self.rate * x
            }
            _ => f64::NEG_INFINITY,
        }
    }

    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::PosReal(x) if *x > 0.0 && x.is_finite())
    }
}
