//! Binomial distribution over naturals.

use rand::Rng;
use rand_pcg::Pcg64;

use crate::errors::DistError;
use crate::family::Distribution;
use crate::math::ln_choose;
use crate::value::{AtomicType, Value};

/// Binomial(n, p): successes out of n independent trials.
///
/// Sampling consumes exactly n draws from the stream regardless of outcome,
/// keeping downstream draw positions independent of the sampled value.
#[derive(Debug, Clone)]
pub struct Binomial {
    n: u64,
    p: f64,
}

impl Binomial {
    pub fn new(n: u64, p: f64) -> Result<Self, DistError> {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(DistError::InvalidParam(format!(
                "binomial probability must lie in [0, 1], got {}",
                p
            )));
        }
        Ok(Self { n, p })
    }
}

impl Distribution for Binomial {
    fn sample_type(&self) -> AtomicType {
        AtomicType::Natural
    }

    fn sample(&self, rng: &mut Pcg64) -> Value {
        let mut successes = 0u64;
        for _ in 0..self.n {
            if rng.random_bool(self.p) {
                successes += 1;
            }
        }
        Value::Natural(successes)
    }

    fn log_prob(&self, value: &Value) -> f64 {
        let k = match value {
            Value::Natural(k) if *k <= self.n => *k,
            _ => return f64::NEG_INFINITY,
        };
        if self.p == 0.0 {
            return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
        }
        if self.p == 1.0 {
            return if k == self.n { 0.0 } else { f64::NEG_INFINITY };
        }
        ln_choose(self.n, k)
            + k as f64 * self.p.ln()
            + (self.n - k) as f64 * (1.0 - self.p).ln()
    }

    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::Natural(k) if *k <= self.n)
    }
}
