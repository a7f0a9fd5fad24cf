//! Bernoulli distribution over booleans.

use rand::Rng;
use rand_pcg::Pcg64;

use crate::errors::DistError;
use crate::family::Distribution;
use crate::value::{AtomicType, Value};

/// Bernoulli(p): `true` with probability p.
///
/// The two log-masses are precomputed at construction.
#[derive(Debug, Clone)]
pub struct Bernoulli {
    p: f64,
    ln_p: f64,
    ln_q: f64,
}

impl Bernoulli {
    pub fn new(p: f64) -> Result<Self, DistError> {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(DistError::InvalidParam(format!(
                "bernoulli probability must lie in [0, 1], got {}",
                p
            )));
        }
        Ok(Self {
            p,
            ln_p: p.ln(),
            ln_q: (1.0 - p).ln(),
        })
    }
}

impl Distribution for Bernoulli {
    fn sample_type(&self) -> AtomicType {
        AtomicType::Boolean
    }

    fn sample(&self, rng: &mut Pcg64) -> Value {
        Value::Boolean(rng.random_bool(self.p))
    }

    fn log_prob(&self, value: &Value) -> f64 {
        match value {
            Value::Boolean(true) => self.ln_p,
            Value::Boolean(false) => self.ln_q,
            _ => f64::NEG_INFINITY,
        }
    }

    // Support is {false, true} for every p, including the endpoints.
    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::Boolean(_))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn log_masses_match_closed_form() {
        let d = Bernoulli::new(0.7).unwrap();
        assert!((d.log_prob(&Value::Boolean(true)) - 0.7_f64.ln()).abs() < 1e-12);
        assert!((d.log_prob(&Value::Boolean(false)) - 0.3_f64.ln()).abs() < 1e-12);
        assert_eq!(d.log_prob(&Value::Natural(1)), f64::NEG_INFINITY);
    }

    #[test]
    fn rejects_out_of_range_probability() {
        assert!(Bernoulli::new(-0.1).is_err());
        assert!(Bernoulli::new(1.1).is_err());
        assert!(Bernoulli::new(f64::NAN).is_err());
        assert!(Bernoulli::new(0.0).is_ok());
        assert!(Bernoulli::new(1.0).is_ok());
    }

    #[test]
    fn degenerate_probabilities_sample_deterministically() {
        let mut rng = Pcg64::seed_from_u64(1);
        let never = Bernoulli::new(0.0).unwrap();
        let always = Bernoulli::new(1.0).unwrap();
        for _ in 0..50 {
            assert_eq!(never.sample(&mut rng), Value::Boolean(false));
            assert_eq!(always.sample(&mut rng), Value::Boolean(true));
        }
    }

    #[test]
    fn sample_frequency_tracks_p() {
        let d = Bernoulli::new(0.3).unwrap();
        let mut rng = Pcg64::seed_from_u64(42);
        let n = 20_000;
        let hits = (0..n)
            .filter(|_| d.sample(&mut rng) == Value::Boolean(true))
            .count();
        let freq = hits as f64 / n as f64;
        assert!((freq - 0.3).abs() < 0.02, "frequency {}", freq);
    }
}
