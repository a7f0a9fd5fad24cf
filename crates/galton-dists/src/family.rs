//! Distribution families and the sampling contract.
//!
//! [`DistributionType`] is the closed tag set the engine dispatches on.
//! Binding a tag to concrete parameter values through [`make_distribution`]
//! yields a boxed [`Distribution`], the object the evaluator samples and the
//! observation checks score against.

use std::fmt;

use rand_pcg::Pcg64;

use crate::errors::DistError;
use crate::families::{Bernoulli, Beta, Binomial, Gamma, Normal};
use crate::value::{AtomicType, Value};

/// Tags for the distribution families shipped with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistributionType {
    Bernoulli,
    Beta,
    Binomial,
    Gamma,
    Normal,
}

impl DistributionType {
    /// Positional parameter types required to sample `sample_type` from this
    /// family.
    ///
    /// Each family produces exactly one sample type; asking for any other
    /// yields [`DistError::UnsupportedSampleType`].
    pub fn signature(self, sample_type: AtomicType) -> Result<&'static [AtomicType], DistError> {
        match (self, sample_type) {
            (Self::Bernoulli, AtomicType::Boolean) => Ok(&[AtomicType::Probability]),
            (Self::Beta, AtomicType::Probability) => {
                Ok(&[AtomicType::PosReal, AtomicType::PosReal])
            }
            (Self::Binomial, AtomicType::Natural) => {
                Ok(&[AtomicType::Natural, AtomicType::Probability])
            }
            (Self::Gamma, AtomicType::PosReal) => Ok(&[AtomicType::PosReal, AtomicType::PosReal]),
            (Self::Normal, AtomicType::Real) => Ok(&[AtomicType::Real, AtomicType::PosReal]),
            (family, ty) => Err(DistError::UnsupportedSampleType(format!(
                "{} does not sample {}",
                family, ty
            ))),
        }
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bernoulli => "bernoulli",
            Self::Beta => "beta",
            Self::Binomial => "binomial",
            Self::Gamma => "gamma",
            Self::Normal => "normal",
        };
        write!(f, "{}", name)
    }
}

/// A family bound to concrete parameters, ready to sample and score.
pub trait Distribution: fmt::Debug {
    /// The atomic type of values this distribution produces.
    fn sample_type(&self) -> AtomicType;

    /// Draws one value, consuming randomness from `rng` only.
    fn sample(&self, rng: &mut Pcg64) -> Value;

    /// Log-density (or log-mass) at `value`; `NEG_INFINITY` outside the
    /// support or for a payload of the wrong type.
    fn log_prob(&self, value: &Value) -> f64;

    /// Whether `value` lies in the support of the distribution.
    fn supports(&self, value: &Value) -> bool;
}

/// Binds a family tag to parameter values.
///
/// Validates arity, positional parameter types, and parameter domains, so a
/// `Box<dyn Distribution>` is always well formed once returned.
pub fn make_distribution(
    family: DistributionType,
    sample_type: AtomicType,
    params: &[Value],
) -> Result<Box<dyn Distribution>, DistError> {
    let signature = family.signature(sample_type)?;
    if params.len() != signature.len() {
        return Err(DistError::Arity(format!(
            "{} takes {} parameter(s), got {}",
            family,
            signature.len(),
            params.len()
        )));
    }
    let dist: Box<dyn Distribution> = match (family, params) {
        (DistributionType::Bernoulli, [Value::Probability(p)]) => Box::new(Bernoulli::new(*p)?),
        (DistributionType::Beta, [Value::PosReal(alpha), Value::PosReal(beta)]) => {
            Box::new(Beta::new(*alpha, *beta)?)
        }
        (DistributionType::Binomial, [Value::Natural(n), Value::Probability(p)]) => {
            Box::new(Binomial::new(*n, *p)?)
        }
        (DistributionType::Gamma, [Value::PosReal(shape), Value::PosReal(rate)]) => {
            Box::new(Gamma::new(*shape, *rate)?)
        }
        (DistributionType::Normal, [Value::Real(mean), Value::PosReal(sd)]) => {
            Box::new(Normal::new(*mean, *sd)?)
        }
        _ => return Err(param_type_mismatch(family, signature, params)),
    };
    Ok(dist)
}

fn param_type_mismatch(
    family: DistributionType,
    signature: &'static [AtomicType],
    params: &[Value],
) -> DistError {
    for (position, (value, expected)) in params.iter().zip(signature).enumerate() {
        if value.atomic_type() != *expected {
            return DistError::Type(format!(
                "{} parameter {} must be {}, got {}",
                family,
                position,
                expected,
                value.atomic_type()
            ));
        }
    }
    DistError::Type(format!("{} parameters do not match its signature", family))
}
