//! # Typed values
//!
//! The engine's value universe is a closed set of atomic types: scalar
//! booleans, naturals, reals, positive reals, and probabilities, plus a
//! vector variant of each. Every graph node carries exactly one atomic type
//! and there are no implicit conversions between them; widening a natural to
//! a real, for example, is an explicit operator in the engine core.
//!
//! [`Value`] pairs each atomic type with its runtime payload. Equality on
//! values is exact payload equality, which is what exact-match conditioning
//! on discrete evidence compares with.

use std::fmt;

use crate::errors::DistError;

/// The closed set of value types a graph node can carry.
///
/// Scalar variants come first, then their element-wise vector counterparts.
/// `Probability` is a real confined to [0, 1] and `PosReal` a real confined
/// to (0, inf); both are distinct types, not refinements checked at use
/// sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtomicType {
    Boolean,
    Natural,
    Real,
    PosReal,
    Probability,
    BooleanVector,
    NaturalVector,
    RealVector,
    PosRealVector,
    ProbabilityVector,
}

impl AtomicType {
    /// True for countable-domain types, where exact-match conditioning is
    /// well defined.
    pub fn is_discrete(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Natural | Self::BooleanVector | Self::NaturalVector
        )
    }

    /// True for the vector variants.
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            Self::BooleanVector
                | Self::NaturalVector
                | Self::RealVector
                | Self::PosRealVector
                | Self::ProbabilityVector
        )
    }

    /// True for the scalar variants.
    pub fn is_scalar(self) -> bool {
        !self.is_vector()
    }

    /// The vector type with this scalar as element, or `None` if this is
    /// already a vector type.
    pub fn vector_of(self) -> Option<AtomicType> {
        match self {
            Self::Boolean => Some(Self::BooleanVector),
            Self::Natural => Some(Self::NaturalVector),
            Self::Real => Some(Self::RealVector),
            Self::PosReal => Some(Self::PosRealVector),
            Self::Probability => Some(Self::ProbabilityVector),
            _ => None,
        }
    }

    /// The element type of a vector type, or `None` for scalars.
    pub fn element_type(self) -> Option<AtomicType> {
        match self {
            Self::BooleanVector => Some(Self::Boolean),
            Self::NaturalVector => Some(Self::Natural),
            Self::RealVector => Some(Self::Real),
            Self::PosRealVector => Some(Self::PosReal),
            Self::ProbabilityVector => Some(Self::Probability),
            _ => None,
        }
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Natural => "natural",
            Self::Real => "real",
            Self::PosReal => "pos_real",
            Self::Probability => "probability",
            Self::BooleanVector => "boolean_vector",
            Self::NaturalVector => "natural_vector",
            Self::RealVector => "real_vector",
            Self::PosRealVector => "pos_real_vector",
            Self::ProbabilityVector => "probability_vector",
        };
        write!(f, "{}", name)
    }
}

/// A runtime value, one payload variant per [`AtomicType`].
///
/// `PartialEq` is exact payload equality (no tolerance), the comparison used
/// for discrete evidence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Boolean(bool),
    Natural(u64),
    Real(f64),
    PosReal(f64),
    Probability(f64),
    BooleanVector(Vec<bool>),
    NaturalVector(Vec<u64>),
    RealVector(Vec<f64>),
    PosRealVector(Vec<f64>),
    ProbabilityVector(Vec<f64>),
}

impl Value {
    /// The atomic type of this value.
    pub fn atomic_type(&self) -> AtomicType {
        match self {
            Self::Boolean(_) => AtomicType::Boolean,
            Self::Natural(_) => AtomicType::Natural,
            Self::Real(_) => AtomicType::Real,
            Self::PosReal(_) => AtomicType::PosReal,
            Self::Probability(_) => AtomicType::Probability,
            Self::BooleanVector(_) => AtomicType::BooleanVector,
            Self::NaturalVector(_) => AtomicType::NaturalVector,
            Self::RealVector(_) => AtomicType::RealVector,
            Self::PosRealVector(_) => AtomicType::PosRealVector,
            Self::ProbabilityVector(_) => AtomicType::ProbabilityVector,
        }
    }

    /// Checks the payload against its type's domain.
    ///
    /// Reals must be finite, positive reals finite and strictly positive,
    /// probabilities finite and within [0, 1]. Vector payloads are checked
    /// element-wise.
    pub fn validate_domain(&self) -> Result<(), DistError> {
        match self {
            Self::Boolean(_) | Self::Natural(_) | Self::BooleanVector(_) | Self::NaturalVector(_) => {
                Ok(())
            }
            Self::Real(x) => check_real(*x),
            Self::PosReal(x) => check_pos_real(*x),
            Self::Probability(x) => check_probability(*x),
            Self::RealVector(xs) => xs.iter().try_for_each(|x| check_real(*x)),
            Self::PosRealVector(xs) => xs.iter().try_for_each(|x| check_pos_real(*x)),
            Self::ProbabilityVector(xs) => xs.iter().try_for_each(|x| check_probability(*x)),
        }
    }

    /// Numeric scalar payload widened to `f64`, or `None` for booleans and
    /// vectors.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Natural(n) => Some(*n as f64),
            Self::Real(x) | Self::PosReal(x) | Self::Probability(x) => Some(*x),
            _ => None,
        }
    }

    /// Number of elements in a vector payload, or `None` for scalars.
    pub fn vector_len(&self) -> Option<usize> {
        match self {
            Self::BooleanVector(xs) => Some(xs.len()),
            Self::NaturalVector(xs) => Some(xs.len()),
            Self::RealVector(xs) | Self::PosRealVector(xs) | Self::ProbabilityVector(xs) => {
                Some(xs.len())
            }
            _ => None,
        }
    }

    /// Vector payload unpacked into scalar values, or `None` for scalars.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Self::BooleanVector(xs) => Some(xs.iter().map(|b| Self::Boolean(*b)).collect()),
            Self::NaturalVector(xs) => Some(xs.iter().map(|n| Self::Natural(*n)).collect()),
            Self::RealVector(xs) => Some(xs.iter().map(|x| Self::Real(*x)).collect()),
            Self::PosRealVector(xs) => Some(xs.iter().map(|x| Self::PosReal(*x)).collect()),
            Self::ProbabilityVector(xs) => {
                Some(xs.iter().map(|x| Self::Probability(*x)).collect())
            }
            _ => None,
        }
    }

    /// Boolean payload, or `None` for other variants.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Natural payload, or `None` for other variants.
    pub fn as_natural(&self) -> Option<u64> {
        match self {
            Self::Natural(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Natural(n) => write!(f, "{}", n),
            Self::Real(x) | Self::PosReal(x) | Self::Probability(x) => write!(f, "{}", x),
            Self::BooleanVector(xs) => write!(f, "{:?}", xs),
            Self::NaturalVector(xs) => write!(f, "{:?}", xs),
            Self::RealVector(xs) | Self::PosRealVector(xs) | Self::ProbabilityVector(xs) => {
                write!(f, "{:?}", xs)
            }
        }
    }
}

fn check_real(x: f64) -> Result<(), DistError> {
    if x.is_finite() {
        Ok(())
    } else {
        Err(DistError::Domain(format!("real must be finite, got {}", x)))
    }
}

fn check_pos_real(x: f64) -> Result<(), DistError> {
    if x.is_finite() && x > 0.0 {
        Ok(())
    } else {
        Err(DistError::Domain(format!(
            "pos_real must be finite and > 0, got {}",
            x
        )))
    }
}

fn check_probability(x: f64) -> Result<(), DistError> {
    if x.is_finite() && (0.0..=1.0).contains(&x) {
        Ok(())
    } else {
        Err(DistError::Domain(format!(
            "probability must lie in [0, 1], got {}",
            x
        )))
    }
}
