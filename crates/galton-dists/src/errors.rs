//! Error types for distribution construction and scoring.

use thiserror::Error;

/// Errors raised while building or using a distribution family.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DistError {
    /// Wrong number of parameters for the family.
    #[error("arity error: {0}")]
    Arity(String),

    /// A parameter had the wrong atomic type.
    #[error("type error: {0}")]
    Type(String),

    /// A value fell outside its declared atomic type's domain.
    #[error("domain error: {0}")]
    Domain(String),

    /// A parameter value the family cannot accept (e.g. Beta with alpha = 0).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The family cannot produce samples of the requested type.
    #[error("unsupported sample type: {0}")]
    UnsupportedSampleType(String),
}
