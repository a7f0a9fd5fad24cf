//! Error types for graph construction and inference.

use thiserror::Error;

impl From<galton_dists::DistError> for GraphError {
    fn from(err: galton_dists::DistError) -> Self {
        GraphError::Construction(err.to_string())
    }
}

/// Errors that can occur while building a model graph or running inference.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// All operations are synchronous and fail atomically: an error leaves the
/// graph, its evidence, and its query registrations unchanged. Messages name
/// the offending node id where one exists.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// Structural or type error while adding a node (bad reference, arity or
    /// type mismatch, out-of-domain constant).
    #[error("construction error: {0}")]
    Construction(String),

    /// Invalid evidence (wrong target kind, type mismatch, out-of-domain or
    /// out-of-support value, repeated observation).
    #[error("observation error: {0}")]
    Observation(String),

    /// Invalid query registration (unknown node, unvalued node).
    #[error("query error: {0}")]
    Query(String),

    /// Inference could not run or did not complete (unknown strategy,
    /// unsupported evidence, attempt budget exhausted).
    #[error("inference error: {0}")]
    Inference(String),

    /// Numerical failure during evaluation (non-finite result, runtime
    /// parameter outside a family's domain).
    #[error("numeric error: {0}")]
    Numeric(String),
}
