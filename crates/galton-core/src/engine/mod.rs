//! The execution engine for Galton model graphs.
//!
//! This module provides:
//! - **errors**: Error types for construction and inference failures
//! - **node**: Node ids, operator kinds, and per-node storage
//! - **graph**: The append-only model graph and its typing rules
//! - **eval**: Forward realization of a graph into one joint sample
//! - **aggregate**: Posterior-mean accumulation over accepted samples
//! - **infer**: Inference options, the strategy trait, and the registry
//! - **rejection**: The exact-match rejection sampler

pub mod aggregate;
pub mod errors;
pub mod eval;
pub mod graph;
pub mod infer;
pub mod node;
pub mod rejection;
