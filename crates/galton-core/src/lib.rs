//! # Galton Core
//!
//! Core engine for Galton probabilistic model graphs: an append-only
//! directed graph of constants, distributions, and operators, realized
//! forward by seeded sampling and summarized by posterior means.
//!
//! ## Architecture
//!
//! - **engine::node**: Node ids, operator kinds, and per-node storage
//! - **engine::graph**: Graph construction, typing rules, evidence, queries
//! - **engine::eval**: Forward realization into one joint sample
//! - **engine::aggregate**: Posterior-mean accumulation
//! - **engine::infer** / **engine::rejection**: Strategy registry and the
//!   exact-match rejection sampler
//!
//! Value types and distribution families live in the `galton-dists` crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use galton_core::{Graph, InferenceType, OperatorType};
//! use galton_dists::{AtomicType, DistributionType, Value};
//!
//! let mut g = Graph::new();
//! let a = g.add_constant_pos_real(2.0)?;
//! let b = g.add_constant_pos_real(3.0)?;
//! let prior = g.add_distribution(DistributionType::Beta, AtomicType::Probability, &[a, b])?;
//! let p = g.add_operator(OperatorType::Sample, &[prior])?;
//! let n = g.add_constant_natural(5)?;
//! let likelihood = g.add_distribution(DistributionType::Binomial, AtomicType::Natural, &[n, p])?;
//! let k = g.add_operator(OperatorType::Sample, &[likelihood])?;
//! g.observe(k, Value::Natural(2))?;
//! g.query(p)?;
//! let means = g.infer_mean(1_000, InferenceType::Rejection, 23891)?;
//! ```

#![forbid(unsafe_code)]

pub mod engine;

// Re-export commonly used types
pub use engine::aggregate::PosteriorMean;
pub use engine::errors::GraphError;
pub use engine::graph::Graph;
pub use engine::infer::{InferenceOptions, InferenceStrategy, InferenceType, StrategyRegistry};
pub use engine::node::{NodeId, OperatorType};
pub use engine::rejection::RejectionSampler;
