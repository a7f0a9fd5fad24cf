//! # Galton Dists
//!
//! Typed values and distribution families for the Galton inference engine.
//!
//! This crate owns the value model shared across the engine: the closed
//! [`AtomicType`] lattice, the [`Value`] payloads, and the distribution
//! families that sample and score them. The engine core binds families to
//! graph nodes and drives sampling through the [`Distribution`] trait.

#![forbid(unsafe_code)]

pub mod errors;
pub mod families;
pub mod family;
pub mod math;
pub mod value;

// Re-export commonly used types
pub use errors::DistError;
pub use family::{make_distribution, Distribution, DistributionType};
pub use value::{AtomicType, Value};
