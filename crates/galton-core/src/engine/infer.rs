//! Inference entry points and the strategy registry.
//!
//! ## Key Components
//!
//! - [`InferenceType`]: the algorithms callers can name.
//! - [`InferenceOptions`]: run-level knobs, currently the attempt budget.
//! - [`InferenceStrategy`]: the trait every sampler implements.
//! - [`StrategyRegistry`]: maps algorithm names to strategies; the default
//!   registry carries the rejection sampler.
//!
//! ## Design
//!
//! Strategies are object-safe and take the graph immutably, so one graph
//! can serve many runs and many chains at once. Multi-chain runs derive
//! chain `c`'s generator from `seed.wrapping_add(c)`, which keeps chains
//! reproducible individually and in aggregate.

use rustc_hash::FxHashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::aggregate::PosteriorMean;
use crate::engine::errors::GraphError;
use crate::engine::graph::Graph;
use crate::engine::rejection::RejectionSampler;

/// Attempts allowed per requested sample before a run is abandoned.
pub const ATTEMPTS_PER_SAMPLE: u64 = 10_000;

/// Floor on the total attempt budget for small sample counts.
pub const MIN_ATTEMPT_BUDGET: u64 = 100_000;

/// Inference algorithms selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InferenceType {
    /// Sample from the priors, keep realizations matching the evidence.
    Rejection,
}

impl std::fmt::Display for InferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceType::Rejection => write!(f, "rejection"),
        }
    }
}

/// Run-level options shared by all strategies.
#[derive(Debug, Clone, Default)]
pub struct InferenceOptions {
    /// Cap on total realization attempts. `None` derives a cap from the
    /// requested sample count.
    pub max_attempts: Option<u64>,
}

impl InferenceOptions {
    /// The attempt cap in force for a run of `num_samples`.
    pub fn attempt_budget(&self, num_samples: u64) -> u64 {
        match self.max_attempts {
            Some(cap) => cap,
            None => num_samples
                .saturating_mul(ATTEMPTS_PER_SAMPLE)
                .max(MIN_ATTEMPT_BUDGET),
        }
    }
}

/// A posterior sampler that can serve [`Graph::infer_mean`].
pub trait InferenceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        graph: &Graph,
        num_samples: u64,
        seed: u64,
        options: &InferenceOptions,
    ) -> Result<Vec<PosteriorMean>, GraphError>;
}

/// Lookup table from algorithm to strategy.
pub struct StrategyRegistry {
    strategies: FxHashMap<InferenceType, Box<dyn InferenceStrategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(InferenceType::Rejection, Box::new(RejectionSampler));
        registry
    }
}

impl StrategyRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            strategies: FxHashMap::default(),
        }
    }

    /// Registers `strategy` under `algorithm`, replacing any previous entry.
    pub fn register(&mut self, algorithm: InferenceType, strategy: Box<dyn InferenceStrategy>) {
        self.strategies.insert(algorithm, strategy);
    }

    /// Dispatches one inference run to the registered strategy.
    pub fn run(
        &self,
        graph: &Graph,
        algorithm: InferenceType,
        num_samples: u64,
        seed: u64,
        options: &InferenceOptions,
    ) -> Result<Vec<PosteriorMean>, GraphError> {
        if num_samples == 0 {
            return Err(GraphError::Inference(
                "num_samples must be positive".to_string(),
            ));
        }
        let strategy = self.strategies.get(&algorithm).ok_or_else(|| {
            GraphError::Inference(format!("no strategy registered for {}", algorithm))
        })?;
        log::debug!(
            "running {} inference: {} samples, seed {}",
            strategy.name(),
            num_samples,
            seed
        );
        strategy.run(graph, num_samples, seed, options)
    }
}

impl Graph {
    /// Estimates the posterior mean of every queried node.
    ///
    /// Results follow query-registration order. The same graph, arguments,
    /// and seed always produce the same result.
    pub fn infer_mean(
        &self,
        num_samples: u64,
        algorithm: InferenceType,
        seed: u64,
    ) -> Result<Vec<PosteriorMean>, GraphError> {
        self.infer_mean_with_options(num_samples, algorithm, seed, &InferenceOptions::default())
    }

    /// [`infer_mean`](Graph::infer_mean) with explicit run options.
    pub fn infer_mean_with_options(
        &self,
        num_samples: u64,
        algorithm: InferenceType,
        seed: u64,
        options: &InferenceOptions,
    ) -> Result<Vec<PosteriorMean>, GraphError> {
        StrategyRegistry::default().run(self, algorithm, num_samples, seed, options)
    }

    /// Runs `num_chains` independent estimates, one result set per chain.
    ///
    /// Chain `c` seeds its generator with `seed.wrapping_add(c)`, so a
    /// single-chain run reproduces chain 0 of a multi-chain run.
    pub fn infer_mean_chains(
        &self,
        num_samples: u64,
        algorithm: InferenceType,
        seed: u64,
        num_chains: u64,
    ) -> Result<Vec<Vec<PosteriorMean>>, GraphError> {
        if num_chains == 0 {
            return Err(GraphError::Inference(
                "num_chains must be positive".to_string(),
            ));
        }
        let registry = StrategyRegistry::default();
        let options = InferenceOptions::default();

        #[cfg(feature = "parallel")]
        {
            (0..num_chains)
                .into_par_iter()
                .map(|chain| {
                    registry.run(
                        self,
                        algorithm,
                        num_samples,
                        seed.wrapping_add(chain),
                        &options,
                    )
                })
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            (0..num_chains)
                .map(|chain| {
                    registry.run(
                        self,
                        algorithm,
                        num_samples,
                        seed.wrapping_add(chain),
                        &options,
                    )
                })
                .collect()
        }
    }
}
