//! Exact-match rejection sampling.
//!
//! Each attempt draws a full joint realization from the priors and keeps it
//! only when every observed node came out exactly equal to its evidence.
//! Exact matching is viable for discrete evidence only; observations on
//! continuous nodes are refused before any sampling happens, since a run
//! against them could never accept. A budget caps total attempts so heavily
//! constrained models fail with a diagnostic instead of spinning forever.

use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::engine::aggregate::{MeanAccumulator, PosteriorMean};
use crate::engine::errors::GraphError;
use crate::engine::eval::Evaluator;
use crate::engine::graph::Graph;
use crate::engine::infer::{InferenceOptions, InferenceStrategy};

/// The default strategy behind [`InferenceType::Rejection`](crate::engine::infer::InferenceType).
#[derive(Debug, Default)]
pub struct RejectionSampler;

impl InferenceStrategy for RejectionSampler {
    fn name(&self) -> &'static str {
        "rejection"
    }

    fn run(
        &self,
        graph: &Graph,
        num_samples: u64,
        seed: u64,
        options: &InferenceOptions,
    ) -> Result<Vec<PosteriorMean>, GraphError> {
        if graph.queries().is_empty() {
            return Err(GraphError::Inference(
                "no node is queried in the graph".to_string(),
            ));
        }
        check_discrete_evidence(graph)?;

        let budget = options.attempt_budget(num_samples);
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut evaluator = Evaluator::new(graph);
        let mut accumulator = MeanAccumulator::new(graph);
        let mut attempts: u64 = 0;
        while accumulator.accepted() < num_samples {
            if attempts >= budget {
                log::warn!(
                    "rejection run gave up: {} accepted of {} requested in {} attempts",
                    accumulator.accepted(),
                    num_samples,
                    attempts
                );
                return Err(GraphError::Inference(format!(
                    "rejection sampling exhausted its attempt budget: \
                     accepted {} of {} requested samples in {} attempts",
                    accumulator.accepted(),
                    num_samples,
                    attempts
                )));
            }
            attempts += 1;
            evaluator.realize(&mut rng)?;
            if matches_evidence(graph, &evaluator)? {
                accumulator.accumulate(graph, &evaluator)?;
            }
        }
        log::debug!(
            "rejection run accepted {} of {} attempts",
            accumulator.accepted(),
            attempts
        );
        accumulator.finish()
    }
}

// Exact matching of a continuous draw accepts with probability zero.
fn check_discrete_evidence(graph: &Graph) -> Result<(), GraphError> {
    for (node, value) in graph.observations() {
        if !value.atomic_type().is_discrete() {
            return Err(GraphError::Inference(format!(
                "rejection sampling needs discrete evidence, but node {} is observed as {}",
                node,
                value.atomic_type()
            )));
        }
    }
    Ok(())
}

fn matches_evidence(graph: &Graph, evaluator: &Evaluator<'_>) -> Result<bool, GraphError> {
    for (node, observed) in graph.observations() {
        let sampled = evaluator.value(*node).ok_or_else(|| {
            GraphError::Inference(format!("observed node {} has no realized value", node))
        })?;
        if sampled != observed {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use galton_dists::{AtomicType, DistributionType, Value};

    use crate::engine::node::OperatorType;

    use super::*;

    fn observed_coin(p: f64) -> Graph {
        let mut graph = Graph::new();
        let weight = graph.add_constant_probability(p).unwrap();
        let coin = graph
            .add_distribution(DistributionType::Bernoulli, AtomicType::Boolean, &[weight])
            .unwrap();
        let flip = graph.add_operator(OperatorType::Sample, &[coin]).unwrap();
        let second = graph.add_operator(OperatorType::Sample, &[coin]).unwrap();
        graph.observe(flip, Value::Boolean(true)).unwrap();
        graph.query(second).unwrap();
        graph
    }

    #[test]
    fn a_run_with_no_queries_is_refused() {
        let mut graph = Graph::new();
        let p = graph.add_constant_probability(0.5).unwrap();
        let coin = graph
            .add_distribution(DistributionType::Bernoulli, AtomicType::Boolean, &[p])
            .unwrap();
        graph.add_operator(OperatorType::Sample, &[coin]).unwrap();

        let err = RejectionSampler
            .run(&graph, 10, 0, &InferenceOptions::default())
            .unwrap_err();
        assert!(matches!(err, GraphError::Inference(_)), "{:?}", err);
    }

    #[test]
    fn continuous_evidence_is_refused_before_sampling() {
        let mut graph = Graph::new();
        let mean = graph.add_constant_real(0.0).unwrap();
        let sd = graph.add_constant_pos_real(1.0).unwrap();
        let normal = graph
            .add_distribution(DistributionType::Normal, AtomicType::Real, &[mean, sd])
            .unwrap();
        let y = graph.add_operator(OperatorType::Sample, &[normal]).unwrap();
        graph.observe(y, Value::Real(0.5)).unwrap();
        graph.query(y).unwrap();

        let err = RejectionSampler
            .run(&graph, 10, 0, &InferenceOptions::default())
            .unwrap_err();
        match err {
            GraphError::Inference(message) => assert!(message.contains("discrete"), "{}", message),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn an_impossible_observation_exhausts_the_attempt_budget() {
        let graph = observed_coin(0.0);
        let options = InferenceOptions {
            max_attempts: Some(500),
        };
        let err = RejectionSampler.run(&graph, 10, 0, &options).unwrap_err();
        match err {
            GraphError::Inference(message) => {
                assert!(message.contains("attempt budget"), "{}", message)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn accepted_runs_repeat_under_a_fixed_seed() {
        let graph = observed_coin(0.5);
        let options = InferenceOptions::default();
        let first = RejectionSampler.run(&graph, 50, 17, &options).unwrap();
        let second = RejectionSampler.run(&graph, 50, 17, &options).unwrap();
        assert_eq!(first, second);
    }
}
