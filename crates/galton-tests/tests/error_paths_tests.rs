//! Error-path tests across construction, evidence, queries, and inference.
//!
//! Each failure class carries its own variant, failed calls leave the graph
//! unchanged, and runtime failures surface through `infer_mean` rather than
//! panicking.

use galton_core::{Graph, GraphError, InferenceOptions, InferenceType, NodeId, OperatorType};
use galton_dists::{AtomicType, DistributionType, Value};

fn observed_coin(p: f64, evidence: bool) -> Graph {
    let mut graph = Graph::new();
    let weight = graph.add_constant_probability(p).unwrap();
    let coin = graph
        .add_distribution(DistributionType::Bernoulli, AtomicType::Boolean, &[weight])
        .unwrap();
    let flip = graph.add_operator(OperatorType::Sample, &[coin]).unwrap();
    let other = graph.add_operator(OperatorType::Sample, &[coin]).unwrap();
    graph.observe(flip, Value::Boolean(evidence)).unwrap();
    graph.query(other).unwrap();
    graph
}

#[test]
fn errors_render_with_their_category_prefix() {
    let mut graph = Graph::new();

    let construction = graph.add_constant_probability(1.5).unwrap_err();
    assert!(construction.to_string().starts_with("construction error:"));

    let c = graph.add_constant_natural(1).unwrap();
    let observation = graph.observe(c, Value::Natural(1)).unwrap_err();
    assert!(observation.to_string().starts_with("observation error:"));

    let query = graph.query(NodeId(99)).unwrap_err();
    assert!(query.to_string().starts_with("query error:"));

    let inference = graph
        .infer_mean(10, InferenceType::Rejection, 0)
        .unwrap_err();
    assert!(inference.to_string().starts_with("inference error:"));

    let big = graph.add_constant_real(1000.0).unwrap();
    let blown = graph.add_operator(OperatorType::Exp, &[big]).unwrap();
    graph.query(blown).unwrap();
    let numeric = graph
        .infer_mean(10, InferenceType::Rejection, 0)
        .unwrap_err();
    assert!(numeric.to_string().starts_with("numeric error:"));
}

#[test]
fn impossible_evidence_exhausts_the_attempt_budget() {
    // Bernoulli(0) can only realize false, so observing true never accepts.
    let graph = observed_coin(0.0, true);
    let options = InferenceOptions {
        max_attempts: Some(300),
    };
    let err = graph
        .infer_mean_with_options(10, InferenceType::Rejection, 0, &options)
        .unwrap_err();
    match err {
        GraphError::Inference(message) => assert!(message.contains("attempt budget"), "{}", message),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn continuous_evidence_is_refused_by_rejection() {
    let mut graph = Graph::new();
    let mean = graph.add_constant_real(0.0).unwrap();
    let sd = graph.add_constant_pos_real(1.0).unwrap();
    let normal = graph
        .add_distribution(DistributionType::Normal, AtomicType::Real, &[mean, sd])
        .unwrap();
    let y = graph.add_operator(OperatorType::Sample, &[normal]).unwrap();
    graph.observe(y, Value::Real(0.25)).unwrap();
    graph.query(y).unwrap();

    let err = graph.infer_mean(10, InferenceType::Rejection, 0).unwrap_err();
    match err {
        GraphError::Inference(message) => assert!(message.contains("discrete"), "{}", message),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn zero_samples_and_zero_chains_are_refused() {
    let graph = observed_coin(0.5, true);
    let err = graph.infer_mean(0, InferenceType::Rejection, 0).unwrap_err();
    assert!(matches!(err, GraphError::Inference(_)), "{:?}", err);
    let err = graph
        .infer_mean_chains(10, InferenceType::Rejection, 0, 0)
        .unwrap_err();
    assert!(matches!(err, GraphError::Inference(_)), "{:?}", err);
}

#[test]
fn a_failed_observation_leaves_the_graph_reusable() {
    let mut graph = Graph::new();
    let n = graph.add_constant_natural(5).unwrap();
    let p = graph.add_constant_probability(0.4).unwrap();
    let likelihood = graph
        .add_distribution(DistributionType::Binomial, AtomicType::Natural, &[n, p])
        .unwrap();
    let k = graph.add_operator(OperatorType::Sample, &[likelihood]).unwrap();

    // Six successes out of five trials cannot happen.
    let err = graph.observe(k, Value::Natural(6)).unwrap_err();
    assert!(matches!(err, GraphError::Observation(_)), "{:?}", err);
    assert!(!graph.is_observed(k));

    graph.observe(k, Value::Natural(3)).unwrap();
    assert!(graph.is_observed(k));
    graph.query(k).unwrap();
    let means = graph.infer_mean(200, InferenceType::Rejection, 8).unwrap();
    assert_eq!(means[0], galton_core::PosteriorMean::Scalar(3.0));
}
