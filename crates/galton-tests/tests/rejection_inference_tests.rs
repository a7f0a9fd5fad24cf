//! End-to-end rejection inference tests against conjugate closed forms.
//!
//! Beta-binomial models have exact posteriors, so sampled means can be
//! checked against pencil-and-paper values. Tolerances sit a few standard
//! errors wide of each estimate at the requested sample count. Seeded runs
//! are also pinned bit for bit.

use galton_core::engine::aggregate::MeanAccumulator;
use galton_core::engine::eval::Evaluator;
use galton_core::{Graph, InferenceType, NodeId, OperatorType, PosteriorMean};
use galton_dists::{AtomicType, DistributionType, Value};
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{} mismatch: expected {:.15}, got {:.15}, diff={:.3e}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

fn scalar(mean: &PosteriorMean) -> f64 {
    match mean {
        PosteriorMean::Scalar(x) => *x,
        other => panic!("expected a scalar mean, got {:?}", other),
    }
}

/// p ~ Beta(alpha, beta); k ~ Binomial(trials, p). Returns (graph, p, k).
fn beta_binomial(alpha: f64, beta: f64, trials: u64) -> (Graph, NodeId, NodeId) {
    let mut graph = Graph::new();
    let a = graph.add_constant_pos_real(alpha).unwrap();
    let b = graph.add_constant_pos_real(beta).unwrap();
    let prior = graph
        .add_distribution(DistributionType::Beta, AtomicType::Probability, &[a, b])
        .unwrap();
    let p = graph.add_operator(OperatorType::Sample, &[prior]).unwrap();
    let n = graph.add_constant_natural(trials).unwrap();
    let likelihood = graph
        .add_distribution(DistributionType::Binomial, AtomicType::Natural, &[n, p])
        .unwrap();
    let k = graph.add_operator(OperatorType::Sample, &[likelihood]).unwrap();
    (graph, p, k)
}

#[test]
fn beta_binomial_posterior_matches_the_conjugate_closed_form() {
    // Prior Beta(2,3), evidence k=2 of n=5
    // Posterior: Beta(2+2, 3+3) = Beta(4,6)
    //   E[p] = 4/10 = 0.4
    let (mut graph, p, k) = beta_binomial(2.0, 3.0, 5);
    graph.observe(k, Value::Natural(2)).unwrap();
    graph.query(p).unwrap();

    let means = graph.infer_mean(1_000, InferenceType::Rejection, 23891).unwrap();
    assert_eq!(means.len(), 1);
    assert_close(scalar(&means[0]), 0.4, 1.5e-2, "posterior mean");
}

#[test]
fn a_uniform_prior_with_balanced_evidence_centers_at_one_half() {
    // Prior Beta(1,1), evidence k=5 of n=10
    // Posterior: Beta(6,6), E[p] = 0.5
    let (mut graph, p, k) = beta_binomial(1.0, 1.0, 10);
    graph.observe(k, Value::Natural(5)).unwrap();
    graph.query(p).unwrap();

    let means = graph.infer_mean(2_000, InferenceType::Rejection, 4021).unwrap();
    assert_close(scalar(&means[0]), 0.5, 2e-2, "posterior mean");
}

#[test]
fn beta_binomial_posterior_tightens_with_more_samples() {
    // Same model as the closed-form test; at 8000 accepted samples the
    // standard error drops under 2e-3, so a tighter check holds.
    let (mut graph, p, k) = beta_binomial(2.0, 3.0, 5);
    graph.observe(k, Value::Natural(2)).unwrap();
    graph.query(p).unwrap();

    let means = graph.infer_mean(8_000, InferenceType::Rejection, 23891).unwrap();
    assert_close(scalar(&means[0]), 0.4, 8e-3, "posterior mean");
}

#[test]
fn observing_zero_successes_pulls_the_posterior_low() {
    // Prior Beta(2,3), evidence k=0 of n=5
    // Posterior: Beta(2,8), E[p] = 0.2
    let (mut graph, p, k) = beta_binomial(2.0, 3.0, 5);
    graph.observe(k, Value::Natural(0)).unwrap();
    graph.query(p).unwrap();

    let means = graph.infer_mean(1_000, InferenceType::Rejection, 911).unwrap();
    assert_close(scalar(&means[0]), 0.2, 2e-2, "posterior mean");
}

#[test]
fn posterior_means_follow_query_registration_order() {
    let (mut graph, p, k) = beta_binomial(2.0, 3.0, 5);
    let q = graph.add_operator(OperatorType::Complement, &[p]).unwrap();
    graph.observe(k, Value::Natural(2)).unwrap();
    graph.query(q).unwrap();
    graph.query(p).unwrap();

    let means = graph.infer_mean(1_000, InferenceType::Rejection, 23891).unwrap();
    assert_eq!(means.len(), 2);
    // Registered first, reported first; the pair sums to one by construction.
    assert_close(scalar(&means[0]), 0.6, 1.5e-2, "complement mean");
    assert_close(
        scalar(&means[0]) + scalar(&means[1]),
        1.0,
        1e-9,
        "complement + mean",
    );
}

#[test]
fn querying_an_observed_node_returns_the_evidence_exactly() {
    let (mut graph, p, k) = beta_binomial(2.0, 3.0, 5);
    graph.observe(k, Value::Natural(2)).unwrap();
    graph.query(p).unwrap();
    graph.query(k).unwrap();

    let means = graph.infer_mean(500, InferenceType::Rejection, 5).unwrap();
    // Every accepted realization has k = 2, so the mean is exact.
    assert_eq!(means[1], PosteriorMean::Scalar(2.0));
}

#[test]
fn a_fixed_seed_reproduces_estimates_bit_for_bit() {
    let (mut graph, p, k) = beta_binomial(2.0, 3.0, 5);
    graph.observe(k, Value::Natural(2)).unwrap();
    graph.query(p).unwrap();

    let first = graph.infer_mean(1_000, InferenceType::Rejection, 23891).unwrap();
    let second = graph.infer_mean(1_000, InferenceType::Rejection, 23891).unwrap();
    assert_eq!(first, second);

    let shifted = graph.infer_mean(1_000, InferenceType::Rejection, 23892).unwrap();
    assert_ne!(first, shifted, "a different seed moves the estimate");
}

#[test]
fn an_unobserved_graph_averages_plain_prior_draws() {
    // With no evidence every attempt is accepted, so inference must agree
    // bit for bit with forward sampling on the same generator.
    let (mut graph, p, _k) = beta_binomial(2.0, 3.0, 5);
    graph.query(p).unwrap();

    let means = graph.infer_mean(500, InferenceType::Rejection, 7).unwrap();

    let mut rng = Pcg64::seed_from_u64(7);
    let mut evaluator = Evaluator::new(&graph);
    let mut accumulator = MeanAccumulator::new(&graph);
    for _ in 0..500 {
        evaluator.realize(&mut rng).unwrap();
        accumulator.accumulate(&graph, &evaluator).unwrap();
    }
    assert_eq!(means, accumulator.finish().unwrap());
}

#[test]
fn chains_shift_the_seed_and_match_single_runs() {
    let (mut graph, p, k) = beta_binomial(2.0, 3.0, 5);
    graph.observe(k, Value::Natural(2)).unwrap();
    graph.query(p).unwrap();

    let chains = graph
        .infer_mean_chains(200, InferenceType::Rejection, 100, 3)
        .unwrap();
    assert_eq!(chains.len(), 3);
    for (c, chain) in chains.iter().enumerate() {
        let single = graph
            .infer_mean(200, InferenceType::Rejection, 100 + c as u64)
            .unwrap();
        assert_eq!(chain, &single, "chain {}", c);
    }
}

#[test]
fn boolean_queries_estimate_posterior_predictive_frequency() {
    // weight ~ Beta(2,2); flip1, flip2 ~ Bernoulli(weight)
    // Given flip1 = true: E[weight | data] = 3/5, and that is exactly
    // P(flip2 = true | data).
    let mut graph = Graph::new();
    let a = graph.add_constant_pos_real(2.0).unwrap();
    let b = graph.add_constant_pos_real(2.0).unwrap();
    let prior = graph
        .add_distribution(DistributionType::Beta, AtomicType::Probability, &[a, b])
        .unwrap();
    let weight = graph.add_operator(OperatorType::Sample, &[prior]).unwrap();
    let coin = graph
        .add_distribution(DistributionType::Bernoulli, AtomicType::Boolean, &[weight])
        .unwrap();
    let flip1 = graph.add_operator(OperatorType::Sample, &[coin]).unwrap();
    let flip2 = graph.add_operator(OperatorType::Sample, &[coin]).unwrap();
    graph.observe(flip1, Value::Boolean(true)).unwrap();
    graph.query(flip2).unwrap();

    let means = graph.infer_mean(1_000, InferenceType::Rejection, 60).unwrap();
    let frequency = scalar(&means[0]);
    assert!((0.0..=1.0).contains(&frequency));
    assert_close(frequency, 0.6, 6e-2, "posterior predictive");
}

#[test]
fn iid_draws_estimate_each_component_mean() {
    let mut graph = Graph::new();
    let p = graph.add_constant_probability(0.7).unwrap();
    let coin = graph
        .add_distribution(DistributionType::Bernoulli, AtomicType::Boolean, &[p])
        .unwrap();
    let count = graph.add_constant_natural(4).unwrap();
    let flips = graph
        .add_operator(OperatorType::IidSample, &[coin, count])
        .unwrap();
    graph.query(flips).unwrap();

    let means = graph.infer_mean(1_500, InferenceType::Rejection, 12).unwrap();
    match &means[0] {
        PosteriorMean::Vector(components) => {
            assert_eq!(components.len(), 4);
            for (i, component) in components.iter().enumerate() {
                assert_close(*component, 0.7, 5e-2, &format!("component {}", i));
            }
        }
        other => panic!("expected a vector mean, got {:?}", other),
    }
}
