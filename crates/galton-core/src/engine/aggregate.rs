//! Posterior-mean aggregation over accepted samples.
//!
//! Results come back in query-registration order. Boolean queries average
//! as acceptance frequencies in `[0, 1]`, naturals as their counts, and
//! vector queries component-wise.

use crate::engine::errors::GraphError;
use crate::engine::eval::Evaluator;
use crate::engine::graph::Graph;
use crate::engine::node::NodeId;

use galton_dists::Value;

/// Posterior mean of one queried node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PosteriorMean {
    Scalar(f64),
    Vector(Vec<f64>),
}

enum RunningSum {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// Running per-query sums, divided through once at the end.
///
/// Keeping raw sums rather than incremental means makes a run reproducible
/// bit for bit from the same accepted values.
pub struct MeanAccumulator {
    sums: Vec<Option<RunningSum>>,
    accepted: u64,
}

impl MeanAccumulator {
    pub fn new(graph: &Graph) -> Self {
        let mut sums = Vec::new();
        sums.resize_with(graph.queries().len(), || None);
        Self { sums, accepted: 0 }
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Folds one accepted realization into every query's running sum.
    pub fn accumulate(&mut self, graph: &Graph, evaluator: &Evaluator<'_>) -> Result<(), GraphError> {
        for (slot, query) in self.sums.iter_mut().zip(graph.queries()) {
            let value = evaluator
                .value(*query)
                .ok_or_else(|| missing_value(*query))?;
            match value {
                Value::Boolean(_)
                | Value::Natural(_)
                | Value::Real(_)
                | Value::PosReal(_)
                | Value::Probability(_) => {
                    let x = scalar_payload(value).ok_or_else(|| missing_value(*query))?;
                    match slot {
                        Some(RunningSum::Scalar(sum)) => *sum += x,
                        None => *slot = Some(RunningSum::Scalar(x)),
                        Some(RunningSum::Vector(_)) => return Err(shape_drift(*query)),
                    }
                }
                _ => {
                    let elements = value.elements().ok_or_else(|| missing_value(*query))?;
                    let mut payloads = Vec::with_capacity(elements.len());
                    for element in &elements {
                        match scalar_payload(element) {
                            Some(x) => payloads.push(x),
                            None => return Err(shape_drift(*query)),
                        }
                    }
                    match slot {
                        Some(RunningSum::Vector(sums)) => {
                            if sums.len() != payloads.len() {
                                return Err(shape_drift(*query));
                            }
                            for (sum, x) in sums.iter_mut().zip(&payloads) {
                                *sum += x;
                            }
                        }
                        None => *slot = Some(RunningSum::Vector(payloads)),
                        Some(RunningSum::Scalar(_)) => return Err(shape_drift(*query)),
                    }
                }
            }
        }
        self.accepted += 1;
        Ok(())
    }

    /// Divides every sum by the accepted count, in query-registration order.
    pub fn finish(self) -> Result<Vec<PosteriorMean>, GraphError> {
        if self.accepted == 0 {
            return Err(GraphError::Inference(
                "no accepted samples to aggregate".to_string(),
            ));
        }
        let n = self.accepted as f64;
        let mut means = Vec::with_capacity(self.sums.len());
        for slot in self.sums {
            match slot {
                Some(RunningSum::Scalar(sum)) => means.push(PosteriorMean::Scalar(sum / n)),
                Some(RunningSum::Vector(sums)) => {
                    means.push(PosteriorMean::Vector(sums.into_iter().map(|s| s / n).collect()))
                }
                None => {
                    return Err(GraphError::Inference(
                        "query accumulated no values".to_string(),
                    ));
                }
            }
        }
        Ok(means)
    }
}

fn scalar_payload(value: &Value) -> Option<f64> {
    value
        .as_bool()
        .map(|b| if b { 1.0 } else { 0.0 })
        .or_else(|| value.as_f64())
}

fn missing_value(query: NodeId) -> GraphError {
    GraphError::Inference(format!("query node {} has no realized value", query))
}

fn shape_drift(query: NodeId) -> GraphError {
    GraphError::Inference(format!("query node {} changed shape between samples", query))
}
