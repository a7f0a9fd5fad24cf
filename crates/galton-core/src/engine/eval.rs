//! Forward realization of the model graph.
//!
//! One pass in ascending node-id order copies constants, draws every
//! `sample`/`iid_sample` node from its distribution, and applies every
//! deterministic operator, producing a joint sample of all valued nodes.
//! Randomness comes only from the caller's generator, so a fixed seed fixes
//! the whole realization sequence.
//!
//! Runtime failures surface as [`GraphError::Numeric`]: a non-finite
//! operator result, a value leaving its type's domain (e.g. `to_pos_real`
//! of zero), or a sampled parameter a family cannot accept.

use rand_pcg::Pcg64;

use galton_dists::{make_distribution, AtomicType, Distribution, Value};

use crate::engine::errors::GraphError;
use crate::engine::graph::Graph;
use crate::engine::node::{NodeId, NodeKind, OperatorType};

/// Scratch evaluator over a borrowed graph.
///
/// The value buffer is indexed by node id and rewritten on every
/// [`realize`](Evaluator::realize) pass; distribution nodes keep `None`.
pub struct Evaluator<'g> {
    graph: &'g Graph,
    values: Vec<Option<Value>>,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            values: vec![None; graph.node_count()],
        }
    }

    /// Draws one joint realization of every valued node.
    pub fn realize(&mut self, rng: &mut Pcg64) -> Result<(), GraphError> {
        let nodes = self.graph.nodes();
        for node in nodes {
            let value = match &node.kind {
                NodeKind::Constant { value } => Some(value.clone()),
                NodeKind::Distribution { .. } => None,
                NodeKind::Operator { op, inputs } => {
                    Some(self.apply_operator(node.id, *op, inputs, rng)?)
                }
            };
            self.values[node.id.0 as usize] = value;
        }
        Ok(())
    }

    /// The realized value of `id` from the current pass, if any.
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        self.values.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    fn apply_operator(
        &self,
        id: NodeId,
        op: OperatorType,
        inputs: &[NodeId],
        rng: &mut Pcg64,
    ) -> Result<Value, GraphError> {
        match op {
            OperatorType::Sample => {
                let dist_id = inputs
                    .first()
                    .copied()
                    .ok_or_else(|| numeric(id, "sample is missing its distribution input"))?;
                let dist = self.instantiate(dist_id, id)?;
                Ok(dist.sample(rng))
            }
            OperatorType::IidSample => {
                let dist_id = inputs
                    .first()
                    .copied()
                    .ok_or_else(|| numeric(id, "iid_sample is missing its distribution input"))?;
                let dist = self.instantiate(dist_id, id)?;
                let count = inputs
                    .get(1)
                    .and_then(|c| self.graph.constant_value(*c))
                    .and_then(Value::as_natural)
                    .ok_or_else(|| numeric(id, "iid_sample is missing its count constant"))?;
                draw_iid(dist.as_ref(), count, rng, id)
            }
            _ => {
                let mut values = Vec::with_capacity(inputs.len());
                for input in inputs {
                    match self.value(*input) {
                        Some(value) => values.push(value.clone()),
                        None => {
                            return Err(numeric(
                                id,
                                &format!("input {} has no realized value", input),
                            ));
                        }
                    }
                }
                apply_deterministic(id, op, &values)
            }
        }
    }

    // Binds the distribution node's family to this pass's parameter values.
    fn instantiate(&self, dist_id: NodeId, at: NodeId) -> Result<Box<dyn Distribution>, GraphError> {
        let node = self
            .graph
            .node(dist_id)
            .ok_or_else(|| numeric(at, &format!("unknown distribution node {}", dist_id)))?;
        let (family, sample_type, params) = match &node.kind {
            NodeKind::Distribution {
                family,
                sample_type,
                params,
            } => (*family, *sample_type, params),
            _ => {
                return Err(numeric(
                    at,
                    &format!("node {} is not a distribution", dist_id),
                ));
            }
        };
        let mut values = Vec::with_capacity(params.len());
        for param in params.iter() {
            match self.value(*param) {
                Some(value) => values.push(value.clone()),
                None => {
                    return Err(numeric(
                        at,
                        &format!("parameter {} has no realized value", param),
                    ));
                }
            }
        }
        make_distribution(family, sample_type, &values)
            .map_err(|e| numeric(at, &e.to_string()))
    }
}

fn draw_iid(
    dist: &dyn Distribution,
    count: u64,
    rng: &mut Pcg64,
    at: NodeId,
) -> Result<Value, GraphError> {
    match dist.sample_type() {
        AtomicType::Boolean => {
            let mut draws = Vec::with_capacity(count as usize);
            for _ in 0..count {
                match dist.sample(rng) {
                    Value::Boolean(b) => draws.push(b),
                    other => return Err(sample_drift(at, AtomicType::Boolean, &other)),
                }
            }
            Ok(Value::BooleanVector(draws))
        }
        AtomicType::Natural => {
            let mut draws = Vec::with_capacity(count as usize);
            for _ in 0..count {
                match dist.sample(rng) {
                    Value::Natural(n) => draws.push(n),
                    other => return Err(sample_drift(at, AtomicType::Natural, &other)),
                }
            }
            Ok(Value::NaturalVector(draws))
        }
        scalar @ (AtomicType::Real | AtomicType::PosReal | AtomicType::Probability) => {
            let mut draws = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let value = dist.sample(rng);
                if value.atomic_type() != scalar {
                    return Err(sample_drift(at, scalar, &value));
                }
                match value.as_f64() {
                    Some(x) => draws.push(x),
                    None => return Err(sample_drift(at, scalar, &value)),
                }
            }
            Ok(match scalar {
                AtomicType::Real => Value::RealVector(draws),
                AtomicType::PosReal => Value::PosRealVector(draws),
                _ => Value::ProbabilityVector(draws),
            })
        }
        vector => Err(numeric(
            at,
            &format!("iid_sample cannot draw {} elements", vector),
        )),
    }
}

fn apply_deterministic(id: NodeId, op: OperatorType, values: &[Value]) -> Result<Value, GraphError> {
    let result = match (op, values) {
        (OperatorType::ToReal, [v]) => Value::Real(numeric_scalar(id, v)?),
        (OperatorType::ToPosReal, [v]) => Value::PosReal(numeric_scalar(id, v)?),
        (OperatorType::Complement, [Value::Probability(p)]) => Value::Probability(1.0 - p),
        (OperatorType::Negate, [Value::Real(x)]) => Value::Real(-x),
        (OperatorType::Exp, [Value::Real(x)]) => Value::PosReal(x.exp()),
        (OperatorType::Log, [Value::PosReal(x)]) => Value::Real(x.ln()),
        (OperatorType::Add, values) => combine(id, op, values, |acc, x| acc + x)?,
        (OperatorType::Multiply, values) => combine(id, op, values, |acc, x| acc * x)?,
        _ => return Err(malformed(id, op)),
    };
    result
        .validate_domain()
        .map_err(|e| numeric(id, &e.to_string()))?;
    Ok(result)
}

fn combine(
    id: NodeId,
    op: OperatorType,
    values: &[Value],
    fold: impl Fn(f64, f64) -> f64,
) -> Result<Value, GraphError> {
    let mut payloads = Vec::with_capacity(values.len());
    for value in values {
        match value.as_f64() {
            Some(x) => payloads.push(x),
            None => return Err(malformed(id, op)),
        }
    }
    if payloads.len() < 2 {
        return Err(malformed(id, op));
    }
    let mut acc = payloads[0];
    for x in &payloads[1..] {
        acc = fold(acc, *x);
    }
    match values[0].atomic_type() {
        AtomicType::Real => Ok(Value::Real(acc)),
        AtomicType::PosReal => Ok(Value::PosReal(acc)),
        AtomicType::Probability => Ok(Value::Probability(acc)),
        _ => Err(malformed(id, op)),
    }
}

fn numeric_scalar(id: NodeId, value: &Value) -> Result<f64, GraphError> {
    value.as_f64().ok_or_else(|| {
        numeric(
            id,
            &format!("expected a numeric scalar, got {}", value.atomic_type()),
        )
    })
}

fn numeric(id: NodeId, message: &str) -> GraphError {
    GraphError::Numeric(format!("node {}: {}", id, message))
}

fn sample_drift(at: NodeId, expected: AtomicType, got: &Value) -> GraphError {
    numeric(
        at,
        &format!("drew a {} where {} was expected", got.atomic_type(), expected),
    )
}

fn malformed(id: NodeId, op: OperatorType) -> GraphError {
    numeric(id, &format!("malformed {} application", op))
}
