//! # Model graph
//!
//! This module implements the directed acyclic graph of random variables the
//! engine runs inference over.
//!
//! ## Key Components
//!
//! - **Graph**: append-only node store plus evidence and query registries
//! - **Constants**: fixed values with type-level domain validation
//! - **Distributions**: family tags bound to parameter nodes
//! - **Operators**: `sample`/`iid_sample` draws and pure functions of
//!   earlier nodes
//!
//! ## Design
//!
//! Nodes receive dense ids in insertion order and may only reference nodes
//! inserted before them, so insertion order is a topological order and the
//! evaluator can run in a single ascending-id pass. All validation happens
//! at insertion: parameter arity and types against the family signature,
//! operator input types against the operator rules, and constant payloads
//! against their type domains. A failed operation leaves the graph
//! untouched.
//!
//! Evidence attaches to `sample`/`iid_sample` nodes only, with the observed
//! value checked against the node's type, the type's domain, and (when the
//! distribution's parameters are constants) the support of the
//! distribution. Queries register valued nodes and receive stable indices
//! in first-registration order.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use galton_dists::{make_distribution, AtomicType, Distribution, DistributionType, Value};

use crate::engine::errors::GraphError;
use crate::engine::node::{NodeData, NodeId, NodeKind, OperatorType};

/// A directed acyclic model of random variables.
///
/// Build order is the evaluation order: constants and distributions first,
/// operators over them, with evidence and queries attached once the
/// structure is in place.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Append-only node store; index equals `NodeId` payload.
    nodes: Vec<NodeData>,
    /// Observed evidence keyed by stochastic-operator node id.
    observations: FxHashMap<NodeId, Value>,
    /// Queried node ids in first-registration order.
    queries: Vec<NodeId>,
    /// Query id -> position in `queries`.
    query_index: FxHashMap<NodeId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in insertion (= topological) order.
    pub fn nodes(&self) -> &[NodeData] {
        &self.nodes
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize)
    }

    /// Observed evidence, keyed by node id.
    pub fn observations(&self) -> &FxHashMap<NodeId, Value> {
        &self.observations
    }

    /// True if evidence is attached to `id`.
    pub fn is_observed(&self, id: NodeId) -> bool {
        self.observations.contains_key(&id)
    }

    /// Queried node ids in first-registration order.
    pub fn queries(&self) -> &[NodeId] {
        &self.queries
    }

    /// Adds a constant node holding `value`.
    ///
    /// The payload must satisfy its type's domain (finite reals, strictly
    /// positive pos_reals, probabilities in [0, 1]).
    pub fn add_constant(&mut self, value: Value) -> Result<NodeId, GraphError> {
        value.validate_domain()?;
        let ty = value.atomic_type();
        Ok(self.push_node(NodeKind::Constant { value }, Some(ty)))
    }

    /// Adds a boolean constant.
    pub fn add_constant_bool(&mut self, value: bool) -> Result<NodeId, GraphError> {
        self.add_constant(Value::Boolean(value))
    }

    /// Adds a natural constant.
    pub fn add_constant_natural(&mut self, value: u64) -> Result<NodeId, GraphError> {
        self.add_constant(Value::Natural(value))
    }

    /// Adds a real constant.
    pub fn add_constant_real(&mut self, value: f64) -> Result<NodeId, GraphError> {
        self.add_constant(Value::Real(value))
    }

    /// Adds a positive-real constant.
    pub fn add_constant_pos_real(&mut self, value: f64) -> Result<NodeId, GraphError> {
        self.add_constant(Value::PosReal(value))
    }

    /// Adds a probability constant.
    pub fn add_constant_probability(&mut self, value: f64) -> Result<NodeId, GraphError> {
        self.add_constant(Value::Probability(value))
    }

    /// Adds a distribution node for `family` producing `sample_type`, with
    /// parameters taken from earlier nodes.
    ///
    /// Parameter arity and types are checked against the family signature,
    /// and the family must be able to produce `sample_type` at all.
    pub fn add_distribution(
        &mut self,
        family: DistributionType,
        sample_type: AtomicType,
        params: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let signature = family.signature(sample_type)?;
        if params.len() != signature.len() {
            return Err(GraphError::Construction(format!(
                "{} takes {} parameter(s), got {}",
                family,
                signature.len(),
                params.len()
            )));
        }
        for (position, (param, expected)) in params.iter().zip(signature).enumerate() {
            let node = self.node(*param).ok_or_else(|| {
                GraphError::Construction(format!(
                    "{} parameter {} references unknown node {}",
                    family, position, param
                ))
            })?;
            match node.ty {
                Some(ty) if ty == *expected => {}
                Some(ty) => {
                    return Err(GraphError::Construction(format!(
                        "{} parameter {} must be {}, node {} has type {}",
                        family, position, expected, param, ty
                    )));
                }
                None => {
                    return Err(GraphError::Construction(format!(
                        "{} parameter {} must be a valued node, node {} is a distribution",
                        family, position, param
                    )));
                }
            }
        }
        Ok(self.push_node(
            NodeKind::Distribution {
                family,
                sample_type,
                params: SmallVec::from_slice(params),
            },
            None,
        ))
    }

    /// Adds an operator node over earlier nodes.
    ///
    /// `Sample` takes one distribution node and is typed by its sample type;
    /// `IidSample` takes a distribution node and a constant natural count
    /// (at least 1) and is typed by the vector form of the sample type. The
    /// deterministic operators take valued inputs and are typed by the
    /// rules on [`OperatorType`].
    pub fn add_operator(
        &mut self,
        op: OperatorType,
        inputs: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let ty = self.operator_result_type(op, inputs)?;
        Ok(self.push_node(
            NodeKind::Operator {
                op,
                inputs: SmallVec::from_slice(inputs),
            },
            Some(ty),
        ))
    }

    /// Attaches evidence to a `sample` or `iid_sample` node.
    ///
    /// The value's type must equal the node's result type, its payload must
    /// satisfy that type's domain, and a node can be observed at most once.
    /// When the target's distribution has all-constant parameters the value
    /// is additionally checked against the distribution's support, so
    /// evidence no realization can produce is rejected here.
    pub fn observe(&mut self, id: NodeId, value: Value) -> Result<(), GraphError> {
        let node = self
            .node(id)
            .ok_or_else(|| GraphError::Observation(format!("unknown node {}", id)))?;
        match &node.kind {
            NodeKind::Operator { op, .. } if op.is_stochastic() => {}
            _ => {
                return Err(GraphError::Observation(format!(
                    "node {} is not a sample or iid_sample operator",
                    id
                )));
            }
        }
        let ty = node
            .ty
            .ok_or_else(|| GraphError::Observation(format!("node {} carries no value", id)))?;
        if self.observations.contains_key(&id) {
            return Err(GraphError::Observation(format!(
                "node {} is already observed",
                id
            )));
        }
        if ty != value.atomic_type() {
            return Err(GraphError::Observation(format!(
                "node {} has type {}, observed value has type {}",
                id,
                ty,
                value.atomic_type()
            )));
        }
        value
            .validate_domain()
            .map_err(|e| GraphError::Observation(format!("node {}: {}", id, e)))?;
        self.check_static_support(id, &value)?;
        self.observations.insert(id, value);
        Ok(())
    }

    /// Registers a query on a valued node and returns its stable index.
    ///
    /// Re-querying a node returns the index assigned to it the first time.
    /// Distribution nodes carry no realized value and cannot be queried.
    pub fn query(&mut self, id: NodeId) -> Result<usize, GraphError> {
        let node = self
            .node(id)
            .ok_or_else(|| GraphError::Query(format!("unknown node {}", id)))?;
        if !node.is_valued() {
            return Err(GraphError::Query(format!(
                "node {} is a distribution and carries no sampled value",
                id
            )));
        }
        if let Some(&index) = self.query_index.get(&id) {
            return Ok(index);
        }
        let index = self.queries.len();
        self.queries.push(id);
        self.query_index.insert(id, index);
        Ok(index)
    }

    /// The constant payload of `id`, if it names a constant node.
    pub(crate) fn constant_value(&self, id: NodeId) -> Option<&Value> {
        match &self.node(id)?.kind {
            NodeKind::Constant { value } => Some(value),
            _ => None,
        }
    }

    fn push_node(&mut self, kind: NodeKind, ty: Option<AtomicType>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData { id, kind, ty });
        id
    }

    fn operator_result_type(
        &self,
        op: OperatorType,
        inputs: &[NodeId],
    ) -> Result<AtomicType, GraphError> {
        match op {
            OperatorType::Sample => {
                let dist = self.single_input(op, inputs)?;
                match &self.input_node(op, dist)?.kind {
                    NodeKind::Distribution { sample_type, .. } => Ok(*sample_type),
                    _ => Err(GraphError::Construction(format!(
                        "{} input must be a distribution node, node {} is not",
                        op, dist
                    ))),
                }
            }
            OperatorType::IidSample => {
                if inputs.len() != 2 {
                    return Err(GraphError::Construction(format!(
                        "{} takes a distribution node and a count node, got {} input(s)",
                        op,
                        inputs.len()
                    )));
                }
                let sample_type = match &self.input_node(op, inputs[0])?.kind {
                    NodeKind::Distribution { sample_type, .. } => *sample_type,
                    _ => {
                        return Err(GraphError::Construction(format!(
                            "{} input must be a distribution node, node {} is not",
                            op, inputs[0]
                        )));
                    }
                };
                let count = match self.constant_value(inputs[1]) {
                    Some(Value::Natural(n)) => *n,
                    _ => {
                        return Err(GraphError::Construction(format!(
                            "{} count must be a constant natural node, node {} is not",
                            op, inputs[1]
                        )));
                    }
                };
                if count == 0 {
                    return Err(GraphError::Construction(format!(
                        "{} count must be at least 1",
                        op
                    )));
                }
                sample_type.vector_of().ok_or_else(|| {
                    GraphError::Construction(format!(
                        "{} cannot vectorize sample type {}",
                        op, sample_type
                    ))
                })
            }
            _ => {
                let mut types = Vec::with_capacity(inputs.len());
                for input in inputs {
                    let node = self.input_node(op, *input)?;
                    match node.ty {
                        Some(ty) => types.push(ty),
                        None => {
                            return Err(GraphError::Construction(format!(
                                "{} input must be a valued node, node {} is a distribution",
                                op, input
                            )));
                        }
                    }
                }
                self.deterministic_result_type(op, &types)
            }
        }
    }

    fn deterministic_result_type(
        &self,
        op: OperatorType,
        types: &[AtomicType],
    ) -> Result<AtomicType, GraphError> {
        use AtomicType::{Natural, PosReal, Probability, Real};
        match (op, types) {
            (OperatorType::ToReal, [Natural | Real | PosReal | Probability]) => Ok(Real),
            (OperatorType::ToPosReal, [Natural | PosReal | Probability]) => Ok(PosReal),
            (OperatorType::Complement, [Probability]) => Ok(Probability),
            (OperatorType::Negate, [Real]) => Ok(Real),
            (OperatorType::Exp, [Real]) => Ok(PosReal),
            (OperatorType::Log, [PosReal]) => Ok(Real),
            (OperatorType::Add, [first @ (Real | PosReal), rest @ ..]) if !rest.is_empty() => {
                self.homogeneous(op, *first, rest)
            }
            (OperatorType::Multiply, [first @ (Real | PosReal | Probability), rest @ ..])
                if !rest.is_empty() =>
            {
                self.homogeneous(op, *first, rest)
            }
            _ => Err(GraphError::Construction(format!(
                "{} cannot be applied to inputs of type [{}]",
                op,
                types
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    fn homogeneous(
        &self,
        op: OperatorType,
        first: AtomicType,
        rest: &[AtomicType],
    ) -> Result<AtomicType, GraphError> {
        for ty in rest {
            if *ty != first {
                return Err(GraphError::Construction(format!(
                    "{} inputs must share one type, got {} and {}",
                    op, first, ty
                )));
            }
        }
        Ok(first)
    }

    fn single_input(&self, op: OperatorType, inputs: &[NodeId]) -> Result<NodeId, GraphError> {
        match inputs {
            [only] => Ok(*only),
            _ => Err(GraphError::Construction(format!(
                "{} takes exactly one input, got {}",
                op,
                inputs.len()
            ))),
        }
    }

    fn input_node(&self, op: OperatorType, id: NodeId) -> Result<&NodeData, GraphError> {
        self.node(id).ok_or_else(|| {
            GraphError::Construction(format!("{} references unknown node {}", op, id))
        })
    }

    /// Instantiates the distribution behind `dist_id` when every parameter
    /// is a constant; `None` when parameters are themselves random.
    pub(crate) fn static_distribution(&self, dist_id: NodeId) -> Option<Box<dyn Distribution>> {
        let node = self.node(dist_id)?;
        let (family, sample_type, params) = match &node.kind {
            NodeKind::Distribution {
                family,
                sample_type,
                params,
            } => (*family, *sample_type, params),
            _ => return None,
        };
        let values: Option<Vec<Value>> = params
            .iter()
            .map(|p| self.constant_value(*p).cloned())
            .collect();
        make_distribution(family, sample_type, &values?).ok()
    }

    // Rejects evidence no realization can produce, when the target's
    // distribution is statically known.
    fn check_static_support(&self, id: NodeId, value: &Value) -> Result<(), GraphError> {
        let node = match self.node(id) {
            Some(node) => node,
            None => return Ok(()),
        };
        let (op, inputs) = match &node.kind {
            NodeKind::Operator { op, inputs } if op.is_stochastic() => (*op, inputs),
            _ => return Ok(()),
        };
        // The iid count is a constant by construction, so length drift is
        // checkable even when the distribution's parameters are random.
        if op == OperatorType::IidSample {
            let count = inputs
                .get(1)
                .and_then(|c| self.constant_value(*c))
                .and_then(Value::as_natural);
            if let (Some(count), Some(len)) = (count, value.vector_len()) {
                if len as u64 != count {
                    return Err(GraphError::Observation(format!(
                        "node {}: observed vector has {} element(s), expected {}",
                        id, len, count
                    )));
                }
            }
        }
        let dist_id = match inputs.first() {
            Some(dist_id) => *dist_id,
            None => return Ok(()),
        };
        let dist = match self.static_distribution(dist_id) {
            Some(dist) => dist,
            None => return Ok(()),
        };
        match op {
            OperatorType::Sample => {
                if !dist.supports(value) {
                    return Err(GraphError::Observation(format!(
                        "node {}: value {} lies outside the support of its distribution",
                        id, value
                    )));
                }
            }
            OperatorType::IidSample => {
                if let Some(elements) = value.elements() {
                    for element in &elements {
                        if !dist.supports(element) {
                            return Err(GraphError::Observation(format!(
                                "node {}: element {} lies outside the support of its distribution",
                                id, element
                            )));
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
