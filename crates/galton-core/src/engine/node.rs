//! Node storage types for the model graph.

use std::fmt;

use smallvec::SmallVec;

use galton_dists::{AtomicType, DistributionType, Value};

/// A unique identifier for a node in the model graph.
///
/// Ids are assigned densely in insertion order, so a node's id is also its
/// position in the evaluation sequence. NodeId implements Ord/PartialOrd for
/// stable, deterministic iteration.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The operator vocabulary.
///
/// `Sample` and `IidSample` are the stochastic operators; they alone may
/// carry observations. The rest are pure functions of their inputs, typed at
/// construction time by [`Graph::add_operator`](crate::engine::graph::Graph::add_operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorType {
    /// One draw from a distribution node.
    Sample,
    /// A fixed number of independent draws, packed into a vector value.
    IidSample,
    /// Widen a numeric scalar to a real.
    ToReal,
    /// Reinterpret a natural, positive real, or probability as a positive
    /// real; evaluation fails on zero.
    ToPosReal,
    /// 1 - p on probabilities.
    Complement,
    /// Negation on reals.
    Negate,
    /// e^x, real to positive real.
    Exp,
    /// ln x, positive real to real.
    Log,
    /// Sum of two or more same-typed reals or positive reals.
    Add,
    /// Product of two or more same-typed reals, positive reals, or
    /// probabilities.
    Multiply,
}

impl OperatorType {
    /// True for the operators that draw from a distribution.
    pub fn is_stochastic(self) -> bool {
        matches!(self, Self::Sample | Self::IidSample)
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sample => "sample",
            Self::IidSample => "iid_sample",
            Self::ToReal => "to_real",
            Self::ToPosReal => "to_pos_real",
            Self::Complement => "complement",
            Self::Negate => "negate",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Add => "add",
            Self::Multiply => "multiply",
        };
        write!(f, "{}", name)
    }
}

/// What a node is: a constant, a distribution, or an operator application.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A fixed value.
    Constant { value: Value },
    /// A distribution family bound to parameter nodes. Distribution nodes
    /// carry no realized value; they are sampled through `Sample` and
    /// `IidSample` operators.
    Distribution {
        family: DistributionType,
        sample_type: AtomicType,
        params: SmallVec<[NodeId; 2]>,
    },
    /// An operator applied to earlier nodes.
    Operator {
        op: OperatorType,
        inputs: SmallVec<[NodeId; 2]>,
    },
}

/// A stored node: id, kind, and statically derived result type.
///
/// `ty` is `None` exactly for distribution nodes, which are the only nodes
/// without a realized value.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: NodeId,
    pub kind: NodeKind,
    pub ty: Option<AtomicType>,
}

impl NodeData {
    /// True if this node takes a value during evaluation.
    pub fn is_valued(&self) -> bool {
        self.ty.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_order_by_payload() {
        let mut ids = vec![NodeId(5), NodeId(0), NodeId(2)];
        ids.sort();
        assert_eq!(ids, vec![NodeId(0), NodeId(2), NodeId(5)]);
    }

    #[test]
    fn only_sampling_operators_are_stochastic() {
        assert!(OperatorType::Sample.is_stochastic());
        assert!(OperatorType::IidSample.is_stochastic());
        for op in [
            OperatorType::ToReal,
            OperatorType::ToPosReal,
            OperatorType::Complement,
            OperatorType::Negate,
            OperatorType::Exp,
            OperatorType::Log,
            OperatorType::Add,
            OperatorType::Multiply,
        ] {
            assert!(!op.is_stochastic(), "{} should be deterministic", op);
        }
    }
}
