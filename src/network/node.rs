use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier handed out by a [`Graph`](super::Graph) when it creates a node.
/// Identifiers are never reused within one graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of an arc in the graph's arc arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArcId(pub usize);

/// Position of a node: layer index and neuron index within that layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub layer: usize,
    pub index: usize,
}

impl NodeRef {
    pub fn new(layer: usize, index: usize) -> Self {
        NodeRef { layer, index }
    }
}

/// A weighted directed edge between two nodes.
///
/// The arc lives once in the graph's arena; the source node lists it as
/// outgoing and the destination node lists it as incoming, so a weight change
/// is seen from both ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Arc {
    pub from: NodeRef,
    pub to: NodeRef,
    pub weight: f64,
}

impl Arc {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn new(from: NodeRef, to: NodeRef) -> Self {
        Self::with_weight(from, to, Self::DEFAULT_WEIGHT)
    }

    pub fn with_weight(from: NodeRef, to: NodeRef, weight: f64) -> Self {
        Arc { from, to, weight }
    }
}

/// A neuron: an activation value plus the arcs touching it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    pub value: f64,
    outgoing: Vec<ArcId>,
    incoming: Vec<ArcId>,
}

impl Node {
    pub fn new(id: NodeId, value: f64) -> Self {
        Node {
            id,
            value,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Arcs whose source is this node, in creation order.
    pub fn outgoing(&self) -> &[ArcId] {
        &self.outgoing
    }

    /// Arcs whose destination is this node, in creation order.
    pub fn incoming(&self) -> &[ArcId] {
        &self.incoming
    }

    pub fn fan_in(&self) -> usize {
        self.incoming.len()
    }

    pub fn fan_out(&self) -> usize {
        self.outgoing.len()
    }

    pub(crate) fn add_outgoing(&mut self, arc: ArcId) {
        self.outgoing.push(arc);
    }

    pub(crate) fn add_incoming(&mut self, arc: ArcId) {
        self.incoming.push(arc);
    }
}
