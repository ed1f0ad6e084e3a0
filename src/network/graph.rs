use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::fmt;

use super::layer::Layer;
use super::node::{Arc, ArcId, Node, NodeId, NodeRef};
use crate::activations::leaky_relu;
use crate::error::{QGraphError, Result};

/// A fully connected feed-forward network stored as an explicit graph.
///
/// Layers own their nodes; every arc lives once in `arcs` and is referenced by
/// index from both of its endpoints. Two graphs built from the same layer
/// sizes have identical arc arenas, which is what weight copying and gradient
/// accumulation rely on.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    layers: Vec<Layer>,
    arcs: Vec<Arc>,
    next_node_id: u64,
}

impl Graph {
    /// Bias given to every bias-carrying layer by [`Graph::init_weights_and_biases`].
    pub const DEFAULT_BIAS: f64 = 0.1;

    /// Build a network with one layer per entry of `layer_sizes`.
    ///
    /// Every layer but the last carries a bias. Biases and arc weights start
    /// at zero; call [`Graph::init_weights_and_biases`] before training.
    pub fn new(layer_sizes: &[usize]) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(QGraphError::invalid_parameter(
                "layer_sizes".to_string(),
                format!("need at least an input and an output layer, got {} layer(s)", layer_sizes.len()),
            ));
        }
        if let Some(position) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(QGraphError::invalid_parameter(
                "layer_sizes".to_string(),
                format!("layer {} has no neurons", position),
            ));
        }

        let mut graph = Graph {
            layers: Vec::with_capacity(layer_sizes.len()),
            arcs: Vec::new(),
            next_node_id: 1,
        };
        graph.create_nodes(layer_sizes);
        graph.create_arcs();
        Ok(graph)
    }

    /// Number of arcs a graph with these layer sizes has, or `None` if it
    /// overflows `usize`.
    pub fn arc_count_for(layer_sizes: &[usize]) -> Option<usize> {
        layer_sizes
            .windows(2)
            .try_fold(0usize, |total, pair| pair[0].checked_mul(pair[1]).and_then(|n| total.checked_add(n)))
    }

    fn create_nodes(&mut self, layer_sizes: &[usize]) {
        for &size in layer_sizes {
            let mut layer = Layer::new();
            for _ in 0..size {
                let id = self.allocate_node_id();
                layer.add_node(Node::new(id, 0.0));
            }
            layer.set_bias(0.0);
            self.layers.push(layer);
        }
        if let Some(output) = self.layers.last_mut() {
            output.remove_bias();
        }
    }

    fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Connect every neuron to every neuron of the previous layer with weight 0.
    fn create_arcs(&mut self) {
        for layer_index in 1..self.layers.len() {
            for neuron_index in 0..self.layers[layer_index].len() {
                for previous_index in 0..self.layers[layer_index - 1].len() {
                    let from = NodeRef::new(layer_index - 1, previous_index);
                    let to = NodeRef::new(layer_index, neuron_index);
                    let id = ArcId(self.arcs.len());
                    self.arcs.push(Arc::with_weight(from, to, 0.0));
                    self.layers[layer_index - 1].nodes[previous_index].add_outgoing(id);
                    self.layers[layer_index].nodes[neuron_index].add_incoming(id);
                }
            }
        }
    }

    /// Reset biases to [`Graph::DEFAULT_BIAS`] and draw He-uniform weights
    /// using the thread-local RNG.
    pub fn init_weights_and_biases(&mut self) {
        let mut rng = rand::thread_rng();
        self.init_weights_and_biases_with(&mut rng);
    }

    /// Same as [`Graph::init_weights_and_biases`] with a caller supplied RNG.
    ///
    /// Each incoming arc of a neuron is drawn from `[-L, L)` with
    /// `L = sqrt(6 / fan_in)`. The input layer has no incoming arcs.
    pub fn init_weights_and_biases_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Graph { layers, arcs, .. } = self;
        for layer in layers.iter_mut() {
            if layer.has_bias() {
                layer.set_bias(Self::DEFAULT_BIAS);
            }
        }
        for layer in layers.iter().skip(1) {
            for neuron in layer.nodes() {
                let limit = (6.0 / neuron.fan_in() as f64).sqrt();
                let distribution = Uniform::new(-limit, limit);
                for arc in neuron.incoming() {
                    arcs[arc.0].weight = distribution.sample(rng);
                }
            }
        }
    }

    /// Copy a state vector into the input layer, position by position.
    pub fn pass_state<'a>(&mut self, state: impl Into<ArrayView1<'a, f64>>) -> Result<()> {
        let state = state.into();
        let input = &mut self.layers[0];
        if state.len() != input.len() {
            return Err(QGraphError::dimension_mismatch(
                format!("{} input values", input.len()),
                format!("{} input values", state.len()),
            ));
        }
        for (node, &value) in input.nodes.iter_mut().zip(state.iter()) {
            node.value = value;
        }
        Ok(())
    }

    /// Recompute every non-input neuron from the current input layer values.
    pub fn forward_propagation(&mut self) {
        for layer_index in 1..self.layers.len() {
            let bias = self.layers[layer_index - 1].bias().unwrap_or(0.0);
            for neuron_index in 0..self.layers[layer_index].len() {
                let sum = bias + self.weighted_input(NodeRef::new(layer_index, neuron_index));
                self.layers[layer_index].nodes[neuron_index].value = leaky_relu(sum);
            }
        }
    }

    fn weighted_input(&self, node: NodeRef) -> f64 {
        self.layers[node.layer].nodes[node.index]
            .incoming()
            .iter()
            .map(|arc| {
                let arc = &self.arcs[arc.0];
                arc.weight * self.node_value(arc.from)
            })
            .sum()
    }

    /// Pass `state` to the input layer, propagate, and return the output layer.
    pub fn predict<'a>(&mut self, state: impl Into<ArrayView1<'a, f64>>) -> Result<Array1<f64>> {
        self.pass_state(state)?;
        self.forward_propagation();
        Ok(self.output_values())
    }

    /// Overwrite this graph's weights and biases with those of `other`.
    pub fn copy_weights_and_biases(&mut self, other: &Graph) -> Result<()> {
        self.ensure_congruent(other)?;
        for (arc, source) in self.arcs.iter_mut().zip(other.arcs.iter()) {
            arc.weight = source.weight;
        }
        for (layer, source) in self.layers.iter_mut().zip(other.layers.iter()) {
            if let Some(bias) = source.bias() {
                layer.set_bias(bias);
            }
        }
        Ok(())
    }

    /// Same layer sizes and the same bias flags.
    pub fn is_congruent(&self, other: &Graph) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(other.layers.iter())
                .all(|(a, b)| a.len() == b.len() && a.has_bias() == b.has_bias())
    }

    pub(crate) fn ensure_congruent(&self, other: &Graph) -> Result<()> {
        if self.is_congruent(other) {
            Ok(())
        } else {
            Err(QGraphError::TopologyMismatch {
                expected: self.layer_sizes(),
                actual: other.layer_sizes(),
            })
        }
    }

    /// A graph of the same shape with every weight and bias set to zero.
    pub fn zeroed_like(&self) -> Graph {
        let mut graph = self.clone();
        for arc in graph.arcs.iter_mut() {
            arc.weight = 0.0;
        }
        for layer in graph.layers.iter_mut() {
            if layer.has_bias() {
                layer.set_bias(0.0);
            }
        }
        graph
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::len).collect()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].len()
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    pub fn output_size(&self) -> usize {
        self.output_layer().len()
    }

    pub fn node(&self, node: NodeRef) -> Option<&Node> {
        self.layers.get(node.layer).and_then(|layer| layer.node(node.index))
    }

    pub(crate) fn node_value(&self, node: NodeRef) -> f64 {
        self.layers[node.layer].nodes[node.index].value
    }

    /// Weights of `node`'s incoming arcs, in arc order.
    pub fn incoming_weights<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = f64> + 'a {
        node.incoming().iter().map(move |arc| self.arcs[arc.0].weight)
    }

    /// Weights of `node`'s outgoing arcs, in arc order.
    pub fn outgoing_weights<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = f64> + 'a {
        node.outgoing().iter().map(move |arc| self.arcs[arc.0].weight)
    }

    pub fn arc(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.get(id.0)
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub(crate) fn arcs_mut(&mut self) -> &mut [Arc] {
        &mut self.arcs
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Biases of the bias-carrying layers, in layer order.
    pub fn biases(&self) -> Vec<f64> {
        self.layers.iter().filter_map(Layer::bias).collect()
    }

    pub fn output_values(&self) -> Array1<f64> {
        self.output_layer().values().collect()
    }

    /// Activation of output neuron `action` after the last forward pass.
    pub fn output_value(&self, action: usize) -> Result<f64> {
        self.output_layer()
            .node(action)
            .map(|node| node.value)
            .ok_or(QGraphError::InvalidAction {
                action,
                max_actions: self.output_size(),
            })
    }

    /// The greedy Q-value: the largest output activation.
    pub fn biggest_output_value(&self) -> f64 {
        self.output_layer()
            .values()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the largest output activation; the first index wins ties.
    pub fn best_action(&self) -> usize {
        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (index, value) in self.output_layer().values().enumerate() {
            if value > best_value {
                best = index;
                best_value = value;
            }
        }
        best
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NodeID:NodeValue:ArcWeight(opt)")?;
        for (number, layer) in self.layers.iter().enumerate() {
            writeln!(f, "\nLayer number: {}", number + 1)?;
            if let Some(bias) = layer.bias() {
                writeln!(f, "Layer bias value: {:.2}", bias)?;
            }
            for node in layer.nodes() {
                writeln!(f, "Node: {}:{:.2}", node.id(), node.value)?;
                write!(f, "In going Nodes: ")?;
                for arc in node.incoming() {
                    let arc = &self.arcs[arc.0];
                    let from = &self.layers[arc.from.layer].nodes[arc.from.index];
                    write!(f, "{}:{:.2}:{:.2}, ", from.id(), from.value, arc.weight)?;
                }
                write!(f, "\nOut going Nodes: ")?;
                for arc in node.outgoing() {
                    let arc = &self.arcs[arc.0];
                    let to = &self.layers[arc.to.layer].nodes[arc.to.index];
                    write!(f, "{}:{:.2}:{:.2}, ", to.id(), to.value, arc.weight)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
