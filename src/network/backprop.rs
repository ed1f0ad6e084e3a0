//! Gradient accumulation and the parameter update.
//!
//! Gradients are summed into a scratch [`Graph`] of the same shape: its arc
//! weights hold the accumulated weight gradients and its biases the
//! accumulated bias gradients. The delta recurrence is layer-scalar:
//!
//! * output: `d = 2(actual - target) * f'(a_out)` for the chosen action only;
//! * the layer below the output: `d = sum(d_out * w)` over the action node's
//!   incoming arcs, with no activation derivative;
//! * every earlier non-input layer: `d = sum_j f'(a_j) * sum(d_next * w)` over
//!   neuron `j`'s outgoing arcs.
//!
//! Each layer delta is added to the bias feeding that layer and, multiplied
//! by the source activation, to every incoming arc of every neuron in it
//! (the output layer only updates the action node's arcs). Persisted networks
//! and trained values depend on this exact recurrence.

use super::graph::Graph;
use crate::activations::{leaky_relu_derivative, squared_error_derivative};
use crate::error::{QGraphError, Result};

impl Graph {
    /// Accumulate the gradient of `(target - actual)^2` for output `action`
    /// into `gradient`.
    ///
    /// The node values of `self` must come from a forward pass on the state
    /// that produced `actual`.
    pub fn backpropagation(
        &self,
        gradient: &mut Graph,
        actual: f64,
        target: f64,
        action: usize,
    ) -> Result<()> {
        self.ensure_congruent(gradient)?;
        let output_index = self.layers().len() - 1;
        let output_node = self.layers()[output_index]
            .node(action)
            .ok_or(QGraphError::InvalidAction {
                action,
                max_actions: self.output_size(),
            })?;

        let mut delta = squared_error_derivative(actual, target) * leaky_relu_derivative(output_node.value);
        add_to_previous_layer_bias(gradient, output_index, delta);
        for arc in output_node.incoming() {
            let source = self.node_value(self.arcs()[arc.0].from);
            gradient.arcs_mut()[arc.0].weight += delta * source;
        }

        let previous_delta = delta;
        delta = output_node
            .incoming()
            .iter()
            .map(|arc| previous_delta * self.arcs()[arc.0].weight)
            .sum();
        let layer_index = output_index - 1;
        add_to_previous_layer_bias(gradient, layer_index, delta);
        self.accumulate_layer_weights(gradient, delta, layer_index);

        for layer_index in (1..output_index - 1).rev() {
            let previous_delta = delta;
            delta = self.layers()[layer_index]
                .nodes()
                .iter()
                .map(|neuron| {
                    let downstream: f64 = neuron
                        .outgoing()
                        .iter()
                        .map(|arc| previous_delta * self.arcs()[arc.0].weight)
                        .sum();
                    downstream * leaky_relu_derivative(neuron.value)
                })
                .sum();
            add_to_previous_layer_bias(gradient, layer_index, delta);
            self.accumulate_layer_weights(gradient, delta, layer_index);
        }
        Ok(())
    }

    /// Add `delta * source activation` to every incoming arc of every neuron
    /// in `layer_index`.
    fn accumulate_layer_weights(&self, gradient: &mut Graph, delta: f64, layer_index: usize) {
        for neuron in self.layers()[layer_index].nodes() {
            for arc in neuron.incoming() {
                let source = self.node_value(self.arcs()[arc.0].from);
                gradient.arcs_mut()[arc.0].weight += delta * source;
            }
        }
    }

    /// Apply an accumulated gradient: `p <- p - learning_rate * (g / batch_size)`
    /// for every weight and every bias.
    pub fn update_weights(&mut self, gradient: &Graph, batch_size: usize, learning_rate: f64) -> Result<()> {
        if batch_size == 0 {
            return Err(QGraphError::invalid_parameter(
                "batch_size",
                "cannot average a gradient over zero experiences",
            ));
        }
        self.ensure_congruent(gradient)?;
        let batch_size = batch_size as f64;

        for (arc, accumulated) in self.arcs_mut().iter_mut().zip(gradient.arcs().iter()) {
            arc.weight -= learning_rate * (accumulated.weight / batch_size);
        }
        for (layer, accumulated) in self.layers_mut().iter_mut().zip(gradient.layers().iter()) {
            if let (Some(bias), Some(accumulated)) = (layer.bias(), accumulated.bias()) {
                layer.set_bias(bias - learning_rate * (accumulated / batch_size));
            }
        }
        Ok(())
    }
}

/// The bias of layer `layer_index - 1` feeds `layer_index`; the input layer
/// has nothing before it.
fn add_to_previous_layer_bias(gradient: &mut Graph, layer_index: usize, delta: f64) {
    if layer_index >= 1 {
        gradient.layers_mut()[layer_index - 1].add_to_bias(delta);
    }
}
