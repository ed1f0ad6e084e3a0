pub mod test_graph;
pub mod test_persistence;

use crate::network::Graph;

/// Build a graph and overwrite its arc arena and biases.
pub(crate) fn graph_with(layer_sizes: &[usize], weights: &[f64], biases: &[f64]) -> Graph {
    let mut graph = Graph::new(layer_sizes).unwrap();
    assert_eq!(graph.arc_count(), weights.len());
    for (arc, &weight) in graph.arcs_mut().iter_mut().zip(weights) {
        arc.weight = weight;
    }
    let mut biases = biases.iter();
    for layer in graph.layers_mut() {
        if layer.has_bias() {
            layer.set_bias(*biases.next().unwrap());
        }
    }
    graph
}
