use approx::assert_abs_diff_eq;
use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use super::graph_with;
use crate::activations::leaky_relu;
use crate::error::QGraphError;
use crate::network::{ArcId, Graph, NodeRef};

#[test]
fn test_graph_creation() {
    let graph = Graph::new(&[4, 16, 16, 5]).unwrap();
    assert_eq!(graph.layer_sizes(), vec![4, 16, 16, 5]);
    assert_eq!(graph.arc_count(), 4 * 16 + 16 * 16 + 16 * 5);
    assert_eq!(graph.input_size(), 4);
    assert_eq!(graph.output_size(), 5);

    // Every layer but the output carries a zero bias
    assert_eq!(graph.biases(), vec![0.0, 0.0, 0.0]);
    assert!(!graph.output_layer().has_bias());
    assert!(graph.arcs().iter().all(|arc| arc.weight == 0.0));
}

#[test]
fn test_graph_rejects_bad_sizes() {
    assert!(matches!(Graph::new(&[3]), Err(QGraphError::InvalidParameter { .. })));
    assert!(matches!(Graph::new(&[]), Err(QGraphError::InvalidParameter { .. })));
    assert!(matches!(Graph::new(&[2, 0, 1]), Err(QGraphError::InvalidParameter { .. })));
}

#[test]
fn test_node_ids_unique() {
    let graph = Graph::new(&[3, 5, 2]).unwrap();
    let ids: HashSet<_> = graph
        .layers()
        .iter()
        .flat_map(|layer| layer.nodes().iter().map(|node| node.id()))
        .collect();
    assert_eq!(ids.len(), 10);
}

#[test]
fn test_arcs_visible_from_both_ends() {
    let graph = Graph::new(&[2, 3, 2]).unwrap();
    for (index, arc) in graph.arcs().iter().enumerate() {
        let id = ArcId(index);
        assert_eq!(arc.to.layer, arc.from.layer + 1);
        assert!(graph.node(arc.from).unwrap().outgoing().contains(&id));
        assert!(graph.node(arc.to).unwrap().incoming().contains(&id));
    }

    let hidden = graph.node(NodeRef::new(1, 0)).unwrap();
    assert_eq!(hidden.fan_in(), 2);
    assert_eq!(hidden.fan_out(), 2);
}

#[test]
fn test_init_bounds() {
    let mut graph = Graph::new(&[4, 8, 3]).unwrap();
    graph.init_weights_and_biases_with(&mut StdRng::seed_from_u64(5));
    assert_eq!(graph.biases(), vec![Graph::DEFAULT_BIAS, Graph::DEFAULT_BIAS]);

    for arc in graph.arcs() {
        let fan_in = graph.node(arc.to).unwrap().fan_in() as f64;
        let limit = (6.0 / fan_in).sqrt();
        assert!(arc.weight >= -limit && arc.weight < limit);
    }
    assert!(graph.arcs().iter().any(|arc| arc.weight != 0.0));
}

#[test]
fn test_seeded_init_is_deterministic() {
    let mut a = Graph::new(&[3, 6, 2]).unwrap();
    let mut b = Graph::new(&[3, 6, 2]).unwrap();
    a.init_weights_and_biases_with(&mut StdRng::seed_from_u64(42));
    b.init_weights_and_biases_with(&mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}

#[test]
fn test_hand_computed_forward_pass() {
    let mut graph = graph_with(
        &[2, 3, 1],
        &[0.5, 0.25, -1.0, 0.5, 1.0, 1.0, 1.0, 2.0, -1.0],
        &[0.1, -0.2],
    );
    let output = graph.predict(&array![1.0, -1.0]).unwrap();

    let hidden: Vec<f64> = graph.layers()[1].values().collect();
    assert_abs_diff_eq!(hidden[0], 0.35, epsilon = 1e-12);
    assert_abs_diff_eq!(hidden[1], -0.014, epsilon = 1e-12);
    assert_abs_diff_eq!(hidden[2], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(output[0], 0.022, epsilon = 1e-12);
}

#[test]
fn test_seeded_forward_pass_matches_arcs() {
    let mut graph = Graph::new(&[2, 3, 1]).unwrap();
    graph.init_weights_and_biases_with(&mut StdRng::seed_from_u64(42));
    let state = [1.0, -1.0];
    let output = graph.predict(&array![1.0, -1.0]).unwrap();

    let biases = graph.biases();
    let mut hidden = [biases[0]; 3];
    for arc in graph.arcs().iter().filter(|arc| arc.to.layer == 1) {
        hidden[arc.to.index] += arc.weight * state[arc.from.index];
    }
    let hidden = hidden.map(leaky_relu);
    let mut expected = biases[1];
    for arc in graph.arcs().iter().filter(|arc| arc.to.layer == 2) {
        expected += arc.weight * hidden[arc.from.index];
    }
    let expected = leaky_relu(expected);

    assert_eq!(output.len(), 1);
    assert!(output[0].is_finite());
    assert_abs_diff_eq!(output[0], expected, epsilon = 1e-12);
}

#[test]
fn test_forward_is_deterministic() {
    let mut graph = Graph::new(&[3, 5, 4]).unwrap();
    graph.init_weights_and_biases_with(&mut StdRng::seed_from_u64(1));
    let state = array![0.2, -0.7, 1.5];
    let first = graph.predict(&state).unwrap();
    let second = graph.predict(&state).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_pass_state_length_mismatch() {
    let mut graph = Graph::new(&[3, 2]).unwrap();
    assert!(matches!(
        graph.pass_state(&array![1.0, 2.0]),
        Err(QGraphError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_copy_gives_identical_outputs() {
    let mut source = Graph::new(&[4, 7, 3]).unwrap();
    source.init_weights_and_biases_with(&mut StdRng::seed_from_u64(9));
    let mut copy = Graph::new(&[4, 7, 3]).unwrap();
    copy.copy_weights_and_biases(&source).unwrap();

    let state = array![1.0, 0.0, -0.5, 2.0];
    assert_eq!(source.predict(&state).unwrap(), copy.predict(&state).unwrap());

    // The copy does not alias the source
    copy.arcs_mut()[0].weight += 1.0;
    assert_ne!(copy.arcs()[0].weight, source.arcs()[0].weight);
}

#[test]
fn test_copy_rejects_other_topology() {
    let source = Graph::new(&[4, 7, 3]).unwrap();
    let mut other = Graph::new(&[4, 6, 3]).unwrap();
    assert!(matches!(
        other.copy_weights_and_biases(&source),
        Err(QGraphError::TopologyMismatch { .. })
    ));
}

#[test]
fn test_best_action_first_wins_ties() {
    let mut graph = graph_with(&[1, 3], &[1.0, 2.0, 2.0], &[0.0]);
    graph.predict(&array![1.0]).unwrap();
    assert_eq!(graph.best_action(), 1);
    assert_eq!(graph.biggest_output_value(), 2.0);
    assert_eq!(graph.output_value(2).unwrap(), 2.0);
    assert!(matches!(graph.output_value(3), Err(QGraphError::InvalidAction { .. })));
}

#[test]
fn test_zeroed_like_keeps_shape() {
    let mut graph = Graph::new(&[2, 3, 2]).unwrap();
    graph.init_weights_and_biases();
    let zeroed = graph.zeroed_like();
    assert!(zeroed.is_congruent(&graph));
    assert!(zeroed.arcs().iter().all(|arc| arc.weight == 0.0));
    assert_eq!(zeroed.biases(), vec![0.0, 0.0]);
}

#[test]
fn test_display_dump() {
    let mut graph = graph_with(&[1, 1], &[0.5], &[0.25]);
    graph.predict(&array![2.0]).unwrap();
    let dump = graph.to_string();
    assert!(dump.starts_with("NodeID:NodeValue:ArcWeight(opt)"));
    assert!(dump.contains("Layer number: 1"));
    assert!(dump.contains("Layer bias value: 0.25"));
    assert!(dump.contains("Layer number: 2"));
}
