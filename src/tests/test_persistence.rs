use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::QGraphError;
use crate::network::Graph;
use crate::persistence::{
    decode_memory, decode_network, encode_memory, encode_network, load_memory, load_network,
    load_network_expecting, save_memory, save_network,
};
use crate::replay_memory::{Experience, ReplayMemory};

fn trained_like_graph(seed: u64) -> Graph {
    let mut graph = Graph::new(&[4, 6, 6, 3]).unwrap();
    graph.init_weights_and_biases_with(&mut StdRng::seed_from_u64(seed));
    graph
}

#[test]
fn test_network_encoding_is_idempotent() {
    let graph = trained_like_graph(21);
    let text = encode_network(&graph);
    let decoded = decode_network(&text).unwrap();
    assert_eq!(encode_network(&decoded), text);
}

#[test]
fn test_decoded_network_behaves_the_same() {
    let mut graph = trained_like_graph(8);
    let mut decoded = decode_network(&encode_network(&graph)).unwrap();
    assert_eq!(decoded.arcs(), graph.arcs());
    assert_eq!(decoded.biases(), graph.biases());

    let state = array![0.1, -0.4, 2.0, 0.0];
    assert_eq!(graph.predict(&state).unwrap(), decoded.predict(&state).unwrap());
}

#[test]
fn test_network_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("QNetwork.txt");
    let graph = trained_like_graph(2);
    save_network(&graph, &path).unwrap();

    let loaded = load_network(&path).unwrap();
    assert_eq!(loaded.arcs(), graph.arcs());

    assert!(matches!(
        load_network_expecting(&path, &[4, 6, 3]),
        Err(QGraphError::TopologyMismatch { .. })
    ));
}

#[test]
fn test_load_missing_network_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_network(dir.path().join("missing.txt")),
        Err(QGraphError::Io(_))
    ));
}

#[test]
fn test_memory_round_trip() {
    let mut memory = ReplayMemory::new();
    memory.enqueue(Experience::new(array![0.125, -3.5], 1, 0.3, array![1.0 / 3.0, 2.0], false));
    memory.enqueue(Experience::terminal(array![7.0, 8.0], 0, -10.0));

    let text = encode_memory(&memory);
    assert!(text.starts_with("7,8, 0 -10 0,0, True\n"));

    let decoded = decode_memory(&text, 100).unwrap();
    let before: Vec<&Experience> = memory.iter().collect();
    let restored: Vec<&Experience> = decoded.iter().collect();
    assert_eq!(before, restored);
    assert_eq!(decoded.capacity(), 100);
}

#[test]
fn test_memory_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Memories.txt");
    let mut memory = ReplayMemory::new();
    for i in 0..5 {
        memory.enqueue(Experience::new(array![i as f64], 0, 1.0, array![0.5], i == 4));
    }
    save_memory(&memory, &path).unwrap();
    let loaded = load_memory(&path, ReplayMemory::DEFAULT_CAPACITY).unwrap();
    assert_eq!(loaded.len(), 5);
    assert!(loaded.iter().next().unwrap().is_terminal());
}

#[test]
fn test_empty_memory_file() {
    let memory = decode_memory("", 10).unwrap();
    assert!(memory.is_empty());
    assert_eq!(encode_memory(&memory), "");
}
