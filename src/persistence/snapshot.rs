use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{QGraphError, Result};
use crate::network::Graph;

/// Compact serde form of a graph's parameters.
///
/// Weights are stored in arc-arena order, which is fixed by the layer sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub layer_sizes: Vec<usize>,
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl GraphSnapshot {
    pub fn capture(graph: &Graph) -> Self {
        GraphSnapshot {
            layer_sizes: graph.layer_sizes(),
            weights: graph.arcs().iter().map(|arc| arc.weight).collect(),
            biases: graph.biases(),
        }
    }

    pub fn restore(&self) -> Result<Graph> {
        let arc_count = Graph::arc_count_for(&self.layer_sizes).ok_or_else(|| {
            QGraphError::invalid_parameter("layer_sizes", "arc count overflows usize")
        })?;
        if self.weights.len() != arc_count {
            return Err(QGraphError::dimension_mismatch(
                format!("{} weights", arc_count),
                format!("{} weights", self.weights.len()),
            ));
        }
        let bias_count = self.layer_sizes.len().saturating_sub(1);
        if self.biases.len() != bias_count {
            return Err(QGraphError::dimension_mismatch(
                format!("{} biases", bias_count),
                format!("{} biases", self.biases.len()),
            ));
        }

        let mut graph = Graph::new(&self.layer_sizes)?;
        for (arc, &weight) in graph.arcs_mut().iter_mut().zip(self.weights.iter()) {
            arc.weight = weight;
        }
        let mut biases = self.biases.iter();
        for layer in graph.layers_mut() {
            if layer.has_bias() {
                if let Some(&bias) = biases.next() {
                    layer.set_bias(bias);
                }
            }
        }
        Ok(graph)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Write a bincode checkpoint of `graph`.
pub fn save_snapshot<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    let serialized = bincode::serialize(&GraphSnapshot::capture(graph))?;
    fs::write(path, serialized)?;
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let data = fs::read(path)?;
    let snapshot: GraphSnapshot = bincode::deserialize(&data)?;
    snapshot.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_capture_restore() {
        let mut graph = Graph::new(&[3, 4, 2]).unwrap();
        graph.init_weights_and_biases_with(&mut StdRng::seed_from_u64(11));
        let restored = GraphSnapshot::capture(&graph).restore().unwrap();
        assert_eq!(restored.arcs(), graph.arcs());
        assert_eq!(restored.biases(), graph.biases());
    }

    #[test]
    fn test_restore_rejects_wrong_weight_count() {
        let snapshot = GraphSnapshot {
            layer_sizes: vec![2, 1],
            weights: vec![0.5],
            biases: vec![0.1],
        };
        assert!(matches!(snapshot.restore(), Err(QGraphError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_restore_checks_counts_before_building() {
        let snapshot = GraphSnapshot {
            layer_sizes: vec![100_000, 100_000],
            weights: vec![0.0; 4],
            biases: vec![0.1],
        };
        assert!(matches!(snapshot.restore(), Err(QGraphError::DimensionMismatch { .. })));

        let overflowing = GraphSnapshot {
            layer_sizes: vec![usize::MAX, 2],
            weights: Vec::new(),
            biases: vec![0.1],
        };
        assert!(matches!(overflowing.restore(), Err(QGraphError::InvalidParameter { .. })));
    }

    #[test]
    fn test_json_form() {
        let graph = Graph::new(&[1, 1]).unwrap();
        let json = GraphSnapshot::capture(&graph).to_json().unwrap();
        let snapshot = GraphSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.layer_sizes, vec![1, 1]);
        assert_eq!(snapshot.weights, vec![0.0]);
    }

    #[test]
    fn test_bincode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.bin");
        let mut graph = Graph::new(&[2, 2]).unwrap();
        graph.init_weights_and_biases();
        save_snapshot(&graph, &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.arcs(), graph.arcs());
    }
}
