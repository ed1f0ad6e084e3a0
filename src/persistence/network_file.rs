//! Line-oriented text format for a [`Graph`].
//!
//! ```text
//! 2 3 1 \n                         neuron count per layer
//! \n                               input neuron 0: incoming weights (none)
//! w w w \n                         input neuron 0: outgoing weights
//! ...                              two lines per neuron, layer by layer
//! 0.1 0.1                          biases of bias-carrying layers
//! ```
//!
//! Every token is followed by one space. Arcs appear twice (as outgoing of the
//! source and incoming of the destination); when decoding, the line read last
//! wins, which is always the incoming line of the destination.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{QGraphError, Result};
use crate::network::Graph;

pub fn encode_network(graph: &Graph) -> String {
    let mut out = String::new();
    push_line(&mut out, graph.layer_sizes());
    for layer in graph.layers() {
        for neuron in layer.nodes() {
            push_line(&mut out, graph.incoming_weights(neuron));
            push_line(&mut out, graph.outgoing_weights(neuron));
        }
    }
    push_tokens(&mut out, graph.biases());
    out
}

fn push_tokens<T: ToString>(out: &mut String, tokens: impl IntoIterator<Item = T>) {
    for token in tokens {
        out.push_str(&token.to_string());
        out.push(' ');
    }
}

fn push_line<T: ToString>(out: &mut String, tokens: impl IntoIterator<Item = T>) {
    push_tokens(out, tokens);
    out.push('\n');
}

/// Rebuild a graph from [`encode_network`] output.
///
/// The graph is constructed from the size line and initialised, then every
/// weight and bias is overwritten from the file.
pub fn decode_network(text: &str) -> Result<Graph> {
    let lines: Vec<&str> = text.lines().collect();
    let sizes = parse_layer_sizes(&lines)?;
    decode_body(&lines, &sizes)
}

/// Like [`decode_network`], but fails with [`QGraphError::TopologyMismatch`]
/// unless the recorded layer sizes equal `expected`.
pub fn decode_network_expecting(text: &str, expected: &[usize]) -> Result<Graph> {
    let lines: Vec<&str> = text.lines().collect();
    let sizes = parse_layer_sizes(&lines)?;
    if sizes != expected {
        return Err(QGraphError::TopologyMismatch {
            expected: expected.to_vec(),
            actual: sizes,
        });
    }
    decode_body(&lines, &sizes)
}

fn parse_layer_sizes(lines: &[&str]) -> Result<Vec<usize>> {
    let first = lines
        .first()
        .ok_or_else(|| QGraphError::parse(1, "missing layer size line"))?;
    parse_tokens(first, 1, "layer size")
}

fn decode_body(lines: &[&str], sizes: &[usize]) -> Result<Graph> {
    check_sizes_against_text(lines, sizes)?;
    let mut graph = Graph::new(sizes).map_err(|err| QGraphError::parse(1, err.to_string()))?;
    graph.init_weights_and_biases();

    let mut cursor = 1;
    for layer_index in 0..graph.layers().len() {
        for neuron_index in 0..graph.layers()[layer_index].len() {
            let neuron = &graph.layers()[layer_index].nodes()[neuron_index];
            let incoming = neuron.incoming().to_vec();
            let outgoing = neuron.outgoing().to_vec();

            for arcs in [incoming, outgoing] {
                let weights: Vec<f64> = read_line(lines, cursor, arcs.len(), "weight")?;
                for (arc, weight) in arcs.iter().zip(weights) {
                    graph.arcs_mut()[arc.0].weight = weight;
                }
                cursor += 1;
            }
        }
    }

    let bias_count = graph.layers().iter().filter(|layer| layer.has_bias()).count();
    let biases: Vec<f64> = read_line(lines, cursor, bias_count, "bias")?;
    let mut biases = biases.into_iter();
    for layer in graph.layers_mut() {
        if layer.has_bias() {
            if let Some(bias) = biases.next() {
                layer.set_bias(bias);
            }
        }
    }

    if let Some(offset) = lines[cursor + 1..].iter().position(|line| !line.trim().is_empty()) {
        return Err(QGraphError::parse(cursor + offset + 2, "unexpected content after bias line"));
    }
    Ok(graph)
}

/// Reject a size line that promises more neurons or arcs than the text can
/// describe, before anything is allocated for them.
fn check_sizes_against_text(lines: &[&str], sizes: &[usize]) -> Result<()> {
    let needed_lines = sizes
        .iter()
        .try_fold(0usize, |total, &size| total.checked_add(size))
        .and_then(|neurons| neurons.checked_mul(2))
        .and_then(|neuron_lines| neuron_lines.checked_add(2));
    match needed_lines {
        Some(needed) if lines.len() >= needed => {}
        _ => {
            return Err(QGraphError::parse(
                lines.len() + 1,
                "unexpected end of file for the recorded layer sizes",
            ))
        }
    }

    // Each arc is written twice, so a complete file holds at least one value per arc.
    let values: usize = lines[1..].iter().map(|line| line.split_whitespace().count()).sum();
    match Graph::arc_count_for(sizes) {
        Some(arcs) if values >= arcs => Ok(()),
        _ => Err(QGraphError::parse(
            1,
            format!("layer sizes need more weights than the {} values present", values),
        )),
    }
}

/// Parse exactly `expected` tokens from line `index` (0-based).
fn read_line<T: FromStr>(lines: &[&str], index: usize, expected: usize, what: &str) -> Result<Vec<T>> {
    let line_number = index + 1;
    let line = lines
        .get(index)
        .ok_or_else(|| QGraphError::parse(line_number, format!("unexpected end of file, expected {} line", what)))?;
    let values = parse_tokens(line, line_number, what)?;
    if values.len() != expected {
        return Err(QGraphError::parse(
            line_number,
            format!("expected {} {} value(s), found {}", expected, what, values.len()),
        ));
    }
    Ok(values)
}

/// Split on whitespace, so the trailing delimiter never yields a token.
fn parse_tokens<T: FromStr>(line: &str, line_number: usize, what: &str) -> Result<Vec<T>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|_| QGraphError::parse(line_number, format!("invalid {} '{}'", what, token)))
        })
        .collect()
}

pub fn save_network<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    fs::write(path.as_ref(), encode_network(graph))?;
    log::info!("saved network {:?} to {}", graph.layer_sizes(), path.as_ref().display());
    Ok(())
}

pub fn load_network<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let text = fs::read_to_string(path.as_ref())?;
    decode_network(&text)
}

pub fn load_network_expecting<P: AsRef<Path>>(path: P, expected: &[usize]) -> Result<Graph> {
    let text = fs::read_to_string(path.as_ref())?;
    decode_network_expecting(&text, expected)
}
