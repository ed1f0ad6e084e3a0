use super::node::Node;

/// An ordered set of neurons with an optional shared bias.
///
/// Node order defines the neuron index; for the output layer that index is
/// the action. The bias of layer `i` feeds every neuron of layer `i + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub(crate) nodes: Vec<Node>,
    bias: Option<f64>,
}

impl Layer {
    pub fn new() -> Self {
        Layer {
            nodes: Vec::new(),
            bias: None,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    pub fn bias(&self) -> Option<f64> {
        self.bias
    }

    pub fn set_bias(&mut self, value: f64) {
        self.bias = Some(value);
    }

    pub fn remove_bias(&mut self) {
        self.bias = None;
    }

    /// Adds `delta` to the bias; layers without a bias are left untouched.
    pub(crate) fn add_to_bias(&mut self, delta: f64) {
        if let Some(bias) = self.bias.as_mut() {
            *bias += delta;
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.iter().map(|node| node.value)
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NodeId;

    #[test]
    fn test_bias_lifecycle() {
        let mut layer = Layer::new();
        assert!(!layer.has_bias());
        layer.add_to_bias(1.0);
        assert_eq!(layer.bias(), None);

        layer.set_bias(0.5);
        layer.add_to_bias(0.25);
        assert_eq!(layer.bias(), Some(0.75));

        layer.remove_bias();
        assert!(!layer.has_bias());
    }

    #[test]
    fn test_node_order() {
        let mut layer = Layer::new();
        layer.add_node(Node::new(NodeId(1), 0.3));
        layer.add_node(Node::new(NodeId(2), 0.6));
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.values().collect::<Vec<_>>(), vec![0.3, 0.6]);
        assert_eq!(layer.node(1).map(|n| n.id()), Some(NodeId(2)));
    }
}
