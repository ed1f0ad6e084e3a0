//! The graph network: nodes, arcs, layers and the [`Graph`] that owns them.

mod backprop;
mod graph;
mod layer;
mod node;
mod training;

pub use graph::Graph;
pub use layer::Layer;
pub use node::{Arc, ArcId, Node, NodeId, NodeRef};
pub use training::{target_value, TrainingReport};
