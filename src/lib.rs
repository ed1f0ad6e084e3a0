//! # qgraph - Deep Q-Learning on an Explicit Graph Network
//!
//! qgraph implements a deep Q-network where every neuron and every connection
//! is a first-class object. Nodes own their activation, arcs own their weight,
//! and forward propagation, backpropagation and the parameter update walk the
//! graph directly instead of multiplying matrices.
//!
//! ## Key Features
//!
//! - **Graph Network**: Fully connected layers built node by node, Leaky ReLU
//!   everywhere, one shared bias per non-output layer
//! - **Training**: Minibatch SGD on the squared temporal-difference error with
//!   a separate target network
//! - **Experience Replay**: Bounded FIFO memory with uniform sampling
//! - **Persistence**: Plain text network and memory files, plus a bincode
//!   snapshot format
//! - **Diagnostics**: Pluggable sinks for the per-step training log
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qgraph::agent::DqnAgent;
//! use qgraph::config::TrainingConfig;
//! use qgraph::diagnostics::NullSink;
//! use qgraph::replay_memory::Experience;
//! use ndarray::array;
//!
//! let config = TrainingConfig::builder()
//!     .layer_sizes(&[4, 16, 16, 5])
//!     .build()
//!     .unwrap();
//! let mut agent = DqnAgent::new(config).unwrap();
//!
//! let state = array![0.0, 0.5, 1.0, 0.0];
//! let action = agent.act(&state).unwrap();
//! agent.observe(Experience::terminal(state, action, 10.0)).unwrap();
//! agent.train_step(&mut NullSink).unwrap();
//! agent.save("saves").unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Leaky ReLU and the squared error loss
//! - [`agent`] - Epsilon-greedy DQN agent tying the pieces together
//! - [`config`] - Training hyper-parameters
//! - [`diagnostics`] - Sinks for the training log
//! - [`error`] - Error types and result handling
//! - [`network`] - Nodes, arcs, layers, the graph and its training step
//! - [`persistence`] - Text and binary save formats
//! - [`replay_memory`] - Experience replay

pub mod activations;
pub mod agent;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod network;
pub mod persistence;
pub mod replay_memory;

#[cfg(test)]
mod tests;

pub use agent::DqnAgent;
pub use config::TrainingConfig;
pub use error::{QGraphError, Result};
pub use network::{Graph, TrainingReport};
pub use replay_memory::{Experience, ReplayMemory, SharedReplayMemory};
