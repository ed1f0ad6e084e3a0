use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;

use crate::config::TrainingConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::{QGraphError, Result};
use crate::network::{Graph, TrainingReport};
use crate::persistence::{load_memory_expecting, load_network_expecting, save_memory, save_network};
use crate::replay_memory::{Experience, ReplayMemory};

pub const Q_NETWORK_FILE: &str = "QNetwork.txt";
pub const TARGET_NETWORK_FILE: &str = "TargetNetwork.txt";
pub const MEMORY_FILE: &str = "Memories.txt";

/// Deep Q-Network agent with a target network and experience replay
///
/// The environment loop is owned by the caller:
///
/// ```rust
/// use qgraph::agent::DqnAgent;
/// use qgraph::config::TrainingConfig;
/// use qgraph::diagnostics::NullSink;
/// use qgraph::replay_memory::Experience;
/// use ndarray::array;
///
/// let config = TrainingConfig::builder()
///     .layer_sizes(&[2, 8, 3])
///     .minibatch_size(4)
///     .seed(7)
///     .build()
///     .unwrap();
/// let mut agent = DqnAgent::new(config).unwrap();
///
/// let state = array![0.0, 1.0];
/// let action = agent.act(&state).unwrap();
/// let next_state = array![1.0, 1.0];
/// agent.observe(Experience::new(state, action, 1.0, next_state, false)).unwrap();
/// let report = agent.train_step(&mut NullSink).unwrap();
/// assert_eq!(report.batch_size, 1);
/// ```
pub struct DqnAgent {
    /// Network being trained and used for action selection
    pub q_network: Graph,

    /// Periodically synced copy used for training targets
    pub target_network: Graph,

    pub memory: ReplayMemory,

    config: TrainingConfig,

    /// Exploration rate
    epsilon: f64,

    /// Number of training steps performed
    train_steps: usize,

    rng: StdRng,
}

impl DqnAgent {
    /// Fresh agent: He-initialised Q-network, target network copied from it,
    /// empty replay memory.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut q_network = Graph::new(&config.layer_sizes)?;
        q_network.init_weights_and_biases_with(&mut rng);
        let mut target_network = Graph::new(&config.layer_sizes)?;
        target_network.copy_weights_and_biases(&q_network)?;
        let memory = new_memory(&config, &mut rng)?;

        Ok(DqnAgent {
            q_network,
            target_network,
            memory,
            epsilon: config.epsilon_max,
            config,
            train_steps: 0,
            rng,
        })
    }

    /// Assemble an agent from existing parts; both networks must match
    /// `config.layer_sizes`.
    pub fn from_parts(
        config: TrainingConfig,
        q_network: Graph,
        target_network: Graph,
        memory: ReplayMemory,
    ) -> Result<Self> {
        config.validate()?;
        for network in [&q_network, &target_network] {
            if network.layer_sizes() != config.layer_sizes {
                return Err(QGraphError::TopologyMismatch {
                    expected: config.layer_sizes.clone(),
                    actual: network.layer_sizes(),
                });
            }
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(DqnAgent {
            q_network,
            target_network,
            memory,
            epsilon: config.epsilon_max,
            config,
            train_steps: 0,
            rng,
        })
    }

    /// Epsilon-greedy action for `state`.
    pub fn act<'a>(&mut self, state: impl Into<ArrayView1<'a, f64>>) -> Result<usize> {
        let state = state.into();
        if self.rng.gen::<f64>() < self.epsilon {
            // Validate the state even when exploring.
            self.q_network.pass_state(state)?;
            Ok(self.rng.gen_range(0..self.q_network.output_size()))
        } else {
            self.greedy_action(state)
        }
    }

    /// Action with the largest Q-value for `state`.
    pub fn greedy_action<'a>(&mut self, state: impl Into<ArrayView1<'a, f64>>) -> Result<usize> {
        self.q_network.pass_state(state)?;
        self.q_network.forward_propagation();
        Ok(self.q_network.best_action())
    }

    /// Store a transition in the replay memory.
    pub fn observe(&mut self, experience: Experience) -> Result<()> {
        experience.check_shape(self.q_network.input_size(), self.q_network.output_size())?;
        self.memory.enqueue(experience);
        Ok(())
    }

    /// One minibatch update, followed by the scheduled target sync and the
    /// epsilon decay.
    pub fn train_step(&mut self, sink: &mut dyn DiagnosticSink) -> Result<TrainingReport> {
        let report = self.q_network.stochastic_gradient_descent(
            &mut self.target_network,
            &mut self.memory,
            self.config.minibatch_size,
            self.config.gamma,
            self.config.learning_rate,
            sink,
        )?;
        self.train_steps += 1;

        if self.train_steps % self.config.target_update_interval == 0 {
            self.sync_target_network()?;
        }
        self.decay_epsilon();
        Ok(report)
    }

    /// Copy the Q-network's parameters into the target network.
    pub fn sync_target_network(&mut self) -> Result<()> {
        self.target_network.copy_weights_and_biases(&self.q_network)?;
        log::info!("target network synced after {} training steps", self.train_steps);
        Ok(())
    }

    fn decay_epsilon(&mut self) {
        if self.epsilon > self.config.epsilon_min {
            self.epsilon = (self.epsilon - self.config.epsilon_decay).max(self.config.epsilon_min);
            if self.epsilon == self.config.epsilon_min {
                log::debug!("epsilon reached its minimum {}", self.epsilon);
            }
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Write both networks and the replay memory into `dir`, which must exist.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        save_network(&self.q_network, dir.join(Q_NETWORK_FILE))?;
        save_network(&self.target_network, dir.join(TARGET_NETWORK_FILE))?;
        save_memory(&self.memory, dir.join(MEMORY_FILE))?;
        Ok(())
    }

    /// Restore an agent saved with [`DqnAgent::save`].
    ///
    /// Missing or empty files fall back to a fresh Q-network, a target network
    /// copied from the Q-network and an empty memory. When a trained
    /// Q-network is found, exploration starts at `epsilon_min`. Stored
    /// experiences must fit the configured layer sizes.
    pub fn load<P: AsRef<Path>>(dir: P, config: TrainingConfig) -> Result<Self> {
        let dir = dir.as_ref();
        let mut agent = DqnAgent::new(config)?;
        let layer_sizes = agent.config.layer_sizes.clone();

        let q_path = dir.join(Q_NETWORK_FILE);
        if has_content(&q_path)? {
            agent.q_network = load_network_expecting(&q_path, &layer_sizes)?;
            agent.epsilon = agent.config.epsilon_min;
            log::info!("loaded Q-network from {}", q_path.display());
        }

        let target_path = dir.join(TARGET_NETWORK_FILE);
        if has_content(&target_path)? {
            agent.target_network = load_network_expecting(&target_path, &layer_sizes)?;
            log::info!("loaded target network from {}", target_path.display());
        } else {
            agent.target_network.copy_weights_and_biases(&agent.q_network)?;
        }

        let memory_path = dir.join(MEMORY_FILE);
        if has_content(&memory_path)? {
            agent.memory = load_memory_expecting(
                &memory_path,
                agent.config.memory_capacity,
                agent.config.input_size(),
                agent.config.action_count(),
            )?;
            if let Some(seed) = agent.config.seed {
                agent.memory = agent.memory.with_seed(seed.wrapping_add(1));
            }
            log::info!("loaded {} experiences from {}", agent.memory.len(), memory_path.display());
        }
        Ok(agent)
    }
}

fn new_memory(config: &TrainingConfig, rng: &mut StdRng) -> Result<ReplayMemory> {
    let memory = ReplayMemory::with_capacity(config.memory_capacity)?;
    Ok(match config.seed {
        Some(seed) => memory.with_seed(seed.wrapping_add(1)),
        None => memory.with_seed(rng.gen()),
    })
}

fn has_content(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.len() > 0),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}
