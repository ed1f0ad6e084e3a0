use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{QGraphError, Result};
use crate::replay_memory::ReplayMemory;

/// Hyper-parameters of a DQN training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Neurons per layer, input first.
    pub layer_sizes: Vec<usize>,
    pub minibatch_size: usize,
    /// Discount factor.
    pub gamma: f64,
    pub learning_rate: f64,
    /// Training steps between two target network syncs.
    pub target_update_interval: usize,
    pub memory_capacity: usize,
    pub epsilon_max: f64,
    pub epsilon_min: f64,
    /// Subtracted from epsilon after every training step.
    pub epsilon_decay: f64,
    /// Seeds weight initialisation, exploration and minibatch sampling.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            layer_sizes: vec![4, 16, 16, 16, 5],
            minibatch_size: 32,
            gamma: 0.9,
            learning_rate: 0.01,
            target_update_interval: 45,
            memory_capacity: ReplayMemory::DEFAULT_CAPACITY,
            epsilon_max: 1.0,
            epsilon_min: 0.075,
            epsilon_decay: 0.01,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 {
            return Err(QGraphError::invalid_parameter(
                "layer_sizes",
                "Must have at least 2 layers",
            ));
        }
        if self.layer_sizes.contains(&0) {
            return Err(QGraphError::invalid_parameter(
                "layer_sizes",
                "Every layer needs at least one neuron",
            ));
        }
        if self.minibatch_size == 0 {
            return Err(QGraphError::invalid_parameter(
                "minibatch_size",
                "Must be greater than 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(QGraphError::invalid_parameter("gamma", "Must be within [0, 1]"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(QGraphError::invalid_parameter(
                "learning_rate",
                "Must be positive and finite",
            ));
        }
        if self.target_update_interval == 0 {
            return Err(QGraphError::invalid_parameter(
                "target_update_interval",
                "Must be greater than 0",
            ));
        }
        if self.memory_capacity == 0 {
            return Err(QGraphError::invalid_parameter(
                "memory_capacity",
                "Capacity must be greater than 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_min)
            || !(0.0..=1.0).contains(&self.epsilon_max)
            || self.epsilon_min > self.epsilon_max
        {
            return Err(QGraphError::invalid_parameter(
                "epsilon",
                "Need 0 <= epsilon_min <= epsilon_max <= 1",
            ));
        }
        if self.epsilon_decay < 0.0 {
            return Err(QGraphError::invalid_parameter(
                "epsilon_decay",
                "Must not be negative",
            ));
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes.first().copied().unwrap_or(0)
    }

    pub fn action_count(&self) -> usize {
        self.layer_sizes.last().copied().unwrap_or(0)
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for [`TrainingConfig`]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    pub fn new() -> Self {
        TrainingConfigBuilder {
            config: TrainingConfig::default(),
        }
    }

    pub fn layer_sizes(mut self, sizes: &[usize]) -> Self {
        self.config.layer_sizes = sizes.to_vec();
        self
    }

    pub fn minibatch_size(mut self, size: usize) -> Self {
        self.config.minibatch_size = size;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn target_update_interval(mut self, interval: usize) -> Self {
        self.config.target_update_interval = interval;
        self
    }

    pub fn memory_capacity(mut self, capacity: usize) -> Self {
        self.config.memory_capacity = capacity;
        self
    }

    pub fn epsilon(mut self, max: f64, min: f64, decay: f64) -> Self {
        self.config.epsilon_max = max;
        self.config.epsilon_min = min;
        self.config.epsilon_decay = decay;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for TrainingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
