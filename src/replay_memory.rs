use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{QGraphError, Result};

/// One transition `(state, action, reward, next_state, terminal)`.
///
/// `next_state` carries no meaning when the transition is terminal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    state: Array1<f64>,
    action: usize,
    reward: f64,
    next_state: Array1<f64>,
    is_terminal: bool,
}

impl Experience {
    pub fn new(
        state: Array1<f64>,
        action: usize,
        reward: f64,
        next_state: Array1<f64>,
        is_terminal: bool,
    ) -> Self {
        Experience {
            state,
            action,
            reward,
            next_state,
            is_terminal,
        }
    }

    /// A terminal transition; the next state is filled with zeros.
    pub fn terminal(state: Array1<f64>, action: usize, reward: f64) -> Self {
        let next_state = Array1::zeros(state.len());
        Self::new(state, action, reward, next_state, true)
    }

    pub fn state(&self) -> &Array1<f64> {
        &self.state
    }

    pub fn action(&self) -> usize {
        self.action
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn next_state(&self) -> &Array1<f64> {
        &self.next_state
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Check that the experience fits a network with `input_size` inputs and
    /// `action_count` outputs. The next state of a terminal transition is not
    /// checked.
    pub fn check_shape(&self, input_size: usize, action_count: usize) -> Result<()> {
        let mut vectors = vec![("state", self.state.len())];
        if !self.is_terminal {
            vectors.push(("next state", self.next_state.len()));
        }
        for (name, len) in vectors {
            if len != input_size {
                return Err(QGraphError::dimension_mismatch(
                    format!("{} of {} values", name, input_size),
                    format!("{} of {} values", name, len),
                ));
            }
        }
        if self.action >= action_count {
            return Err(QGraphError::InvalidAction {
                action: self.action,
                max_actions: action_count,
            });
        }
        Ok(())
    }
}

/// Bounded experience buffer. The newest experience sits at the front; when
/// the buffer is full the oldest one is evicted before inserting.
#[derive(Clone, Debug)]
pub struct ReplayMemory {
    buffer: VecDeque<Experience>,
    capacity: usize,
    rng: StdRng,
}

impl ReplayMemory {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        ReplayMemory {
            buffer: VecDeque::new(),
            capacity: Self::DEFAULT_CAPACITY,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(QGraphError::invalid_parameter(
                "capacity",
                "Capacity must be greater than 0",
            ));
        }
        Ok(ReplayMemory {
            buffer: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reseed the sampling RNG, for reproducible minibatches.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn enqueue(&mut self, experience: Experience) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_back();
        }
        self.buffer.push_front(experience);
    }

    /// Up to `minibatch_size` experiences.
    ///
    /// When the request covers the whole buffer, every stored experience is
    /// returned in storage order. Otherwise `minibatch_size` distinct entries
    /// are drawn uniformly without replacement.
    pub fn get_mini_batch(&mut self, minibatch_size: usize) -> Vec<Experience> {
        if minibatch_size >= self.buffer.len() {
            return self.buffer.iter().cloned().collect();
        }
        index::sample(&mut self.rng, self.buffer.len(), minibatch_size)
            .iter()
            .map(|i| self.buffer[i].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Experience> + '_ {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for ReplayMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`ReplayMemory`] shared between an environment thread and a trainer.
/// Each operation holds the lock for its whole duration.
#[derive(Clone, Debug, Default)]
pub struct SharedReplayMemory {
    inner: Arc<Mutex<ReplayMemory>>,
}

impl SharedReplayMemory {
    pub fn new(memory: ReplayMemory) -> Self {
        SharedReplayMemory {
            inner: Arc::new(Mutex::new(memory)),
        }
    }

    /// Lock the memory, e.g. to hand it to a training step.
    pub fn lock(&self) -> MutexGuard<'_, ReplayMemory> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn enqueue(&self, experience: Experience) {
        self.lock().enqueue(experience);
    }

    pub fn get_mini_batch(&self, minibatch_size: usize) -> Vec<Experience> {
        self.lock().get_mini_batch(minibatch_size)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
