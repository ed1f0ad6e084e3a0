use super::graph::Graph;
use crate::activations::squared_error;
use crate::diagnostics::DiagnosticSink;
use crate::error::{QGraphError, Result};
use crate::replay_memory::{Experience, ReplayMemory};

/// Outcome of one minibatch update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    /// Number of experiences actually trained on.
    pub batch_size: usize,
    /// Mean squared error over the minibatch before the update.
    pub loss_before: f64,
    /// Mean squared error over the same minibatch after the update.
    pub loss_after: f64,
}

impl TrainingReport {
    pub fn improved(&self) -> bool {
        self.loss_after < self.loss_before
    }
}

/// The value the Q-network is pulled towards for `experience`:
/// the reward for terminal transitions, otherwise
/// `reward + gamma * max_a Q_target(next_state, a)`.
pub fn target_value(experience: &Experience, target_network: &mut Graph, gamma: f64) -> Result<f64> {
    if experience.is_terminal() {
        return Ok(experience.reward());
    }
    target_network.pass_state(experience.next_state())?;
    target_network.forward_propagation();
    Ok(experience.reward() + gamma * target_network.biggest_output_value())
}

impl Graph {
    /// One step of minibatch stochastic gradient descent.
    ///
    /// Draws up to `batch_size` experiences from `memory`, computes targets
    /// with `target_network`, accumulates gradients into a zeroed graph of the
    /// same shape and applies their average. The network is left untouched if
    /// any precondition fails.
    pub fn stochastic_gradient_descent(
        &mut self,
        target_network: &mut Graph,
        memory: &mut ReplayMemory,
        batch_size: usize,
        gamma: f64,
        learning_rate: f64,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<TrainingReport> {
        if batch_size == 0 {
            return Err(QGraphError::invalid_parameter("batch_size", "must be at least 1"));
        }
        if memory.is_empty() {
            return Err(QGraphError::EmptyMemory);
        }
        self.ensure_congruent(target_network)?;

        let minibatch = memory.get_mini_batch(batch_size);
        for experience in &minibatch {
            experience.check_shape(self.input_size(), self.output_size())?;
        }

        let snapshot = if sink.is_enabled() { Some(self.clone()) } else { None };
        let mut gradient = self.zeroed_like();

        let mut targets = Vec::with_capacity(minibatch.len());
        for experience in &minibatch {
            targets.push(target_value(experience, target_network, gamma)?);
        }

        sink.append("\n\nBefore Updating: \n");
        let mut total_loss = 0.0;
        for (experience, &target) in minibatch.iter().zip(targets.iter()) {
            let actual = self.evaluate(experience)?;
            sink.append(&format!("\n\nTarget value: {} Actual Value: {}\n", target, actual));
            total_loss += squared_error(target, actual);
            self.backpropagation(&mut gradient, actual, target, experience.action())?;
        }
        self.update_weights(&gradient, minibatch.len(), learning_rate)?;
        let loss_before = total_loss / minibatch.len() as f64;
        sink.append(&format!("\n\nLoss function before: {}\n", loss_before));

        sink.append("\nAfter Updating: \n");
        let mut total_loss = 0.0;
        for (experience, &target) in minibatch.iter().zip(targets.iter()) {
            let actual = self.evaluate(experience)?;
            sink.append(&format!("\n\nTarget value: {} Actual Value: {}\n", target, actual));
            total_loss += squared_error(target, actual);
        }
        let loss_after = total_loss / minibatch.len() as f64;
        sink.append(&format!("\n\nLoss function after : {}\n", loss_after));

        if loss_before < loss_after {
            if let Some(before) = snapshot {
                sink.append(&format!("\nError\nThe graph before updating: \n\n{}", before));
                sink.append(&format!("\nThe graph after updating: \n\n{}", self));
            }
        }

        let report = TrainingReport {
            batch_size: minibatch.len(),
            loss_before,
            loss_after,
        };
        log::debug!(
            "sgd step: batch={} loss_before={:.6} loss_after={:.6}",
            report.batch_size,
            report.loss_before,
            report.loss_after
        );
        Ok(report)
    }

    /// Forward `experience.state` and read the Q-value of its action.
    fn evaluate(&mut self, experience: &Experience) -> Result<f64> {
        self.pass_state(experience.state())?;
        self.forward_propagation();
        self.output_value(experience.action())
    }
}
