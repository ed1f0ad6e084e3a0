/// Result type for qgraph operations
pub type Result<T> = std::result::Result<T, QGraphError>;

/// Main error type for the qgraph library
#[derive(Debug, thiserror::Error)]
pub enum QGraphError {
    /// A vector does not match the layer it is fed into
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Two graphs (or a graph and a file) disagree on layer sizes
    #[error("Topology mismatch: expected layers {expected:?}, got {actual:?}")]
    TopologyMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action index outside the output layer
    #[error("Invalid action {action}: must be less than {max_actions}")]
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Training was requested on an empty replay memory
    #[error("Empty replay memory: cannot draw a minibatch")]
    EmptyMemory,

    /// Malformed line in a persisted network or memory file
    #[error("Parse error on line {line}: {reason}")]
    Parse {
        line: usize,
        reason: String,
    },

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for QGraphError {
    fn from(err: bincode::Error) -> Self {
        QGraphError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for QGraphError {
    fn from(err: serde_json::Error) -> Self {
        QGraphError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl QGraphError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        QGraphError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        QGraphError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn parse<S: Into<String>>(line: usize, reason: S) -> Self {
        QGraphError::Parse {
            line,
            reason: reason.into(),
        }
    }
}
