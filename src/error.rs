use thiserror::Error;

/// Every failure the perceptron can report to its caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// Non-positive sizes, zero input arity or unusable hyperparameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("network synapses have not been initialized")]
    Uninitialized,

    /// Classification refused because the last training run hit its epoch
    /// budget without reaching the acceptable error.
    #[error("network did not converge after {epochs} epochs (last error {error:.6})")]
    DidNotConverge { epochs: usize, error: f64 },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training set has {samples} samples but {labels} labels")]
    LabelCountMismatch { samples: usize, labels: usize },

    #[error("sample {index} has {actual} features, expected {expected}")]
    RaggedSample { index: usize, expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, NetworkError>;
