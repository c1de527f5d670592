use serde::{Serialize, Deserialize};

use crate::error::{NetworkError, Result};

/// Hyperparameters of a perceptron.
///
/// # Fields
/// - `learning_rate`     — step size of every weight update
/// - `acceptable_error`  — training stops once the last sample's absolute
///                         error is at or below this value
/// - `max_epochs`        — hard budget of passes over the training set
/// - `bias`              — constant fed to every neuron's bias weight
/// - `progress_interval` — emit a progress event every this many epochs;
///                         `0` disables progress events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub acceptable_error: f64,
    pub max_epochs: usize,
    pub bias: f64,
    pub progress_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.03,
            acceptable_error: 0.05,
            max_epochs: 100_000,
            bias: 1.0,
            progress_interval: 1000,
        }
    }
}

impl TrainConfig {
    /// Default hyperparameters with a different epoch budget.
    pub fn with_max_epochs(max_epochs: usize) -> Self {
        TrainConfig { max_epochs, ..TrainConfig::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetworkError::InvalidConfiguration(format!(
                "learning rate must be positive, got {}", self.learning_rate
            )));
        }
        if !self.acceptable_error.is_finite() || self.acceptable_error < 0.0 {
            return Err(NetworkError::InvalidConfiguration(format!(
                "acceptable error must be non-negative, got {}", self.acceptable_error
            )));
        }
        if self.max_epochs == 0 {
            return Err(NetworkError::InvalidConfiguration(
                "max epochs must be at least 1".into(),
            ));
        }
        if !self.bias.is_finite() {
            return Err(NetworkError::InvalidConfiguration(format!(
                "bias must be finite, got {}", self.bias
            )));
        }
        Ok(())
    }

    /// Serializes the hyperparameters to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Reads hyperparameters from JSON. Missing fields take their defaults;
    /// values that fail `validate` are reported as `InvalidData`.
    pub fn load_json(path: &str) -> std::io::Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: TrainConfig = serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        config.validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }
}
