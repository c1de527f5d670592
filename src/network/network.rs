use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{NetworkError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::optim::backprop::backpropagate;
use crate::train::report::TrainingReport;
use crate::train::samples::{ColumnSamples, RowSamples, TrainingSet};
use crate::train::train_config::TrainConfig;

/// Output, error and local gradient of the first output neuron for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    output: f64,
    error: f64,
    gradient: f64,
}

/// A multilayer perceptron with one hidden ("intermediary") layer and one
/// output layer, trained online by backpropagation.
///
/// The first output neuron is the network's prediction. Every output neuron
/// is trained toward the sample's scalar label.
#[derive(Debug, Clone)]
pub struct Network {
    hidden: Layer,
    output: Layer,
    config: TrainConfig,
    epochs: usize,
    last: Step,
    last_run: Option<TrainingReport>,
    last_training_input: Vec<f64>,
    last_classification_input: Vec<f64>,
}

impl Network {
    /// Builds a network with default hyperparameters.
    pub fn new(hidden_neurons: usize, output_neurons: usize) -> Result<Network> {
        Network::with_config(hidden_neurons, output_neurons, TrainConfig::default())
    }

    /// Builds a network with default hyperparameters and a custom epoch budget.
    pub fn with_max_epochs(hidden_neurons: usize, output_neurons: usize, max_epochs: usize) -> Result<Network> {
        Network::with_config(hidden_neurons, output_neurons, TrainConfig::with_max_epochs(max_epochs))
    }

    pub fn with_config(hidden_neurons: usize, output_neurons: usize, config: TrainConfig) -> Result<Network> {
        config.validate()?;

        let mut hidden = Layer::new(hidden_neurons)?;
        let mut output = Layer::new(output_neurons)?;
        hidden.set_bias(config.bias);
        output.set_bias(config.bias);

        Ok(Network {
            hidden,
            output,
            config,
            epochs: 0,
            last: Step { output: 0.0, error: 1.0, gradient: 0.0 },
            last_run: None,
            last_training_input: Vec::new(),
            last_classification_input: Vec::new(),
        })
    }

    /// Draws fresh synapses for `num_inputs` features using the thread-local RNG.
    pub fn initialize_synapses(&mut self, num_inputs: usize) -> Result<()> {
        self.initialize_synapses_with_rng(num_inputs, &mut rand::thread_rng())
    }

    /// Sizes the hidden layer for `num_inputs` features and the output layer
    /// for the hidden layer's width.
    pub fn initialize_synapses_with_rng<R: Rng + ?Sized>(&mut self, num_inputs: usize, rng: &mut R) -> Result<()> {
        self.hidden.initialize_with_rng(num_inputs, rng)?;
        self.output.initialize_with_rng(self.hidden.neuron_count(), rng)?;
        self.last_run = None;

        debug!(
            inputs = num_inputs,
            hidden = self.hidden.neuron_count(),
            outputs = self.output.neuron_count(),
            "initialized synapses"
        );
        Ok(())
    }

    /// Trains on a matrix whose columns are samples (`data[feature][sample]`).
    pub fn train_columns(&mut self, samples: &Matrix, labels: &[f64]) -> Result<TrainingReport> {
        self.train(&ColumnSamples::new(samples), labels)
    }

    /// Trains on one vector per sample.
    pub fn train_rows(&mut self, samples: &[Vec<f64>], labels: &[f64]) -> Result<TrainingReport> {
        self.train(&RowSamples::new(samples), labels)
    }

    /// Runs online backpropagation until the last sample of an epoch is within
    /// `acceptable_error` or the epoch budget runs out.
    ///
    /// Resets the epoch counter and error on every call. The set is checked
    /// up front, so a rejected call leaves the network untouched.
    pub fn train<S: TrainingSet + ?Sized>(&mut self, set: &S, labels: &[f64]) -> Result<TrainingReport> {
        self.config.validate()?;
        if !self.is_initialized() {
            return Err(NetworkError::Uninitialized);
        }
        set.validate(labels)?;
        if set.feature_count() != self.hidden.input_size() {
            return Err(NetworkError::ShapeMismatch {
                expected: self.hidden.input_size(),
                actual: set.feature_count(),
            });
        }

        self.epochs = 0;
        self.last.error = 1.0;
        self.last.gradient = 0.0;
        debug!(
            samples = set.sample_count(),
            learning_rate = self.config.learning_rate,
            acceptable_error = self.config.acceptable_error,
            max_epochs = self.config.max_epochs,
            "training started"
        );

        while self.last.error.abs() > self.config.acceptable_error && self.epochs < self.config.max_epochs {
            for (sample, expected) in set.samples().zip(labels) {
                self.last = self.train_step(&sample, *expected)?;
            }

            let interval = self.config.progress_interval;
            if interval != 0 && self.epochs != 0 && self.epochs % interval == 0 {
                info!(epoch = self.epochs, error = self.last.error, "training");
            }
            self.epochs += 1;
        }

        if self.epochs > 0 {
            if let Some(sample) = set.samples().last() {
                self.last_training_input = sample.into_owned();
            }
        }

        let report = TrainingReport {
            epochs: self.epochs,
            error: self.last.error,
            gradient: self.last.gradient,
            converged: self.last.error.abs() <= self.config.acceptable_error,
        };
        self.last_run = Some(report);

        if report.converged {
            info!(epochs = report.epochs, error = report.error, "training converged");
        } else {
            warn!(epochs = report.epochs, error = report.error, "epoch budget exhausted before convergence");
        }
        Ok(report)
    }

    /// Forward pass, error and gradient for one sample, then one weight update.
    fn train_step(&mut self, sample: &[f64], expected: f64) -> Result<Step> {
        let outputs = self.forward(sample)?;

        let errors: Vec<f64> = outputs.iter().map(|y| calculate_error(expected, *y)).collect();
        let gradients: Vec<f64> = outputs.iter().zip(&errors)
            .map(|(y, e)| calculate_gradient(*y, *e))
            .collect();

        backpropagate(&mut self.hidden, &mut self.output, &gradients, self.config.learning_rate)?;

        Ok(Step { output: outputs[0], error: errors[0], gradient: gradients[0] })
    }

    /// Unrounded outputs of the output layer; records both layers' last state.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let hidden_out = self.hidden.forward(input)?;
        self.output.forward(&hidden_out)
    }

    /// Rounded prediction for `input`.
    ///
    /// Refused with `DidNotConverge` when the last training run stopped on its
    /// epoch budget. Never changes a weight.
    pub fn classify(&mut self, input: &[f64]) -> Result<f64> {
        self.ensure_converged()?;
        let outputs = self.forward(input)?;
        self.last_classification_input = input.to_vec();
        Ok(outputs[0].round())
    }

    /// Like [`Network::classify`], and logs whether the prediction matched `expected`.
    pub fn classify_expected(&mut self, input: &[f64], expected: f64) -> Result<f64> {
        let answer = self.classify(input)?;
        if answer == expected {
            info!(output = answer, expected, "classification hit");
        } else {
            info!(output = answer, expected, "classification miss");
        }
        Ok(answer)
    }

    /// Fraction of samples whose rounded prediction equals their label.
    pub fn accuracy<S: TrainingSet + ?Sized>(&mut self, set: &S, labels: &[f64]) -> Result<f64> {
        set.validate(labels)?;
        let mut correct = 0usize;
        for (sample, expected) in set.samples().zip(labels) {
            if self.classify(&sample)? == *expected {
                correct += 1;
            }
        }
        Ok(correct as f64 / set.sample_count() as f64)
    }

    fn ensure_converged(&self) -> Result<()> {
        match self.last_run {
            Some(run) if !run.converged => Err(NetworkError::DidNotConverge {
                epochs: run.epochs,
                error: run.error,
            }),
            _ => Ok(()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.hidden.is_initialized() && self.output.is_initialized()
    }

    pub fn hidden_layer(&self) -> &Layer {
        &self.hidden
    }

    pub fn output_layer(&self) -> &Layer {
        &self.output
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.config.learning_rate = learning_rate;
    }

    pub fn bias(&self) -> f64 {
        self.config.bias
    }

    /// Sets the bias value of the network and both of its layers.
    pub fn set_bias(&mut self, bias: f64) {
        self.config.bias = bias;
        self.hidden.set_bias(bias);
        self.output.set_bias(bias);
    }

    pub fn acceptable_error(&self) -> f64 {
        self.config.acceptable_error
    }

    pub fn set_acceptable_error(&mut self, acceptable_error: f64) {
        self.config.acceptable_error = acceptable_error;
    }

    pub fn max_epochs(&self) -> usize {
        self.config.max_epochs
    }

    pub fn set_max_epochs(&mut self, max_epochs: usize) {
        self.config.max_epochs = max_epochs;
    }

    /// Epochs completed by the most recent training run.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Error of the last trained sample.
    pub fn error(&self) -> f64 {
        self.last.error
    }

    /// Local gradient of the last trained sample.
    pub fn gradient(&self) -> f64 {
        self.last.gradient
    }

    /// Raw network output for the last trained sample.
    pub fn output_value(&self) -> f64 {
        self.last.output
    }

    pub fn last_run(&self) -> Option<TrainingReport> {
        self.last_run
    }

    pub fn last_training_input(&self) -> &[f64] {
        &self.last_training_input
    }

    pub fn last_classification_input(&self) -> &[f64] {
        &self.last_classification_input
    }
}

fn calculate_error(expected: f64, output: f64) -> f64 {
    expected - output
}

/// Logistic-derivative-weighted error: `y·(1−y)·error`.
fn calculate_gradient(output: f64, error: f64) -> f64 {
    output * (1.0 - output) * error
}
