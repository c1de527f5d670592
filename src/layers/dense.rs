use rand::Rng;

use crate::activation::Sigmoid;
use crate::error::{NetworkError, Result};
use crate::math::matrix::Matrix;

/// A fully connected sigmoid layer.
///
/// Weights are stored one row per neuron. Each row holds one weight per input
/// followed by the neuron's bias weight, which is scaled by the layer's shared
/// `bias` value on every forward pass.
#[derive(Debug, Clone)]
pub struct Layer{
    size: usize,
    input_size: usize,
    weights: Matrix,
    bias: f64,
    activator: Sigmoid,
    last_input: Vec<f64>,
    last_output: Vec<f64>,
}

impl Layer {
    /// Creates an uninitialized layer of `size` neurons with bias value 1.0.
    pub fn new(size: usize) -> Result<Layer> {
        if size == 0 {
            return Err(NetworkError::InvalidConfiguration(
                "a layer needs at least one neuron".into(),
            ));
        }

        Ok(Layer {
            size,
            input_size: 0,
            weights: Matrix::default(),
            bias: 1.0,
            activator: Sigmoid,
            last_input: Vec::new(),
            last_output: Vec::new(),
        })
    }

    /// Builds an initialized layer from explicit weights. Every row is one
    /// neuron; its last entry is the bias weight.
    pub fn with_weights(weights: Matrix, bias: f64) -> Result<Layer> {
        if weights.rows == 0 || weights.cols < 2 {
            return Err(NetworkError::InvalidConfiguration(format!(
                "weights must be at least 1x2, got {}x{}",
                weights.rows, weights.cols
            )));
        }
        // `rows`/`cols` are public, so a hand-built matrix may disagree with its data.
        if weights.data.len() != weights.rows {
            return Err(NetworkError::ShapeMismatch { expected: weights.rows, actual: weights.data.len() });
        }
        if let Some(row) = weights.data.iter().find(|row| row.len() != weights.cols) {
            return Err(NetworkError::ShapeMismatch { expected: weights.cols, actual: row.len() });
        }

        Ok(Layer {
            size: weights.rows,
            input_size: weights.cols - 1,
            weights,
            bias,
            activator: Sigmoid,
            last_input: Vec::new(),
            last_output: Vec::new(),
        })
    }

    /// Draws `num_inputs + 1` weights per neuron using the thread-local RNG.
    pub fn initialize(&mut self, num_inputs: usize) -> Result<()> {
        self.initialize_with_rng(num_inputs, &mut rand::thread_rng())
    }

    /// Draws `num_inputs + 1` weights per neuron, uniform on [-1, 1).
    ///
    /// Fails before allocating anything when `num_inputs` is zero.
    pub fn initialize_with_rng<R: Rng + ?Sized>(&mut self, num_inputs: usize, rng: &mut R) -> Result<()> {
        if num_inputs == 0 {
            return Err(NetworkError::InvalidConfiguration(
                "a layer needs at least one input".into(),
            ));
        }

        self.weights = Matrix::random(self.size, num_inputs + 1, rng);
        self.input_size = num_inputs;
        self.last_input.clear();
        self.last_output.clear();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.input_size > 0
    }

    /// Propagates `input` through every neuron and records the input and the
    /// produced output as the layer's last state.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if !self.is_initialized() {
            return Err(NetworkError::Uninitialized);
        }
        if input.len() != self.input_size {
            return Err(NetworkError::ShapeMismatch {
                expected: self.input_size,
                actual: input.len(),
            });
        }

        let output: Vec<f64> = self.weights.data.iter()
            .map(|row| {
                let (synapses, bias_weight) = row.split_at(self.input_size);
                let z: f64 = synapses.iter().zip(input).map(|(w, x)| w * x).sum::<f64>()
                    + bias_weight[0] * self.bias;
                self.activator.function(z)
            })
            .collect();

        self.last_input = input.to_vec();
        self.last_output = output.clone();
        Ok(output)
    }

    pub fn neuron_count(&self) -> usize {
        self.size
    }

    /// Number of inputs each neuron expects; 0 until initialized.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Changes the constant fed to every bias weight. Stored weights are untouched.
    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Matrix {
        &mut self.weights
    }

    pub fn activator(&self) -> Sigmoid {
        self.activator
    }

    pub fn last_input(&self) -> &[f64] {
        &self.last_input
    }

    pub fn last_output(&self) -> &[f64] {
        &self.last_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixed_layer() -> Layer {
        Layer::with_weights(
            Matrix::from_data(vec![
                vec![1.0, -1.0, 0.5],
                vec![2.0, -1.0, 2.0],
            ]).unwrap(),
            1.0,
        ).unwrap()
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(matches!(Layer::new(0), Err(NetworkError::InvalidConfiguration(_))));

        let mut layer = Layer::new(3).unwrap();
        assert!(matches!(layer.initialize(0), Err(NetworkError::InvalidConfiguration(_))));
        assert!(!layer.is_initialized());
        assert_eq!(layer.weights().rows, 0);
    }

    #[test]
    fn initialize_sizes_rows_with_bias_weight() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = Layer::new(3).unwrap();
        layer.initialize_with_rng(4, &mut rng).unwrap();

        assert_eq!(layer.weights().rows, 3);
        assert!(layer.weights().data.iter().all(|row| row.len() == 5));
        assert_ne!(layer.weights().row(0), layer.weights().row(1));
    }

    #[test]
    fn with_weights_rejects_matrix_whose_data_disagrees_with_its_shape() {
        let short_row = Matrix { rows: 1, cols: 3, data: vec![vec![1.0]] };
        assert_eq!(
            Layer::with_weights(short_row, 1.0).unwrap_err(),
            NetworkError::ShapeMismatch { expected: 3, actual: 1 },
        );

        let missing_row = Matrix { rows: 2, cols: 2, data: vec![vec![1.0, 0.0]] };
        assert_eq!(
            Layer::with_weights(missing_row, 1.0).unwrap_err(),
            NetworkError::ShapeMismatch { expected: 2, actual: 1 },
        );

        let layer = fixed_layer();
        assert_eq!(layer.neuron_count(), layer.weights().rows);
    }

    #[test]
    fn forward_before_initialize_fails() {
        let mut layer = Layer::new(2).unwrap();
        assert_eq!(layer.forward(&[1.0]), Err(NetworkError::Uninitialized));
    }

    #[test]
    fn forward_rejects_wrong_arity_without_touching_state() {
        let mut layer = fixed_layer();
        let err = layer.forward(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, NetworkError::ShapeMismatch { expected: 2, actual: 3 });
        assert!(layer.last_input().is_empty());
        assert!(layer.last_output().is_empty());
    }

    #[test]
    fn forward_applies_weights_bias_and_sigmoid() {
        let mut layer = fixed_layer();
        let out = layer.forward(&[1.0, 0.5]).unwrap();

        // z0 = 1.0 - 0.5 + 0.5 = 1.0, z1 = 2.0 - 0.5 + 2.0 = 3.5
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0], 1.0 / (1.0 + (-1.0f64).exp()), epsilon = 1e-12);
        assert_relative_eq!(out[1], 1.0 / (1.0 + (-3.5f64).exp()), epsilon = 1e-12);
        assert_eq!(layer.last_input(), &[1.0, 0.5]);
        assert_eq!(layer.last_output(), out.as_slice());
    }

    #[test]
    fn bias_changes_output_but_not_weights() {
        let mut layer = fixed_layer();
        let before = layer.forward(&[1.0, 0.5]).unwrap();
        let weights = layer.weights().clone();

        layer.set_bias(-2.0);
        let after = layer.forward(&[1.0, 0.5]).unwrap();

        assert_eq!(layer.weights(), &weights);
        assert!(after.iter().zip(&before).all(|(a, b)| a != b));
        // z0 = 1.0 - 0.5 + 0.5 * -2.0 = -0.5
        assert_relative_eq!(after[0], 1.0 / (1.0 + 0.5f64.exp()), epsilon = 1e-12);
    }

    #[test]
    fn outputs_stay_inside_open_unit_interval() {
        let mut layer = Layer::with_weights(
            Matrix::from_data(vec![vec![1e4, 0.0], vec![-1e4, 0.0]]).unwrap(),
            1.0,
        ).unwrap();
        let out = layer.forward(&[1e3]).unwrap();
        assert!(out.iter().all(|y| *y > 0.0 && *y < 1.0));
    }
}
