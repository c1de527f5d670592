use crate::error::{NetworkError, Result};
use crate::layers::dense::Layer;

/// Applies one online backpropagation step to a hidden/output layer pair.
///
/// `output_gradients` holds the local error signal `y·(1−y)·error` of every
/// output neuron for the sample whose forward pass is still recorded in both
/// layers. Each layer scales its bias weight's update by its own bias value.
///
/// The error propagated to the hidden layer is taken through the output
/// weights as they were during the forward pass, so it is computed before
/// the output layer is touched.
pub fn backpropagate(
    hidden: &mut Layer,
    output: &mut Layer,
    output_gradients: &[f64],
    learning_rate: f64,
) -> Result<()> {
    check_shapes(hidden, output, output_gradients)?;

    let hidden_gradients = hidden_gradients(hidden, output, output_gradients);

    // Output layer: w_k += lr · g · h_k, bias weight += lr · g · bias
    let h = output.last_input().to_vec();
    let output_bias = output.bias();
    for (k, g) in output_gradients.iter().enumerate() {
        adjust_neuron(output.weights_mut().row_mut(k), &h, *g, output_bias, learning_rate);
    }

    // Hidden layer: same rule with the propagated gradients and the raw input.
    let x = hidden.last_input().to_vec();
    let hidden_bias = hidden.bias();
    for (j, g) in hidden_gradients.iter().enumerate() {
        adjust_neuron(hidden.weights_mut().row_mut(j), &x, *g, hidden_bias, learning_rate);
    }

    Ok(())
}

/// `g_j = h_j·(1−h_j)·Σ_k g_k·w_kj`, read from the current (pre-update) output weights.
fn hidden_gradients(hidden: &Layer, output: &Layer, output_gradients: &[f64]) -> Vec<f64> {
    let activator = hidden.activator();
    hidden.last_output().iter()
        .enumerate()
        .map(|(j, h)| {
            let propagated: f64 = output_gradients.iter()
                .enumerate()
                .map(|(k, g)| g * output.weights().row(k)[j])
                .sum();
            activator.derivative_from_output(*h) * propagated
        })
        .collect()
}

fn adjust_neuron(row: &mut [f64], inputs: &[f64], gradient: f64, bias: f64, learning_rate: f64) {
    let (synapses, bias_weight) = row.split_at_mut(inputs.len());
    for (w, x) in synapses.iter_mut().zip(inputs) {
        *w += learning_rate * gradient * x;
    }
    bias_weight[0] += learning_rate * gradient * bias;
}

/// Both layers must be initialized, chained, and hold a recorded forward pass.
fn check_shapes(hidden: &Layer, output: &Layer, output_gradients: &[f64]) -> Result<()> {
    if !hidden.is_initialized() || !output.is_initialized() {
        return Err(NetworkError::Uninitialized);
    }

    let expectations = [
        (hidden.neuron_count(), output.input_size()),
        (hidden.input_size(), hidden.last_input().len()),
        (hidden.neuron_count(), hidden.last_output().len()),
        (output.input_size(), output.last_input().len()),
        (output.neuron_count(), output_gradients.len()),
    ];
    for (expected, actual) in expectations {
        if expected != actual {
            return Err(NetworkError::ShapeMismatch { expected, actual });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;
    use approx::assert_relative_eq;

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn pair(hidden: Vec<Vec<f64>>, output: Vec<Vec<f64>>) -> (Layer, Layer) {
        (
            Layer::with_weights(Matrix::from_data(hidden).unwrap(), 1.0).unwrap(),
            Layer::with_weights(Matrix::from_data(output).unwrap(), 1.0).unwrap(),
        )
    }

    fn forward(hidden: &mut Layer, output: &mut Layer, x: &[f64]) -> f64 {
        let h = hidden.forward(x).unwrap();
        output.forward(&h).unwrap()[0]
    }

    #[test]
    fn output_layer_moves_along_hidden_activations() {
        let (mut hidden, mut output) = pair(
            vec![vec![0.3, -0.2, 0.1], vec![-0.4, 0.6, 0.0]],
            vec![vec![0.7, -0.5, 0.2]],
        );
        let y = forward(&mut hidden, &mut output, &[1.0, 0.0]);
        let h = hidden.last_output().to_vec();
        let g = y * (1.0 - y) * (1.0 - y);

        backpropagate(&mut hidden, &mut output, &[g], 0.5).unwrap();

        let row = output.weights().row(0);
        assert_relative_eq!(row[0], 0.7 + 0.5 * g * h[0], epsilon = 1e-12);
        assert_relative_eq!(row[1], -0.5 + 0.5 * g * h[1], epsilon = 1e-12);
        assert_relative_eq!(row[2], 0.2 + 0.5 * g * 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hidden_error_flows_through_pre_update_weights() {
        let (mut hidden, mut output) = pair(vec![vec![0.5, 0.0]], vec![vec![2.0, 0.0]]);
        forward(&mut hidden, &mut output, &[1.0]);
        let h = sigmoid(0.5);
        let g = 0.5;
        let lr = 1.0;

        backpropagate(&mut hidden, &mut output, &[g], lr).unwrap();

        let with_old = 0.5 + lr * h * (1.0 - h) * g * 2.0;
        let with_new = 0.5 + lr * h * (1.0 - h) * g * (2.0 + lr * g * h);
        let updated = hidden.weights().row(0)[0];
        assert_relative_eq!(updated, with_old, epsilon = 1e-12);
        assert!((updated - with_new).abs() > 1e-2);
        // bias weight sees the same gradient scaled by the bias value
        assert_relative_eq!(hidden.weights().row(0)[1], with_old - 0.5, epsilon = 1e-12);
    }

    #[test]
    fn bias_value_scales_bias_weight_updates() {
        let (mut hidden, mut output) = pair(vec![vec![0.1, 0.1]], vec![vec![0.1, 0.1]]);
        hidden.set_bias(-3.0);
        output.set_bias(-3.0);
        forward(&mut hidden, &mut output, &[1.0]);

        backpropagate(&mut hidden, &mut output, &[0.2], 0.1).unwrap();

        assert_relative_eq!(output.weights().row(0)[1], 0.1 + 0.1 * 0.2 * -3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_gradient_leaves_weights_alone() {
        let (mut hidden, mut output) = pair(
            vec![vec![0.3, -0.2, 0.1], vec![-0.4, 0.6, 0.0]],
            vec![vec![0.7, -0.5, 0.2]],
        );
        forward(&mut hidden, &mut output, &[0.5, 0.5]);
        let before = (hidden.weights().clone(), output.weights().clone());

        backpropagate(&mut hidden, &mut output, &[0.0], 0.3).unwrap();

        assert_eq!((hidden.weights().clone(), output.weights().clone()), before);
    }

    #[test]
    fn rejects_layers_without_a_recorded_pass() {
        let (mut hidden, mut output) = pair(vec![vec![0.5, 0.0]], vec![vec![2.0, 0.0]]);
        let err = backpropagate(&mut hidden, &mut output, &[0.1], 0.1).unwrap_err();
        assert!(matches!(err, NetworkError::ShapeMismatch { .. }));
    }

    #[test]
    fn rejects_unchained_layers() {
        let (mut hidden, mut output) = pair(
            vec![vec![0.5, 0.0], vec![0.5, 0.0]],
            vec![vec![2.0, 0.0]],
        );
        let err = backpropagate(&mut hidden, &mut output, &[0.1], 0.1).unwrap_err();
        assert_eq!(err, NetworkError::ShapeMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn rejects_uninitialized_layers() {
        let mut hidden = Layer::new(2).unwrap();
        let mut output = Layer::new(1).unwrap();
        let err = backpropagate(&mut hidden, &mut output, &[0.1], 0.1).unwrap_err();
        assert_eq!(err, NetworkError::Uninitialized);
    }
}
