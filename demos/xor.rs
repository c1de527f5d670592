use ferrite_mlp::{logging, Network, NetworkError, TrainConfig};

fn main() -> Result<(), NetworkError> {
    logging::install_logger().ok();

    let config = TrainConfig { learning_rate: 0.5, ..TrainConfig::default() };
    let mut network = Network::with_config(6, 1, config)?;
    network.initialize_synapses(2)?;

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = [1.0, 0.0, 1.0, 0.0];

    let report = network.train_rows(&inputs, &expected_outputs)?;
    println!("Trained for {} epochs: last error = {:.6}", report.epochs, report.error);

    for input in &inputs {
        let raw = network.forward(input)?[0];
        println!("Input: {:?} -> Output: {:.4} -> Class: {}", input, raw, network.classify(input)?);
    }
    Ok(())
}
