use clap::{Parser, ValueEnum};
use tracing::error;

use ferrite_mlp::{logging, Matrix, Network, TrainConfig};

/// Trains a two-layer perceptron on a two-input truth table and classifies it.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Truth table to learn.
    #[arg(value_enum, default_value_t = Gate::Xor)]
    gate: Gate,

    /// Hidden layer width.
    #[arg(long, default_value_t = 4)]
    hidden: usize,

    /// JSON file with hyperparameters; missing fields keep their defaults.
    #[arg(long)]
    config: Option<String>,

    /// Overrides the learning rate from the config.
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Feed the training set as matrix columns instead of row vectors.
    #[arg(long)]
    columns: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Gate {
    And,
    Or,
    Xor,
}

impl Gate {
    fn labels(self) -> [f64; 4] {
        match self {
            Gate::And => [0.0, 0.0, 0.0, 1.0],
            Gate::Or => [0.0, 1.0, 1.0, 1.0],
            Gate::Xor => [0.0, 1.0, 1.0, 0.0],
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::install_logger() {
        eprintln!("could not install logger: {e}");
    }

    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => TrainConfig::load_json(path)?,
        None => TrainConfig::default(),
    };
    if let Some(lr) = cli.learning_rate {
        config.learning_rate = lr;
    }

    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let labels = cli.gate.labels();

    let mut network = Network::with_config(cli.hidden, 1, config)?;
    network.initialize_synapses(2)?;

    let report = if cli.columns {
        network.train_columns(&Matrix::from_data(inputs.clone())?.transpose(), &labels)?
    } else {
        network.train_rows(&inputs, &labels)?
    };
    println!(
        "{:?}: {} epochs, last error {:.6}, converged: {}",
        cli.gate, report.epochs, report.error, report.converged
    );

    for (input, expected) in inputs.iter().zip(labels) {
        let output = network.classify_expected(input, expected)?;
        println!("Input: {:?} -> Output: {}", input, output);
    }
    Ok(())
}
