pub mod math;
pub mod activation;
pub mod layers;
pub mod optim;
pub mod train;
pub mod network;
pub mod error;
pub mod logging;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::sigmoid::Sigmoid;
pub use layers::dense::Layer;
pub use optim::backprop::backpropagate;
pub use train::{ColumnSamples, RowSamples, TrainConfig, TrainingReport, TrainingSet};
pub use network::network::Network;
pub use error::{NetworkError, Result};
