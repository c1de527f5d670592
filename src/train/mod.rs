pub mod report;
pub mod samples;
pub mod train_config;

pub use report::TrainingReport;
pub use samples::{ColumnSamples, RowSamples, TrainingSet};
pub use train_config::TrainConfig;
