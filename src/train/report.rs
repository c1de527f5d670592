use serde::{Serialize, Deserialize};

/// Outcome of one call to a training entry point.
///
/// `error` and `gradient` belong to the last sample processed, which is also
/// what the convergence test looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Completed passes over the training set.
    pub epochs: usize,
    pub error: f64,
    pub gradient: f64,
    /// `false` when the run stopped on the epoch budget.
    pub converged: bool,
}
