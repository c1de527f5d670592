use std::borrow::Cow;

use crate::error::{NetworkError, Result};
use crate::math::matrix::Matrix;

/// An ordered collection of equal-length training samples.
///
/// The training loop only ever walks samples front to back, so a source just
/// has to hand them out lazily in a fixed order.
pub trait TrainingSet {
    fn sample_count(&self) -> usize;

    /// Length every sample is expected to have.
    fn feature_count(&self) -> usize;

    fn samples(&self) -> Box<dyn Iterator<Item = Cow<'_, [f64]>> + '_>;

    /// Checks the set against its labels before any weight is touched.
    fn validate(&self, labels: &[f64]) -> Result<()> {
        if self.sample_count() == 0 {
            return Err(NetworkError::EmptyTrainingSet);
        }
        if self.sample_count() != labels.len() {
            return Err(NetworkError::LabelCountMismatch {
                samples: self.sample_count(),
                labels: labels.len(),
            });
        }

        let expected = self.feature_count();
        match self.samples().enumerate().find(|(_, s)| s.len() != expected) {
            Some((index, sample)) => Err(NetworkError::RaggedSample {
                index,
                expected,
                actual: sample.len(),
            }),
            None => Ok(()),
        }
    }
}

/// Samples stored as matrix columns: `data[feature][sample]`.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSamples<'a> {
    matrix: &'a Matrix,
}

impl<'a> ColumnSamples<'a> {
    pub fn new(matrix: &'a Matrix) -> Self {
        ColumnSamples { matrix }
    }
}

impl TrainingSet for ColumnSamples<'_> {
    fn sample_count(&self) -> usize {
        self.matrix.cols
    }

    fn feature_count(&self) -> usize {
        self.matrix.rows
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Cow<'_, [f64]>> + '_> {
        Box::new((0..self.matrix.cols).map(|j| Cow::Owned(self.matrix.column(j))))
    }
}

/// One vector per sample, in order.
#[derive(Debug, Clone, Copy)]
pub struct RowSamples<'a> {
    rows: &'a [Vec<f64>],
}

impl<'a> RowSamples<'a> {
    pub fn new(rows: &'a [Vec<f64>]) -> Self {
        RowSamples { rows }
    }
}

impl TrainingSet for RowSamples<'_> {
    fn sample_count(&self) -> usize {
        self.rows.len()
    }

    fn feature_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Cow<'_, [f64]>> + '_> {
        Box::new(self.rows.iter().map(|row| Cow::Borrowed(row.as_slice())))
    }
}
