use std::fmt::{self, Display};

use crate::data::dataset::RealNumber;
use crate::error::{ForestError, Result};

const RULE: &str = "----------------------------------------------------------------";

/// Exact-match comparison of true labels and predictions.
#[derive(Clone, Debug, PartialEq)]
pub struct AccuracyReport<T: RealNumber> {
    pairs: Vec<(T, T)>,
    correct: usize,
}

impl<T: RealNumber> AccuracyReport<T> {
    /// Compares two parallel sequences.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequences have different lengths.
    pub fn compute(y_true: &[T], y_pred: &[T]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(ForestError::LengthMismatch {
                truth: y_true.len(),
                predicted: y_pred.len(),
            });
        }
        let pairs = y_true
            .iter()
            .copied()
            .zip(y_pred.iter().copied())
            .collect::<Vec<_>>();
        let correct = pairs.iter().filter(|(t, p)| t == p).count();
        Ok(Self { pairs, correct })
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn total(&self) -> usize {
        self.pairs.len()
    }

    /// Share of exact matches, 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.pairs.is_empty() {
            return 0.0;
        }
        self.correct as f64 / self.pairs.len() as f64
    }
}

/// Shorthand for `AccuracyReport::compute(..)?.ratio()`.
pub fn accuracy<T: RealNumber>(y_true: &[T], y_pred: &[T]) -> Result<f64> {
    Ok(AccuracyReport::compute(y_true, y_pred)?.ratio())
}

/// One line per row with mismatches starred, then the totals.
impl<T: RealNumber> Display for AccuracyReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:>4}{:>12}{:>30}", "#", "True Label", "Predicted Label")?;
        writeln!(f, "{}", RULE)?;
        for (i, (truth, predicted)) in self.pairs.iter().enumerate() {
            let marker = if truth == predicted {
                "            "
            } else {
                "  ********  "
            };
            writeln!(f, "{:>4}{:>12}{}{}", i + 1, truth, marker, predicted)?;
        }
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Size of the test dataset: {}", self.total())?;
        writeln!(f, "Number of correctly predicted labels: {}", self.correct)
    }
}
