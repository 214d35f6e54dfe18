//! Errors
//!
//! Every fatal condition of dataset validation, tree induction and prediction.
//! A builder that hits one of these aborts; no partially built model is kept.
use thiserror::Error;

/// Errors raised by the `decision_forest` crate.
#[derive(Debug, Error)]
pub enum ForestError {
    /// A dataset with no rows was supplied.
    #[error("The dataset is empty.")]
    EmptyDataset,
    /// The recursion handed an empty subset to the tree builder.
    #[error("Empty data subset reached the tree builder at depth {depth}.")]
    EmptySubset { depth: usize },
    /// A row without any value, so there is no label column.
    #[error("Row {0} has no values, a label column is required.")]
    MissingLabelColumn(usize),
    /// Rows of different lengths.
    #[error("Row {row} has {found} values, expected {expected}.")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Feature matrix and label vector disagree on the number of rows.
    #[error("The feature matrix has {features} rows but there are {labels} labels.")]
    RowCountMismatch { features: usize, labels: usize },
    /// NaN or infinite value in a dataset.
    #[error("Non-finite value found at row {row}, column {column}.")]
    NonFiniteValue { row: usize, column: usize },
    /// A continuous split was chosen on a feature without a threshold.
    #[error("No threshold was found for continuous split on feature {feature}.")]
    MissingThreshold { feature: usize },
    /// Invalid parameter: name, expected, provided.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Prediction was requested before fitting.
    #[error("The model wasn't fitted yet.")]
    NotFitted,
    /// A query row does not contain the feature a node splits on.
    #[error("Row of length {len} has no feature {feature}.")]
    RowTooShort { feature: usize, len: usize },
    /// A discrete split node without any children.
    #[error("Discrete split on feature {feature} has no children.")]
    EmptyBranch { feature: usize },
    /// Parallel sequences of different lengths.
    #[error("Predictions and labels are of different sizes: {truth} labels, {predicted} predictions.")]
    LengthMismatch { truth: usize, predicted: usize },
    /// A CSV field that is not a number.
    #[error("Unable to parse value {value:?} at row {row}, column {column}.")]
    ParseValue {
        row: usize,
        column: usize,
        value: String,
    },
    /// Underlying CSV reader failure.
    #[error("Unable to read CSV data: {0}")]
    Csv(#[from] csv::Error),
    /// Underlying I/O failure.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ForestError>;
