/// Loading datasets from CSV files
pub mod csv;
/// In-memory tabular dataset
pub mod dataset;
