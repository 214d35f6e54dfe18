/// Exact-match accuracy and per-row report
pub mod accuracy;
/// Regression error metrics
pub mod errors;
