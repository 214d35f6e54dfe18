//! # Decision-forest
//!
//! `decision-forest` grows entropy-driven decision trees over numeric tabular data,
//! either with multi-way splits on categorical features or binary threshold splits on
//! continuous ones, for classification or regression. Trees can be bagged into a
//! random forest that votes (or averages) over its members.
//!
//! ## Getting Started
//!
//! To use `decision-forest`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! decision-forest = "*"
//! ```
//!
//! ## Example Usage
//!
//! Training a continuous classification tree and a small forest on the same dataset:
//!
//! ```rust
//! use decision_forest::data::dataset::Dataset;
//! use decision_forest::forests::{ForestParams, RandomForest};
//! use decision_forest::trees::{DecisionTree, SplitMode, Task};
//!
//! let dataset = Dataset::from_rows(&[
//!     vec![1.0, 0.0],
//!     vec![2.0, 0.0],
//!     vec![5.0, 1.0],
//!     vec![6.0, 1.0],
//! ])
//! .unwrap();
//!
//! let mut tree = DecisionTree::with_settings(SplitMode::Continuous, Task::Classification, 1).unwrap();
//! tree.fit(&dataset).unwrap();
//! assert_eq!(tree.predict_row(&[1.5]).unwrap(), 0.0);
//!
//! let mut params = ForestParams::new();
//! params.set_num_trees(10).unwrap();
//! params.set_seed(Some(42));
//! let mut forest = RandomForest::with_params(params);
//! forest.fit(&dataset).unwrap();
//!
//! let predictions = forest.predict(&dataset.x).unwrap();
//! assert_eq!(predictions.len(), 4);
//! ```

/// Dataset and data loading utilities
pub mod data;
/// Error type shared by every model
pub mod error;
/// Random forests
pub mod forests;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;

pub use error::{ForestError, Result};
