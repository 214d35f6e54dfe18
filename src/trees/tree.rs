//! Decision Tree
use log::info;
use nalgebra::{DMatrix, DVector};
use std::fmt::{self, Display};

use super::builder::TreeBuilder;
use super::dump::{dump_tree, NodeDump};
use super::node::{NodeKind, TreeNode};
use super::params::{SplitMode, Task, TreeParams};
use crate::{
    data::dataset::{Dataset, RealNumber},
    error::{ForestError, Result},
    metrics::errors::RegressionMetrics,
};

/// Entropy-driven decision tree, discrete or continuous, for classification
/// or regression.
#[derive(Clone, Debug)]
pub struct DecisionTree<T: RealNumber> {
    root: Option<TreeNode<T>>,
    tree_params: TreeParams,
}

impl<T: RealNumber> Default for DecisionTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for DecisionTree<T> {}

impl<T: RealNumber> DecisionTree<T> {
    /// Creates a continuous classification tree with default parameters.
    pub fn new() -> Self {
        Self::with_params(TreeParams::new())
    }

    pub fn with_params(tree_params: TreeParams) -> Self {
        Self {
            root: None,
            tree_params,
        }
    }

    /// Creates a tree from the individual settings.
    ///
    /// # Arguments
    ///
    /// * `split_mode` - Discrete (multi-way) or continuous (threshold) splits.
    /// * `task` - Classification or regression leaves.
    /// * `min_data_size` - Subsets smaller than this become leaves.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_data_size` is 0.
    pub fn with_settings(split_mode: SplitMode, task: Task, min_data_size: usize) -> Result<Self> {
        let mut params = TreeParams::new();
        params.set_split_mode(split_mode);
        params.set_task(task);
        params.set_min_data_size(min_data_size)?;
        Ok(Self::with_params(params))
    }

    pub fn params(&self) -> &TreeParams {
        &self.tree_params
    }

    /// The root node, once fitted.
    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.root.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Builds the tree from a dataset.
    ///
    /// The previous tree, if any, is only replaced when the build succeeds.
    ///
    /// # Errors
    ///
    /// Fails on an invalid dataset and on any violated build invariant.
    pub fn fit(&mut self, dataset: &Dataset<T>) -> Result<()> {
        dataset.validate()?;
        let root = TreeBuilder::new(&self.tree_params).build(dataset)?;
        if !self.tree_params.in_forest() {
            info!(
                "Built tree on {} rows and {} features: {} leaves, depth {}.",
                dataset.nrows(),
                dataset.num_features(),
                root.num_leaves(),
                root.depth()
            );
        }
        self.root = Some(root);
        Ok(())
    }

    /// Predicts a single row of feature values.
    ///
    /// # Errors
    ///
    /// Fails when the tree wasn't fitted or the row is shorter than a
    /// feature the tree splits on.
    pub fn predict_row(&self, row: &[T]) -> Result<T> {
        let root = self.root.as_ref().ok_or(ForestError::NotFitted)?;
        Self::make_prediction(row, root)
    }

    /// Predicts every row of a feature matrix, in order.
    pub fn predict(&self, features: &DMatrix<T>) -> Result<DVector<T>> {
        let predictions = features
            .row_iter()
            .map(|row| {
                let row = row.iter().copied().collect::<Vec<_>>();
                self.predict_row(&row)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DVector::from_vec(predictions))
    }

    fn make_prediction(row: &[T], node: &TreeNode<T>) -> Result<T> {
        match &node.kind {
            NodeKind::Leaf { value } => Ok(*value),
            NodeKind::Continuous {
                feature_index,
                threshold,
                below,
                above,
            } => {
                let value = feature(row, *feature_index)?;
                if value < *threshold {
                    Self::make_prediction(row, below)
                } else {
                    Self::make_prediction(row, above)
                }
            }
            NodeKind::Discrete {
                feature_index,
                children,
            } => {
                let value = feature(row, *feature_index)?;
                if let Some(child) = children.iter().find(|c| c.split_value == Some(value)) {
                    return Self::make_prediction(row, child);
                }
                // Unseen category: follow the child that saw the most rows.
                let mut fallback: Option<&TreeNode<T>> = None;
                for child in children {
                    match fallback {
                        Some(best) if child.subset_size <= best.subset_size => {}
                        _ => fallback = Some(child),
                    }
                }
                let child = fallback.ok_or(ForestError::EmptyBranch {
                    feature: *feature_index,
                })?;
                Self::make_prediction(row, child)
            }
        }
    }

    /// Depth-first listing of every node.
    pub fn dump(&self) -> Result<Vec<NodeDump<T>>> {
        let root = self.root.as_ref().ok_or(ForestError::NotFitted)?;
        Ok(dump_tree(root))
    }

    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    pub fn num_leaves(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::num_leaves)
    }
}

fn feature<T: RealNumber>(row: &[T], feature_index: usize) -> Result<T> {
    row.get(feature_index)
        .copied()
        .ok_or(ForestError::RowTooShort {
            feature: feature_index,
            len: row.len(),
        })
}

impl<T: RealNumber> Display for DecisionTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.root {
            Some(root) => {
                for node in dump_tree(root) {
                    writeln!(f, "{}", node)?;
                }
                Ok(())
            }
            None => writeln!(f, "<unfitted tree>"),
        }
    }
}
