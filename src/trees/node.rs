use std::fmt::{self, Display};

use crate::data::dataset::RealNumber;

/// What a node does with a row.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind<T: RealNumber> {
    Leaf {
        value: T,
    },
    /// Multi-way split, one child per value seen in training.
    Discrete {
        feature_index: usize,
        children: Vec<TreeNode<T>>,
    },
    /// Binary split; `below` takes `< threshold`, `above` takes `>= threshold`.
    Continuous {
        feature_index: usize,
        threshold: T,
        below: Box<TreeNode<T>>,
        above: Box<TreeNode<T>>,
    },
}

/// Decision tree node.
///
/// `feature_index` is always a column of the original dataset, even below
/// discrete splits that removed columns from the training subset.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode<T: RealNumber> {
    pub kind: NodeKind<T>,
    /// Value of the parent's discrete feature this child was built for.
    pub split_value: Option<T>,
    /// Number of training rows that reached the node.
    pub subset_size: usize,
}

impl<T: RealNumber> TreeNode<T> {
    pub fn leaf(value: T, split_value: Option<T>, subset_size: usize) -> Self {
        Self {
            kind: NodeKind::Leaf { value },
            split_value,
            subset_size,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn value(&self) -> Option<T> {
        match self.kind {
            NodeKind::Leaf { value } => Some(value),
            _ => None,
        }
    }

    pub fn feature_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Discrete { feature_index, .. }
            | NodeKind::Continuous { feature_index, .. } => Some(feature_index),
        }
    }

    pub fn threshold(&self) -> Option<T> {
        match self.kind {
            NodeKind::Continuous { threshold, .. } => Some(threshold),
            _ => None,
        }
    }

    /// Children in split order.
    pub fn children(&self) -> Vec<&TreeNode<T>> {
        match &self.kind {
            NodeKind::Leaf { .. } => Vec::new(),
            NodeKind::Discrete { children, .. } => children.iter().collect(),
            NodeKind::Continuous { below, above, .. } => vec![below.as_ref(), above.as_ref()],
        }
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        self.children()
            .into_iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn num_leaves(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children()
            .into_iter()
            .map(TreeNode::num_leaves)
            .sum()
    }

    pub fn num_nodes(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(TreeNode::num_nodes)
            .sum::<usize>()
    }
}

impl<T: RealNumber> Display for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            NodeKind::Leaf { value } => write!(f, "leaf={}, rows={}", value, self.subset_size),
            NodeKind::Discrete {
                feature_index,
                children,
            } => write!(
                f,
                "split on feature {} into {} values, rows={}",
                feature_index,
                children.len(),
                self.subset_size
            ),
            NodeKind::Continuous {
                feature_index,
                threshold,
                ..
            } => write!(
                f,
                "feature {} < {}, rows={}",
                feature_index, threshold, self.subset_size
            ),
        }
    }
}
