//! Flat depth-first listing of a tree, for printing.
use std::fmt::{self, Display};

use super::node::{NodeKind, TreeNode};
use crate::data::dataset::RealNumber;

/// How a node was reached from its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Branch<T: RealNumber> {
    Root,
    /// Discrete parent, this child holds `feature == value`.
    Value { feature_index: usize, value: T },
    /// Continuous parent, `feature < threshold`.
    Below { feature_index: usize, threshold: T },
    /// Continuous parent, `feature >= threshold`.
    AtOrAbove { feature_index: usize, threshold: T },
}

/// One node of a dumped tree.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDump<T: RealNumber> {
    pub depth: usize,
    pub branch: Branch<T>,
    /// Feature this node splits on, `None` for leaves.
    pub feature_index: Option<usize>,
    /// Own threshold of a continuous split.
    pub threshold: Option<T>,
    pub subset_size: usize,
    /// Predicted value of a leaf.
    pub label: Option<T>,
}

impl<T: RealNumber> Display for NodeDump<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", "    ".repeat(self.depth))?;
        match self.branch {
            Branch::Root => write!(f, "root")?,
            Branch::Value {
                feature_index,
                value,
            } => write!(f, "[x{} == {}]", feature_index, value)?,
            Branch::Below {
                feature_index,
                threshold,
            } => write!(f, "[x{} < {}]", feature_index, threshold)?,
            Branch::AtOrAbove {
                feature_index,
                threshold,
            } => write!(f, "[x{} >= {}]", feature_index, threshold)?,
        }
        write!(f, " rows={}", self.subset_size)?;
        match self.label {
            Some(label) => write!(f, " -> {}", label),
            None => match self.feature_index {
                Some(feature_index) => write!(f, " split x{}", feature_index),
                None => Ok(()),
            },
        }
    }
}

/// Lists every node of the subtree in depth-first (pre-)order.
pub fn dump_tree<T: RealNumber>(root: &TreeNode<T>) -> Vec<NodeDump<T>> {
    let mut dumps = Vec::new();
    let mut stack = vec![(root, Branch::Root, 0)];
    while let Some((node, branch, depth)) = stack.pop() {
        dumps.push(NodeDump {
            depth,
            branch,
            feature_index: node.feature_index(),
            threshold: node.threshold(),
            subset_size: node.subset_size,
            label: node.value(),
        });

        match &node.kind {
            NodeKind::Leaf { .. } => {}
            NodeKind::Discrete {
                feature_index,
                children,
            } => {
                for child in children.iter().rev() {
                    let branch = match child.split_value {
                        Some(value) => Branch::Value {
                            feature_index: *feature_index,
                            value,
                        },
                        None => Branch::Root,
                    };
                    stack.push((child, branch, depth + 1));
                }
            }
            NodeKind::Continuous {
                feature_index,
                threshold,
                below,
                above,
            } => {
                stack.push((
                    above.as_ref(),
                    Branch::AtOrAbove {
                        feature_index: *feature_index,
                        threshold: *threshold,
                    },
                    depth + 1,
                ));
                stack.push((
                    below.as_ref(),
                    Branch::Below {
                        feature_index: *feature_index,
                        threshold: *threshold,
                    },
                    depth + 1,
                ));
            }
        }
    }
    dumps
}
