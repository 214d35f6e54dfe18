pub(crate) mod builder;
/// Depth-first tree listing
pub mod dump;
/// Entropy and information gain
pub mod entropy;
/// Tree nodes
pub mod node;
/// Tree configuration
pub mod params;
/// Per-node feature domains and label counts
pub mod summary;
/// The decision tree model
pub mod tree;

pub use params::{SplitMode, Task, TreeParams};
pub use tree::DecisionTree;
