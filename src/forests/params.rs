use crate::error::{ForestError, Result};
use crate::trees::params::{SplitMode, Task};

#[derive(Clone, Debug)]
pub struct ForestParams {
    num_trees: usize,
    bag_size: Option<usize>,
    split_mode: SplitMode,
    task: Task,
    seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestParams {
    pub fn new() -> Self {
        Self {
            num_trees: 1000,
            bag_size: None,
            split_mode: SplitMode::Continuous,
            task: Task::Classification,
            seed: None,
        }
    }

    pub fn set_num_trees(&mut self, num_trees: usize) -> Result<()> {
        if num_trees < 1 {
            return Err(ForestError::InvalidParameter(
                "num_trees".to_string(),
                "a value of at least 1".to_string(),
                num_trees.to_string(),
            ));
        }
        self.num_trees = num_trees;
        Ok(())
    }

    /// Rows drawn per bootstrap sample; `None` derives it from the dataset.
    pub fn set_bag_size(&mut self, bag_size: Option<usize>) -> Result<()> {
        if bag_size.is_some_and(|size| size < 1) {
            return Err(ForestError::InvalidParameter(
                "bag_size".to_string(),
                "a value of at least 1".to_string(),
                "0".to_string(),
            ));
        }
        self.bag_size = bag_size;
        Ok(())
    }

    pub fn set_split_mode(&mut self, split_mode: SplitMode) {
        self.split_mode = split_mode;
    }

    pub fn set_task(&mut self, task: Task) {
        self.task = task;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    pub fn bag_size(&self) -> Option<usize> {
        self.bag_size
    }

    /// Configured bag size, or two thirds of the rows (at least one).
    pub fn bag_size_for(&self, num_rows: usize) -> usize {
        self.bag_size
            .unwrap_or_else(|| ((num_rows * 2 + 2) / 3).max(1))
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
