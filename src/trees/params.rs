use crate::error::{ForestError, Result};

/// How feature values are split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitMode {
    /// Values are categories compared by equality, one child per value.
    Discrete,
    /// Values are ordered, one binary threshold split per node.
    #[default]
    Continuous,
}

/// What a leaf predicts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Task {
    /// Majority label.
    #[default]
    Classification,
    /// Averaged label value.
    Regression,
}

#[derive(Clone, Debug)]
pub struct TreeParams {
    pub split_mode: SplitMode,
    pub task: Task,
    pub min_data_size: usize,
    pub in_forest: bool,
    pub seed: Option<u64>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            split_mode: SplitMode::Continuous,
            task: Task::Classification,
            min_data_size: 1,
            in_forest: false,
            seed: None,
        }
    }

    pub fn set_split_mode(&mut self, split_mode: SplitMode) {
        self.split_mode = split_mode;
    }

    pub fn set_task(&mut self, task: Task) {
        self.task = task;
    }

    /// Subsets smaller than this become leaves outside of a forest.
    pub fn set_min_data_size(&mut self, min_data_size: usize) -> Result<()> {
        if min_data_size < 1 {
            return Err(ForestError::InvalidParameter(
                "min_data_size".to_string(),
                "a value of at least 1".to_string(),
                min_data_size.to_string(),
            ));
        }
        self.min_data_size = min_data_size;
        Ok(())
    }

    pub fn set_in_forest(&mut self, in_forest: bool) {
        self.in_forest = in_forest;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn min_data_size(&self) -> usize {
        self.min_data_size
    }

    pub fn in_forest(&self) -> bool {
        self.in_forest
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
