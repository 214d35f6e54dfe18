use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use super::params::ForestParams;
use crate::{
    data::dataset::{Dataset, RealNumber},
    error::{ForestError, Result},
    metrics::errors::RegressionMetrics,
    trees::{
        builder::mean, dump::NodeDump, params::Task, summary::LabelFrequencies, DecisionTree,
        TreeParams,
    },
};

/// Bagged ensemble of decision trees built in forest mode.
#[derive(Clone, Debug)]
pub struct RandomForest<T: RealNumber> {
    trees: Vec<DecisionTree<T>>,
    forest_params: ForestParams,
}

impl<T: RealNumber> Default for RandomForest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for RandomForest<T> {}

impl<T: RealNumber> RandomForest<T> {
    pub fn new() -> Self {
        Self::with_params(ForestParams::new())
    }

    pub fn with_params(forest_params: ForestParams) -> Self {
        Self {
            trees: Vec::new(),
            forest_params,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.forest_params
    }

    pub fn trees(&self) -> &[DecisionTree<T>] {
        &self.trees
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Grows `num_trees` trees, each on its own bootstrap sample of the
    /// dataset.
    ///
    /// Per-tree seeds are drawn from one master generator before the trees
    /// are built in parallel, so a fixed seed always yields the same forest.
    ///
    /// # Errors
    ///
    /// Fails on an invalid dataset or when any tree fails to build. The
    /// previous trees are kept in that case.
    pub fn fit(&mut self, dataset: &Dataset<T>) -> Result<()> {
        dataset.validate()?;
        let nrows = dataset.nrows();
        let bag_size = self.forest_params.bag_size_for(nrows);
        if bag_size >= nrows && self.forest_params.bag_size().is_some() {
            warn!(
                "Bag size {} covers all {} rows, every tree sees the full dataset.",
                bag_size, nrows
            );
        }

        let mut rng = match self.forest_params.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seeds = (0..self.forest_params.num_trees())
            .map(|_| rng.gen::<u64>())
            .collect::<Vec<_>>();

        let forest_params = &self.forest_params;
        let min_data_size = ((nrows as f64).sqrt().round() as usize).max(1);
        info!(
            "Growing {} trees on {} rows, bag size {}.",
            seeds.len(),
            nrows,
            bag_size
        );

        let trees = seeds
            .into_par_iter()
            .enumerate()
            .map(|(index, tree_seed)| -> Result<DecisionTree<T>> {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let bag = dataset.bootstrap(bag_size, &mut rng);

                let mut tree_params = TreeParams::new();
                tree_params.set_split_mode(forest_params.split_mode());
                tree_params.set_task(forest_params.task());
                tree_params.set_min_data_size(min_data_size)?;
                tree_params.set_in_forest(true);
                tree_params.set_seed(Some(rng.gen()));

                let mut tree = DecisionTree::with_params(tree_params);
                tree.fit(&bag)?;
                debug!(
                    "Tree {}: {} leaves, depth {}.",
                    index,
                    tree.num_leaves().unwrap_or(0),
                    tree.depth().unwrap_or(0)
                );
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        info!("Finished growing {} trees.", self.trees.len());
        Ok(())
    }

    /// Aggregates the per-tree predictions for one row: majority vote for
    /// classification (ties to the smallest label), mean for regression.
    pub fn predict_row(&self, row: &[T]) -> Result<T> {
        if self.trees.is_empty() {
            return Err(ForestError::NotFitted);
        }
        let predictions = self
            .trees
            .iter()
            .map(|tree| tree.predict_row(row))
            .collect::<Result<Vec<_>>>()?;

        match self.forest_params.task() {
            Task::Classification => LabelFrequencies::compute(&predictions)
                .majority()
                .ok_or(ForestError::NotFitted),
            Task::Regression => Ok(mean(&predictions)),
        }
    }

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

    /// Dumps of `sample_size` trees picked at an even stride.
    pub fn sample_dumps(&self, sample_size: usize) -> Result<Vec<Vec<NodeDump<T>>>> {
        if self.trees.is_empty() {
            return Err(ForestError::NotFitted);
        }
        let step = (self.trees.len() / sample_size.max(1)).max(1);
        self.trees
            .iter()
            .step_by(step)
            .take(sample_size)
            .map(DecisionTree::dump)
            .collect()
    }
}
