//! Recursive tree induction.
//!
//! Each call owns the data that reached its node and computes that node's
//! summary tables locally; nothing is shared between sibling subtrees.
use log::{debug, trace};
use rand::{rngs::StdRng, SeedableRng};

use super::entropy::choose_best_split;
use super::node::{NodeKind, TreeNode};
use super::params::{SplitMode, Task, TreeParams};
use super::summary::DatasetSummary;
use crate::data::dataset::{Dataset, RealNumber};
use crate::error::{ForestError, Result};

pub(crate) struct TreeBuilder<'a> {
    params: &'a TreeParams,
    rng: StdRng,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(params: &'a TreeParams) -> Self {
        let rng = match params.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { params, rng }
    }

    pub(crate) fn build<T: RealNumber>(&mut self, dataset: &Dataset<T>) -> Result<TreeNode<T>> {
        let feature_map = (0..dataset.num_features()).collect::<Vec<_>>();
        self.build_node(dataset.clone(), feature_map, None, 0)
    }

    /// `feature_map[i]` is the original column of local column `i`.
    fn build_node<T: RealNumber>(
        &mut self,
        data: Dataset<T>,
        feature_map: Vec<usize>,
        split_value: Option<T>,
        depth: usize,
    ) -> Result<TreeNode<T>> {
        let num_rows = data.nrows();
        if num_rows == 0 {
            return Err(ForestError::EmptySubset { depth });
        }
        let first_label = data.y[0];

        let summary = DatasetSummary::compute(&data, self.params.split_mode());
        if num_rows == 1 || summary.labels.len() == 1 {
            return Ok(TreeNode::leaf(first_label, split_value, num_rows));
        }

        if data.has_identical_features() {
            let value = self.fallback_value(&data, &summary, depth)?;
            debug!(
                "Identical features with {} labels at depth {}, leaf value {}.",
                summary.labels.len(),
                depth,
                value
            );
            return Ok(TreeNode::leaf(value, split_value, num_rows));
        }

        if !self.params.in_forest() && num_rows < self.params.min_data_size() {
            let value = self.fallback_value(&data, &summary, depth)?;
            debug!(
                "Subset of {} rows below minimum {} at depth {}, leaf value {}.",
                num_rows,
                self.params.min_data_size(),
                depth,
                value
            );
            return Ok(TreeNode::leaf(value, split_value, num_rows));
        }

        let candidate = if self.params.in_forest() {
            // Forest trees score splits on a random subset of rows only.
            let sample_size = ((num_rows as f64).sqrt().ceil() as usize).clamp(1, num_rows);
            let sample = data.sample_without_replacement(sample_size, &mut self.rng);
            let sample_summary = DatasetSummary::compute(&sample, self.params.split_mode());
            choose_best_split(&sample, &sample_summary, self.params.split_mode())
        } else {
            choose_best_split(&data, &summary, self.params.split_mode())
        };

        let Some(candidate) = candidate else {
            debug!(
                "No split candidate for {} rows at depth {}, leaf value {}.",
                num_rows, depth, first_label
            );
            return Ok(TreeNode::leaf(first_label, split_value, num_rows));
        };

        let local_feature = candidate.feature_index;
        let feature_index = feature_map[local_feature];
        trace!(
            "Depth {}: split on feature {} (threshold {:?}), gain {:.6}, rows {}.",
            depth,
            feature_index,
            candidate.threshold,
            candidate.gain,
            num_rows
        );

        let kind = match self.params.split_mode() {
            SplitMode::Discrete => {
                let child_map = feature_map
                    .iter()
                    .enumerate()
                    .filter(|&(local, _)| local != local_feature)
                    .map(|(_, &original)| original)
                    .collect::<Vec<_>>();

                let mut children = Vec::new();
                for &value in summary.domains.values(local_feature) {
                    let rows = (0..num_rows)
                        .filter(|&row| data.x[(row, local_feature)] == value)
                        .collect::<Vec<_>>();
                    let child_data = data.subset(&rows).without_feature(local_feature);
                    children.push(self.build_node(
                        child_data,
                        child_map.clone(),
                        Some(value),
                        depth + 1,
                    )?);
                }
                NodeKind::Discrete {
                    feature_index,
                    children,
                }
            }
            SplitMode::Continuous => {
                let threshold = candidate
                    .threshold
                    .ok_or(ForestError::MissingThreshold {
                        feature: feature_index,
                    })?;
                let (below, above): (Vec<usize>, Vec<usize>) =
                    (0..num_rows).partition(|&row| data.x[(row, local_feature)] < threshold);

                let below = self.build_node(data.subset(&below), feature_map.clone(), None, depth + 1)?;
                let above = self.build_node(data.subset(&above), feature_map, None, depth + 1)?;
                NodeKind::Continuous {
                    feature_index,
                    threshold,
                    below: Box::new(below),
                    above: Box::new(above),
                }
            }
        };

        Ok(TreeNode {
            kind,
            split_value,
            subset_size: num_rows,
        })
    }

    /// Leaf value when splitting is stopped early: the majority label for
    /// classification, the mean label for regression.
    fn fallback_value<T: RealNumber>(
        &self,
        data: &Dataset<T>,
        summary: &DatasetSummary<T>,
        depth: usize,
    ) -> Result<T> {
        match self.params.task() {
            Task::Classification => summary
                .labels
                .majority()
                .ok_or(ForestError::EmptySubset { depth }),
            Task::Regression => Ok(mean(data.labels())),
        }
    }
}

pub(crate) fn mean<T: RealNumber>(values: &[T]) -> T {
    let sum = values.iter().fold(T::zero(), |acc, &value| acc + value);
    match T::from_usize(values.len()) {
        Some(count) if !values.is_empty() => sum / count,
        _ => T::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::summary::FeatureDomains;
    use approx::assert_relative_eq;

    fn params(split_mode: SplitMode, min_data_size: usize) -> TreeParams {
        let mut params = TreeParams::new();
        params.set_split_mode(split_mode);
        params.set_min_data_size(min_data_size).unwrap();
        params.set_seed(Some(42));
        params
    }

    fn leaves(node: &TreeNode<f64>) -> Vec<&TreeNode<f64>> {
        if node.is_leaf() {
            return vec![node];
        }
        node.children().into_iter().flat_map(leaves).collect()
    }

    fn assert_sizes_add_up(node: &TreeNode<f64>) {
        let children = node.children();
        if children.is_empty() {
            return;
        }
        let total: usize = children.iter().map(|child| child.subset_size).sum();
        assert_eq!(total, node.subset_size);
        children.into_iter().for_each(assert_sizes_add_up);
    }

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 3.5);
        assert_eq!(mean::<f64>(&[]), 0.0);
    }

    #[test]
    fn test_single_row_is_leaf() {
        let params = params(SplitMode::Continuous, 1);
        let dataset = Dataset::from_rows(&[vec![1.0, 2.0, 7.0]]).unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_eq!(root.value(), Some(7.0));
        assert_eq!(root.subset_size, 1);
    }

    #[test]
    fn test_pure_subset_is_leaf_with_shared_label() {
        let params = params(SplitMode::Discrete, 1);
        let dataset =
            Dataset::from_rows(&[vec![1.0, 3.0], vec![2.0, 3.0], vec![5.0, 3.0]]).unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_eq!(root.value(), Some(3.0));
    }

    #[test]
    fn test_identical_features_use_majority() {
        let params = params(SplitMode::Continuous, 1);
        let dataset = Dataset::from_rows(&[
            vec![1.0, 1.0, 2.0],
            vec![1.0, 1.0, 1.0],
            vec![1.0, 1.0, 2.0],
        ])
        .unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_eq!(root.value(), Some(2.0));
    }

    #[test]
    fn test_identical_features_use_mean_for_regression() {
        let mut params = params(SplitMode::Continuous, 1);
        params.set_task(Task::Regression);
        let dataset =
            Dataset::from_rows(&[vec![1.0, 1.0], vec![1.0, 2.0], vec![1.0, 6.0]]).unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_relative_eq!(root.value().unwrap(), 3.0);
    }

    #[test]
    fn test_size_cutoff_forces_leaf() {
        let params = params(SplitMode::Continuous, 10);
        let dataset = Dataset::from_rows(&[
            vec![1.0, 0.0],
            vec![2.0, 1.0],
            vec![3.0, 1.0],
        ])
        .unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_eq!(root.value(), Some(1.0));
        assert_eq!(root.subset_size, 3);
    }

    #[test]
    fn test_size_cutoff_ignored_in_forest() {
        let mut params = params(SplitMode::Continuous, 10);
        params.set_in_forest(true);
        let dataset = Dataset::from_rows(&[
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 1.0],
            vec![4.0, 1.0],
        ])
        .unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_eq!(root.subset_size, 4);
        assert_sizes_add_up(&root);
    }

    #[test]
    fn test_zero_gain_split_ends_in_majority_leaves() {
        let params = params(SplitMode::Continuous, 1);
        // the first column separates nothing, the second holds duplicates
        let dataset = Dataset::from_rows(&[
            vec![1.0, 5.0, 1.0],
            vec![1.0, 5.0, 0.0],
            vec![2.0, 5.0, 1.0],
            vec![2.0, 5.0, 0.0],
        ])
        .unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_eq!(root.feature_index(), Some(0));
        assert_eq!(root.threshold(), Some(1.5));
        for child in root.children() {
            assert_eq!(child.value(), Some(0.0));
            assert_eq!(child.subset_size, 2);
        }
    }

    #[test]
    fn test_discrete_xor_tree_is_pure() {
        let params = params(SplitMode::Discrete, 1);
        let dataset = Dataset::from_rows(&[
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ])
        .unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();

        assert_eq!(root.feature_index(), Some(0));
        for child in root.children() {
            assert_eq!(child.feature_index(), Some(1));
        }
        assert_eq!(leaves(&root).len(), 4);
        assert!(leaves(&root).iter().all(|leaf| leaf.subset_size == 1));
        assert_sizes_add_up(&root);
    }

    #[test]
    fn test_discrete_children_keep_original_feature_index() {
        let params = params(SplitMode::Discrete, 1);
        // feature 1 decides first, then feature 2 refines the rest
        let dataset = Dataset::from_rows(&[
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![1.0, 1.0, 0.0, 1.0],
            vec![0.0, 1.0, 1.0, 2.0],
            vec![1.0, 1.0, 1.0, 2.0],
        ])
        .unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        assert_eq!(root.feature_index(), Some(1));

        let ones = root
            .children()
            .into_iter()
            .find(|child| child.split_value == Some(1.0))
            .unwrap();
        assert_eq!(ones.feature_index(), Some(2));
        assert_sizes_add_up(&root);
    }

    #[test]
    fn test_continuous_split_threshold() {
        let params = params(SplitMode::Continuous, 1);
        let dataset = Dataset::from_rows(&[
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![5.0, 1.0],
            vec![6.0, 1.0],
        ])
        .unwrap();
        let root = TreeBuilder::new(&params).build(&dataset).unwrap();
        let threshold = root.threshold().unwrap();
        assert!(threshold > 2.0 && threshold < 5.0);
        let children = root.children();
        assert_eq!(children[0].value(), Some(0.0));
        assert_eq!(children[1].value(), Some(1.0));
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let params = params(SplitMode::Continuous, 1);
        let empty = Dataset::<f64>::new(
            nalgebra::DMatrix::zeros(0, 2),
            nalgebra::DVector::zeros(0),
        );
        let err = TreeBuilder::new(&params).build(&empty).unwrap_err();
        assert!(matches!(err, ForestError::EmptySubset { depth: 0 }));
    }

    fn forest_params(split_mode: SplitMode, seed: u64) -> TreeParams {
        let mut params = params(split_mode, 1);
        params.set_in_forest(true);
        params.set_seed(Some(seed));
        params
    }

    fn forest_rows() -> Dataset<f64> {
        Dataset::from_rows(
            &(0..16)
                .map(|i| {
                    vec![
                        i as f64,
                        ((i * 5) % 16) as f64,
                        (i % 4) as f64,
                        if (i * 3) % 7 < 3 { 1.0 } else { 0.0 },
                    ]
                })
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    #[test]
    fn test_forest_root_is_scored_on_row_sample() {
        let dataset = forest_rows();
        for seed in 0..20 {
            let params = forest_params(SplitMode::Continuous, seed);
            let root = TreeBuilder::new(&params).build(&dataset).unwrap();

            // the root draws ceil(sqrt(16)) rows before anything else
            let mut rng = StdRng::seed_from_u64(seed);
            let sample = dataset.sample_without_replacement(4, &mut rng);
            let summary = DatasetSummary::compute(&sample, SplitMode::Continuous);
            match choose_best_split(&sample, &summary, SplitMode::Continuous) {
                Some(candidate) => {
                    assert_eq!(root.feature_index(), Some(candidate.feature_index));
                    assert_eq!(root.threshold(), candidate.threshold);
                }
                None => assert_eq!(root.value(), Some(dataset.y[0])),
            }
            assert_eq!(root.subset_size, 16);
            assert_sizes_add_up(&root);
        }
    }

    #[test]
    fn test_forest_single_label_sample_gives_first_label_leaf() {
        // only the first row carries label 2, the sample holds 3 of 9 rows
        let dataset = Dataset::from_rows(
            &(0..9)
                .map(|i| vec![i as f64, if i == 0 { 2.0 } else { 4.0 }])
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let mut pure_samples = 0;
        for seed in 0..20 {
            let params = forest_params(SplitMode::Continuous, seed);
            let root = TreeBuilder::new(&params).build(&dataset).unwrap();

            let mut rng = StdRng::seed_from_u64(seed);
            let sample = dataset.sample_without_replacement(3, &mut rng);
            if sample.labels().iter().all(|&label| label == 4.0) {
                pure_samples += 1;
                assert_eq!(root.value(), Some(2.0));
                assert_eq!(root.subset_size, 9);
            } else {
                assert!(!root.is_leaf());
            }
        }
        assert!(pure_samples > 0);
    }

    #[test]
    fn test_forest_discrete_children_cover_full_domain() {
        let dataset = forest_rows();
        for seed in 0..10 {
            let params = forest_params(SplitMode::Discrete, seed);
            let root = TreeBuilder::new(&params).build(&dataset).unwrap();

            let mut rng = StdRng::seed_from_u64(seed);
            let sample = dataset.sample_without_replacement(4, &mut rng);
            let summary = DatasetSummary::compute(&sample, SplitMode::Discrete);
            let candidate = choose_best_split(&sample, &summary, SplitMode::Discrete).unwrap();
            assert_eq!(root.feature_index(), Some(candidate.feature_index));

            let domain = FeatureDomains::compute(&dataset)
                .values(candidate.feature_index)
                .to_vec();
            let split_values = root
                .children()
                .iter()
                .map(|child| child.split_value.unwrap())
                .collect::<Vec<_>>();
            assert_eq!(split_values, domain);
            assert_sizes_add_up(&root);
        }
    }
}
