//! Per-node dataset summaries.
//!
//! Both tables are computed from the data that reached a node and are never
//! inherited: after a discrete split the remaining columns renumber, and any
//! split changes the residual label distribution.
use std::cmp::Ordering;

use super::params::SplitMode;
use crate::data::dataset::{Dataset, RealNumber};

/// Distinct values of every feature column, in first-occurrence order.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureDomains<T: RealNumber> {
    domains: Vec<Vec<T>>,
}

impl<T: RealNumber> FeatureDomains<T> {
    pub fn compute(dataset: &Dataset<T>) -> Self {
        let domains = dataset
            .x
            .column_iter()
            .map(|column| {
                let mut values: Vec<T> = Vec::new();
                for &value in column.iter() {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
                values
            })
            .collect();
        Self { domains }
    }

    /// An empty table, used in continuous mode where domains are not needed.
    pub fn empty() -> Self {
        Self {
            domains: Vec::new(),
        }
    }

    pub fn values(&self, feature_index: usize) -> &[T] {
        self.domains
            .get(feature_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn position(&self, feature_index: usize, value: T) -> Option<usize> {
        self.values(feature_index).iter().position(|&v| v == value)
    }

    pub fn num_features(&self) -> usize {
        self.domains.len()
    }
}

/// Occurrence count of each distinct label, kept in ascending label order.
///
/// The fixed order makes majority votes reproducible: among equally frequent
/// labels the smallest one wins.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelFrequencies<T: RealNumber> {
    counts: Vec<(T, usize)>,
    total: usize,
}

impl<T: RealNumber> LabelFrequencies<T> {
    pub fn compute(labels: &[T]) -> Self {
        let mut counts: Vec<(T, usize)> = Vec::new();
        for &label in labels {
            match counts.binary_search_by(|(probe, _)| {
                probe.partial_cmp(&label).unwrap_or(Ordering::Equal)
            }) {
                Ok(pos) => counts[pos].1 += 1,
                Err(pos) => counts.insert(pos, (label, 1)),
            }
        }
        Self {
            counts,
            total: labels.len(),
        }
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of labels counted.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = &(T, usize)> {
        self.counts.iter()
    }

    pub fn count(&self, label: T) -> usize {
        self.position(label).map_or(0, |pos| self.counts[pos].1)
    }

    pub fn position(&self, label: T) -> Option<usize> {
        self.counts.iter().position(|&(l, _)| l == label)
    }

    /// The most frequent label; ties go to the first label in ascending order.
    pub fn majority(&self) -> Option<T> {
        let mut best: Option<(T, usize)> = None;
        for &(label, count) in &self.counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((label, count)),
            }
        }
        best.map(|(label, _)| label)
    }
}

/// Both summary tables of one node's data.
#[derive(Clone, Debug)]
pub struct DatasetSummary<T: RealNumber> {
    pub domains: FeatureDomains<T>,
    pub labels: LabelFrequencies<T>,
}

impl<T: RealNumber> DatasetSummary<T> {
    /// Feature domains are only collected in discrete mode.
    pub fn compute(dataset: &Dataset<T>, split_mode: SplitMode) -> Self {
        let domains = match split_mode {
            SplitMode::Discrete => FeatureDomains::compute(dataset),
            SplitMode::Continuous => FeatureDomains::empty(),
        };
        Self {
            domains,
            labels: LabelFrequencies::compute(dataset.labels()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_domains_first_occurrence_order() {
        let dataset = Dataset::from_rows(&[
            vec![3.0, 1.0, 0.0],
            vec![1.0, 1.0, 1.0],
            vec![3.0, 2.0, 0.0],
            vec![2.0, 1.0, 1.0],
        ])
        .unwrap();
        let domains = FeatureDomains::compute(&dataset);
        assert_eq!(domains.num_features(), 2);
        assert_eq!(domains.values(0), &[3.0, 1.0, 2.0]);
        assert_eq!(domains.values(1), &[1.0, 2.0]);
        assert_eq!(domains.position(0, 2.0), Some(2));
        assert_eq!(domains.position(0, 7.0), None);
        assert!(domains.values(5).is_empty());
    }

    #[test]
    fn test_label_frequencies_ascending() {
        let labels = LabelFrequencies::compute(&[2.0, 0.0, 2.0, 1.0, 2.0]);
        let collected = labels.iter().copied().collect::<Vec<_>>();
        assert_eq!(collected, vec![(0.0, 1), (1.0, 1), (2.0, 3)]);
        assert_eq!(labels.total(), 5);
        assert_eq!(labels.count(2.0), 3);
        assert_eq!(labels.count(9.0), 0);
    }

    #[test]
    fn test_majority_label() {
        let labels = LabelFrequencies::compute(&[5.0, 1.0, 5.0]);
        assert_eq!(labels.majority(), Some(5.0));
    }

    #[test]
    fn test_majority_label_tie_goes_to_smallest() {
        let labels = LabelFrequencies::compute(&[1.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(labels.majority(), Some(0.0));
    }

    #[test]
    fn test_majority_label_empty() {
        let labels = LabelFrequencies::<f64>::compute(&[]);
        assert!(labels.is_empty());
        assert_eq!(labels.majority(), None);
    }

    #[test]
    fn test_summary_skips_domains_in_continuous_mode() {
        let dataset = Dataset::from_rows(&[vec![1.0, 0.0], vec![2.0, 1.0]]).unwrap();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Continuous);
        assert_eq!(summary.domains.num_features(), 0);
        assert_eq!(summary.labels.len(), 2);

        let summary = DatasetSummary::compute(&dataset, SplitMode::Discrete);
        assert_eq!(summary.domains.values(0), &[1.0, 2.0]);
    }
}
