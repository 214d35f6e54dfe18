//! Entropy and information gain.
//!
//! Labels are always treated as categories here, in regression mode too.
//! Every probability of exactly zero contributes a zero term, so none of the
//! functions below produce `NaN` on empty bins.
use std::cmp::Ordering;

use super::params::SplitMode;
use super::summary::{DatasetSummary, LabelFrequencies};
use crate::data::dataset::{Dataset, RealNumber};

/// A feature, and in continuous mode a threshold, to split a node on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitCandidate<T: RealNumber> {
    /// Column index local to the evaluated data.
    pub feature_index: usize,
    pub threshold: Option<T>,
    pub gain: f64,
}

fn entropy_of_counts(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// H(Y) over a label frequency table.
pub fn label_entropy<T: RealNumber>(labels: &LabelFrequencies<T>) -> f64 {
    let counts = labels.iter().map(|&(_, count)| count).collect::<Vec<_>>();
    entropy_of_counts(&counts, labels.total())
}

/// Sum over bins of P(bin) * H(Y | bin), bins given by `bin_of`.
fn binned_entropy<T, F>(
    dataset: &Dataset<T>,
    labels: &LabelFrequencies<T>,
    feature_index: usize,
    num_bins: usize,
    bin_of: F,
) -> f64
where
    T: RealNumber,
    F: Fn(T) -> Option<usize>,
{
    let total = dataset.nrows();
    if total == 0 {
        return 0.0;
    }

    let mut bin_counts = vec![0usize; num_bins];
    let mut joint_counts = vec![vec![0usize; labels.len()]; num_bins];
    for (row, &label) in dataset.labels().iter().enumerate() {
        let (Some(bin), Some(label_pos)) = (
            bin_of(dataset.x[(row, feature_index)]),
            labels.position(label),
        ) else {
            continue;
        };
        bin_counts[bin] += 1;
        joint_counts[bin][label_pos] += 1;
    }

    bin_counts
        .iter()
        .zip(joint_counts.iter())
        .filter(|(count, _)| **count > 0)
        .map(|(&count, joint)| {
            let p_bin = count as f64 / total as f64;
            p_bin * entropy_of_counts(joint, count)
        })
        .sum()
}

/// H(Y | X) for one feature.
///
/// In discrete mode the rows are binned by exact value using the feature
/// domains of `summary`; in continuous mode into `< threshold` and
/// `>= threshold`.
pub fn conditional_entropy<T: RealNumber>(
    dataset: &Dataset<T>,
    summary: &DatasetSummary<T>,
    feature_index: usize,
    threshold: Option<T>,
) -> f64 {
    match threshold {
        None => {
            let num_values = summary.domains.values(feature_index).len();
            binned_entropy(dataset, &summary.labels, feature_index, num_values, |value| {
                summary.domains.position(feature_index, value)
            })
        }
        Some(threshold) => {
            binned_entropy(dataset, &summary.labels, feature_index, 2, |value| {
                Some(if value < threshold { 0 } else { 1 })
            })
        }
    }
}

pub fn information_gain<T: RealNumber>(
    dataset: &Dataset<T>,
    summary: &DatasetSummary<T>,
    feature_index: usize,
    threshold: Option<T>,
    base_entropy: f64,
) -> f64 {
    base_entropy - conditional_entropy(dataset, summary, feature_index, threshold)
}

fn sorted_by_feature<T: RealNumber>(dataset: &Dataset<T>, feature_index: usize) -> Vec<(T, T)> {
    let mut pairs = dataset
        .x
        .column(feature_index)
        .iter()
        .copied()
        .zip(dataset.labels().iter().copied())
        .collect::<Vec<_>>();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    pairs
}

/// Thresholds wherever the label changes along the sorted feature.
///
/// Rows with equal feature values are collapsed into one run first. A cut is
/// placed between two neighbouring runs unless both carry the same single
/// label, at the midpoint of their values.
pub fn candidate_thresholds<T: RealNumber>(dataset: &Dataset<T>, feature_index: usize) -> Vec<T> {
    thresholds_of_sorted(&sorted_by_feature(dataset, feature_index))
}

fn thresholds_of_sorted<T: RealNumber>(sorted: &[(T, T)]) -> Vec<T> {
    // (value, Some(label) if the run is pure)
    let mut runs: Vec<(T, Option<T>)> = Vec::new();
    for &(value, label) in sorted {
        match runs.last_mut() {
            Some((run_value, run_label)) if *run_value == value => {
                if *run_label != Some(label) {
                    *run_label = None;
                }
            }
            _ => runs.push((value, Some(label))),
        }
    }

    let two = T::one() + T::one();
    runs.windows(2)
        .filter(|pair| match (pair[0].1, pair[1].1) {
            (Some(left), Some(right)) => left != right,
            _ => true,
        })
        .map(|pair| {
            let (low, high) = (pair[0].0, pair[1].0);
            let mid = low + (high - low) / two;
            // adjacent floats: the midpoint must still send `low` left
            if mid > low {
                mid
            } else {
                high
            }
        })
        .collect()
}

/// H(Y | X < t, X >= t) for every ascending threshold `t`, in one pass.
///
/// Label counts below the threshold are carried from one threshold to the
/// next, so the results equal `conditional_entropy` with `Some(t)`.
fn sweep_threshold_entropies<T: RealNumber>(
    sorted: &[(T, T)],
    labels: &LabelFrequencies<T>,
    thresholds: &[T],
) -> Vec<f64> {
    let total = sorted.len();
    if total == 0 {
        return vec![0.0; thresholds.len()];
    }

    let mut all = vec![0usize; labels.len()];
    let positions = sorted
        .iter()
        .map(|&(_, label)| labels.position(label))
        .collect::<Vec<_>>();
    for pos in positions.iter().flatten() {
        all[*pos] += 1;
    }
    let counted = all.iter().sum::<usize>();

    let mut below = vec![0usize; labels.len()];
    let mut below_count = 0;
    let mut next = 0;
    thresholds
        .iter()
        .map(|&threshold| {
            while next < total && sorted[next].0 < threshold {
                if let Some(pos) = positions[next] {
                    below[pos] += 1;
                    below_count += 1;
                }
                next += 1;
            }
            let above = all
                .iter()
                .zip(below.iter())
                .map(|(&a, &b)| a - b)
                .collect::<Vec<_>>();

            [(below_count, &below), (counted - below_count, &above)]
                .into_iter()
                .filter(|(count, _)| *count > 0)
                .map(|(count, joint)| {
                    let p_bin = count as f64 / total as f64;
                    p_bin * entropy_of_counts(joint, count)
                })
                .sum()
        })
        .collect()
}

/// The candidate with the highest information gain.
///
/// Features are scanned left to right, thresholds in ascending order, and a
/// later candidate only wins with a strictly greater gain. Returns `None` when
/// there is nothing to evaluate: no feature column is left, or in continuous
/// mode no column has a label-induced threshold.
pub fn choose_best_split<T: RealNumber>(
    dataset: &Dataset<T>,
    summary: &DatasetSummary<T>,
    split_mode: SplitMode,
) -> Option<SplitCandidate<T>> {
    let base_entropy = label_entropy(&summary.labels);
    let mut best: Option<SplitCandidate<T>> = None;
    let mut best_gain = f64::NEG_INFINITY;

    for feature_index in 0..dataset.num_features() {
        let scored = match split_mode {
            SplitMode::Discrete => vec![(
                None,
                information_gain(dataset, summary, feature_index, None, base_entropy),
            )],
            SplitMode::Continuous => {
                let sorted = sorted_by_feature(dataset, feature_index);
                let thresholds = thresholds_of_sorted(&sorted);
                let entropies = sweep_threshold_entropies(&sorted, &summary.labels, &thresholds);
                thresholds
                    .into_iter()
                    .zip(entropies)
                    .map(|(threshold, entropy)| (Some(threshold), base_entropy - entropy))
                    .collect()
            }
        };

        for (threshold, gain) in scored {
            if gain > best_gain {
                best_gain = gain;
                best = Some(SplitCandidate {
                    feature_index,
                    threshold,
                    gain,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn xor() -> Dataset<f64> {
        Dataset::from_rows(&[
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_label_entropy_bounds() {
        let pure = LabelFrequencies::compute(&[1.0, 1.0, 1.0]);
        assert_eq!(label_entropy(&pure), 0.0);

        let even = LabelFrequencies::compute(&[0.0, 1.0, 0.0, 1.0]);
        assert_abs_diff_eq!(label_entropy(&even), 1.0, epsilon = 1e-12);

        let four = LabelFrequencies::compute(&[0.0, 1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(label_entropy(&four), 2.0, epsilon = 1e-12);

        let skewed = LabelFrequencies::compute(&[0.0, 0.0, 0.0, 1.0]);
        let h = label_entropy(&skewed);
        assert!(h > 0.0 && h < 1.0);
    }

    #[test]
    fn test_label_entropy_empty_is_zero() {
        let empty = LabelFrequencies::<f64>::compute(&[]);
        assert_eq!(label_entropy(&empty), 0.0);
    }

    #[test]
    fn test_conditional_entropy_discrete() {
        let dataset = Dataset::from_rows(&[
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        ])
        .unwrap();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Discrete);
        assert_abs_diff_eq!(
            conditional_entropy(&dataset, &summary, 0, None),
            0.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            information_gain(&dataset, &summary, 0, None, 1.0),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_conditional_entropy_xor_has_no_gain() {
        let dataset = xor();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Discrete);
        let base = label_entropy(&summary.labels);
        for feature in 0..2 {
            assert_abs_diff_eq!(
                information_gain(&dataset, &summary, feature, None, base),
                0.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_conditional_entropy_empty_bin_is_finite() {
        let dataset = Dataset::from_rows(&[vec![1.0, 0.0], vec![2.0, 1.0]]).unwrap();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Continuous);
        let h = conditional_entropy(&dataset, &summary, 0, Some(100.0));
        assert!(h.is_finite());
        assert_abs_diff_eq!(h, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_candidate_thresholds_at_label_changes() {
        let dataset = Dataset::from_rows(&[
            vec![6.0, 1.0],
            vec![1.0, 0.0],
            vec![5.0, 1.0],
            vec![2.0, 0.0],
        ])
        .unwrap();
        assert_eq!(candidate_thresholds(&dataset, 0), vec![3.5]);
    }

    #[test]
    fn test_candidate_thresholds_collapse_equal_values() {
        let dataset = Dataset::from_rows(&[
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![2.0, 1.0],
            vec![3.0, 1.0],
        ])
        .unwrap();
        assert_eq!(candidate_thresholds(&dataset, 0), vec![1.5, 2.5]);
    }

    #[test]
    fn test_candidate_thresholds_none_for_duplicates() {
        let dataset = Dataset::from_rows(&[vec![4.0, 0.0], vec![4.0, 1.0]]).unwrap();
        assert!(candidate_thresholds(&dataset, 0).is_empty());
    }

    #[test]
    fn test_candidate_threshold_between_adjacent_floats() {
        let low = 1.0_f64;
        let high = f64::from_bits(low.to_bits() + 1);
        let dataset = Dataset::from_rows(&[vec![low, 0.0], vec![high, 1.0]]).unwrap();
        let thresholds = candidate_thresholds(&dataset, 0);
        assert_eq!(thresholds.len(), 1);
        assert!(low < thresholds[0] && thresholds[0] <= high);
    }

    #[test]
    fn test_choose_best_split_continuous() {
        let dataset = Dataset::from_rows(&[
            vec![9.0, 1.0, 0.0],
            vec![3.0, 2.0, 0.0],
            vec![9.0, 5.0, 1.0],
            vec![3.0, 6.0, 1.0],
        ])
        .unwrap();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Continuous);
        let best = choose_best_split(&dataset, &summary, SplitMode::Continuous).unwrap();
        assert_eq!(best.feature_index, 1);
        assert_eq!(best.threshold, Some(3.5));
        assert_abs_diff_eq!(best.gain, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_choose_best_split_is_maximal() {
        let dataset = Dataset::from_rows(&[
            vec![1.0, 7.0, 0.0, 0.0],
            vec![2.0, 3.0, 1.0, 0.0],
            vec![3.0, 8.0, 0.0, 1.0],
            vec![4.0, 1.0, 1.0, 1.0],
            vec![5.0, 2.0, 0.0, 2.0],
            vec![6.0, 9.0, 1.0, 2.0],
        ])
        .unwrap();
        for mode in [SplitMode::Discrete, SplitMode::Continuous] {
            let summary = DatasetSummary::compute(&dataset, mode);
            let base = label_entropy(&summary.labels);
            let best = choose_best_split(&dataset, &summary, mode).unwrap();
            for feature in 0..dataset.num_features() {
                let thresholds = match mode {
                    SplitMode::Discrete => vec![None],
                    SplitMode::Continuous => candidate_thresholds(&dataset, feature)
                        .into_iter()
                        .map(Some)
                        .collect(),
                };
                for threshold in thresholds {
                    let gain = information_gain(&dataset, &summary, feature, threshold, base);
                    assert!(gain <= best.gain);
                }
            }
        }
    }

    #[test]
    fn test_choose_best_split_tie_goes_to_first_feature() {
        let dataset = xor();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Discrete);
        let best = choose_best_split(&dataset, &summary, SplitMode::Discrete).unwrap();
        assert_eq!(best.feature_index, 0);
        assert_eq!(best.threshold, None);
    }

    #[test]
    fn test_choose_best_split_none_without_candidates() {
        let dataset = Dataset::from_rows(&[vec![4.0, 0.0], vec![4.0, 1.0]]).unwrap();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Continuous);
        assert!(choose_best_split(&dataset, &summary, SplitMode::Continuous).is_none());

        let labels_only = Dataset::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
        let summary = DatasetSummary::compute(&labels_only, SplitMode::Discrete);
        assert!(choose_best_split(&labels_only, &summary, SplitMode::Discrete).is_none());
    }

    #[test]
    fn test_threshold_sweep_matches_direct_entropy() {
        let dataset = Dataset::from_rows(&[
            vec![4.0, 2.0],
            vec![1.0, 0.0],
            vec![3.0, 1.0],
            vec![1.0, 1.0],
            vec![7.0, 2.0],
            vec![3.0, 0.0],
            vec![5.0, 1.0],
            vec![7.0, 0.0],
        ])
        .unwrap();
        let summary = DatasetSummary::compute(&dataset, SplitMode::Continuous);
        let sorted = sorted_by_feature(&dataset, 0);
        let thresholds = thresholds_of_sorted(&sorted);
        assert_eq!(thresholds, candidate_thresholds(&dataset, 0));
        assert_eq!(thresholds.len(), 4);

        let swept = sweep_threshold_entropies(&sorted, &summary.labels, &thresholds);
        for (threshold, entropy) in thresholds.iter().zip(swept) {
            assert_eq!(
                entropy,
                conditional_entropy(&dataset, &summary, 0, Some(*threshold))
            );
        }
    }
}
