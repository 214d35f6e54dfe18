use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use rand::{rngs::StdRng, SeedableRng};
use std::cmp::PartialOrd;
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use crate::error::{ForestError, Result};

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

/// Tabular numeric data: one feature row per sample and one label per row.
///
/// Rows handed in through [`Dataset::from_rows`] carry the label in their last
/// position, the same layout the CSV loader reads.
#[derive(Clone)]
pub struct Dataset<T: RealNumber> {
    pub x: DMatrix<T>,
    pub y: DVector<T>,
}

impl<T: RealNumber> Debug for Dataset<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{:?}, ", self.y[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl<T: RealNumber> Dataset<T> {
    pub fn new(x: DMatrix<T>, y: DVector<T>) -> Self {
        Self { x, y }
    }

    /// Builds a dataset from rows whose last value is the label.
    ///
    /// # Errors
    ///
    /// Fails on an empty row list, on a row without values and on rows whose
    /// length differs from the first row.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let first = rows.first().ok_or(ForestError::EmptyDataset)?;
        let width = first.len();
        if width == 0 {
            return Err(ForestError::MissingLabelColumn(0));
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(ForestError::RaggedRow {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
        }

        let num_features = width - 1;
        let x = DMatrix::from_fn(rows.len(), num_features, |i, j| rows[i][j]);
        let y = DVector::from_iterator(rows.len(), rows.iter().map(|row| row[num_features]));
        let dataset = Self::new(x, y);
        dataset.validate()?;
        Ok(dataset)
    }

    /// Checks the shape and the values of the dataset.
    pub fn validate(&self) -> Result<()> {
        if self.y.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        if self.x.nrows() != self.y.len() {
            return Err(ForestError::RowCountMismatch {
                features: self.x.nrows(),
                labels: self.y.len(),
            });
        }
        for row in 0..self.x.nrows() {
            for column in 0..self.x.ncols() {
                if !self.x[(row, column)].is_finite() {
                    return Err(ForestError::NonFiniteValue { row, column });
                }
            }
            if !self.y[row].is_finite() {
                return Err(ForestError::NonFiniteValue {
                    row,
                    column: self.x.ncols(),
                });
            }
        }
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.y.len()
    }

    pub fn num_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn labels(&self) -> &[T] {
        self.y.as_slice()
    }

    /// Feature values of a single row.
    pub fn features(&self, row: usize) -> Vec<T> {
        self.x.row(row).iter().copied().collect()
    }

    /// Keeps the given rows, in the given order.
    pub fn subset(&self, rows: &[usize]) -> Self {
        Self::new(self.x.select_rows(rows), self.y.select_rows(rows))
    }

    /// Drops one feature column, labels untouched.
    pub fn without_feature(&self, feature_index: usize) -> Self {
        let kept = (0..self.x.ncols())
            .filter(|&column| column != feature_index)
            .collect::<Vec<_>>();
        Self::new(self.x.select_columns(&kept), self.y.clone())
    }

    pub fn train_test_split(&self, train_size: f64, seed: Option<u64>) -> Result<(Self, Self)> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(ForestError::InvalidParameter(
                "train_size".to_string(),
                "a value between 0.0 and 1.0".to_string(),
                train_size.to_string(),
            ));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..self.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.nrows() as f64 * train_size).floor() as usize;

        Ok((
            self.subset(&indices[..train_size]),
            self.subset(&indices[train_size..]),
        ))
    }

    /// Bootstrap resample of `sample_size` rows drawn with replacement.
    ///
    /// A sample size at or above the number of rows returns the whole dataset.
    pub fn bootstrap(&self, sample_size: usize, rng: &mut StdRng) -> Self {
        let nrows = self.nrows();
        if sample_size >= nrows {
            return self.clone();
        }

        let sample_indices = (0..sample_size)
            .map(|_| rng.gen_range(0..nrows))
            .collect::<Vec<_>>();
        self.subset(&sample_indices)
    }

    /// `sample_size` distinct rows chosen uniformly, without replacement.
    pub fn sample_without_replacement(&self, sample_size: usize, rng: &mut StdRng) -> Self {
        let amount = sample_size.min(self.nrows());
        let mut sample_indices = index::sample(rng, self.nrows(), amount).into_vec();
        sample_indices.sort_unstable();
        self.subset(&sample_indices)
    }

    /// True when every row holds the same value in every feature column.
    pub fn has_identical_features(&self) -> bool {
        if self.nrows() == 0 {
            return true;
        }
        (0..self.x.ncols()).all(|column| {
            let first = self.x[(0, column)];
            self.x.column(column).iter().all(|&value| value == first)
        })
    }
}
