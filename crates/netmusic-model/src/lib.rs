//! Link-prediction models for Netmusic.
//!
//! - [`Classifier`]: the `fit` / `predict` contract over dense rows and
//!   binary labels
//! - [`tree`]: a CART [`DecisionTreeClassifier`]
//! - [`metrics`]: accuracy, precision, recall and F1
//! - [`split`]: shuffled train/test splits and k-fold partitions
//! - [`search`]: randomized hyper-parameter search

pub mod metrics;
mod proptests;
pub mod search;
pub mod split;
pub mod tree;

use netmusic_core::{Error, Result};

pub use metrics::{Confusion, Metrics, evaluate};
pub use search::{ParamGrid, RandomizedSearch, SearchResult, Trial};
pub use split::{Fold, TrainTestSplit, k_fold, train_test_split};
pub use tree::{DecisionTreeClassifier, TreeParams};

/// A binary classifier over rows of `f64` features.
pub trait Classifier {
    /// Short model name for reports.
    fn name(&self) -> &'static str;

    /// Learn from rows `x` with labels `y` (`0` or `1`).
    fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()>;

    /// Predict a label for each row.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<u8>>;
}

/// Validate a design matrix and return its width (`0` when empty).
pub(crate) fn check_inputs(x: &[Vec<f64>], y: Option<&[u8]>) -> Result<usize> {
    if let Some(y) = y
        && y.len() != x.len()
    {
        return Err(Error::model(format!(
            "{} rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    let width = x.first().map_or(0, Vec::len);
    if let Some(pos) = x.iter().position(|row| row.len() != width) {
        return Err(Error::model(format!(
            "row {pos} has {} features, expected {width}",
            x[pos].len()
        )));
    }
    Ok(width)
}
