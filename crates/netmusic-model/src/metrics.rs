//! Binary classification metrics with `1` as the positive class.

use std::fmt;

use serde::{Deserialize, Serialize};

use netmusic_core::{Error, Result};

/// Confusion counts for the positive class `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confusion {
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_negative: usize,
}

impl Confusion {
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::model(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        let mut confusion = Self::default();
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            match (truth != 0, pred != 0) {
                (true, true) => confusion.true_positive += 1,
                (false, true) => confusion.false_positive += 1,
                (true, false) => confusion.false_negative += 1,
                (false, false) => confusion.true_negative += 1,
            }
        }
        Ok(confusion)
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }
}

/// Headline scores of a set of predictions.
///
/// Ratios with a zero denominator are reported as `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl From<Confusion> for Metrics {
    fn from(c: Confusion) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let accuracy = ratio(c.true_positive + c.true_negative, c.total());
        let precision = ratio(c.true_positive, c.true_positive + c.false_positive);
        let recall = ratio(c.true_positive, c.true_positive + c.false_negative);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy={:.4} precision={:.4} recall={:.4} f1={:.4}",
            self.accuracy, self.precision, self.recall, self.f1
        )
    }
}

/// Score `y_pred` against `y_true`.
pub fn evaluate(y_true: &[u8], y_pred: &[u8]) -> Result<Metrics> {
    Confusion::from_labels(y_true, y_pred).map(Metrics::from)
}

// ============================================================================
// Tests
// ============================================================================
