//! CART decision tree for binary labels.

use serde::{Deserialize, Serialize};

use netmusic_core::{Error, Result};

use crate::{Classifier, check_inputs};

/// Growth limits of a [`DecisionTreeClassifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs to be split.
    pub min_samples_split: usize,
    /// Minimum samples each child of a split must keep.
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf { class: u8 },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaves() + right.leaves(),
        }
    }

    fn classify(&self, row: &[f64]) -> u8 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { class, .. } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Counts of `(label 0, label 1)` samples.
#[derive(Clone, Copy, Debug, Default)]
struct Counts {
    zeros: usize,
    ones: usize,
}

impl Counts {
    fn of(labels: impl Iterator<Item = u8>) -> Self {
        labels.fold(Self::default(), |mut counts, label| {
            counts.add(label);
            counts
        })
    }

    fn add(&mut self, label: u8) {
        if label == 0 {
            self.zeros += 1;
        } else {
            self.ones += 1;
        }
    }

    fn total(&self) -> usize {
        self.zeros + self.ones
    }

    fn gini(&self) -> f64 {
        let n = self.total();
        if n == 0 {
            return 0.0;
        }
        let p = self.ones as f64 / n as f64;
        2.0 * p * (1.0 - p)
    }

    /// Majority class; ties go to `0`.
    fn majority(&self) -> u8 {
        u8::from(self.ones > self.zeros)
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Binary CART classifier splitting on gini impurity.
///
/// Thresholds are midpoints between consecutive distinct feature values;
/// a row goes left when its value is `<=` the threshold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    params: TreeParams,
    root: Option<TreeNode>,
    n_features: usize,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            root: None,
            n_features: 0,
        }
    }

    pub fn params(&self) -> TreeParams {
        self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Depth of the fitted tree; a single leaf has depth 0.
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    /// Number of leaves of the fitted tree.
    pub fn leaf_count(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::leaves)
    }

    fn grow(&self, x: &[Vec<f64>], y: &[u8], indices: &mut [usize], depth: usize) -> TreeNode {
        let counts = Counts::of(indices.iter().map(|&i| y[i]));
        let leaf = TreeNode::Leaf {
            class: counts.majority(),
        };

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || indices.len() < self.params.min_samples_split
            || counts.zeros == 0
            || counts.ones == 0
        {
            return leaf;
        }

        let Some(best) = self.best_split(x, y, indices, counts) else {
            return leaf;
        };

        let (mut left, mut right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[i][best.feature] <= best.threshold);
        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.grow(x, y, &mut left, depth + 1)),
            right: Box::new(self.grow(x, y, &mut right, depth + 1)),
        }
    }

    /// Split with the lowest weighted child impurity over all features.
    ///
    /// A split is taken even when it does not lower impurity (as on XOR),
    /// so `None` means no threshold satisfies `min_samples_leaf`.
    fn best_split(
        &self,
        x: &[Vec<f64>],
        y: &[u8],
        indices: &mut [usize],
        parent: Counts,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;
        let mut best_impurity = f64::INFINITY;

        for feature in 0..self.n_features {
            indices.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left = Counts::default();
            for pos in 0..n - 1 {
                left.add(y[indices[pos]]);
                let here = x[indices[pos]][feature];
                let next = x[indices[pos + 1]][feature];
                if here == next {
                    continue;
                }
                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }
                let right = Counts {
                    zeros: parent.zeros - left.zeros,
                    ones: parent.ones - left.ones,
                };
                let impurity = (left_n as f64 * left.gini() + right_n as f64 * right.gini())
                    / n as f64;
                if impurity < best_impurity {
                    best_impurity = impurity;
                    best = Some(BestSplit {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        impurity,
                    });
                }
            }
        }
        if let Some(split) = &best {
            log::trace!(
                "Split on feature {} at {:.4} (gini {:.4})",
                split.feature,
                split.threshold,
                split.impurity
            );
        }
        best
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &'static str {
        "DecisionTreeClassifier"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        self.n_features = check_inputs(x, Some(y))?;
        if x.is_empty() {
            return Err(Error::model("cannot fit on an empty training set"));
        }
        let mut indices: Vec<usize> = (0..x.len()).collect();
        let root = self.grow(x, y, &mut indices, 0);
        log::debug!(
            "Fitted decision tree: depth {}, {} leaves, {} samples",
            root.depth(),
            root.leaves(),
            x.len()
        );
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<u8>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| Error::model("decision tree is not fitted"))?;
        let width = check_inputs(x, None)?;
        if !x.is_empty() && width != self.n_features {
            return Err(Error::model(format!(
                "expected {} features, got {width}",
                self.n_features
            )));
        }
        Ok(x.iter().map(|row| root.classify(row)).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn xor() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for _ in 0..5 {
            for (a, b) in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)] {
                x.push(vec![a, b]);
                y.push(u8::from((a == 1.0) != (b == 1.0)));
            }
        }
        (x, y)
    }

    // ------------------------------------------------------------------------
    // Fitting
    // ------------------------------------------------------------------------

    #[test]
    fn test_single_threshold() {
        let x: Vec<Vec<f64>> = (0..10).map(|v| vec![v as f64]).collect();
        let y: Vec<u8> = (0..10).map(|v| u8::from(v >= 6)).collect();
        let mut tree = DecisionTreeClassifier::default();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.depth(), Some(1));
        assert_eq!(tree.predict(&[vec![5.4], vec![5.6]]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_learns_xor() {
        let (x, y) = xor();
        let mut tree = DecisionTreeClassifier::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.leaf_count(), Some(4));
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let (x, y) = xor();
        let mut tree = DecisionTreeClassifier::new(TreeParams {
            max_depth: Some(1),
            ..TreeParams::default()
        });
        tree.fit(&x, &y).unwrap();
        assert!(tree.depth().unwrap() <= 1);
    }

    #[test]
    fn test_min_samples_leaf() {
        // Only the last sample is positive; a leaf of one is not allowed.
        let x: Vec<Vec<f64>> = (0..6).map(|v| vec![v as f64]).collect();
        let y = vec![0, 0, 0, 0, 0, 1];
        let mut tree = DecisionTreeClassifier::new(TreeParams {
            min_samples_leaf: 2,
            ..TreeParams::default()
        });
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&[vec![5.0]]).unwrap(), vec![0]);
    }

    #[test]
    fn test_pure_labels_make_a_leaf() {
        let x = vec![vec![1.0], vec![2.0]];
        let mut tree = DecisionTreeClassifier::default();
        tree.fit(&x, &[1, 1]).unwrap();
        assert_eq!(tree.depth(), Some(0));
        assert_eq!(tree.predict(&[vec![-3.0]]).unwrap(), vec![1]);
    }

    // ------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTreeClassifier::default();
        assert!(matches!(
            tree.predict(&[vec![1.0]]),
            Err(Error::Model { .. })
        ));
    }

    #[test]
    fn test_fit_rejects_bad_shapes() {
        let mut tree = DecisionTreeClassifier::default();
        assert!(tree.fit(&[vec![1.0], vec![2.0]], &[0]).is_err());
        assert!(tree.fit(&[vec![1.0], vec![2.0, 3.0]], &[0, 1]).is_err());
        assert!(tree.fit(&[], &[]).is_err());
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let mut tree = DecisionTreeClassifier::default();
        tree.fit(&[vec![1.0, 2.0], vec![3.0, 4.0]], &[0, 1]).unwrap();
        assert!(tree.predict(&[vec![1.0]]).is_err());
    }
}
