//! Randomized hyper-parameter search with k-fold cross-validation.
//!
//! Candidates are drawn without replacement from the Cartesian product of a
//! [`ParamGrid`]; each is scored by its mean fold accuracy and the best one
//! wins (earliest drawn on ties).

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use netmusic_core::{Error, Result};

use crate::metrics::evaluate;
use crate::split::k_fold;
use crate::tree::{DecisionTreeClassifier, TreeParams};
use crate::{Classifier, check_inputs};

/// Candidate values for each decision-tree parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            max_depth: vec![Some(2), Some(3), Some(4), Some(6), Some(7), Some(10), None],
            min_samples_split: vec![2, 4, 8, 16],
            min_samples_leaf: vec![1, 2, 4],
        }
    }
}

impl ParamGrid {
    /// Number of distinct parameter combinations.
    pub fn len(&self) -> usize {
        self.max_depth.len() * self.min_samples_split.len() * self.min_samples_leaf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Combination at position `i` of the product, `i < len()`.
    fn get(&self, i: usize) -> TreeParams {
        let leaf = self.min_samples_leaf.len();
        let split = self.min_samples_split.len();
        TreeParams {
            max_depth: self.max_depth[i / (split * leaf)],
            min_samples_split: self.min_samples_split[(i / leaf) % split],
            min_samples_leaf: self.min_samples_leaf[i % leaf],
        }
    }
}

/// One evaluated candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub params: TreeParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Outcome of a [`RandomizedSearch`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_params: TreeParams,
    pub best_score: f64,
    pub trials: Vec<Trial>,
}

/// Randomized search over a [`ParamGrid`].
#[derive(Clone, Debug)]
pub struct RandomizedSearch {
    grid: ParamGrid,
    iterations: usize,
    folds: usize,
    seed: u64,
}

impl RandomizedSearch {
    pub const DEFAULT_ITERATIONS: usize = 200;
    pub const DEFAULT_FOLDS: usize = 3;

    pub fn new(grid: ParamGrid) -> Self {
        Self {
            grid,
            iterations: Self::DEFAULT_ITERATIONS,
            folds: Self::DEFAULT_FOLDS,
            seed: 42,
        }
    }

    /// Candidates to evaluate; capped at the grid size.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<SearchResult> {
        check_inputs(x, Some(y))?;
        if self.grid.is_empty() || self.iterations == 0 {
            return Err(Error::config("randomized search has no candidates"));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let folds = k_fold(x.len(), self.folds, &mut rng)?;
        let count = self.iterations.min(self.grid.len());
        let candidates = rand::seq::index::sample(&mut rng, self.grid.len(), count);
        log::info!(
            "Randomized search: {count} of {} candidates, {} folds",
            self.grid.len(),
            folds.len()
        );

        let mut trials = Vec::with_capacity(count);
        for i in candidates.iter() {
            let params = self.grid.get(i);
            let fold_scores = folds
                .iter()
                .map(|fold| {
                    let pick = |rows: &[usize]| -> (Vec<Vec<f64>>, Vec<u8>) {
                        rows.iter().map(|&r| (x[r].clone(), y[r])).unzip()
                    };
                    let (x_train, y_train) = pick(&fold.train);
                    let (x_test, y_test) = pick(&fold.test);
                    let mut model = DecisionTreeClassifier::new(params);
                    model.fit(&x_train, &y_train)?;
                    let predicted = model.predict(&x_test)?;
                    Ok(evaluate(&y_test, &predicted)?.accuracy)
                })
                .collect::<Result<Vec<f64>>>()?;
            let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            log::debug!("{params:?}: mean accuracy {mean_score:.4}");
            trials.push(Trial {
                params,
                fold_scores,
                mean_score,
            });
        }

        let best = trials
            .iter()
            .enumerate()
            .fold(None::<usize>, |best, (i, trial)| match best {
                Some(b) if trials[b].mean_score >= trial.mean_score => Some(b),
                _ => Some(i),
            })
            .ok_or_else(|| Error::config("randomized search evaluated no candidates"))?;
        let result = SearchResult {
            best_params: trials[best].params,
            best_score: trials[best].mean_score,
            trials,
        };
        log::info!(
            "Best parameters {:?} with mean accuracy {:.4}",
            result.best_params,
            result.best_score
        );
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn grid() -> ParamGrid {
        ParamGrid {
            max_depth: vec![Some(1), None],
            min_samples_split: vec![2, 8],
            min_samples_leaf: vec![1, 3, 5],
        }
    }

    /// Label is 1 when the first feature exceeds 0.5; the second is noise.
    fn separable(n: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![(i % 10) as f64 / 10.0, (i * 7 % 13) as f64])
            .collect();
        let y = x.iter().map(|row| u8::from(row[0] > 0.5)).collect();
        (x, y)
    }

    // ------------------------------------------------------------------------
    // Grid
    // ------------------------------------------------------------------------

    #[test]
    fn test_grid_enumerates_every_combination() {
        let g = grid();
        assert_eq!(g.len(), 12);
        let all: HashSet<TreeParams> = (0..g.len()).map(|i| g.get(i)).collect();
        assert_eq!(all.len(), 12);
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    #[test]
    fn test_search_finds_separating_split() {
        let (x, y) = separable(60);
        let result = RandomizedSearch::new(grid())
            .with_iterations(50)
            .fit(&x, &y)
            .unwrap();
        assert_eq!(result.trials.len(), 12);
        assert!(result.best_score >= 0.95);
        let best_trial = result
            .trials
            .iter()
            .map(|t| t.mean_score)
            .fold(f64::MIN, f64::max);
        assert_eq!(result.best_score, best_trial);
    }

    #[test]
    fn test_search_is_seeded() {
        let (x, y) = separable(40);
        let search = RandomizedSearch::new(grid()).with_iterations(4).with_seed(9);
        let a = search.fit(&x, &y).unwrap();
        let b = search.fit(&x, &y).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trials.len(), 4);
    }

    #[test]
    fn test_search_rejects_empty_grid() {
        let (x, y) = separable(10);
        let empty = ParamGrid {
            max_depth: vec![],
            ..grid()
        };
        assert!(RandomizedSearch::new(empty).fit(&x, &y).is_err());
    }

    #[test]
    fn test_search_needs_enough_rows_for_folds() {
        let (x, y) = separable(2);
        assert!(RandomizedSearch::new(grid()).fit(&x, &y).is_err());
    }
}
