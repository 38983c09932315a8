//! Train/test splits and k-fold partitions.

use rand::Rng;
use rand::seq::SliceRandom;

use netmusic_core::{Error, Result};

/// Rows and labels divided into a training and a test part.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<u8>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<u8>,
}

/// Shuffle and split, putting `ceil(test_size · n)` rows in the test part.
///
/// `test_size` must lie in `(0, 1)`.
pub fn train_test_split<R: Rng + ?Sized>(
    x: &[Vec<f64>],
    y: &[u8],
    test_size: f64,
    rng: &mut R,
) -> Result<TrainTestSplit> {
    if x.len() != y.len() {
        return Err(Error::model(format!(
            "{} rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::config(format!(
            "test_size must be within (0, 1), got {test_size}"
        )));
    }

    let mut order: Vec<usize> = (0..x.len()).collect();
    order.shuffle(rng);
    let n_test = ((x.len() as f64) * test_size).ceil() as usize;
    let (test, train) = order.split_at(n_test.min(order.len()));

    let take = |rows: &[usize]| -> (Vec<Vec<f64>>, Vec<u8>) {
        rows.iter().map(|&i| (x[i].clone(), y[i])).unzip()
    };
    let (x_train, y_train) = take(train);
    let (x_test, y_test) = take(test);
    log::debug!(
        "Split {} rows into {} train / {} test",
        x.len(),
        x_train.len(),
        x_test.len()
    );
    Ok(TrainTestSplit {
        x_train,
        y_train,
        x_test,
        y_test,
    })
}

/// One cross-validation fold as row positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffled k-fold partition of `0..n`.
///
/// Every position is in exactly one test part; the last fold absorbs the
/// remainder.
pub fn k_fold<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Result<Vec<Fold>> {
    if k < 2 {
        return Err(Error::config(format!("k-fold needs at least 2 folds, got {k}")));
    }
    if n < k {
        return Err(Error::config(format!(
            "cannot make {k} folds from {n} samples"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    let fold_size = n / k;

    Ok((0..k)
        .map(|i| {
            let start = i * fold_size;
            let end = if i == k - 1 { n } else { start + fold_size };
            Fold {
                test: order[start..end].to_vec(),
                train: order[..start].iter().chain(&order[end..]).copied().collect(),
            }
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn data(n: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        let x = (0..n).map(|i| vec![i as f64]).collect();
        let y = (0..n).map(|i| (i % 2) as u8).collect();
        (x, y)
    }

    // ------------------------------------------------------------------------
    // Train/test
    // ------------------------------------------------------------------------

    #[test]
    fn test_split_sizes() {
        let (x, y) = data(100);
        let mut rng = StdRng::seed_from_u64(42);
        let split = train_test_split(&x, &y, 0.25, &mut rng).unwrap();
        assert_eq!(split.x_test.len(), 25);
        assert_eq!(split.x_train.len(), 75);
        assert_eq!(split.y_test.len(), 25);
    }

    #[test]
    fn test_split_keeps_rows_with_labels() {
        let (x, y) = data(20);
        let mut rng = StdRng::seed_from_u64(1);
        let split = train_test_split(&x, &y, 0.25, &mut rng).unwrap();
        for (row, &label) in split.x_train.iter().chain(&split.x_test).zip(
            split.y_train.iter().chain(&split.y_test),
        ) {
            assert_eq!((row[0] as usize % 2) as u8, label);
        }
        let mut all: Vec<f64> = split
            .x_train
            .iter()
            .chain(&split.x_test)
            .map(|r| r[0])
            .collect();
        all.sort_by(f64::total_cmp);
        assert_eq!(all, (0..20).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rejects_bad_input() {
        let (x, y) = data(4);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(train_test_split(&x, &y, 0.0, &mut rng).is_err());
        assert!(train_test_split(&x, &y, 1.0, &mut rng).is_err());
        assert!(train_test_split(&x, &y[..3], 0.5, &mut rng).is_err());
    }

    // ------------------------------------------------------------------------
    // K-fold
    // ------------------------------------------------------------------------

    #[test]
    fn test_k_fold_partitions() {
        let mut rng = StdRng::seed_from_u64(3);
        let folds = k_fold(10, 3, &mut rng).unwrap();
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[2].test.len(), 4);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), 10);
            assert!(fold.train.iter().all(|i| !fold.test.contains(i)));
        }
    }

    #[test]
    fn test_k_fold_rejects_bad_counts() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(k_fold(10, 1, &mut rng).is_err());
        assert!(k_fold(2, 3, &mut rng).is_err());
    }
}
