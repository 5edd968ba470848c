// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles row indices and splits them into two sets:
//   - Training set: used to fit (and cross-validate) the model
//   - Test set:     held out for the final evaluation
//
// The shuffle is driven by a seeded StdRng instead of a
// thread-local RNG, so the same input rows and the same seed
// always produce the same partition. Training runs are then
// comparable with each other and re-runs are reproducible.
//
// The test set gets ceil(n · test_size) rows, the training
// set the rest. For 10 rows and 0.2 that is 2 test rows.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SeedableRng)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::dataset::TrainTestSplit;
use crate::domain::diamond::FeatureRow;

/// Shuffle `items` with `seed` and split into (train, test).
///
/// # Arguments
/// * `items`     - All rows (consumed by this function)
/// * `test_size` - Proportion held out, e.g. 0.2 = 20%
/// * `seed`      - RNG seed controlling the partition
pub fn split_train_test<T>(mut items: Vec<T>, test_size: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let total   = items.len();
    let n_test  = ((total as f64) * test_size.clamp(0.0, 1.0)).ceil() as usize;
    let n_train = total - n_test.min(total);

    // split_off(n) removes elements [n..] and returns them
    let test = items.split_off(n_train);

    tracing::debug!(
        "Dataset split: {} train, {} test (seed {})",
        items.len(),
        test.len(),
        seed
    );

    (items, test)
}

/// Split aligned feature rows and targets with one shuffle,
/// keeping every row paired with its own target.
pub fn split_features(
    x:         Vec<FeatureRow>,
    y:         Vec<f64>,
    test_size: f64,
    seed:      u64,
) -> TrainTestSplit {
    debug_assert_eq!(x.len(), y.len());
    let pairs: Vec<(FeatureRow, f64)> = x.into_iter().zip(y).collect();
    let (train, test) = split_train_test(pairs, test_size, seed);

    let (x_train, y_train) = train.into_iter().unzip();
    let (x_test, y_test)   = test.into_iter().unzip();
    TrainTestSplit { x_train, x_test, y_train, y_test }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
    }

    #[test]
    fn test_test_size_rounds_up() {
        let items: Vec<usize> = (0..11).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        // ceil(11 * 0.2) = 3
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let (a_train, a_test) = split_train_test((0..50).collect::<Vec<u32>>(), 0.2, 42);
        let (b_train, b_test) = split_train_test((0..50).collect::<Vec<u32>>(), 0.2, 42);
        assert_eq!(a_train, b_train);
        assert_eq!(a_test, b_test);
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let (train, test) = split_train_test((0..50).collect::<Vec<u32>>(), 0.3, 7);
        let mut all: Vec<u32> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<u32>>());
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = split_train_test(Vec::<usize>::new(), 0.2, 42);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_features_stay_paired_with_targets() {
        let x: Vec<FeatureRow> = (0..20).map(|i| [i as f64; 9]).collect();
        let y: Vec<f64>        = (0..20).map(|i| i as f64 * 10.0).collect();
        let split = split_features(x, y, 0.2, 42);

        assert_eq!(split.train_len(), 16);
        assert_eq!(split.test_len(), 4);
        for (row, target) in split.x_train.iter().zip(&split.y_train) {
            assert_eq!(row[0] * 10.0, *target);
        }
        for (row, target) in split.x_test.iter().zip(&split.y_test) {
            assert_eq!(row[0] * 10.0, *target);
        }
    }
}
