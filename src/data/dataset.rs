use serde::{Deserialize, Serialize};

use crate::domain::diamond::FeatureRow;

/// An ordered collection of rows sharing one column set.
/// Filtering removes rows in place and never reorders them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<R> {
    rows: Vec<R>,
}

impl<R> Dataset<R> {
    pub fn new(rows: Vec<R>) -> Self { Self { rows } }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn rows(&self) -> &[R] { &self.rows }

    /// Keep only the rows matching `keep`; returns how many were dropped
    pub fn retain(&mut self, keep: impl FnMut(&R) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(keep);
        before - self.rows.len()
    }
}

/// Features and target partitioned into a training part and
/// a held-out test part. Row `i` of `x_*` pairs with `y_*[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub x_train: Vec<FeatureRow>,
    pub x_test:  Vec<FeatureRow>,
    pub y_train: Vec<f64>,
    pub y_test:  Vec<f64>,
}

impl TrainTestSplit {
    pub fn train_len(&self) -> usize { self.x_train.len() }

    pub fn test_len(&self) -> usize { self.x_test.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_preserves_order_and_counts() {
        let mut ds = Dataset::new(vec![5, 1, 8, 2, 9]);
        let dropped = ds.retain(|&v| v > 2);
        assert_eq!(dropped, 2);
        assert_eq!(ds.rows(), &[5, 8, 9]);
    }
}
