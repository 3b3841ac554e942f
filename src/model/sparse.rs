//! Sparse feature vectors produced by the vectorizer.

/// A single-row sparse vector with entries sorted by column.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from unsorted `(column, value)` pairs.
    ///
    /// Columns must be unique and below `dim`; zero values are dropped.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(_, v)| v != 0.0);
        entries.sort_unstable_by_key(|&(col, _)| col);
        debug_assert!(entries.iter().all(|&(col, _)| col < dim));
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { dim, entries }
    }

    /// All-zero vector.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Number of columns.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Value at `col`, zero when absent.
    pub fn get(&self, col: usize) -> f64 {
        self.entries
            .binary_search_by_key(&col, |&(c, _)| c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Stored entries in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Dot product with a dense weight row.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(col, v)| dense.get(col).map(|w| w * v))
            .sum()
    }

    /// Scale every entry so the L1 norm is 1. No-op on a zero vector.
    pub fn normalize_l1(&mut self) {
        let norm: f64 = self.entries.iter().map(|&(_, v)| v.abs()).sum();
        self.scale_by(norm);
    }

    /// Scale every entry so the L2 norm is 1. No-op on a zero vector.
    pub fn normalize_l2(&mut self) {
        let norm = self
            .entries
            .iter()
            .map(|&(_, v)| v * v)
            .sum::<f64>()
            .sqrt();
        self.scale_by(norm);
    }

    fn scale_by(&mut self, norm: f64) {
        if norm > 0.0 {
            for (_, v) in &mut self.entries {
                *v /= norm;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_sorted_and_zeros_dropped() {
        let v = SparseVector::from_entries(5, vec![(3, 1.0), (0, 2.0), (1, 0.0)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(0, 2.0), (3, 1.0)]);
        assert_eq!(v.get(1), 0.0);
        assert_eq!(v.get(3), 1.0);
    }

    #[test]
    fn dot_ignores_missing_columns() {
        let v = SparseVector::from_entries(3, vec![(0, 1.0), (2, 2.0)]);
        assert_eq!(v.dot(&[0.5, 9.0, 0.25]), 1.0);
    }

    #[test]
    fn l2_normalization() {
        let mut v = SparseVector::from_entries(2, vec![(0, 3.0), (1, 4.0)]);
        v.normalize_l2();
        assert!((v.get(0) - 0.6).abs() < 1e-12);
        assert!((v.get(1) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn normalizing_zero_vector_is_noop() {
        let mut v = SparseVector::zeros(4);
        v.normalize_l2();
        v.normalize_l1();
        assert_eq!(v.nnz(), 0);
        assert_eq!(v.dim(), 4);
    }
}
