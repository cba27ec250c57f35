//! Core CSR implementation: struct, creation, getters

use crate::error::{Error, Result};

use super::Index;
use super::storage::SparseStorage;

/// CSR (Compressed Sparse Row) boolean matrix
///
/// `row_ptrs` is either empty (the matrix holds no values) or has
/// `nrows + 1` monotone offsets into `col_indices`. Column indices are strictly
/// ascending within a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrMatrix {
    pub(crate) row_ptrs: Vec<usize>,
    pub(crate) col_indices: Vec<Index>,
    pub(crate) shape: [Index; 2],
}

impl CsrMatrix {
    /// Create an empty matrix
    ///
    /// No per-row storage is allocated until the matrix holds values.
    pub fn empty(shape: [Index; 2]) -> Self {
        Self {
            row_ptrs: Vec::new(),
            col_indices: Vec::new(),
            shape,
        }
    }

    /// Create a CSR matrix from components
    ///
    /// # Arguments
    ///
    /// * `row_ptrs` - Row pointers (length: nrows + 1, or empty when there are no values)
    /// * `col_indices` - Column indices, strictly ascending within each row
    /// * `shape` - Matrix shape [nrows, ncols]
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the pointers are not monotone, do not cover
    /// `col_indices`, or a row is unsorted; `IndexOutOfBounds` if a column is
    /// outside the matrix.
    pub fn from_parts(
        row_ptrs: Vec<usize>,
        col_indices: Vec<Index>,
        shape: [Index; 2],
    ) -> Result<Self> {
        let [nrows, ncols] = shape;

        if row_ptrs.is_empty() {
            if !col_indices.is_empty() {
                return Err(Error::invalid_argument(
                    "row_ptrs",
                    "row pointers are required when column indices are present",
                ));
            }
            return Ok(Self::empty(shape));
        }

        if row_ptrs.len() != nrows as usize + 1 {
            return Err(Error::invalid_argument(
                "row_ptrs",
                format!(
                    "expected {} row pointers, got {}",
                    nrows as usize + 1,
                    row_ptrs.len()
                ),
            ));
        }
        if row_ptrs[0] != 0 || row_ptrs[nrows as usize] != col_indices.len() {
            return Err(Error::invalid_argument(
                "row_ptrs",
                format!(
                    "expected [0]=0 and [{}]={}, got [0]={} and [{}]={}",
                    nrows,
                    col_indices.len(),
                    row_ptrs[0],
                    nrows,
                    row_ptrs[nrows as usize]
                ),
            ));
        }

        for (row, window) in row_ptrs.windows(2).enumerate() {
            let (start, end) = (window[0], window[1]);
            if start > end {
                return Err(Error::invalid_argument(
                    "row_ptrs",
                    format!("row pointers decrease at row {}", row),
                ));
            }
            let cols = &col_indices[start..end];
            for (pos, &col) in cols.iter().enumerate() {
                if col >= ncols {
                    return Err(Error::IndexOutOfBounds {
                        row: row as Index,
                        col,
                        nrows,
                        ncols,
                    });
                }
                if pos > 0 && cols[pos - 1] >= col {
                    return Err(Error::invalid_argument(
                        "col_indices",
                        format!("columns of row {} are not strictly ascending", row),
                    ));
                }
            }
        }

        Ok(Self::from_parts_unchecked(row_ptrs, col_indices, shape))
    }

    /// Assemble a matrix from kernel output without validation.
    ///
    /// Normalizes an all-empty result to the pointer-free representation.
    pub(crate) fn from_parts_unchecked(
        mut row_ptrs: Vec<usize>,
        col_indices: Vec<Index>,
        shape: [Index; 2],
    ) -> Self {
        debug_assert!(row_ptrs.is_empty() || row_ptrs.len() == shape[0] as usize + 1);
        debug_assert_eq!(row_ptrs.last().copied().unwrap_or(0), col_indices.len());
        if col_indices.is_empty() {
            row_ptrs = Vec::new();
        }
        Self {
            row_ptrs,
            col_indices,
            shape,
        }
    }

    /// Returns the shape as [nrows, ncols] in index units
    #[inline]
    pub fn dims(&self) -> [Index; 2] {
        self.shape
    }

    /// Returns the row pointers (empty when the matrix holds no values)
    pub fn row_ptrs(&self) -> &[usize] {
        &self.row_ptrs
    }

    /// Returns the column indices of all nonzeros in row-major order
    pub fn col_indices(&self) -> &[Index] {
        &self.col_indices
    }

    /// Returns the sorted column indices of one row
    ///
    /// # Panics
    ///
    /// Panics if row >= nrows (only in debug mode)
    #[inline]
    pub fn row(&self, row: usize) -> &[Index] {
        debug_assert!(row < self.shape[0] as usize);
        if self.row_ptrs.is_empty() {
            return &[];
        }
        &self.col_indices[self.row_ptrs[row]..self.row_ptrs[row + 1]]
    }

    /// Returns the number of nonzeros in a specific row
    #[inline]
    pub fn row_nnz(&self, row: usize) -> usize {
        self.row(row).len()
    }

    /// Returns true if (row, col) is a nonzero
    pub fn contains(&self, row: Index, col: Index) -> bool {
        if row >= self.shape[0] || col >= self.shape[1] {
            return false;
        }
        self.row(row as usize).binary_search(&col).is_ok()
    }

    /// Iterate nonzero coordinates in row-major ascending order
    pub fn iter(&self) -> impl Iterator<Item = (Index, Index)> + '_ {
        self.row_ptrs
            .windows(2)
            .enumerate()
            .flat_map(move |(row, w)| {
                self.col_indices[w[0]..w[1]]
                    .iter()
                    .map(move |&col| (row as Index, col))
            })
    }

    /// Extract all nonzeros as parallel row/column arrays in row-major order
    pub fn pairs(&self) -> (Vec<Index>, Vec<Index>) {
        let mut rows = Vec::with_capacity(self.nnz());
        for (row, w) in self.row_ptrs.windows(2).enumerate() {
            rows.extend(std::iter::repeat_n(row as Index, w[1] - w[0]));
        }
        (rows, self.col_indices.clone())
    }

    /// Change the declared dimensions of a matrix that holds no values
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the matrix holds values.
    pub fn resize(&mut self, shape: [Index; 2]) -> Result<()> {
        if !self.is_empty() {
            return Err(Error::invalid_state(format!(
                "cannot resize a populated {}x{} matrix with {} values",
                self.shape[0],
                self.shape[1],
                self.nnz()
            )));
        }
        self.shape = shape;
        Ok(())
    }
}

impl SparseStorage for CsrMatrix {
    fn shape(&self) -> [usize; 2] {
        [self.shape[0] as usize, self.shape[1] as usize]
    }

    fn nnz(&self) -> usize {
        self.col_indices.len()
    }

    fn memory_usage(&self) -> usize {
        self.row_ptrs.len() * std::mem::size_of::<usize>()
            + self.col_indices.len() * std::mem::size_of::<Index>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        // [1, 0, 1]
        // [0, 0, 1]
        // [1, 1, 0]
        CsrMatrix::from_parts(vec![0, 2, 3, 5], vec![0, 2, 2, 0, 1], [3, 3]).unwrap()
    }

    #[test]
    fn test_csr_creation() {
        let csr = sample();
        assert_eq!(csr.nnz(), 5);
        assert_eq!(csr.shape(), [3, 3]);
        assert_eq!(csr.nrows(), 3);
        assert_eq!(csr.ncols(), 3);
        assert_eq!(csr.row(2), &[0, 1]);
        assert!(csr.contains(1, 2));
        assert!(!csr.contains(1, 1));
        assert!(!csr.contains(7, 0));
    }

    #[test]
    fn test_csr_empty() {
        let csr = CsrMatrix::empty([100, 200]);
        assert_eq!(csr.nnz(), 0);
        assert_eq!(csr.shape(), [100, 200]);
        assert!(csr.is_empty());
        assert!(csr.row_ptrs().is_empty());
        assert_eq!(csr.row_nnz(57), 0);
        assert_eq!(csr.pairs(), (vec![], vec![]));
    }

    #[test]
    fn test_csr_all_zero_pointers_normalize_to_empty() {
        let csr = CsrMatrix::from_parts(vec![0, 0, 0], vec![], [2, 2]).unwrap();
        assert_eq!(csr, CsrMatrix::empty([2, 2]));
    }

    #[test]
    fn test_csr_memory_usage() {
        // 4 row_ptrs * 8 bytes + 5 col_indices * 4 bytes
        assert_eq!(
            sample().memory_usage(),
            4 * std::mem::size_of::<usize>() + 5 * 4
        );
        assert_eq!(CsrMatrix::empty([1000, 1000]).memory_usage(), 0);
    }

    #[test]
    fn test_csr_invalid_row_ptrs() {
        let result = CsrMatrix::from_parts(vec![0, 2, 3], vec![0, 2, 2, 0, 1], [3, 3]);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_csr_unsorted_row_rejected() {
        let result = CsrMatrix::from_parts(vec![0, 2], vec![2, 0], [1, 3]);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        let dup = CsrMatrix::from_parts(vec![0, 2], vec![1, 1], [1, 3]);
        assert!(dup.is_err());
    }

    #[test]
    fn test_csr_column_out_of_bounds() {
        let result = CsrMatrix::from_parts(vec![0, 1], vec![3], [1, 3]);
        assert!(matches!(result, Err(Error::IndexOutOfBounds { col: 3, .. })));
    }

    #[test]
    fn test_csr_pairs_row_major() {
        let (rows, cols) = sample().pairs();
        assert_eq!(rows, vec![0, 0, 1, 2, 2]);
        assert_eq!(cols, vec![0, 2, 2, 0, 1]);
        let collected: Vec<_> = sample().iter().collect();
        assert_eq!(collected, vec![(0, 0), (0, 2), (1, 2), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_csr_resize_rules() {
        let mut empty = CsrMatrix::empty([0, 0]);
        empty.resize([4, 5]).unwrap();
        assert_eq!(empty.dims(), [4, 5]);

        let mut populated = sample();
        assert!(matches!(
            populated.resize([5, 5]),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(populated.dims(), [3, 3]);
    }

    #[test]
    fn test_density() {
        let csr = sample();
        assert!((csr.density() - 5.0 / 9.0).abs() < 1e-12);
        assert_eq!(CsrMatrix::empty([0, 0]).sparsity(), 0.0);
    }
}
