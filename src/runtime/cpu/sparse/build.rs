//! Coordinate list to CSR conversion for CPU

use super::super::CpuClient;
use crate::error::{Error, Result};
use crate::runtime::{Allocator, RuntimeClient};
use crate::sparse::{CsrMatrix, Index};

/// Build a deduplicated CSR matrix from (row, col) pairs.
///
/// Bounds are checked for every pair before any storage is produced. When
/// `assume_sorted` is set the input is scanned once; if it really is strictly
/// row-major ascending the sort pass is skipped, otherwise the kernel falls
/// back to the general path.
pub(super) fn coo_to_csr(
    client: &CpuClient,
    rows: &[Index],
    cols: &[Index],
    shape: [Index; 2],
    assume_sorted: bool,
) -> Result<CsrMatrix> {
    let [nrows, ncols] = shape;

    if rows.len() != cols.len() {
        return Err(Error::invalid_argument(
            "cols",
            format!(
                "row and column arrays differ in length: {} vs {}",
                rows.len(),
                cols.len()
            ),
        ));
    }

    if let Some((&row, &col)) = rows
        .iter()
        .zip(cols)
        .find(|&(&r, &c)| r >= nrows || c >= ncols)
    {
        return Err(Error::IndexOutOfBounds {
            row,
            col,
            nrows,
            ncols,
        });
    }

    if rows.is_empty() {
        return Ok(CsrMatrix::empty(shape));
    }

    let allocator = client.allocator();
    let nrows = nrows as usize;

    let mut row_ptrs: Vec<usize> = allocator.allocate_vec(nrows + 1)?;
    row_ptrs.resize(nrows + 1, 0);

    let sorted = assume_sorted && is_strictly_sorted(rows, cols);
    if assume_sorted && !sorted {
        tracing::debug!(
            nvals = rows.len(),
            "input flagged as sorted is not strictly row-major, sorting"
        );
    }

    let col_indices = if sorted {
        let mut col_indices: Vec<Index> = allocator.allocate_vec(cols.len())?;
        col_indices.extend_from_slice(cols);
        for &row in rows {
            row_ptrs[row as usize + 1] += 1;
        }
        col_indices
    } else {
        let mut pairs: Vec<(Index, Index)> = allocator.allocate_vec(rows.len())?;
        pairs.extend(rows.iter().copied().zip(cols.iter().copied()));
        pairs.sort_unstable();
        pairs.dedup();

        let mut col_indices: Vec<Index> = allocator.allocate_vec(pairs.len())?;
        for &(row, col) in &pairs {
            row_ptrs[row as usize + 1] += 1;
            col_indices.push(col);
        }
        col_indices
    };

    for i in 1..=nrows {
        row_ptrs[i] += row_ptrs[i - 1];
    }

    Ok(CsrMatrix::from_parts_unchecked(row_ptrs, col_indices, shape))
}

/// Returns true if the pairs are strictly ascending in (row, col) order
fn is_strictly_sorted(rows: &[Index], cols: &[Index]) -> bool {
    rows.windows(2)
        .zip(cols.windows(2))
        .all(|(r, c)| (r[0], c[0]) < (r[1], c[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_sorted_detection() {
        assert!(is_strictly_sorted(&[0, 0, 1], &[0, 2, 0]));
        assert!(!is_strictly_sorted(&[0, 0, 1], &[2, 0, 0]));
        assert!(!is_strictly_sorted(&[0, 0], &[1, 1]));
        assert!(is_strictly_sorted(&[], &[]));
    }
}
