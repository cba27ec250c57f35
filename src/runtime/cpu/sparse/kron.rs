//! Kronecker product for CPU
//!
//! Cost is proportional to nnz(A) × nnz(B): every pair of nonzeros produces
//! exactly one output nonzero. Output rows are emitted in order and columns
//! come out sorted, so no sort pass is needed.

use super::super::CpuClient;
use crate::error::{Error, Result};
use crate::runtime::{Allocator, RuntimeClient};
use crate::sparse::{CsrMatrix, Index, SparseStorage};

/// Output shape of A ⊗ B, or None if it does not fit in [`Index`]
pub(crate) fn kron_shape(a: [Index; 2], b: [Index; 2]) -> Option<[Index; 2]> {
    Some([a[0].checked_mul(b[0])?, a[1].checked_mul(b[1])?])
}

pub(super) fn kron_csr(client: &CpuClient, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix> {
    let shape = kron_shape(a.dims(), b.dims()).ok_or_else(|| {
        Error::invalid_argument(
            "b",
            format!(
                "kronecker product of {:?} and {:?} overflows the index type",
                a.dims(),
                b.dims()
            ),
        )
    })?;

    if a.is_empty() || b.is_empty() {
        return Ok(CsrMatrix::empty(shape));
    }

    let nnz = a
        .nnz()
        .checked_mul(b.nnz())
        .ok_or(Error::OutOfMemory { size: usize::MAX })?;

    let [a_rows, _] = a.dims();
    let [b_rows, b_cols] = b.dims();

    let allocator = client.allocator();
    let mut row_ptrs: Vec<usize> = allocator.allocate_vec(shape[0] as usize + 1)?;
    let mut col_indices: Vec<Index> = allocator.allocate_vec(nnz)?;

    row_ptrs.push(0);
    for i1 in 0..a_rows as usize {
        let a_row = a.row(i1);
        for i2 in 0..b_rows as usize {
            let b_row = b.row(i2);
            if !b_row.is_empty() {
                for &j1 in a_row {
                    // j1 * b_cols + j2 < a_cols * b_cols, which fits in Index
                    let base = j1 * b_cols;
                    col_indices.extend(b_row.iter().map(|&j2| base + j2));
                }
            }
            row_ptrs.push(col_indices.len());
        }
    }

    Ok(CsrMatrix::from_parts_unchecked(row_ptrs, col_indices, shape))
}
