//! CSR transpose for CPU (counting sort over columns)

use super::super::CpuClient;
use crate::error::Result;
use crate::runtime::{Allocator, RuntimeClient};
use crate::sparse::{CsrMatrix, Index, SparseStorage};

pub(super) fn transpose_csr(client: &CpuClient, a: &CsrMatrix) -> Result<CsrMatrix> {
    let [nrows, ncols] = a.dims();
    let shape = [ncols, nrows];

    if a.is_empty() {
        return Ok(CsrMatrix::empty(shape));
    }

    let ncols = ncols as usize;
    let nnz = a.nnz();
    let allocator = client.allocator();

    // Column counts become the row pointers of the transpose
    let mut t_row_ptrs: Vec<usize> = allocator.allocate_vec(ncols + 1)?;
    t_row_ptrs.resize(ncols + 1, 0);
    for &col in a.col_indices() {
        t_row_ptrs[col as usize + 1] += 1;
    }
    for i in 1..=ncols {
        t_row_ptrs[i] += t_row_ptrs[i - 1];
    }

    let mut next: Vec<usize> = allocator.allocate_vec(ncols)?;
    next.extend_from_slice(&t_row_ptrs[..ncols]);

    let mut t_col_indices: Vec<Index> = allocator.allocate_vec(nnz)?;
    t_col_indices.resize(nnz, 0);

    // Scanning source rows in order keeps each output row sorted
    for row in 0..nrows as usize {
        for &col in a.row(row) {
            let slot = &mut next[col as usize];
            t_col_indices[*slot] = row as Index;
            *slot += 1;
        }
    }

    Ok(CsrMatrix::from_parts_unchecked(
        t_row_ptrs,
        t_col_indices,
        shape,
    ))
}
