//! ESC SpGEMM (Expand, Sort, Compress) - boolean CPU implementation
//!
//! Implements Sparse × Sparse multiplication over the boolean (OR, AND)
//! semiring.
//!
//! # Algorithm
//!
//! ## Phase 1: Expand + Sort (per output row)
//! ```text
//! For each output row i:
//!   For each non-zero A[i,k]:
//!     Append every column of B[k,:] to the row buffer
//!   Sort the buffer and drop duplicates
//! ```
//!
//! ## Phase 2: Compress
//! ```text
//! Build row_ptrs via exclusive scan over the buffer lengths
//! Concatenate the buffers into col_indices
//! ```
//!
//! Without numeric weights only presence matters, so accumulation order
//! affects performance only. Rows are independent and run on the `rayon`
//! pool once the row count reaches the client's threshold.

use super::super::CpuClient;
use crate::error::{Error, Result};
use crate::runtime::{Allocator, RuntimeClient, TrackingAllocator};
use crate::sparse::{CsrMatrix, Index, SparseStorage};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Validate shapes for C = A × B and return the output shape
pub(super) fn validate_spgemm_shapes(a: [Index; 2], b: [Index; 2]) -> Result<[Index; 2]> {
    if a[1] != b[0] {
        return Err(Error::inner_dimension_mismatch("mxm", a, b));
    }
    Ok([a[0], b[1]])
}

pub(super) fn esc_spgemm_csr(
    client: &CpuClient,
    a: &CsrMatrix,
    b: &CsrMatrix,
) -> Result<CsrMatrix> {
    let shape = validate_spgemm_shapes(a.dims(), b.dims())?;

    if a.is_empty() || b.is_empty() {
        return Ok(CsrMatrix::empty(shape));
    }

    let m = shape[0] as usize;
    let allocator = client.allocator();

    // ========================================================================
    // PHASE 1: Expand + Sort
    // ========================================================================
    #[cfg(feature = "rayon")]
    let rows: Vec<Vec<Index>> = if m >= client.parallel_min_rows() {
        (0..m)
            .into_par_iter()
            .map(|i| expand_row(allocator, a, b, i))
            .collect::<Result<_>>()?
    } else {
        expand_rows(allocator, a, b, m)?
    };

    #[cfg(not(feature = "rayon"))]
    let rows: Vec<Vec<Index>> = expand_rows(allocator, a, b, m)?;

    // ========================================================================
    // PHASE 2: Compress
    // ========================================================================
    let total: usize = rows.iter().map(Vec::len).sum();

    let mut c_row_ptrs: Vec<usize> = allocator.allocate_vec(m + 1)?;
    let mut c_col_indices: Vec<Index> = allocator.allocate_vec(total)?;

    c_row_ptrs.push(0);
    for row in &rows {
        c_col_indices.extend_from_slice(row);
        c_row_ptrs.push(c_col_indices.len());
    }

    Ok(CsrMatrix::from_parts_unchecked(
        c_row_ptrs,
        c_col_indices,
        shape,
    ))
}

fn expand_rows(
    allocator: &TrackingAllocator,
    a: &CsrMatrix,
    b: &CsrMatrix,
    m: usize,
) -> Result<Vec<Vec<Index>>> {
    let mut rows = allocator.allocate_vec(m)?;
    for i in 0..m {
        rows.push(expand_row(allocator, a, b, i)?);
    }
    Ok(rows)
}

/// Sorted, deduplicated column set of output row `i`
///
/// The row buffer is sized for the full expansion before deduplication and
/// is requested from the allocator, so the memory limit applies to it.
fn expand_row(
    allocator: &TrackingAllocator,
    a: &CsrMatrix,
    b: &CsrMatrix,
    i: usize,
) -> Result<Vec<Index>> {
    let a_row = a.row(i);
    let expanded: usize = a_row.iter().map(|&k| b.row_nnz(k as usize)).sum();
    let mut cols: Vec<Index> = allocator.allocate_vec(expanded)?;
    match a_row {
        [] => {}
        // Single contributing row of B is already sorted and unique
        [k] => cols.extend_from_slice(b.row(*k as usize)),
        _ => {
            for &k in a_row {
                cols.extend_from_slice(b.row(k as usize));
            }
            cols.sort_unstable();
            cols.dedup();
        }
    }
    Ok(cols)
}
