//! Sparse boolean merge algorithms
//!
//! Element-wise boolean operations are all sorted-list merges over the rows of
//! two CSR matrices. They differ only in which positions survive, so a single
//! merge routine is parameterized by a [`MergeStrategy`].
//!
//! | Strategy     | Keeps             | Operation          |
//! |--------------|-------------------|--------------------|
//! | Union        | in A or in B      | `ewise_add` (OR)   |
//! | Intersection | in A and in B     | `ewise_mult` (AND) |
//! | Difference   | in A and not in B | `ewise_mult_inverted` |

use super::super::CpuClient;
use crate::error::{Error, Result};
use crate::runtime::{Allocator, RuntimeClient};
use crate::sparse::{CsrMatrix, Index, SparseStorage};

/// Strategy for merging two sparse boolean matrices
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum MergeStrategy {
    /// Keep positions that exist in either matrix
    Union,
    /// Keep positions that exist in both matrices
    Intersection,
    /// Keep positions of A that are absent from B
    Difference,
}

impl MergeStrategy {
    /// Whether a position present in A only / B only / both survives
    #[inline]
    fn keeps(self, in_a: bool, in_b: bool) -> bool {
        match self {
            MergeStrategy::Union => in_a || in_b,
            MergeStrategy::Intersection => in_a && in_b,
            MergeStrategy::Difference => in_a && !in_b,
        }
    }

    /// Upper bound of the output nonzero count
    fn capacity(self, a_nnz: usize, b_nnz: usize) -> usize {
        match self {
            MergeStrategy::Union => a_nnz + b_nnz,
            MergeStrategy::Intersection => a_nnz.min(b_nnz),
            MergeStrategy::Difference => a_nnz,
        }
    }
}

/// Operand that the result equals when one side is empty
enum EmptyOutcome {
    Empty,
    CopyA,
    CopyB,
}

/// Centralized empty-operand short circuits
///
/// Returns None when both inputs hold values and the merge must run.
fn handle_empty(a_nnz: usize, b_nnz: usize, strategy: MergeStrategy) -> Option<EmptyOutcome> {
    match (a_nnz, b_nnz, strategy) {
        (0, 0, _) => Some(EmptyOutcome::Empty),

        // 0 ∨ B = B, 0 ∧ B = 0, 0 ∧ ¬B = 0
        (0, _, MergeStrategy::Union) => Some(EmptyOutcome::CopyB),
        (0, _, _) => Some(EmptyOutcome::Empty),

        // A ∨ 0 = A, A ∧ 0 = 0, A ∧ ¬0 = A
        (_, 0, MergeStrategy::Union) | (_, 0, MergeStrategy::Difference) => {
            Some(EmptyOutcome::CopyA)
        }
        (_, 0, MergeStrategy::Intersection) => Some(EmptyOutcome::Empty),

        (_, _, _) => None,
    }
}

/// Copy a matrix into storage obtained from the client's allocator
pub(super) fn copy_csr(client: &CpuClient, m: &CsrMatrix) -> Result<CsrMatrix> {
    if m.is_empty() {
        return Ok(CsrMatrix::empty(m.dims()));
    }
    let allocator = client.allocator();
    let mut row_ptrs: Vec<usize> = allocator.allocate_vec(m.row_ptrs.len())?;
    row_ptrs.extend_from_slice(&m.row_ptrs);
    let mut col_indices: Vec<Index> = allocator.allocate_vec(m.col_indices.len())?;
    col_indices.extend_from_slice(&m.col_indices);
    Ok(CsrMatrix::from_parts_unchecked(row_ptrs, col_indices, m.dims()))
}

/// Generic CSR merge for element-wise boolean ops
///
/// # Algorithm
///
/// For each row:
/// 1. Walk the two sorted column lists in lockstep
/// 2. At every distinct column, ask the strategy whether it survives
/// 3. Append surviving columns, which stay sorted by construction
pub(super) fn merge_csr(
    client: &CpuClient,
    a: &CsrMatrix,
    b: &CsrMatrix,
    strategy: MergeStrategy,
    op: &'static str,
) -> Result<CsrMatrix> {
    if a.dims() != b.dims() {
        return Err(Error::dimension_mismatch(op, a.dims(), b.dims()));
    }
    let shape = a.dims();

    if let Some(outcome) = handle_empty(a.nnz(), b.nnz(), strategy) {
        return match outcome {
            EmptyOutcome::Empty => Ok(CsrMatrix::empty(shape)),
            EmptyOutcome::CopyA => copy_csr(client, a),
            EmptyOutcome::CopyB => copy_csr(client, b),
        };
    }

    let nrows = shape[0] as usize;
    let allocator = client.allocator();
    let mut out_row_ptrs: Vec<usize> = allocator.allocate_vec(nrows + 1)?;
    let mut out_col_indices: Vec<Index> =
        allocator.allocate_vec(strategy.capacity(a.nnz(), b.nnz()))?;

    out_row_ptrs.push(0);

    for row in 0..nrows {
        let a_cols = a.row(row);
        let b_cols = b.row(row);
        let (mut i, mut j) = (0, 0);

        while i < a_cols.len() || j < b_cols.len() {
            // Columns are < ncols <= Index::MAX, so MAX works as an end sentinel
            let a_col = a_cols.get(i).copied().unwrap_or(Index::MAX);
            let b_col = b_cols.get(j).copied().unwrap_or(Index::MAX);

            let col = a_col.min(b_col);
            let in_a = a_col == col;
            let in_b = b_col == col;

            if strategy.keeps(in_a, in_b) {
                out_col_indices.push(col);
            }
            if in_a {
                i += 1;
            }
            if in_b {
                j += 1;
            }
        }

        out_row_ptrs.push(out_col_indices.len());
    }

    Ok(CsrMatrix::from_parts_unchecked(
        out_row_ptrs,
        out_col_indices,
        shape,
    ))
}
