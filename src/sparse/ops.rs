//! Sparse boolean operations trait
//!
//! Defines the kernel interface that runtime clients implement.

use crate::error::Result;

use super::{CsrMatrix, Index};

/// Trait for sparse boolean matrix kernels
///
/// Implemented by each runtime client. Every method is a pure function of its
/// inputs: it validates shapes, computes into freshly allocated storage and
/// returns the new matrix. Callers decide where the result is stored, which
/// makes aliasing of operands and results safe by construction.
///
/// # Boolean semiring
///
/// Addition is logical OR and multiplication is logical AND. No values are
/// stored, so only the presence of a coordinate matters.
pub trait BoolSparseOps {
    /// Build a CSR matrix from parallel row/column coordinate arrays.
    ///
    /// Duplicates are removed. With `assume_sorted` the kernel may skip its
    /// sort pass when the input is verified to be strictly row-major ascending.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `rows` and `cols` differ in length
    /// - `IndexOutOfBounds` if any coordinate lies outside `shape`
    fn build_csr(
        &self,
        rows: &[Index],
        cols: &[Index],
        shape: [Index; 2],
        assume_sorted: bool,
    ) -> Result<CsrMatrix>;

    /// Deep copy into freshly allocated storage
    fn duplicate_csr(&self, a: &CsrMatrix) -> Result<CsrMatrix>;

    /// Element-wise OR: C = A ∨ B
    fn ewise_add_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix>;

    /// Element-wise AND: C = A ∧ B
    fn ewise_mult_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix>;

    /// Element-wise AND with inverted right operand: C = A ∧ ¬B
    fn ewise_mult_inverted_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix>;

    /// Boolean semiring product: C[i,j] = ∨_k (A[i,k] ∧ B[k,j])
    ///
    /// # Errors
    ///
    /// `InnerDimensionMismatch` if `a.ncols != b.nrows`
    fn spgemm_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix>;

    /// Kronecker product with shape [a.nrows * b.nrows, a.ncols * b.ncols]
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the product shape overflows [`Index`]
    fn kron_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix>;

    /// Transpose: C[j,i] = A[i,j]
    fn transpose_csr(&self, a: &CsrMatrix) -> Result<CsrMatrix>;
}
