//! Sparse boolean kernels for the CPU runtime
//!
//! This module implements the BoolSparseOps trait for CpuClient.

use super::CpuClient;
use crate::error::Result;
use crate::sparse::{BoolSparseOps, CsrMatrix, Index};

mod build;
mod esc_spgemm;
mod kron;
mod merge;
mod transpose;

use merge::MergeStrategy;

impl BoolSparseOps for CpuClient {
    fn build_csr(
        &self,
        rows: &[Index],
        cols: &[Index],
        shape: [Index; 2],
        assume_sorted: bool,
    ) -> Result<CsrMatrix> {
        build::coo_to_csr(self, rows, cols, shape, assume_sorted)
    }

    fn duplicate_csr(&self, a: &CsrMatrix) -> Result<CsrMatrix> {
        merge::copy_csr(self, a)
    }

    fn ewise_add_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix> {
        merge::merge_csr(self, a, b, MergeStrategy::Union, "ewise_add")
    }

    fn ewise_mult_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix> {
        merge::merge_csr(self, a, b, MergeStrategy::Intersection, "ewise_mult")
    }

    fn ewise_mult_inverted_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix> {
        merge::merge_csr(
            self,
            a,
            b,
            MergeStrategy::Difference,
            "ewise_mult_inverted",
        )
    }

    fn spgemm_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix> {
        esc_spgemm::esc_spgemm_csr(self, a, b)
    }

    fn kron_csr(&self, a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix> {
        kron::kron_csr(self, a, b)
    }

    fn transpose_csr(&self, a: &CsrMatrix) -> Result<CsrMatrix> {
        transpose::transpose_csr(self, a)
    }
}
