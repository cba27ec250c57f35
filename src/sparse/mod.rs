//! Sparse boolean matrix storage
//!
//! Matrices hold only the *positions* of their nonzeros: every stored
//! coordinate is implicitly `true`, everything else is `false`.
//!
//! # Storage
//!
//! **CSR** (Compressed Sparse Row) is the single storage format. Column indices
//! are strictly ascending inside each row, so the stored coordinate set is
//! always deduplicated and iterates in row-major order. O(nnz + nrows) storage.
//!
//! # Usage
//!
//! ```
//! use spbla::sparse::{CsrMatrix, SparseStorage};
//!
//! // [1 0 1]
//! // [0 1 0]
//! let m = CsrMatrix::from_parts(vec![0, 2, 3], vec![0, 2, 1], [2, 3])?;
//! assert_eq!(m.nnz(), 3);
//! assert!(m.contains(0, 2));
//! assert_eq!(m.pairs(), (vec![0, 0, 1], vec![0, 2, 1]));
//! # Ok::<(), spbla::error::Error>(())
//! ```

mod csr;
mod ops;
mod storage;

pub use csr::CsrMatrix;
pub use ops::BoolSparseOps;
pub use storage::SparseStorage;

/// Fixed-width unsigned coordinate type
pub type Index = u32;
