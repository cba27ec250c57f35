//! # spbla
//!
//! **Sparse boolean linear algebra for graph and language-processing workloads.**
//!
//! spbla stores boolean matrices as compressed sparse rows (only the
//! coordinates of `true` values are kept) and computes over the boolean
//! semiring, where addition is logical OR and multiplication is logical AND.
//!
//! ## Features
//!
//! - **Instances**: explicit library contexts owning matrices
//! - **Handles**: generation-checked matrix handles, stale use is detected
//! - **Element-wise ops**: OR, AND and AND-NOT (inverted mask)
//! - **Matrix product**: row-parallel sparse boolean SpGEMM, with accumulation
//! - **Kronecker product** and **transpose**
//! - **C API**: status-code based entry points in [`capi`]
//!
//! ## Quick Start
//!
//! ```
//! use spbla::prelude::*;
//!
//! # fn main() -> spbla::error::Result<()> {
//! let instance = Instance::new(InstanceConfig::default())?;
//!
//! let a = instance.matrix_new(2, 2)?;
//! let b = instance.matrix_new(2, 2)?;
//! instance.build(a, &[0, 1], &[0, 1], Hints::NONE)?;
//! instance.build(b, &[0], &[1], Hints::NONE)?;
//!
//! let c = instance.matrix_new(2, 2)?;
//! instance.ewise_add(c, a, b)?;
//! assert_eq!(instance.nvals(c)?, 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded CPU kernels

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod capi;
pub mod error;
pub mod hints;
pub mod instance;
pub mod runtime;
pub mod sparse;

pub use hints::Hints;

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Major and minor version numbers of the library
pub fn version() -> (u32, u32) {
    let mut parts = VERSION.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    (major, minor)
}

/// Composite version number, `major * 100 + minor`
pub fn version_number() -> u32 {
    let (major, minor) = version();
    major * 100 + minor
}

/// Human-readable description of the library build
pub fn about() -> String {
    let threading = if cfg!(feature = "rayon") {
        "multi-threaded"
    } else {
        "single-threaded"
    };
    format!(
        "spbla {}: sparse boolean linear algebra over the (OR, AND) semiring, \
         CSR storage, {} CPU runtime",
        VERSION, threading
    )
}

/// License the library is distributed under
pub fn license_info() -> &'static str {
    LICENSE
}

const LICENSE: &str = "MIT License

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, Status};
    pub use crate::hints::Hints;
    pub use crate::instance::{Instance, InstanceConfig, MatrixHandle, MemoryPlacement};
    pub use crate::runtime::cpu::CpuRuntime;
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::sparse::{BoolSparseOps, CsrMatrix, Index, SparseStorage};
}

/// Default runtime
pub type DefaultRuntime = runtime::cpu::CpuRuntime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_package() {
        let (major, minor) = version();
        assert_eq!(VERSION, format!("{}.{}.0", major, minor));
        assert!(about().contains(VERSION));
        assert_eq!(version_number(), major * 100 + minor);
        assert!(license_info().starts_with("MIT License"));
    }
}
