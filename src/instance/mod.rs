//! Library instance: matrix ownership and operation dispatch
//!
//! An [`Instance`] owns a runtime client and a registry of matrices. Every
//! matrix is addressed through a [`MatrixHandle`] issued by the instance that
//! created it; there is no process-wide state apart from the counter used to
//! hand out unique instance ids.
//!
//! # Example
//!
//! ```
//! use spbla::instance::{Instance, InstanceConfig};
//! use spbla::Hints;
//!
//! # fn main() -> spbla::error::Result<()> {
//! let instance = Instance::new(InstanceConfig::default())?;
//! let a = instance.matrix_new(2, 2)?;
//! instance.build(a, &[0, 1], &[0, 1], Hints::VALUES_SORTED)?;
//!
//! let c = instance.matrix_new(2, 2)?;
//! instance.mxm(c, a, a)?;
//! assert_eq!(instance.extract_pairs(c)?, (vec![0, 1], vec![0, 1]));
//!
//! instance.finalize()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! `Instance` is `Send + Sync`. Handle resolution, creation and destruction
//! serialize on the registry lock. Compute operations hold read locks on their
//! operands while the kernel runs and only take the result's write lock to
//! swap in the finished storage, so a result may alias either operand.

mod config;
mod handle;
mod registry;

pub use config::{InstanceConfig, MemoryPlacement};
pub use handle::{InstanceId, MatrixHandle};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::hints::Hints;
use crate::runtime::cpu::CpuRuntime;
use crate::runtime::{Allocator, Runtime, RuntimeClient};
use crate::sparse::{BoolSparseOps, CsrMatrix, Index, SparseStorage};
use registry::{MatrixEntry, Registry, SharedMatrix};

/// Owner of sparse boolean matrices and entry point for all operations
pub struct Instance<R: Runtime = CpuRuntime> {
    id: InstanceId,
    config: InstanceConfig,
    client: R::Client,
    registry: Mutex<Registry>,
}

impl Instance<CpuRuntime> {
    /// Create an instance on the CPU runtime
    ///
    /// # Errors
    ///
    /// `UnsupportedConfiguration` if the requested memory placement cannot be
    /// honoured.
    pub fn new(config: InstanceConfig) -> Result<Self> {
        Self::with_runtime(config)
    }
}

impl<R: Runtime> Instance<R> {
    /// Create an instance on runtime `R`
    pub fn with_runtime(config: InstanceConfig) -> Result<Self> {
        if !R::supports_placement(config.memory) {
            return Err(Error::UnsupportedConfiguration(format!(
                "{} runtime does not support {} memory",
                R::name(),
                config.memory
            )));
        }

        let device = R::default_device()?;
        let client = R::create_client(&device, &config)?;
        let id = InstanceId::next();
        debug!(
            instance = %id,
            runtime = R::name(),
            memory = %config.memory,
            memory_limit = ?config.memory_limit,
            "instance created"
        );

        Ok(Self {
            id,
            config,
            client,
            registry: Mutex::new(Registry::new()),
        })
    }

    /// Unique id of this instance
    #[inline]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Configuration this instance was created with
    #[inline]
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// Runtime client used for kernel dispatch
    #[inline]
    pub fn client(&self) -> &R::Client {
        &self.client
    }

    /// Whether [`Instance::finalize`] has run
    pub fn is_finalized(&self) -> bool {
        self.registry.lock().is_finalized()
    }

    /// Number of matrices currently owned by this instance
    pub fn live_matrices(&self) -> usize {
        self.registry.lock().len()
    }

    /// Bytes of matrix storage currently held by this instance
    pub fn allocated_bytes(&self) -> usize {
        self.client.allocator().allocated_bytes()
    }

    /// Release every matrix still owned and deactivate the instance
    ///
    /// Each matrix released here rather than through
    /// [`Instance::matrix_free`] is reported with a warning.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the instance is already finalized.
    pub fn finalize(&self) -> Result<()> {
        let drained = self.registry.lock().drain(self.id)?;
        let released = drained.len();
        for (handle, shared) in drained {
            let mut entry = shared.write();
            warn!(
                matrix = %handle,
                marker = %entry.marker,
                nvals = entry.matrix.nnz(),
                "matrix implicitly released on finalize"
            );
            self.release_entry(&mut entry);
        }
        debug!(instance = %self.id, released = released, "instance finalized");
        Ok(())
    }

    // =========================================================================
    // Matrix lifecycle
    // =========================================================================

    /// Create an empty `nrows x ncols` matrix
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a dimension exceeds the configured maximum,
    /// `InvalidState` if the instance is finalized.
    pub fn matrix_new(&self, nrows: Index, ncols: Index) -> Result<MatrixHandle> {
        self.config.check_dims(nrows, ncols)?;
        let entry = MatrixEntry::new(CsrMatrix::empty([nrows, ncols]), String::new());
        let handle = self.registry.lock().insert(self.id, entry)?;
        trace!(matrix = %handle, nrows = nrows, ncols = ncols, "matrix created");
        Ok(handle)
    }

    /// Free a matrix; its handle becomes stale
    pub fn matrix_free(&self, handle: MatrixHandle) -> Result<()> {
        let shared = self.registry.lock().remove(self.id, handle)?;
        let mut entry = shared.write();
        self.release_entry(&mut entry);
        trace!(matrix = %handle, "matrix freed");
        Ok(())
    }

    /// Change the dimensions of a matrix that holds no values
    ///
    /// # Errors
    ///
    /// `InvalidState` if the matrix holds values, `InvalidArgument` if a new
    /// dimension exceeds the configured maximum.
    pub fn matrix_resize(&self, handle: MatrixHandle, nrows: Index, ncols: Index) -> Result<()> {
        let registry = self.registry.lock();
        let shared = registry.get(self.id, handle)?;
        self.config.check_dims(nrows, ncols)?;
        shared.write().matrix.resize([nrows, ncols])
    }

    /// Attach a debug marker used when the matrix is mentioned in logs
    pub fn set_marker(&self, handle: MatrixHandle, marker: impl Into<String>) -> Result<()> {
        let [matrix] = self.resolve([handle])?;
        matrix.write().marker = marker.into();
        Ok(())
    }

    /// Debug marker of a matrix (empty if none was set)
    pub fn marker(&self, handle: MatrixHandle) -> Result<String> {
        let [matrix] = self.resolve([handle])?;
        let marker = matrix.read_recursive().marker.clone();
        Ok(marker)
    }

    /// Deep copy of a matrix, owned by this instance
    pub fn duplicate(&self, handle: MatrixHandle) -> Result<MatrixHandle> {
        let [source] = self.resolve([handle])?;
        let (copy, marker) = {
            let entry = source.read_recursive();
            let copy = self.client.duplicate_csr(&entry.matrix)?;
            let marker = if entry.marker.is_empty() {
                String::new()
            } else {
                format!("{}-dup", entry.marker)
            };
            (copy, marker)
        };

        let bytes = copy.memory_usage();
        self.client.allocator().charge(bytes)?;
        match self
            .registry
            .lock()
            .insert(self.id, MatrixEntry::new(copy, marker))
        {
            Ok(dup) => {
                trace!(source = %handle, matrix = %dup, "matrix duplicated");
                Ok(dup)
            }
            Err(e) => {
                self.client.allocator().release(bytes);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Builder and queries
    // =========================================================================

    /// Replace the contents of a matrix with the given coordinates
    ///
    /// Duplicate coordinates collapse into one value. With
    /// [`Hints::VALUES_SORTED`] a strictly row-major ascending input skips
    /// the sort pass; an input that turns out unsorted is sorted anyway.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the slices differ in length, `IndexOutOfBounds`
    /// if a coordinate lies outside the matrix. On error the matrix is
    /// unchanged.
    pub fn build(
        &self,
        handle: MatrixHandle,
        rows: &[Index],
        cols: &[Index],
        hints: Hints,
    ) -> Result<()> {
        let [target] = self.resolve([handle])?;
        let shape = target.read_recursive().matrix.dims();
        let built = self.client.build_csr(
            rows,
            cols,
            shape,
            hints.contains(Hints::VALUES_SORTED),
        )?;
        trace!(matrix = %handle, input = rows.len(), nvals = built.nnz(), "matrix built");
        self.commit(&target, built)
    }

    /// Read all nonzero coordinates in row-major ascending order
    pub fn extract_pairs(&self, handle: MatrixHandle) -> Result<(Vec<Index>, Vec<Index>)> {
        self.with_matrix(handle, CsrMatrix::pairs)
    }

    /// Run `f` against the matrix behind `handle` under a read lock
    pub fn with_matrix<T>(&self, handle: MatrixHandle, f: impl FnOnce(&CsrMatrix) -> T) -> Result<T> {
        let [matrix] = self.resolve([handle])?;
        let entry = matrix.read_recursive();
        Ok(f(&entry.matrix))
    }

    /// Number of rows
    pub fn nrows(&self, handle: MatrixHandle) -> Result<Index> {
        self.with_matrix(handle, |m| m.dims()[0])
    }

    /// Number of columns
    pub fn ncols(&self, handle: MatrixHandle) -> Result<Index> {
        self.with_matrix(handle, |m| m.dims()[1])
    }

    /// Number of stored values
    pub fn nvals(&self, handle: MatrixHandle) -> Result<usize> {
        self.with_matrix(handle, |m| m.nnz())
    }

    // =========================================================================
    // Compute operations
    // =========================================================================

    /// `result = a OR b`
    pub fn ewise_add(&self, result: MatrixHandle, a: MatrixHandle, b: MatrixHandle) -> Result<()> {
        self.binary_op("ewise_add", result, a, b, ewise_shape, |client, _, a, b| {
            client.ewise_add_csr(a, b)
        })
    }

    /// `result = a AND b`
    pub fn ewise_mult(&self, result: MatrixHandle, a: MatrixHandle, b: MatrixHandle) -> Result<()> {
        self.binary_op("ewise_mult", result, a, b, ewise_shape, |client, _, a, b| {
            client.ewise_mult_csr(a, b)
        })
    }

    /// `result = a AND NOT b`: keep the values of `a` outside the mask `b`
    pub fn ewise_mult_inverted(
        &self,
        result: MatrixHandle,
        a: MatrixHandle,
        b: MatrixHandle,
    ) -> Result<()> {
        self.binary_op(
            "ewise_mult_inverted",
            result,
            a,
            b,
            ewise_shape,
            |client, _, a, b| client.ewise_mult_inverted_csr(a, b),
        )
    }

    /// Boolean matrix product `result = a × b`
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` unless `result` is `a.nrows x b.ncols`,
    /// `InnerDimensionMismatch` unless `a.ncols == b.nrows`.
    pub fn mxm(&self, result: MatrixHandle, a: MatrixHandle, b: MatrixHandle) -> Result<()> {
        self.mxm_with_hints(result, a, b, Hints::NONE)
    }

    /// Accumulating product `result = result OR (a × b)`
    pub fn mxm_accumulate(
        &self,
        result: MatrixHandle,
        a: MatrixHandle,
        b: MatrixHandle,
    ) -> Result<()> {
        self.mxm_with_hints(result, a, b, Hints::ACCUMULATE)
    }

    /// Matrix product honouring [`Hints::ACCUMULATE`]
    pub fn mxm_with_hints(
        &self,
        result: MatrixHandle,
        a: MatrixHandle,
        b: MatrixHandle,
        hints: Hints,
    ) -> Result<()> {
        let accumulate = hints.contains(Hints::ACCUMULATE);
        self.binary_op(
            "mxm",
            result,
            a,
            b,
            |a, b| [a[0] as usize, b[1] as usize],
            |client, current, a, b| {
                let product = client.spgemm_csr(a, b)?;
                if accumulate {
                    client.ewise_add_csr(current, &product)
                } else {
                    Ok(product)
                }
            },
        )
    }

    /// Kronecker product `result = a ⊗ b`
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` unless `result` is
    /// `(a.nrows·b.nrows) x (a.ncols·b.ncols)`; a product shape that does not
    /// fit in [`Index`] can never match.
    pub fn kron(&self, result: MatrixHandle, a: MatrixHandle, b: MatrixHandle) -> Result<()> {
        self.binary_op(
            "kron",
            result,
            a,
            b,
            |a, b| {
                [
                    (a[0] as usize).saturating_mul(b[0] as usize),
                    (a[1] as usize).saturating_mul(b[1] as usize),
                ]
            },
            |client, _, a, b| client.kron_csr(a, b),
        )
    }

    /// `result = aᵀ`; `result` may alias a square `a`
    pub fn transpose(&self, result: MatrixHandle, a: MatrixHandle) -> Result<()> {
        let [target, source] = self.resolve([result, a])?;
        let transposed = {
            let out = target.read_recursive();
            let src = source.read_recursive();
            let [nrows, ncols] = src.matrix.dims();
            check_result_shape("transpose", [ncols as usize, nrows as usize], &out.matrix)?;
            let transposed = self.client.transpose_csr(&src.matrix)?;
            trace!(
                op = "transpose",
                a = ?src.matrix.dims(),
                nvals = transposed.nnz(),
                "operation complete"
            );
            transposed
        };
        self.commit(&target, transposed)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn resolve<const N: usize>(&self, handles: [MatrixHandle; N]) -> Result<[SharedMatrix; N]> {
        let registry = self.registry.lock();
        let mut resolved = Vec::with_capacity(N);
        for handle in handles {
            resolved.push(registry.get(self.id, handle)?);
        }
        resolved
            .try_into()
            .map_err(|_| Error::Internal("handle resolution lost an entry".to_string()))
    }

    /// Shared driver for operations of the form `result = f(a, b)`
    ///
    /// `expected` computes the required result shape from the operand shapes.
    /// `compute` receives the current result contents for accumulation.
    fn binary_op<S, F>(
        &self,
        op: &'static str,
        result: MatrixHandle,
        a: MatrixHandle,
        b: MatrixHandle,
        expected: S,
        compute: F,
    ) -> Result<()>
    where
        S: FnOnce([Index; 2], [Index; 2]) -> [usize; 2],
        F: FnOnce(&R::Client, &CsrMatrix, &CsrMatrix, &CsrMatrix) -> Result<CsrMatrix>,
    {
        let [target, lhs, rhs] = self.resolve([result, a, b])?;
        let output = {
            let out = target.read_recursive();
            let a = lhs.read_recursive();
            let b = rhs.read_recursive();

            check_result_shape(op, expected(a.matrix.dims(), b.matrix.dims()), &out.matrix)?;
            let output = compute(&self.client, &out.matrix, &a.matrix, &b.matrix)?;
            trace!(
                op = op,
                a = ?a.matrix.dims(),
                b = ?b.matrix.dims(),
                a_nvals = a.matrix.nnz(),
                b_nvals = b.matrix.nnz(),
                nvals = output.nnz(),
                "operation complete"
            );
            output
        };
        self.commit(&target, output)
    }

    /// Swap freshly computed storage into a matrix, settling memory accounting
    fn commit(&self, target: &SharedMatrix, matrix: CsrMatrix) -> Result<()> {
        let mut entry = target.write();
        if !entry.live {
            return Err(Error::invalid_state("matrix was freed during the operation"));
        }

        let allocator = self.client.allocator();
        let old = entry.matrix.memory_usage();
        let new = matrix.memory_usage();
        if new > old {
            allocator.charge(new - old)?;
        } else {
            allocator.release(old - new);
        }
        entry.matrix = matrix;
        Ok(())
    }

    fn release_entry(&self, entry: &mut MatrixEntry) {
        entry.live = false;
        self.client.allocator().release(entry.matrix.memory_usage());
        let shape = entry.matrix.dims();
        entry.matrix = CsrMatrix::empty(shape);
    }
}

impl<R: Runtime> Drop for Instance<R> {
    fn drop(&mut self) {
        if !self.is_finalized() {
            let _ = self.finalize();
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Instance<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("runtime", &R::name())
            .field("config", &self.config)
            .field("live_matrices", &self.live_matrices())
            .finish()
    }
}

fn ewise_shape(a: [Index; 2], _b: [Index; 2]) -> [usize; 2] {
    [a[0] as usize, a[1] as usize]
}

fn check_result_shape(op: &'static str, expected: [usize; 2], result: &CsrMatrix) -> Result<()> {
    let got = result.shape();
    if got != expected {
        return Err(Error::DimensionMismatch { op, expected, got });
    }
    Ok(())
}
