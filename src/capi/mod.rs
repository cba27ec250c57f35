//! Flat C call surface
//!
//! Every entry point returns a [`Status`]. Errors never cross the boundary as
//! panics: a panic inside the library is caught and reported as
//! [`Status::Error`]. Null pointers are rejected with
//! [`Status::InvalidArgument`].
//!
//! Instances and matrices are passed by value as generation-checked handles.
//! An [`InstanceHandle`] comes from [`spbla_instance_new`] and is retired by
//! [`spbla_instance_free`]; any later use of it returns
//! [`Status::InvalidState`].

mod handles;

pub use handles::InstanceHandle;

use std::ffi::{CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use tracing::{debug, error};

use crate::DefaultRuntime;
use crate::error::{Error, Result, Status};
use crate::hints::Hints;
use crate::instance::{Instance, InstanceConfig, MatrixHandle, MemoryPlacement};
use crate::runtime::{Device, Runtime};
use crate::sparse::Index;
use handles::{lookup, register, retire};

/// Instance creation parameters
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceDesc {
    /// Memory placement code, see [`MemoryPlacement`]
    pub memory_type: u32,
}

/// Length of [`DeviceCaps::name`], including the terminating nul
pub const DEVICE_NAME_LEN: usize = 256;

/// Properties of the device backing new instances
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DeviceCaps {
    /// Nul-terminated device name
    pub name: [c_char; DEVICE_NAME_LEN],
    /// Compute capability major number, 0 for the CPU
    pub major: i32,
    /// Compute capability minor number, 0 for the CPU
    pub minor: i32,
    /// Warp size, 0 for the CPU
    pub warp: i32,
    /// Whether a CUDA device is available
    pub cuda_supported: bool,
    /// Global device memory in KiB, 0 when shared with the host
    pub global_memory_kibs: Index,
    /// Shared memory per multiprocessor in KiB
    pub shared_memory_per_multiproc_kibs: Index,
    /// Shared memory per block in KiB
    pub shared_memory_per_block_kibs: Index,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            name: [0; DEVICE_NAME_LEN],
            major: 0,
            minor: 0,
            warp: 0,
            cuda_supported: false,
            global_memory_kibs: 0,
            shared_memory_per_multiproc_kibs: 0,
            shared_memory_per_block_kibs: 0,
        }
    }
}

impl DeviceCaps {
    /// Capabilities of `device`. Only host runtimes are built, so the
    /// device-specific fields stay zero.
    pub fn for_device<D: Device>(device: &D) -> Self {
        let mut caps = Self::default();
        let name = device.name();
        // Keep the last byte as the terminator
        for (dst, &src) in caps.name[..DEVICE_NAME_LEN - 1]
            .iter_mut()
            .zip(name.as_bytes())
        {
            *dst = src as c_char;
        }
        caps
    }

    /// Device name up to the first nul
    pub fn name(&self) -> String {
        let bytes: Vec<u8> = self
            .name
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn guarded(call: &'static str, f: impl FnOnce() -> Result<()>) -> Status {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Status::Success,
        Ok(Err(e)) => {
            let status = e.status();
            debug!(call = call, status = %status, error = %e, "call failed");
            status
        }
        Err(_) => {
            error!(call = call, "panic caught at the C boundary");
            Status::Error
        }
    }
}

fn non_null<T>(ptr: *const T, arg: &'static str) -> Result<()> {
    if ptr.is_null() {
        return Err(Error::invalid_argument(arg, "null pointer"));
    }
    Ok(())
}

/// # Safety
///
/// `ptr` must be null or valid for reads of `len` elements.
unsafe fn slice_ref<'a, T>(ptr: *const T, len: usize, arg: &'static str) -> Result<&'a [T]> {
    non_null(ptr, arg)?;
    // SAFETY: non-null, caller guarantees `len` readable elements
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Write `value` through an out-pointer
///
/// # Safety
///
/// `ptr` must be null or valid for writes.
unsafe fn write_out<T>(ptr: *mut T, value: T, arg: &'static str) -> Result<()> {
    non_null(ptr, arg)?;
    // SAFETY: non-null, caller guarantees validity
    unsafe { ptr.write(value) };
    Ok(())
}

/// Pointer to a nul-terminated copy of `text`, built once per process
fn static_c_str(cell: &'static OnceLock<CString>, text: impl FnOnce() -> String) -> *const c_char {
    cell.get_or_init(|| CString::new(text()).unwrap_or_default())
        .as_ptr()
}

// =============================================================================
// Library
// =============================================================================

/// Query the library version
///
/// `version` receives the composite number `major * 100 + minor`.
///
/// # Safety
///
/// `major`, `minor` and `version` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_version_get(
    major: *mut u32,
    minor: *mut u32,
    version: *mut u32,
) -> Status {
    guarded("spbla_version_get", || {
        non_null(major, "major")?;
        non_null(minor, "minor")?;
        non_null(version, "version")?;
        let (maj, min) = crate::version();
        unsafe {
            write_out(major, maj, "major")?;
            write_out(minor, min, "minor")?;
            write_out(version, crate::version_number(), "version")
        }
    })
}

/// Human-readable description of the library build
///
/// The returned string is owned by the library and lives until process exit.
#[unsafe(no_mangle)]
pub extern "C" fn spbla_about_get() -> *const c_char {
    static ABOUT: OnceLock<CString> = OnceLock::new();
    static_c_str(&ABOUT, crate::about)
}

/// License text of the library
///
/// The returned string is owned by the library and lives until process exit.
#[unsafe(no_mangle)]
pub extern "C" fn spbla_license_info_get() -> *const c_char {
    static LICENSE: OnceLock<CString> = OnceLock::new();
    static_c_str(&LICENSE, || crate::license_info().to_string())
}

/// Query the capabilities of the device new instances run on
///
/// # Safety
///
/// `caps` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_device_caps_get(caps: *mut DeviceCaps) -> Status {
    guarded("spbla_device_caps_get", || {
        non_null(caps, "caps")?;
        let device = DefaultRuntime::default_device()?;
        unsafe { write_out(caps, DeviceCaps::for_device(&device), "caps") }
    })
}

/// Create an instance
///
/// # Safety
///
/// `desc` must be valid for reads and `instance` valid for writes. The
/// returned handle must be released with [`spbla_instance_free`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_instance_new(
    desc: *const InstanceDesc,
    instance: *mut InstanceHandle,
) -> Status {
    guarded("spbla_instance_new", || {
        non_null(desc, "desc")?;
        non_null(instance, "instance")?;
        // SAFETY: checked non-null above
        let desc = unsafe { *desc };
        let memory = MemoryPlacement::from_code(desc.memory_type).ok_or_else(|| {
            Error::UnsupportedConfiguration(format!(
                "unknown memory type {}",
                desc.memory_type
            ))
        })?;
        let created = Instance::new(InstanceConfig::default().with_memory(memory))?;
        let handle = register(created)?;
        debug!(handle = %handle, "instance handle issued");
        unsafe { write_out(instance, handle, "instance") }
    })
}

/// Finalize and destroy an instance
///
/// Matrices still owned by the instance are released. The handle is retired:
/// freeing it again, or passing it to any other call, returns
/// [`Status::InvalidState`].
#[unsafe(no_mangle)]
pub extern "C" fn spbla_instance_free(instance: InstanceHandle) -> Status {
    guarded("spbla_instance_free", || retire(instance)?.finalize())
}

// =============================================================================
// Matrix lifecycle
// =============================================================================

/// Create an empty matrix
///
/// # Safety
///
/// `matrix` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_matrix_new(
    instance: InstanceHandle,
    matrix: *mut MatrixHandle,
    nrows: Index,
    ncols: Index,
) -> Status {
    guarded("spbla_matrix_new", || {
        let inst = lookup(instance)?;
        non_null(matrix, "matrix")?;
        let handle = inst.matrix_new(nrows, ncols)?;
        unsafe { write_out(matrix, handle, "matrix") }
    })
}

/// Free a matrix
#[unsafe(no_mangle)]
pub extern "C" fn spbla_matrix_free(instance: InstanceHandle, matrix: MatrixHandle) -> Status {
    guarded("spbla_matrix_free", || lookup(instance)?.matrix_free(matrix))
}

/// Resize a matrix that holds no values
#[unsafe(no_mangle)]
pub extern "C" fn spbla_matrix_resize(
    instance: InstanceHandle,
    matrix: MatrixHandle,
    nrows: Index,
    ncols: Index,
) -> Status {
    guarded("spbla_matrix_resize", || {
        lookup(instance)?.matrix_resize(matrix, nrows, ncols)
    })
}

/// Fill a matrix from `nvals` coordinate pairs
///
/// # Safety
///
/// `rows` and `cols` must be valid for reads of `nvals` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_matrix_build(
    instance: InstanceHandle,
    matrix: MatrixHandle,
    rows: *const Index,
    cols: *const Index,
    nvals: usize,
    hints: u32,
) -> Status {
    guarded("spbla_matrix_build", || {
        let inst = lookup(instance)?;
        let rows = unsafe { slice_ref(rows, nvals, "rows") }?;
        let cols = unsafe { slice_ref(cols, nvals, "cols") }?;
        inst.build(matrix, rows, cols, Hints::from_bits_truncate(hints))
    })
}

/// Read all coordinate pairs of a matrix
///
/// On input `*nvals` is the capacity of `rows` and `cols`; on success it
/// holds the number of pairs written.
///
/// # Safety
///
/// `rows` and `cols` must be valid for writes of `*nvals` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_matrix_extract_pairs(
    instance: InstanceHandle,
    matrix: MatrixHandle,
    rows: *mut Index,
    cols: *mut Index,
    nvals: *mut usize,
) -> Status {
    guarded("spbla_matrix_extract_pairs", || {
        let inst = lookup(instance)?;
        non_null(rows, "rows")?;
        non_null(cols, "cols")?;
        non_null(nvals, "nvals")?;
        // SAFETY: checked non-null above
        let capacity = unsafe { *nvals };

        inst.with_matrix(matrix, |m| {
            let count = m.col_indices().len();
            if capacity < count {
                return Err(Error::invalid_argument(
                    "nvals",
                    format!("capacity {} is smaller than {} values", capacity, count),
                ));
            }
            // SAFETY: caller guarantees `capacity` writable elements
            let rows = unsafe { std::slice::from_raw_parts_mut(rows, count) };
            let cols = unsafe { std::slice::from_raw_parts_mut(cols, count) };
            for (k, (row, col)) in m.iter().enumerate() {
                rows[k] = row;
                cols[k] = col;
            }
            unsafe { nvals.write(count) };
            Ok(())
        })?
    })
}

/// Deep copy a matrix
///
/// # Safety
///
/// `duplicated` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_matrix_duplicate(
    instance: InstanceHandle,
    matrix: MatrixHandle,
    duplicated: *mut MatrixHandle,
) -> Status {
    guarded("spbla_matrix_duplicate", || {
        let inst = lookup(instance)?;
        non_null(duplicated, "duplicated")?;
        let handle = inst.duplicate(matrix)?;
        unsafe { write_out(duplicated, handle, "duplicated") }
    })
}

/// `result = aᵀ`
#[unsafe(no_mangle)]
pub extern "C" fn spbla_matrix_transpose(
    instance: InstanceHandle,
    result: MatrixHandle,
    a: MatrixHandle,
) -> Status {
    guarded("spbla_matrix_transpose", || {
        lookup(instance)?.transpose(result, a)
    })
}

/// Number of rows
///
/// # Safety
///
/// `nrows` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_matrix_nrows(
    instance: InstanceHandle,
    matrix: MatrixHandle,
    nrows: *mut Index,
) -> Status {
    guarded("spbla_matrix_nrows", || {
        let value = lookup(instance)?.nrows(matrix)?;
        unsafe { write_out(nrows, value, "nrows") }
    })
}

/// Number of columns
///
/// # Safety
///
/// `ncols` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_matrix_ncols(
    instance: InstanceHandle,
    matrix: MatrixHandle,
    ncols: *mut Index,
) -> Status {
    guarded("spbla_matrix_ncols", || {
        let value = lookup(instance)?.ncols(matrix)?;
        unsafe { write_out(ncols, value, "ncols") }
    })
}

/// Number of stored values
///
/// # Safety
///
/// `nvals` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spbla_matrix_nvals(
    instance: InstanceHandle,
    matrix: MatrixHandle,
    nvals: *mut usize,
) -> Status {
    guarded("spbla_matrix_nvals", || {
        let value = lookup(instance)?.nvals(matrix)?;
        unsafe { write_out(nvals, value, "nvals") }
    })
}

// =============================================================================
// Operations
// =============================================================================

/// `result = a OR b`
#[unsafe(no_mangle)]
pub extern "C" fn spbla_ewise_add(
    instance: InstanceHandle,
    result: MatrixHandle,
    a: MatrixHandle,
    b: MatrixHandle,
) -> Status {
    guarded("spbla_ewise_add", || lookup(instance)?.ewise_add(result, a, b))
}

/// `result = a AND b`
#[unsafe(no_mangle)]
pub extern "C" fn spbla_ewise_mult(
    instance: InstanceHandle,
    result: MatrixHandle,
    a: MatrixHandle,
    b: MatrixHandle,
) -> Status {
    guarded("spbla_ewise_mult", || lookup(instance)?.ewise_mult(result, a, b))
}

/// `result = a AND NOT b`
#[unsafe(no_mangle)]
pub extern "C" fn spbla_ewise_mult_inverted(
    instance: InstanceHandle,
    result: MatrixHandle,
    a: MatrixHandle,
    b: MatrixHandle,
) -> Status {
    guarded("spbla_ewise_mult_inverted", || {
        lookup(instance)?.ewise_mult_inverted(result, a, b)
    })
}

/// `result = a × b`, or `result = result OR (a × b)` with the accumulate hint
#[unsafe(no_mangle)]
pub extern "C" fn spbla_mxm(
    instance: InstanceHandle,
    result: MatrixHandle,
    a: MatrixHandle,
    b: MatrixHandle,
    hints: u32,
) -> Status {
    guarded("spbla_mxm", || {
        lookup(instance)?.mxm_with_hints(result, a, b, Hints::from_bits_truncate(hints))
    })
}

/// `result = a ⊗ b`
#[unsafe(no_mangle)]
pub extern "C" fn spbla_kron(
    instance: InstanceHandle,
    result: MatrixHandle,
    a: MatrixHandle,
    b: MatrixHandle,
) -> Status {
    guarded("spbla_kron", || lookup(instance)?.kron(result, a, b))
}
