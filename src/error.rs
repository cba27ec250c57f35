//! Error types for spbla

use crate::sparse::Index;
use thiserror::Error;

/// Result type alias using spbla's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in spbla operations
///
/// Every variant maps to exactly one [`Status`] code via [`Error::status`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Operand or result shapes are incompatible
    #[error("Dimension mismatch in '{op}': expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        /// The operation name
        op: &'static str,
        /// Expected shape [nrows, ncols]
        expected: [usize; 2],
        /// Actual shape [nrows, ncols]
        got: [usize; 2],
    },

    /// Columns of the left operand differ from rows of the right operand
    #[error(
        "Inner dimension mismatch in '{op}': lhs is {lhs:?} with {} columns, rhs is {rhs:?} with {} rows",
        .lhs[1],
        .rhs[0]
    )]
    InnerDimensionMismatch {
        /// The operation name
        op: &'static str,
        /// Left-hand side shape [nrows, ncols]
        lhs: [usize; 2],
        /// Right-hand side shape [nrows, ncols]
        rhs: [usize; 2],
    },

    /// Coordinate outside the declared matrix dimensions
    #[error("Coordinate ({row}, {col}) out of bounds for {nrows}x{ncols} matrix")]
    IndexOutOfBounds {
        /// Row index of the offending pair
        row: Index,
        /// Column index of the offending pair
        col: Index,
        /// Matrix rows
        nrows: Index,
        /// Matrix columns
        ncols: Index,
    },

    /// Call is not possible in the current state (finalized instance, stale handle, ...)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Out of memory or memory limit exceeded
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Requested instance configuration cannot be honoured by the runtime
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// No compute device present for a device runtime
    #[error("No compatible device present")]
    DeviceNotPresent,

    /// Device-side execution failure
    #[error("Device error: {0}")]
    Device(String),

    /// Feature not implemented by the selected runtime
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unimplemented feature
        feature: &'static str,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(op: &'static str, expected: [Index; 2], got: [Index; 2]) -> Self {
        Self::DimensionMismatch {
            op,
            expected: [expected[0] as usize, expected[1] as usize],
            got: [got[0] as usize, got[1] as usize],
        }
    }

    /// Create an inner dimension mismatch error for `lhs x rhs` products
    pub fn inner_dimension_mismatch(op: &'static str, lhs: [Index; 2], rhs: [Index; 2]) -> Self {
        Self::InnerDimensionMismatch {
            op,
            lhs: [lhs[0] as usize, lhs[1] as usize],
            rhs: [rhs[0] as usize, rhs[1] as usize],
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    /// Whether this is one of the shape mismatch errors
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(
            self,
            Error::DimensionMismatch { .. } | Error::InnerDimensionMismatch { .. }
        )
    }

    /// Status code reported for this error across the C boundary
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidArgument { .. }
            | Error::DimensionMismatch { .. }
            | Error::InnerDimensionMismatch { .. }
            | Error::IndexOutOfBounds { .. } => Status::InvalidArgument,
            Error::InvalidState(_) => Status::InvalidState,
            Error::OutOfMemory { .. } => Status::MemOpFailed,
            Error::DeviceNotPresent => Status::DeviceNotPresent,
            Error::Device(_) => Status::DeviceError,
            Error::NotImplemented { .. } | Error::UnsupportedConfiguration(_) => {
                Status::NotImplemented
            }
            Error::Internal(_) => Status::Error,
        }
    }
}

/// Closed set of status codes returned by the flat call surface
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Successful execution of the function
    Success = 0,
    /// Generic error code
    Error = 1,
    /// No compatible device in the system
    DeviceNotPresent = 2,
    /// Device side error
    DeviceError = 3,
    /// Failed to allocate memory
    MemOpFailed = 4,
    /// Passed invalid argument to some function
    InvalidArgument = 5,
    /// Call of the function is not possible in this context
    InvalidState = 6,
    /// Some library feature is not implemented
    NotImplemented = 7,
}

impl Status {
    /// Look up a status by its numeric code
    pub fn from_code(code: u32) -> Option<Self> {
        let status = match code {
            0 => Status::Success,
            1 => Status::Error,
            2 => Status::DeviceNotPresent,
            3 => Status::DeviceError,
            4 => Status::MemOpFailed,
            5 => Status::InvalidArgument,
            6 => Status::InvalidState,
            7 => Status::NotImplemented,
            _ => return None,
        };
        Some(status)
    }

    /// Numeric code of this status
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Symbolic name of the status
    pub fn name(self) -> &'static str {
        match self {
            Status::Success => "SPBLA_STATUS_SUCCESS",
            Status::Error => "SPBLA_STATUS_ERROR",
            Status::DeviceNotPresent => "SPBLA_STATUS_DEVICE_NOT_PRESENT",
            Status::DeviceError => "SPBLA_STATUS_DEVICE_ERROR",
            Status::MemOpFailed => "SPBLA_STATUS_MEM_OP_FAILED",
            Status::InvalidArgument => "SPBLA_STATUS_INVALID_ARGUMENT",
            Status::InvalidState => "SPBLA_STATUS_INVALID_STATE",
            Status::NotImplemented => "SPBLA_STATUS_NOT_IMPLEMENTED",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}
