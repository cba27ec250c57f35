//! CPU runtime implementation
//!
//! The CPU runtime keeps matrices in host memory and provides the reference
//! implementation of every sparse boolean kernel. Row-parallel kernels use
//! `rayon` when the `rayon` feature is enabled.

mod client;
mod device;
mod runtime;
pub(crate) mod sparse;

pub use client::{CpuClient, DEFAULT_PARALLEL_MIN_ROWS};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
