//! Runtime backends for sparse boolean computation
//!
//! This module defines the `Runtime` trait and provides the CPU
//! implementation. Device backends plug in behind the same trait.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific GPU/CPU)
//! ├── Client (dispatches sparse kernels, owns the allocator)
//! └── Allocator (memory accounting and fallible allocation)
//! ```

mod allocator;

pub mod cpu;

pub use allocator::{Allocator, TrackingAllocator};

use crate::error::Result;
use crate::instance::{InstanceConfig, MemoryPlacement};
use crate::sparse::BoolSparseOps;

/// Core trait for compute backends
///
/// `Runtime` abstracts over different compute devices (CPU, GPU, etc.).
/// It uses static dispatch via generics for zero-cost abstraction.
///
/// # Associated Types
///
/// - `Device`: Identifies a specific compute unit
/// - `Client`: Handles kernel dispatch and synchronization
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: Device;

    /// Client for dispatching operations
    type Client: RuntimeClient<Self> + BoolSparseOps;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Whether the runtime can honour the given memory placement
    fn supports_placement(placement: MemoryPlacement) -> bool;

    /// Get the default device
    ///
    /// Device runtimes fail with `DeviceNotPresent` when no device exists.
    fn default_device() -> Result<Self::Device>;

    /// Create a client for a device, configured from the instance config
    fn create_client(device: &Self::Device, config: &InstanceConfig) -> Result<Self::Client>;
}

/// Trait for device identification
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device
    fn id(&self) -> usize;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }
}

/// Trait for runtime clients that handle operation dispatch
pub trait RuntimeClient<R: Runtime>: Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending operations to complete
    fn synchronize(&self);

    /// Get the allocator for this client
    fn allocator(&self) -> &TrackingAllocator;
}
