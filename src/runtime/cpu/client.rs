//! CPU client implementation

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::runtime::{RuntimeClient, TrackingAllocator};

/// Row count from which row-parallel kernels switch to `rayon`
pub const DEFAULT_PARALLEL_MIN_ROWS: usize = 1024;

/// CPU client for operation dispatch
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    allocator: TrackingAllocator,
    parallel_min_rows: usize,
}

impl CpuClient {
    /// Create a new CPU client with an unlimited allocator
    pub fn new(device: CpuDevice) -> Self {
        Self::with_allocator(device, TrackingAllocator::default(), DEFAULT_PARALLEL_MIN_ROWS)
    }

    /// Create a CPU client sharing an existing allocator
    pub fn with_allocator(
        device: CpuDevice,
        allocator: TrackingAllocator,
        parallel_min_rows: usize,
    ) -> Self {
        Self {
            device,
            allocator,
            parallel_min_rows: parallel_min_rows.max(1),
        }
    }

    /// Minimum row count for row-parallel kernels
    #[inline]
    pub fn parallel_min_rows(&self) -> usize {
        self.parallel_min_rows
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // CPU operations are synchronous, nothing to do
    }

    fn allocator(&self) -> &TrackingAllocator {
        &self.allocator
    }
}
