//! CPU runtime implementation

use super::client::CpuClient;
use super::device::CpuDevice;
use crate::error::Result;
use crate::instance::{InstanceConfig, MemoryPlacement};
use crate::runtime::{Runtime, TrackingAllocator};

/// CPU compute runtime
///
/// This is the default runtime that works on any platform.
/// Host memory is trivially visible to the "device", so both memory
/// placements are supported.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;

    fn name() -> &'static str {
        "cpu"
    }

    fn supports_placement(placement: MemoryPlacement) -> bool {
        matches!(placement, MemoryPlacement::Generic | MemoryPlacement::Unified)
    }

    fn default_device() -> Result<CpuDevice> {
        Ok(CpuDevice::new())
    }

    fn create_client(device: &CpuDevice, config: &InstanceConfig) -> Result<CpuClient> {
        Ok(CpuClient::with_allocator(
            device.clone(),
            TrackingAllocator::new(config.memory_limit),
            config.parallel_min_rows,
        ))
    }
}
