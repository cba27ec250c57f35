//! Instance configuration

use crate::error::{Error, Result};
use crate::runtime::cpu::DEFAULT_PARALLEL_MIN_ROWS;
use crate::sparse::Index;

/// Where matrix storage may live relative to the host
#[repr(u32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MemoryPlacement {
    /// Backend-default placement (device memory on GPU runtimes)
    #[default]
    Generic = 0,
    /// Host and device share one address space (managed memory)
    Unified = 1,
}

impl MemoryPlacement {
    /// Look up a placement by its numeric code
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(MemoryPlacement::Generic),
            1 => Some(MemoryPlacement::Unified),
            _ => None,
        }
    }

    /// Returns the placement name as a string
    pub fn name(&self) -> &'static str {
        match self {
            MemoryPlacement::Generic => "generic",
            MemoryPlacement::Unified => "unified",
        }
    }
}

impl std::fmt::Display for MemoryPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration of an [`Instance`](super::Instance)
///
/// ```
/// use spbla::instance::{InstanceConfig, MemoryPlacement};
///
/// let config = InstanceConfig::default()
///     .with_memory(MemoryPlacement::Unified)
///     .with_memory_limit(64 << 20);
/// assert_eq!(config.memory, MemoryPlacement::Unified);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Memory placement requested from the runtime
    pub memory: MemoryPlacement,
    /// Largest accepted row or column count
    pub max_dimension: Index,
    /// Upper bound on bytes held by live matrices (None: unlimited)
    pub memory_limit: Option<usize>,
    /// Row count from which row-parallel kernels go multi-threaded
    pub parallel_min_rows: usize,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            memory: MemoryPlacement::Generic,
            max_dimension: Index::MAX,
            memory_limit: None,
            parallel_min_rows: DEFAULT_PARALLEL_MIN_ROWS,
        }
    }
}

impl InstanceConfig {
    /// Set the memory placement
    pub fn with_memory(mut self, memory: MemoryPlacement) -> Self {
        self.memory = memory;
        self
    }

    /// Set the largest accepted row or column count
    pub fn with_max_dimension(mut self, max_dimension: Index) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Bound the bytes held by live matrices
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Set the row threshold for multi-threaded kernels
    pub fn with_parallel_min_rows(mut self, rows: usize) -> Self {
        self.parallel_min_rows = rows;
        self
    }

    /// Check a requested matrix shape against `max_dimension`
    pub(crate) fn check_dims(&self, nrows: Index, ncols: Index) -> Result<()> {
        for (arg, value) in [("nrows", nrows), ("ncols", ncols)] {
            if value > self.max_dimension {
                return Err(Error::invalid_argument(
                    arg,
                    format!(
                        "{} exceeds the maximum dimension {}",
                        value, self.max_dimension
                    ),
                ));
            }
        }
        Ok(())
    }
}
