//! Memory allocator traits and default implementation
//!
//! The Allocator trait accounts for the storage held by live matrices and
//! turns allocation failures into [`Error::OutOfMemory`] instead of aborting.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory allocator trait for runtime backends
///
/// Allocators hand out kernel output buffers and track the bytes committed
/// to matrices owned by an instance.
pub trait Allocator: Clone + Send + Sync {
    /// Allocate an empty vector with room for `capacity` elements
    ///
    /// Fails with `OutOfMemory` if the system allocator refuses the request
    /// or if the request alone would push usage past the configured limit.
    fn allocate_vec<T>(&self, capacity: usize) -> Result<Vec<T>>;

    /// Record `size_bytes` as committed to a live matrix
    fn charge(&self, size_bytes: usize) -> Result<()>;

    /// Release bytes previously recorded with [`Allocator::charge`]
    fn release(&self, size_bytes: usize);

    /// Get the total committed bytes
    fn allocated_bytes(&self) -> usize {
        0 // Default: tracking not supported
    }

    /// Optional upper bound on committed bytes
    fn limit(&self) -> Option<usize> {
        None
    }
}

/// Allocator backed by the global heap with byte accounting
///
/// Clones share the same counter, so a client and the instance that owns it
/// observe one usage figure.
#[derive(Clone, Debug, Default)]
pub struct TrackingAllocator {
    allocated: Arc<AtomicUsize>,
    limit: Option<usize>,
}

impl TrackingAllocator {
    /// Create a new allocator with an optional byte limit
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            allocated: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    fn check_limit(&self, extra: usize) -> Result<()> {
        if let Some(limit) = self.limit {
            let current = self.allocated.load(Ordering::Acquire);
            if current.saturating_add(extra) > limit {
                return Err(Error::OutOfMemory { size: extra });
            }
        }
        Ok(())
    }
}

impl Allocator for TrackingAllocator {
    fn allocate_vec<T>(&self, capacity: usize) -> Result<Vec<T>> {
        let size = capacity.saturating_mul(std::mem::size_of::<T>());
        self.check_limit(size)?;
        let mut v = Vec::new();
        v.try_reserve_exact(capacity)
            .map_err(|_| Error::OutOfMemory { size })?;
        Ok(v)
    }

    fn charge(&self, size_bytes: usize) -> Result<()> {
        match self.limit {
            None => {
                self.allocated.fetch_add(size_bytes, Ordering::AcqRel);
                Ok(())
            }
            Some(limit) => self
                .allocated
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    current.checked_add(size_bytes).filter(|&next| next <= limit)
                })
                .map(|_| ())
                .map_err(|_| Error::OutOfMemory { size: size_bytes }),
        }
    }

    fn release(&self, size_bytes: usize) {
        let _ = self
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(size_bytes))
            });
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}
