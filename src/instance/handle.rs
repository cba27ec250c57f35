//! Generation-checked handles

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of an instance within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a fresh id. Ids start at 1; 0 marks a null handle.
    pub(crate) fn next() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance#{}", self.0)
    }
}

/// Opaque reference to a matrix owned by an instance
///
/// A handle stays valid until the matrix is freed or its instance is
/// finalized. Reusing a stale handle is detected through the generation
/// counter of its slot and reported as `InvalidState`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixHandle {
    pub(crate) instance: u64,
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl MatrixHandle {
    /// Handle that never refers to a matrix
    pub const NULL: MatrixHandle = MatrixHandle {
        instance: 0,
        slot: 0,
        generation: 0,
    };

    pub(crate) fn new(instance: InstanceId, slot: u32, generation: u32) -> Self {
        Self {
            instance: instance.get(),
            slot,
            generation,
        }
    }

    /// Returns true for the null handle
    #[inline]
    pub fn is_null(&self) -> bool {
        self.instance == 0
    }

    /// Whether this handle was issued by the given instance
    #[inline]
    pub fn belongs_to(&self, instance: InstanceId) -> bool {
        self.instance == instance.get()
    }
}

impl std::fmt::Display for MatrixHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "matrix#{}.{}@{}",
            self.slot, self.generation, self.instance
        )
    }
}
