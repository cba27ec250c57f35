//! Instances created through the C API
//!
//! C callers never see an instance pointer. They hold an [`InstanceHandle`]
//! that is resolved against one process-wide table on every call, so a freed
//! instance is reported as `InvalidState` instead of being dereferenced.
//!
//! ## Thread Safety
//!
//! The table sits behind a mutex that is held only while a handle is
//! resolved. Calls run against an `Arc` clone of the instance.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::instance::Instance;

static INSTANCES: Mutex<InstanceTable> = Mutex::new(InstanceTable::new());

/// Opaque reference to an instance created by `spbla_instance_new`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl InstanceHandle {
    /// Handle that never refers to an instance
    pub const NULL: InstanceHandle = InstanceHandle {
        slot: 0,
        generation: 0,
    };

    /// Returns true for the null handle
    #[inline]
    pub fn is_null(&self) -> bool {
        self.generation == 0
    }
}

impl Default for InstanceHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance-handle#{}.{}", self.slot, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    instance: Option<Arc<Instance>>,
}

/// Generational table of live instances
#[derive(Debug)]
pub(super) struct InstanceTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl InstanceTable {
    pub(super) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live instances
    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(super) fn insert(&mut self, instance: Instance) -> Result<InstanceHandle> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let slot = u32::try_from(self.slots.len()).map_err(|_| Error::OutOfMemory {
                    size: std::mem::size_of::<Slot>(),
                })?;
                self.slots.push(Slot {
                    generation: 1,
                    instance: None,
                });
                slot
            }
        };

        let record = &mut self.slots[slot as usize];
        record.instance = Some(Arc::new(instance));
        Ok(InstanceHandle {
            slot,
            generation: record.generation,
        })
    }

    /// Resolve a handle to its instance
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the handle is null or was never issued
    /// - `InvalidState` if the instance was already freed
    pub(super) fn get(&self, handle: InstanceHandle) -> Result<Arc<Instance>> {
        if handle.is_null() {
            return Err(Error::invalid_argument("instance", "null instance handle"));
        }
        let record = self.slots.get(handle.slot as usize).ok_or_else(|| {
            Error::invalid_argument("instance", format!("{} was never issued", handle))
        })?;
        if record.generation != handle.generation {
            return Err(Error::invalid_state(format!("{} is stale", handle)));
        }
        record
            .instance
            .clone()
            .ok_or_else(|| Error::invalid_state(format!("{} is stale", handle)))
    }

    /// Remove an instance, invalidating its handle
    pub(super) fn remove(&mut self, handle: InstanceHandle) -> Result<Arc<Instance>> {
        let instance = self.get(handle)?;
        let record = &mut self.slots[handle.slot as usize];
        record.instance = None;
        record.generation = record.generation.wrapping_add(1).max(1);
        self.free.push(handle.slot);
        Ok(instance)
    }
}

/// Store an instance in the process-wide table
pub(super) fn register(instance: Instance) -> Result<InstanceHandle> {
    INSTANCES.lock().insert(instance)
}

/// Resolve a handle; the table lock is released before the call proceeds
pub(super) fn lookup(handle: InstanceHandle) -> Result<Arc<Instance>> {
    INSTANCES.lock().get(handle)
}

/// Take an instance out of the table. Later lookups of `handle` fail.
pub(super) fn retire(handle: InstanceHandle) -> Result<Arc<Instance>> {
    INSTANCES.lock().remove(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceConfig;

    fn instance() -> Instance {
        Instance::new(InstanceConfig::default()).unwrap()
    }

    #[test]
    fn test_insert_get_remove() {
        let mut table = InstanceTable::new();
        let h = table.insert(instance()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get(h).is_ok());

        let removed = table.remove(h).unwrap();
        assert_eq!(Arc::strong_count(&removed), 1);
        assert_eq!(table.len(), 0);
        assert!(matches!(table.get(h), Err(Error::InvalidState(_))));
        assert!(matches!(table.remove(h), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut table = InstanceTable::new();
        let h1 = table.insert(instance()).unwrap();
        let first_id = table.get(h1).unwrap().id();
        table.remove(h1).unwrap();
        let h2 = table.insert(instance()).unwrap();

        assert_eq!(h1.slot, h2.slot);
        assert_ne!(h1.generation, h2.generation);
        assert!(matches!(table.get(h1), Err(Error::InvalidState(_))));
        assert_ne!(table.get(h2).unwrap().id(), first_id);
    }

    #[test]
    fn test_null_and_unissued_handles() {
        let mut table = InstanceTable::new();
        table.insert(instance()).unwrap();

        assert!(matches!(
            table.get(InstanceHandle::NULL),
            Err(Error::InvalidArgument { .. })
        ));
        let unissued = InstanceHandle {
            slot: 7,
            generation: 1,
        };
        assert!(matches!(
            table.get(unissued),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
