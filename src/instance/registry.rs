//! Matrix registry: a generational arena keyed by [`MatrixHandle`]

use std::sync::Arc;

use parking_lot::RwLock;

use super::handle::{InstanceId, MatrixHandle};
use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;

/// A registered matrix and its bookkeeping
#[derive(Debug)]
pub(crate) struct MatrixEntry {
    pub(crate) matrix: CsrMatrix,
    pub(crate) marker: String,
    /// Cleared when the matrix is freed, so late writers can detect it
    pub(crate) live: bool,
}

impl MatrixEntry {
    pub(crate) fn new(matrix: CsrMatrix, marker: String) -> Self {
        Self {
            matrix,
            marker,
            live: true,
        }
    }
}

pub(crate) type SharedMatrix = Arc<RwLock<MatrixEntry>>;

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<SharedMatrix>,
}

/// Generational arena of matrices owned by one instance
#[derive(Debug, Default)]
pub(crate) struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    finalized: bool,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of live matrices
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    fn ensure_active(&self) -> Result<()> {
        if self.finalized {
            return Err(Error::invalid_state("instance is finalized"));
        }
        Ok(())
    }

    /// Store a matrix and issue its handle
    pub(crate) fn insert(&mut self, owner: InstanceId, entry: MatrixEntry) -> Result<MatrixHandle> {
        self.ensure_active()?;

        let shared = Arc::new(RwLock::new(entry));
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let slot = u32::try_from(self.slots.len()).map_err(|_| Error::OutOfMemory {
                    size: std::mem::size_of::<Slot>(),
                })?;
                // Generations start at 1 so a zeroed handle never resolves
                self.slots.push(Slot {
                    generation: 1,
                    entry: None,
                });
                slot
            }
        };

        let record = &mut self.slots[slot as usize];
        record.entry = Some(shared);
        self.live += 1;
        Ok(MatrixHandle::new(owner, slot, record.generation))
    }

    /// Resolve a handle to its matrix
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the instance is finalized or the handle is stale
    /// - `InvalidArgument` if the handle is null or issued by another instance
    pub(crate) fn get(&self, owner: InstanceId, handle: MatrixHandle) -> Result<SharedMatrix> {
        self.ensure_active()?;
        if handle.is_null() {
            return Err(Error::invalid_argument("matrix", "null matrix handle"));
        }
        if !handle.belongs_to(owner) {
            return Err(Error::invalid_argument(
                "matrix",
                format!("{} does not belong to {}", handle, owner),
            ));
        }
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.clone())
            .ok_or_else(|| Error::invalid_state(format!("{} is stale", handle)))
    }

    /// Remove a matrix, invalidating its handle
    pub(crate) fn remove(&mut self, owner: InstanceId, handle: MatrixHandle) -> Result<SharedMatrix> {
        let entry = self.get(owner, handle)?;
        let slot = &mut self.slots[handle.slot as usize];
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(handle.slot);
        self.live -= 1;
        Ok(entry)
    }

    /// Finalize the registry and hand back every live matrix
    pub(crate) fn drain(&mut self, owner: InstanceId) -> Result<Vec<(MatrixHandle, SharedMatrix)>> {
        self.ensure_active()?;
        self.finalized = true;
        self.free.clear();
        self.live = 0;

        let drained = self
            .slots
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, record)| {
                let entry = record.entry.take()?;
                Some((MatrixHandle::new(owner, slot as u32, record.generation), entry))
            })
            .collect();
        Ok(drained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> MatrixEntry {
        MatrixEntry::new(CsrMatrix::empty([2, 2]), "m".to_string())
    }

    #[test]
    fn test_insert_get_remove() {
        let owner = InstanceId::next();
        let mut registry = Registry::new();
        let h = registry.insert(owner, entry()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(owner, h).is_ok());

        registry.remove(owner, h).unwrap();
        assert_eq!(registry.len(), 0);
        assert!(matches!(registry.get(owner, h), Err(Error::InvalidState(_))));
        assert!(matches!(registry.remove(owner, h), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let owner = InstanceId::next();
        let mut registry = Registry::new();
        let h1 = registry.insert(owner, entry()).unwrap();
        registry.remove(owner, h1).unwrap();
        let h2 = registry.insert(owner, entry()).unwrap();

        assert_eq!(h1.slot, h2.slot);
        assert_ne!(h1.generation, h2.generation);
        assert!(registry.get(owner, h1).is_err());
        assert!(registry.get(owner, h2).is_ok());
    }

    #[test]
    fn test_foreign_and_null_handles() {
        let owner = InstanceId::next();
        let other = InstanceId::next();
        let mut registry = Registry::new();
        let h = registry.insert(owner, entry()).unwrap();

        assert!(matches!(
            registry.get(other, h),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            registry.get(owner, MatrixHandle::NULL),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_drain_finalizes() {
        let owner = InstanceId::next();
        let mut registry = Registry::new();
        let h = registry.insert(owner, entry()).unwrap();
        registry.insert(owner, entry()).unwrap();

        let drained = registry.drain(owner).unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, h);
        assert!(registry.is_finalized());
        assert!(matches!(registry.get(owner, h), Err(Error::InvalidState(_))));
        assert!(matches!(registry.drain(owner), Err(Error::InvalidState(_))));
        assert!(registry.insert(owner, entry()).is_err());
    }
}
