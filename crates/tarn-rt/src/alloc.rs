//! The contract the runtime needs from an allocator/collector.
//!
//! Reclamation is not the runtime's concern: objects and fragments are reference
//! counted and released when the last reference goes away. What the runtime does
//! need is storage for a given number of slots under one of two policies, and a
//! clean failure when that storage cannot be had.

use std::cell::Cell;

use crate::attr::Attr;
use crate::object::AllocPolicy;

pub const ENV_MAX_HEAP_ATTRS: &str = "TARN_MAX_HEAP_ATTRS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocKind {
    Object(AllocPolicy),
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot allocate {slots} slots for {kind:?}")]
pub struct AllocError {
    pub kind: AllocKind,
    pub slots: usize,
}

pub trait Allocator {
    /// Storage for `slots` attrs, every one [`Attr::Null`].
    fn allocate(&self, kind: AllocKind, slots: usize) -> Result<Box<[Attr]>, AllocError>;

    fn stats(&self) -> AllocStats {
        AllocStats::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    pub objects: u64,
    pub immutable_objects: u64,
    pub fragments: u64,
    pub slots: u64,
}

/// Global-heap allocator with an optional lifetime budget on slots handed out.
#[derive(Debug, Default)]
pub struct SystemAllocator {
    max_slots: Option<u64>,
    stats: Cell<AllocStats>,
}

impl SystemAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_slots(max_slots: u64) -> Self {
        Self {
            max_slots: Some(max_slots),
            stats: Cell::new(AllocStats::default()),
        }
    }

    /// Reads the slot budget from `TARN_MAX_HEAP_ATTRS`; unset or invalid means unlimited.
    pub fn from_env() -> Self {
        match std::env::var(ENV_MAX_HEAP_ATTRS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            Some(max) => Self::with_max_slots(max),
            None => Self::new(),
        }
    }
}

impl Allocator for SystemAllocator {
    fn allocate(&self, kind: AllocKind, slots: usize) -> Result<Box<[Attr]>, AllocError> {
        let err = AllocError { kind, slots };
        let mut stats = self.stats.get();
        let total = stats.slots.saturating_add(slots as u64);
        if self.max_slots.is_some_and(|max| total > max) {
            tracing::debug!(?kind, slots, used = stats.slots, "slot budget exhausted");
            return Err(err);
        }

        let mut storage: Vec<Attr> = Vec::new();
        storage.try_reserve_exact(slots).map_err(|_| err)?;
        storage.resize(slots, Attr::Null);

        stats.slots = total;
        match kind {
            AllocKind::Object(AllocPolicy::Heap) => stats.objects += 1,
            AllocKind::Object(AllocPolicy::Immutable) => {
                stats.objects += 1;
                stats.immutable_objects += 1;
            }
            AllocKind::Fragment => stats.fragments += 1,
        }
        self.stats.set(stats);
        tracing::trace!(?kind, slots, "allocate");
        Ok(storage.into_boxed_slice())
    }

    fn stats(&self) -> AllocStats {
        self.stats.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_enforced_across_allocations() {
        let alloc = SystemAllocator::with_max_slots(5);
        let a = alloc
            .allocate(AllocKind::Object(AllocPolicy::Heap), 3)
            .expect("first allocation fits");
        assert_eq!(a.len(), 3);
        assert!(a.iter().all(Attr::is_null));
        let err = alloc.allocate(AllocKind::Fragment, 3).unwrap_err();
        assert_eq!(err.slots, 3);
        assert_eq!(err.to_string(), "cannot allocate 3 slots for Fragment");
        assert!(alloc.allocate(AllocKind::Fragment, 2).is_ok());
        let stats = alloc.stats();
        assert_eq!(stats.objects, 1);
        assert_eq!(stats.fragments, 1);
        assert_eq!(stats.slots, 5);
    }

    #[test]
    fn immutable_objects_are_counted_separately() {
        let alloc = SystemAllocator::new();
        alloc
            .allocate(AllocKind::Object(AllocPolicy::Immutable), 1)
            .unwrap();
        alloc.allocate(AllocKind::Object(AllocPolicy::Heap), 1).unwrap();
        let stats = alloc.stats();
        assert_eq!(stats.objects, 2);
        assert_eq!(stats.immutable_objects, 1);
    }
}
