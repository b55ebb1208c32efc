use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{TrackError, TrackResult};
use crate::site::AllocSite;

const NIL: usize = usize::MAX;

struct Record {
    addr: usize,
    site: AllocSite,
    prev: usize,
    next: usize,
}

/// Arena-backed doubly linked list of live allocations, linked by slot
/// index rather than by pointer. The links preserve registration order for
/// [`Tracker::trace`]; the hash index gives O(1) removal by address.
struct Registry {
    slots: Vec<Option<Record>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    index: HashMap<usize, usize>,
}

impl Registry {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            index: HashMap::new(),
        }
    }

    fn record(&self, idx: usize) -> &Record {
        self.slots[idx].as_ref().expect("linked slot is live")
    }

    fn record_mut(&mut self, idx: usize) -> &mut Record {
        self.slots[idx].as_mut().expect("linked slot is live")
    }

    fn insert(&mut self, addr: usize, site: AllocSite) -> TrackResult {
        // A live address appearing twice means the underlying allocator
        // handed out the same block twice; the registry cannot represent it.
        debug_assert!(
            !self.index.contains_key(&addr),
            "address {addr:#x} registered twice"
        );
        self.index
            .try_reserve(1)
            .map_err(|_| TrackError::OutOfMemory)?;
        if self.free.is_empty() {
            self.slots
                .try_reserve(1)
                .map_err(|_| TrackError::OutOfMemory)?;
        }
        let record = Record {
            addr,
            site,
            prev: self.tail,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(record);
                idx
            }
            None => {
                self.slots.push(Some(record));
                self.slots.len() - 1
            }
        };
        if self.tail == NIL {
            self.head = idx;
        } else {
            self.record_mut(self.tail).next = idx;
        }
        self.tail = idx;
        self.index.insert(addr, idx);
        Ok(())
    }

    fn remove(&mut self, addr: usize) -> TrackResult {
        let idx = self
            .index
            .remove(&addr)
            .ok_or(TrackError::AddressNotFound(addr))?;
        let record = self.slots[idx].take().expect("indexed slot is live");
        if record.prev == NIL {
            self.head = record.next;
        } else {
            self.record_mut(record.prev).next = record.next;
        }
        if record.next == NIL {
            self.tail = record.prev;
        } else {
            self.record_mut(record.next).prev = record.prev;
        }
        self.free.push(idx);
        Ok(())
    }

    fn rekey(&mut self, old: usize, new: usize) -> TrackResult {
        if !self.index.contains_key(&old) {
            return Err(TrackError::AddressNotFound(old));
        }
        // realloc may hand back the same block, so old == new is legal.
        debug_assert!(
            new == old || !self.index.contains_key(&new),
            "address {new:#x} already tracked"
        );
        self.index
            .try_reserve(1)
            .map_err(|_| TrackError::OutOfMemory)?;
        let idx = self.index.remove(&old).expect("presence checked above");
        self.record_mut(idx).addr = new;
        self.index.insert(new, idx);
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn for_each(&self, visitor: &mut dyn FnMut(usize, AllocSite)) {
        let mut cur = self.head;
        while cur != NIL {
            let record = self.record(cur);
            visitor(record.addr, record.site);
            cur = record.next;
        }
    }
}

/// An allocation tracker: an exact address → allocation-site mapping.
///
/// Every operation serializes behind one mutex; this is a diagnostic
/// subsystem, not a hot path. The registry itself is built lazily on the
/// first registration and dropped again once the tracked set empties, so a
/// tracker that is never used costs nothing beyond the static itself.
///
/// The process-wide instance used by the allocation facade and
/// [`TrackedVec`](crate::TrackedVec) is reachable via [`global`]; separate
/// instances can be created for tests or scoped bookkeeping.
///
/// # Examples
///
/// ```rust
/// use memtrack::{AllocSite, Tracker};
///
/// let tracker = Tracker::new();
/// tracker.register(0x1000 as *mut u8, AllocSite::new("a.c", 1))?;
/// assert_eq!(tracker.tracked_count()?, 1);
/// tracker.unregister(0x1000 as *mut u8)?;
/// assert_eq!(tracker.tracked_count()?, 0);
/// # Ok::<(), memtrack::TrackError>(())
/// ```
pub struct Tracker {
    registry: Mutex<Option<Registry>>,
}

impl Tracker {
    pub const fn new() -> Self {
        Self {
            registry: Mutex::new(None),
        }
    }

    fn lock(&self) -> TrackResult<MutexGuard<'_, Option<Registry>>> {
        self.registry.lock().map_err(|_| TrackError::LockPoisoned)
    }

    /// Starts tracking `addr` under `site`. A null address is a successful
    /// no-op.
    pub fn register(&self, addr: *mut u8, site: AllocSite) -> TrackResult {
        if addr.is_null() {
            return Ok(());
        }
        let mut guard = self.lock()?;
        guard
            .get_or_insert_with(Registry::new)
            .insert(addr as usize, site)
    }

    /// Stops tracking `addr`. A null address is a successful no-op; an
    /// address the tracker never saw is [`TrackError::AddressNotFound`].
    pub fn unregister(&self, addr: *mut u8) -> TrackResult {
        if addr.is_null() {
            return Ok(());
        }
        let mut guard = self.lock()?;
        let registry = guard
            .as_mut()
            .ok_or(TrackError::AddressNotFound(addr as usize))?;
        registry.remove(addr as usize)?;
        // The emptiness test and the teardown happen under the same lock
        // hold; this is the only safe point to cross the lazy-lifecycle
        // boundary.
        if registry.is_empty() {
            *guard = None;
        }
        Ok(())
    }

    /// Rekeys the record for `old` to `new` without touching its recorded
    /// site or its position in registration order. Used after a
    /// reallocation that may have moved the buffer. A null `old` is a
    /// successful no-op.
    pub fn change_register(&self, old: *mut u8, new: *mut u8) -> TrackResult {
        if old.is_null() {
            return Ok(());
        }
        let mut guard = self.lock()?;
        let registry = guard
            .as_mut()
            .ok_or(TrackError::AddressNotFound(old as usize))?;
        registry.rekey(old as usize, new as usize)
    }

    /// Invokes `visitor` once per live record, in registration order. An
    /// empty tracker is a successful no-op.
    ///
    /// The tracker mutex is held for the duration of the walk; visitors
    /// must not call back into this tracker.
    pub fn trace<F>(&self, mut visitor: F) -> TrackResult
    where
        F: FnMut(*mut u8, AllocSite),
    {
        let guard = self.lock()?;
        if let Some(registry) = guard.as_ref() {
            registry.for_each(&mut |addr, site| visitor(addr as *mut u8, site));
        }
        Ok(())
    }

    /// Number of currently tracked allocations.
    pub fn tracked_count(&self) -> TrackResult<usize> {
        Ok(self.lock()?.as_ref().map_or(0, Registry::len))
    }

    /// Snapshot of the live set, in registration order.
    pub fn live(&self) -> TrackResult<Vec<(usize, AllocSite)>> {
        let mut entries = Vec::new();
        self.trace(|addr, site| entries.push((addr as usize, site)))?;
        Ok(entries)
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Tracker = Tracker::new();

/// The process-wide tracker fed by the allocation facade.
pub fn global() -> &'static Tracker {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(line: u32) -> AllocSite {
        AllocSite::new("a.c", line)
    }

    #[test]
    fn test_trace_preserves_registration_order() {
        let tracker = Tracker::new();
        for n in 1..=4usize {
            tracker.register((n * 0x100) as *mut u8, site(n as u32)).unwrap();
        }
        tracker.unregister(0x200 as *mut u8).unwrap();
        tracker.register(0x500 as *mut u8, site(5)).unwrap();

        let addrs: Vec<usize> = tracker
            .live()
            .unwrap()
            .into_iter()
            .map(|(addr, _)| addr)
            .collect();
        assert_eq!(addrs, vec![0x100, 0x300, 0x400, 0x500]);
    }

    #[test]
    fn test_arena_slot_reuse_keeps_links_intact() {
        let tracker = Tracker::new();
        tracker.register(0x10 as *mut u8, site(1)).unwrap();
        tracker.register(0x20 as *mut u8, site(2)).unwrap();
        // Free the head slot, then reuse it for a new tail record.
        tracker.unregister(0x10 as *mut u8).unwrap();
        tracker.register(0x30 as *mut u8, site(3)).unwrap();

        let addrs: Vec<usize> = tracker
            .live()
            .unwrap()
            .into_iter()
            .map(|(addr, _)| addr)
            .collect();
        assert_eq!(addrs, vec![0x20, 0x30]);
        assert_eq!(tracker.tracked_count().unwrap(), 2);
    }

    #[test]
    fn test_rekey_to_the_same_address_is_allowed() {
        let tracker = Tracker::new();
        tracker.register(0x10 as *mut u8, site(1)).unwrap();
        tracker
            .change_register(0x10 as *mut u8, 0x10 as *mut u8)
            .unwrap();
        assert_eq!(tracker.live().unwrap(), vec![(0x10, site(1))]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already tracked")]
    fn test_rekey_onto_another_live_address_is_rejected() {
        let tracker = Tracker::new();
        tracker.register(0x10 as *mut u8, site(1)).unwrap();
        tracker.register(0x20 as *mut u8, site(2)).unwrap();
        let _ = tracker.change_register(0x10 as *mut u8, 0x20 as *mut u8);
    }

    #[test]
    fn test_registry_is_rebuilt_after_teardown() {
        let tracker = Tracker::new();
        tracker.register(0x10 as *mut u8, site(1)).unwrap();
        tracker.unregister(0x10 as *mut u8).unwrap();
        assert_eq!(tracker.tracked_count().unwrap(), 0);

        // The registry was torn down at the empty transition; the next
        // registration must rebuild it from scratch.
        tracker.register(0x20 as *mut u8, site(2)).unwrap();
        assert_eq!(tracker.live().unwrap(), vec![(0x20, site(2))]);
    }
}
