use super::TrackResult;
use crate::site::AllocSite;

/// No-op mirror of the real tracker, selected by the `track-off` feature.
///
/// Every operation succeeds without recording anything, so the allocation
/// facade and [`TrackedVec`](crate::TrackedVec) behave as plain, unguarded
/// allocation wrappers with identical functional results and no diagnostic
/// capability.
pub struct Tracker {
    _priv: (),
}

impl Tracker {
    pub const fn new() -> Self {
        Self { _priv: () }
    }

    #[inline]
    pub fn register(&self, _addr: *mut u8, _site: AllocSite) -> TrackResult {
        Ok(())
    }

    #[inline]
    pub fn unregister(&self, _addr: *mut u8) -> TrackResult {
        Ok(())
    }

    #[inline]
    pub fn change_register(&self, _old: *mut u8, _new: *mut u8) -> TrackResult {
        Ok(())
    }

    #[inline]
    pub fn trace<F>(&self, _visitor: F) -> TrackResult
    where
        F: FnMut(*mut u8, AllocSite),
    {
        Ok(())
    }

    #[inline]
    pub fn tracked_count(&self) -> TrackResult<usize> {
        Ok(0)
    }

    #[inline]
    pub fn live(&self) -> TrackResult<Vec<(usize, AllocSite)>> {
        Ok(Vec::new())
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Tracker = Tracker::new();

/// The process-wide tracker; inert in `track-off` builds.
pub fn global() -> &'static Tracker {
    &GLOBAL
}
