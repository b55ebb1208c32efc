//! Process-wide registry of live allocations, keyed by address.
//!
//! With the `track-off` feature enabled this module is replaced by an
//! API-identical no-op mirror, so every tracking call compiles down to
//! nothing and the allocation facade degenerates to the bare system
//! allocator.

use thiserror::Error;

cfg_if::cfg_if! {
    if #[cfg(feature = "track-off")] {
        mod off;
        pub use off::*;
    } else {
        mod on;
        pub use on::*;
    }
}

/// Failures of the tracker's own bookkeeping.
///
/// The allocation facade and [`TrackedVec`](crate::TrackedVec) treat every
/// variant as unrecoverable corruption: a tracker desynchronization cannot
/// be safely continued past, so they log the error and abort the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackError {
    /// The address is not currently tracked. Signals a double free, a
    /// use-after-free or a release of memory the tracker never saw.
    #[error("address {0:#x} is not tracked")]
    AddressNotFound(usize),
    /// The tracker could not allocate its own bookkeeping record.
    #[error("tracker bookkeeping allocation failed")]
    OutOfMemory,
    /// The tracker mutex was poisoned by a panic mid-mutation.
    #[error("tracker mutex poisoned")]
    LockPoisoned,
}

pub type TrackResult<T = ()> = Result<T, TrackError>;
